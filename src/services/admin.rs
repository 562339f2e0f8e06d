use serde::Serialize;

use crate::domain::product::Product;
use crate::repository::ProductReader;

use super::{ProductPage, ServiceError, ServiceResult, find_product_with_images};

/// Page data for the admin product listing. Images are not loaded here.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminProductsPage {
    pub products: Vec<Product>,
}

/// Every product, newest first, without images.
pub fn list_products_admin<R>(repo: &R) -> ServiceResult<AdminProductsPage>
where
    R: ProductReader,
{
    match repo.list_products() {
        Ok(products) => Ok(AdminProductsPage { products }),
        Err(e) => {
            log::error!("Failed to list products for admin: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// A single product with its images, for the admin detail page.
pub fn show_product_admin<R>(product_id: i32, repo: &R) -> ServiceResult<ProductPage>
where
    R: ProductReader,
{
    let product = find_product_with_images(product_id, repo)?;
    Ok(ProductPage { product })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::repository::test::TestRepository;
    use crate::services::fixtures::{image, product};

    fn repo() -> TestRepository {
        TestRepository::new(
            vec![product(1, 100), product(2, 200)],
            vec![image(1, 1, true), image(2, 2, true), image(3, 2, false)],
        )
    }

    #[test]
    fn admin_listing_never_carries_images() {
        let page = list_products_admin(&repo()).unwrap();
        let value: Value = serde_json::to_value(&page).unwrap();

        let products = value["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["id"], 2);
        for product in products {
            assert!(product.get("images").is_none());
        }
    }

    #[test]
    fn admin_detail_loads_images() {
        let page = show_product_admin(2, &repo()).unwrap();
        let value: Value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["product"]["images"].as_array().unwrap().len(), 2);
        assert_eq!(value["product"]["name"], "Product 2");
    }

    #[test]
    fn admin_detail_unknown_product_is_not_found() {
        assert_eq!(
            show_product_admin(999_999, &repo()),
            Err(ServiceError::NotFound)
        );
    }
}
