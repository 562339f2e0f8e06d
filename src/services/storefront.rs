use serde::Serialize;

use crate::domain::product::ProductWithImages;
use crate::repository::ProductReader;

use super::{ProductPage, ServiceError, ServiceResult, find_product_with_images};

/// Whether the auth service's entry points are registered in the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthRoutes {
    pub can_login: bool,
    pub can_register: bool,
}

/// Page data for the public product listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontPage {
    pub products: Vec<ProductWithImages>,
    pub can_login: bool,
    pub can_register: bool,
}

/// Every product with its images, newest first.
pub fn list_products<R>(auth_routes: AuthRoutes, repo: &R) -> ServiceResult<StorefrontPage>
where
    R: ProductReader,
{
    let products = match repo.list_products_with_images() {
        Ok(products) => products,
        Err(e) => {
            log::error!("Failed to list products: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(StorefrontPage {
        products,
        can_login: auth_routes.can_login,
        can_register: auth_routes.can_register,
    })
}

/// A single product with its images.
pub fn show_product<R>(product_id: i32, repo: &R) -> ServiceResult<ProductPage>
where
    R: ProductReader,
{
    let product = find_product_with_images(product_id, repo)?;
    Ok(ProductPage { product })
}
