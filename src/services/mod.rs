//! Business logic behind the HTTP routes.
//!
//! Services take their collaborators (repository, file store, auth context)
//! as arguments and return page data or a [`ServiceError`], so routes stay
//! thin wrappers.

use serde::Serialize;

use crate::domain::product::ProductWithImages;
use crate::domain::types::ProductId;
use crate::repository::ProductReader;

pub mod account;
pub mod admin;
pub mod errors;
pub mod images;
pub mod storefront;

pub use errors::{ServiceError, ServiceResult};

/// Page data for a single product with its images.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductPage {
    pub product: ProductWithImages,
}

/// Looks up a product and its images, failing with `NotFound` for unknown or
/// non-positive identifiers.
fn find_product_with_images<R>(product_id: i32, repo: &R) -> ServiceResult<ProductWithImages>
where
    R: ProductReader,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_with_images(product_id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
