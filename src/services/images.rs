use chrono::{DateTime, Utc};

use crate::domain::product::Product;
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::{ImagePath, ProductId};
use crate::forms::FieldErrors;
use crate::forms::images::{UploadImageForm, UploadImagePayload};
use crate::repository::{ProductImageWriter, ProductReader};
use crate::storage::{ImageStore, stored_file_name};

use super::{ServiceError, ServiceResult};

/// Handles an image upload for a product.
///
/// The product is resolved first so an unknown id fails with `NotFound`
/// before validation, the file store or the database are touched. `form` is
/// the parsed multipart body, or the field errors for a body that could not
/// be read as one. The form is then validated and the file stored via
/// [`store_image`].
pub fn upload_product_image<R>(
    product_id: i32,
    form: Result<UploadImageForm, FieldErrors>,
    max_upload_kb: u64,
    store: &ImageStore,
    repo: &R,
) -> ServiceResult<Option<ProductImage>>
where
    R: ProductReader + ProductImageWriter,
{
    let product_id = ProductId::new(product_id).map_err(|_| ServiceError::NotFound)?;

    let product = match repo.get_product_by_id(product_id) {
        Ok(Some(product)) => product,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let payload = form?.into_payload(max_upload_kb)?;

    store_image(&product, Some(payload), Utc::now(), store, repo)
}

/// Moves a validated upload into the image store and records it.
///
/// Without a payload nothing happens and `Ok(None)` is returned. The new row
/// is primary when it is the product's first image. The store never replaces
/// an existing file, so if the row cannot be written the file stored here is
/// removed again without touching other images.
pub fn store_image<R>(
    product: &Product,
    payload: Option<UploadImagePayload>,
    uploaded_at: DateTime<Utc>,
    store: &ImageStore,
    repo: &R,
) -> ServiceResult<Option<ProductImage>>
where
    R: ProductImageWriter,
{
    let Some(payload) = payload else {
        return Ok(None);
    };

    let file_name = stored_file_name(
        uploaded_at.timestamp(),
        &payload.original_name,
        payload.format,
    );
    let file_path = match ImagePath::for_file_name(&file_name) {
        Ok(path) => path,
        Err(e) => {
            log::error!("Generated image path is invalid: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let file_path = match store.store(payload.file, &file_path) {
        Ok(stored) => stored,
        Err(e) => {
            log::error!("Failed to store image {file_path}: {e}");
            return Err(e.into());
        }
    };

    let new_image = NewProductImage {
        product_id: product.id,
        file_path: file_path.clone(),
    };

    match repo.create_product_image(&new_image) {
        Ok(image) => {
            log::info!(
                "Stored image {} for product {} (primary: {})",
                image.file_path,
                product.id,
                image.is_primary
            );
            Ok(Some(image))
        }
        Err(e) => {
            log::error!("Failed to record image {file_path}: {e}");
            if let Err(e) = store.remove(&file_path) {
                log::warn!("Failed to remove orphaned image {file_path}: {e}");
            }
            Err(ServiceError::Internal)
        }
    }
}
