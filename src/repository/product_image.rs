use chrono::Utc;
use diesel::prelude::*;

use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::ProductId;
use crate::models::product_image::{
    NewProductImage as DbNewProductImage, ProductImage as DbProductImage,
};
use crate::repository::{
    DieselRepository, ProductImageReader, ProductImageWriter, RepositoryError, RepositoryResult,
};

/// Converts loaded rows, skipping rows whose stored path the application
/// does not serve so one bad row cannot fail a whole page.
pub(super) fn into_domain_images(images: Vec<DbProductImage>) -> Vec<ProductImage> {
    images
        .into_iter()
        .filter_map(|image| {
            let id = image.id;
            match ProductImage::try_from(image) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Skipping product image {id}: {e}");
                    None
                }
            }
        })
        .collect()
}

impl ProductImageReader for DieselRepository {
    fn list_product_images(&self, product_id: ProductId) -> RepositoryResult<Vec<ProductImage>> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let items = product_images::table
            .filter(product_images::product_id.eq(product_id.get()))
            .order(product_images::id.asc())
            .select(DbProductImage::as_select())
            .load(&mut conn)?;

        Ok(into_domain_images(items))
    }
}

impl ProductImageWriter for DieselRepository {
    fn create_product_image(&self, image: &NewProductImage) -> RepositoryResult<ProductImage> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        // BEGIN IMMEDIATE takes the write lock before the count, so concurrent
        // uploads for the same product serialize here.
        let row = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let existing = product_images::table
                .filter(product_images::product_id.eq(image.product_id.get()))
                .count()
                .get_result::<i64>(conn)?;

            let record = DbNewProductImage {
                product_id: image.product_id.get(),
                file_path: image.file_path.as_str(),
                is_primary: existing == 0,
                created_at: now,
                updated_at: now,
            };

            let row = diesel::insert_into(product_images::table)
                .values(&record)
                .returning(DbProductImage::as_returning())
                .get_result(conn)?;

            Ok(row)
        })?;

        Ok(row.try_into()?)
    }
}
