use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_image::ProductImage as DomainProductImage;
use crate::domain::types::{ImagePath, ProductId, ProductImageId, TypeConstraintError};
use crate::models::product::Product;

/// Diesel model representing the `product_images` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = crate::schema::product_images)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub file_path: String,
    pub is_primary: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable form of [`ProductImage`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub file_path: &'a str,
    pub is_primary: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ProductImage> for DomainProductImage {
    type Error = TypeConstraintError;

    fn try_from(image: ProductImage) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductImageId::new(image.id)?,
            product_id: ProductId::new(image.product_id)?,
            file_path: ImagePath::new(image.file_path)?,
            is_primary: image.is_primary,
            created_at: image.created_at,
            updated_at: image.updated_at,
        })
    }
}
