use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product_image::ProductImage;
use crate::domain::types::{ProductDescription, ProductId, ProductName, ProductPrice};

/// A catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub description: Option<ProductDescription>,
    pub price: ProductPrice,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A product together with every image attached to it.
///
/// Serializes as the product's own fields plus an `images` array, which is the
/// shape the storefront and the admin detail pages receive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

impl ProductWithImages {
    pub fn new(product: Product, images: Vec<ProductImage>) -> Self {
        Self { product, images }
    }

    /// The image flagged as primary, if any.
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|image| image.is_primary)
    }
}
