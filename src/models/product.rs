use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::Product as DomainProduct;
use crate::domain::types::{
    ProductDescription, ProductId, ProductName, ProductPrice, TypeConstraintError,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(product.id)?,
            name: ProductName::new(product.name)?,
            // Blank descriptions are stored as empty strings by some seeders.
            description: product
                .description
                .filter(|d| !d.trim().is_empty())
                .map(ProductDescription::new)
                .transpose()?,
            price: ProductPrice::new(product.price)?,
            created_at: product.created_at,
            updated_at: product.updated_at,
        })
    }
}
