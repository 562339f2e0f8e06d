use crate::db::{DbConnection, DbPool};
use crate::domain::product::{Product, ProductWithImages};
use crate::domain::product_image::{NewProductImage, ProductImage};
use crate::domain::types::ProductId;

pub mod errors;
pub mod product;
pub mod product_image;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for product entities.
///
/// Every listing is ordered newest first.
pub trait ProductReader {
    /// List all products without their images.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    /// List all products with their images loaded.
    fn list_products_with_images(&self) -> RepositoryResult<Vec<ProductWithImages>>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Retrieve a product and all of its images.
    fn get_product_with_images(&self, id: ProductId)
    -> RepositoryResult<Option<ProductWithImages>>;
}

/// Read-only operations for product images.
pub trait ProductImageReader {
    /// List the images of a product in upload order.
    fn list_product_images(&self, product_id: ProductId) -> RepositoryResult<Vec<ProductImage>>;
}

/// Write operations for product images.
pub trait ProductImageWriter {
    /// Persist a new image row.
    ///
    /// The row is primary exactly when it is the first image committed for
    /// the product; the decision is made atomically with the insert.
    fn create_product_image(&self, image: &NewProductImage) -> RepositoryResult<ProductImage>;
}
