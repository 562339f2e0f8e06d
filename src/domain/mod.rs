//! Domain entities and value objects shared by the repository and service
//! layers.

pub mod product;
pub mod product_image;
pub mod types;
