use diesel::prelude::*;

use crate::domain::product::{Product, ProductWithImages};
use crate::domain::types::ProductId;
use crate::models::product::Product as DbProduct;
use crate::models::product_image::ProductImage as DbProductImage;
use crate::repository::product_image::into_domain_images;
use crate::repository::{DieselRepository, ProductReader, RepositoryResult};

impl ProductReader for DieselRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let items = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .select(DbProduct::as_select())
            .load(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn list_products_with_images(&self) -> RepositoryResult<Vec<ProductWithImages>> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let db_products = products::table
            .order((products::created_at.desc(), products::id.desc()))
            .select(DbProduct::as_select())
            .load(&mut conn)?;

        let db_images = DbProductImage::belonging_to(&db_products)
            .order(product_images::id.asc())
            .select(DbProductImage::as_select())
            .load(&mut conn)?;

        let grouped = db_images.grouped_by(&db_products);

        let mut items = Vec::with_capacity(db_products.len());
        for (product, images) in db_products.into_iter().zip(grouped) {
            items.push(ProductWithImages::new(
                product.try_into()?,
                into_domain_images(images),
            ));
        }

        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::id.eq(id.get()))
            .select(DbProduct::as_select())
            .first(&mut conn)
            .optional()?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }

    fn get_product_with_images(
        &self,
        id: ProductId,
    ) -> RepositoryResult<Option<ProductWithImages>> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let Some(product) = products::table
            .filter(products::id.eq(id.get()))
            .select(DbProduct::as_select())
            .first(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let images = DbProductImage::belonging_to(&product)
            .order(product_images::id.asc())
            .select(DbProductImage::as_select())
            .load(&mut conn)?;

        Ok(Some(ProductWithImages::new(
            product.try_into()?,
            into_domain_images(images),
        )))
    }
}
