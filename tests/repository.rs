use std::sync::Arc;
use std::thread;

use catalog::domain::product_image::NewProductImage;
use catalog::domain::types::{ImagePath, ProductId};
use catalog::repository::{
    ProductImageReader, ProductImageWriter, ProductReader, RepositoryError,
};
use catalog::schema::{product_images, products};
use diesel::prelude::*;

mod common;

fn new_image(product_id: ProductId, file_name: &str) -> NewProductImage {
    NewProductImage {
        product_id,
        file_path: ImagePath::for_file_name(file_name).expect("valid image path"),
    }
}

#[test]
fn lists_products_newest_first() {
    let env = common::TestEnv::new();
    let repo = env.repo();

    let old = env.insert_product("Old", 1_000);
    let new = env.insert_product("New", 3_000);
    let middle = env.insert_product("Middle", 2_000);

    let ids = repo
        .list_products()
        .expect("should list products")
        .into_iter()
        .map(|p| p.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, [new, middle, old]);

    let ids = repo
        .list_products_with_images()
        .expect("should list products with images")
        .into_iter()
        .map(|p| p.product.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, [new, middle, old]);
}

#[test]
fn same_timestamp_breaks_ties_by_id() {
    let env = common::TestEnv::new();
    let first = env.insert_product("First", 5_000);
    let second = env.insert_product("Second", 5_000);

    let ids = env
        .repo()
        .list_products()
        .expect("should list products")
        .into_iter()
        .map(|p| p.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, [second, first]);
}

#[test]
fn loads_exactly_each_products_images() {
    let env = common::TestEnv::new();
    let repo = env.repo();

    let a = env.insert_product("A", 1_000);
    let b = env.insert_product("B", 2_000);
    let c = env.insert_product("C", 3_000);

    repo.create_product_image(&new_image(a, "1_a1.png")).unwrap();
    repo.create_product_image(&new_image(b, "1_b1.png")).unwrap();
    repo.create_product_image(&new_image(a, "1_a2.png")).unwrap();

    let listed = repo.list_products_with_images().unwrap();
    let paths = |id: ProductId| {
        listed
            .iter()
            .find(|p| p.product.id == id)
            .unwrap()
            .images
            .iter()
            .map(|i| i.file_path.as_str().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(
        paths(a),
        ["images/products/1_a1.png", "images/products/1_a2.png"]
    );
    assert_eq!(paths(b), ["images/products/1_b1.png"]);
    assert!(paths(c).is_empty());

    for id in [a, b, c] {
        let detail = repo
            .get_product_with_images(id)
            .unwrap()
            .expect("product should exist");
        assert_eq!(detail.images, repo.list_product_images(id).unwrap());
        assert!(detail.images.iter().all(|i| i.product_id == id));
    }
}

#[test]
fn missing_product_is_none() {
    let env = common::TestEnv::new();
    let repo = env.repo();
    let missing = ProductId::new(999_999).unwrap();

    assert!(repo.get_product_by_id(missing).unwrap().is_none());
    assert!(repo.get_product_with_images(missing).unwrap().is_none());
}

#[test]
fn first_image_is_primary_and_later_ones_are_not() {
    let env = common::TestEnv::new();
    let repo = env.repo();
    let product = env.insert_product("Camera", 1_000);

    let first = repo
        .create_product_image(&new_image(product, "1_front.jpg"))
        .expect("should create first image");
    let second = repo
        .create_product_image(&new_image(product, "2_back.jpg"))
        .expect("should create second image");

    assert!(first.is_primary);
    assert!(!second.is_primary);
    assert_eq!(first.file_path, "images/products/1_front.jpg");
    assert_eq!(repo.list_product_images(product).unwrap().len(), 2);
}

#[test]
fn image_for_unknown_product_violates_foreign_key() {
    let env = common::TestEnv::new();
    let repo = env.repo();

    let result = repo.create_product_image(&new_image(ProductId::new(42).unwrap(), "1_x.png"));
    assert!(matches!(result, Err(RepositoryError::Database(_))));
}

#[test]
fn second_primary_is_rejected_by_the_store() {
    let env = common::TestEnv::new();
    let product = env.insert_product("Lamp", 1_000);
    env.repo()
        .create_product_image(&new_image(product, "1_a.png"))
        .unwrap();

    let mut conn = env.db.pool().get().unwrap();
    let result = diesel::insert_into(product_images::table)
        .values((
            product_images::product_id.eq(product.get()),
            product_images::file_path.eq("images/products/1_b.png"),
            product_images::is_primary.eq(true),
        ))
        .execute(&mut conn);

    assert!(result.is_err());
}

#[test]
fn concurrent_first_uploads_yield_one_primary() {
    let env = common::TestEnv::new();
    let product = env.insert_product("Chair", 1_000);
    let repo = Arc::new(env.repo());

    let handles = (0..4)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || {
                repo.create_product_image(&new_image(product, &format!("1_{i}.png")))
                    .expect("insert should succeed")
            })
        })
        .collect::<Vec<_>>();

    let created = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect::<Vec<_>>();

    assert_eq!(created.len(), 4);
    assert_eq!(created.iter().filter(|i| i.is_primary).count(), 1);

    let mut conn = env.db.pool().get().unwrap();
    let primaries = product_images::table
        .filter(product_images::product_id.eq(product.get()))
        .filter(product_images::is_primary.eq(true))
        .count()
        .get_result::<i64>(&mut conn)
        .unwrap();
    assert_eq!(primaries, 1);
}

#[test]
fn deleting_a_product_removes_its_images() {
    let env = common::TestEnv::new();
    let repo = env.repo();
    let product = env.insert_product("Desk", 1_000);
    repo.create_product_image(&new_image(product, "1_desk.png"))
        .unwrap();

    let mut conn = env.db.pool().get().unwrap();
    diesel::delete(products::table.filter(products::id.eq(product.get())))
        .execute(&mut conn)
        .unwrap();

    assert!(repo.list_product_images(product).unwrap().is_empty());
}

#[test]
fn rows_with_foreign_paths_are_skipped_not_fatal() {
    let env = common::TestEnv::new();
    let repo = env.repo();
    let product = env.insert_product("Vase", 1_000);
    repo.create_product_image(&new_image(product, "1_vase.png"))
        .unwrap();

    let mut conn = env.db.pool().get().unwrap();
    diesel::insert_into(product_images::table)
        .values((
            product_images::product_id.eq(product.get()),
            product_images::file_path.eq("https://cdn.example.com/vase.png"),
        ))
        .execute(&mut conn)
        .unwrap();

    let listed = repo.list_products_with_images().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].images.len(), 1);
    assert_eq!(listed[0].images[0].file_path, "images/products/1_vase.png");

    let detail = repo.get_product_with_images(product).unwrap().unwrap();
    assert_eq!(detail.images.len(), 1);
    assert_eq!(repo.list_product_images(product).unwrap().len(), 1);
}
