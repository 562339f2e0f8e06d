//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;

use catalog::db::{DbPool, establish_connection_pool, run_migrations};
use catalog::domain::types::ProductId;
use catalog::models::config::{DEFAULT_MAX_UPLOAD_KB, ServerConfig};
use catalog::repository::DieselRepository;
use catalog::schema::products;
use catalog::storage::ImageStore;
use chrono::{DateTime, NaiveDateTime};
use diesel::prelude::*;
use tempfile::{NamedTempFile, TempDir};
use tera::Tera;

pub const BOUNDARY: &str = "catalog-test-boundary";

pub const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// A database plus a scratch public directory.
pub struct TestEnv {
    pub db: TestDb,
    pub public: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            db: TestDb::new(),
            public: TempDir::new().expect("Failed to create public dir"),
        }
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.db.pool())
    }

    pub fn store(&self) -> ImageStore {
        ImageStore::new(self.public.path())
    }

    pub fn products_dir(&self) -> PathBuf {
        self.store().products_dir()
    }

    pub fn server_config(&self, auth_service_url: Option<&str>) -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".into(),
            port: 8080,
            database_url: ":memory:".into(),
            public_dir: self.public.path().to_string_lossy().into_owned(),
            templates_dir: templates_dir(),
            secret: "s".repeat(64),
            auth_service_url: auth_service_url.map(str::to_string),
            max_upload_kb: DEFAULT_MAX_UPLOAD_KB,
        }
    }

    /// Inserts a product created `created_at` seconds after the epoch.
    pub fn insert_product(&self, name: &str, created_at: i64) -> ProductId {
        let mut conn = self.db.pool().get().expect("connection");
        let ts = timestamp(created_at);
        let id = diesel::insert_into(products::table)
            .values((
                products::name.eq(name),
                products::description.eq(Some("Seeded product")),
                products::price.eq(12.5_f64),
                products::created_at.eq(ts),
                products::updated_at.eq(ts),
            ))
            .returning(products::id)
            .get_result::<i32>(&mut conn)
            .expect("should create product");
        ProductId::new(id).expect("valid product id")
    }
}

pub fn timestamp(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}

pub fn templates_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string()
}

pub fn tera() -> Tera {
    Tera::new(&format!("{}/**/*.html", templates_dir())).expect("templates should parse")
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Body with a single file part.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Name of the session cookie carrying the signed-in identity.
pub const SESSION_COOKIE: &str = "id";

/// Identity payload for a signed-in user.
pub fn session_user(email_verified: bool) -> String {
    serde_json::json!({
        "sub": "42",
        "email": "shopper@example.com",
        "name": "Shopper",
        "email_verified": email_verified,
    })
    .to_string()
}

/// Builds the application service the same way `main` does, against a
/// [`TestEnv`]. `POST /test/sign-in` stores the request body as the session
/// identity.
#[macro_export]
macro_rules! test_app {
    ($env:expr, $auth_service_url:expr) => {{
        use actix_web::web;

        let key = actix_web::cookie::Key::from(&[7u8; 64]);
        let message_store =
            actix_web_flash_messages::storage::CookieMessageStore::builder(key.clone()).build();
        let message_framework =
            actix_web_flash_messages::FlashMessagesFramework::builder(message_store).build();
        let server_config = $env.server_config($auth_service_url);
        let store = $env.store();

        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(message_framework)
                .wrap(actix_identity::IdentityMiddleware::default())
                .wrap(actix_session::SessionMiddleware::new(
                    actix_session::storage::CookieSessionStore::default(),
                    key,
                ))
                .app_data(web::Data::new($env.repo()))
                .app_data(web::Data::new(store.clone()))
                .app_data(web::Data::new(common::tera()))
                .route(
                    "/test/sign-in",
                    web::post().to(|req: actix_web::HttpRequest, id: String| async move {
                        use actix_web::HttpMessage;
                        match actix_identity::Identity::login(&req.extensions(), id) {
                            Ok(_) => actix_web::HttpResponse::Ok().finish(),
                            Err(_) => actix_web::HttpResponse::InternalServerError().finish(),
                        }
                    }),
                )
                .service(actix_files::Files::new(
                    "/images",
                    store.public_dir().join("images"),
                ))
                .configure(catalog::routes::configure(
                    server_config.auth_service_url.clone(),
                ))
                .app_data(web::Data::new(server_config)),
        )
        .await
    }};
}
