use std::process;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use catalog::db::{establish_connection_pool, run_migrations};
use catalog::models::config::ServerConfig;
use catalog::repository::DieselRepository;
use catalog::routes;
use catalog::storage::ImageStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("{e}");
            process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool) {
        log::error!("Failed to run database migrations: {e}");
        process::exit(1);
    }

    let tera = match Tera::new(&format!("{}/**/*.html", server_config.templates_dir)) {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            process::exit(1);
        }
    };

    let store = ImageStore::new(&server_config.public_dir);
    if let Err(e) = store.ensure_products_dir() {
        log::error!("Failed to prepare image directory: {e}");
        process::exit(1);
    }

    let repo = DieselRepository::new(pool);
    let secret_key = Key::from(server_config.secret.as_bytes());
    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind = (server_config.bind_address.clone(), server_config.port);
    log::info!("Starting catalog on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .service(Files::new("/images", store.public_dir().join("images")))
            .configure(routes::configure(server_config.auth_service_url.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
