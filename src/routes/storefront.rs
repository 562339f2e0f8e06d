use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::auth::AuthContext;
use crate::repository::DieselRepository;
use crate::routes::{base_context, render_page};
use crate::services::ServiceError;
use crate::services::storefront::{
    AuthRoutes, list_products as list_products_service, show_product as show_product_service,
};

#[get("/", name = "home")]
pub async fn index(
    req: HttpRequest,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let login_url = req.url_for_static("login").ok().map(|url| url.to_string());
    let register_url = req.url_for_static("register").ok().map(|url| url.to_string());
    let auth_routes = AuthRoutes {
        can_login: login_url.is_some(),
        can_register: register_url.is_some(),
    };

    match list_products_service(auth_routes, repo.get_ref()) {
        Ok(page) => {
            let mut base = base_context(&flash_messages, &auth);
            base.insert("login_url", &login_url);
            base.insert("register_url", &register_url);
            render_page(&req, &tera, base, "Welcome", &page)
        }
        Err(err) => {
            log::error!("Failed to render storefront: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/{product}", name = "products.show")]
pub async fn show(
    req: HttpRequest,
    product_id: web::Path<i32>,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_product_service(product_id.into_inner(), repo.get_ref()) {
        Ok(page) => render_page(
            &req,
            &tera,
            base_context(&flash_messages, &auth),
            "ProductDetail",
            &page,
        ),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to render product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
