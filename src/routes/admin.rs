use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthContext;
use crate::forms::images::UploadImageForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect_back, render_page, validation_failed};
use crate::services::ServiceError;
use crate::services::admin::{
    list_products_admin as list_products_admin_service,
    show_product_admin as show_product_admin_service,
};
use crate::services::images::upload_product_image as upload_product_image_service;
use crate::storage::ImageStore;

#[get("/admin", name = "admin.products.index")]
pub async fn index(
    req: HttpRequest,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match list_products_admin_service(repo.get_ref()) {
        Ok(page) => render_page(
            &req,
            &tera,
            base_context(&flash_messages, &auth),
            "Admin/Products",
            &page,
        ),
        Err(err) => {
            log::error!("Failed to render admin products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/admin/products/{product}", name = "admin.products.show")]
pub async fn show(
    req: HttpRequest,
    product_id: web::Path<i32>,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_product_admin_service(product_id.into_inner(), repo.get_ref()) {
        Ok(page) => render_page(
            &req,
            &tera,
            base_context(&flash_messages, &auth),
            "Admin/ProductDetail",
            &page,
        ),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to render admin product: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/admin/products/{product}/images", name = "admin.products.images.store")]
pub async fn store_image(
    req: HttpRequest,
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    store: web::Data<ImageStore>,
    server_config: web::Data<ServerConfig>,
    form: Result<MultipartForm<UploadImageForm>, actix_web::Error>,
) -> impl Responder {
    let product_id = product_id.into_inner();
    let fallback = format!("/admin/products/{product_id}");
    let max_upload_kb = server_config.max_upload_kb;
    let form = form
        .map(|MultipartForm(form)| form)
        .map_err(|err| UploadImageForm::rejection_errors(&err, max_upload_kb));

    match upload_product_image_service(
        product_id,
        form,
        max_upload_kb,
        store.get_ref(),
        repo.get_ref(),
    ) {
        Ok(_) => {
            FlashMessage::success("Image uploaded.").send();
            redirect_back(&req, &fallback)
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(ServiceError::Validation(errors)) => validation_failed(&req, &errors, &fallback),
        Err(err) => {
            log::error!("Failed to upload image for product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
