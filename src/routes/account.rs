use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, patch, web};
use actix_web_flash_messages::IncomingFlashMessages;
use tera::Tera;

use crate::auth::AuthContext;
use crate::models::config::ServerConfig;
use crate::routes::{base_context, redirect, render_page, unauthenticated};
use crate::services::ServiceError;
use crate::services::account::{
    profile_management_url, show_dashboard as show_dashboard_service,
    show_profile as show_profile_service,
};

#[get("/dashboard", name = "dashboard")]
pub async fn dashboard(
    req: HttpRequest,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_dashboard_service(&auth) {
        Ok(page) => render_page(
            &req,
            &tera,
            base_context(&flash_messages, &auth),
            "Dashboard",
            &page,
        ),
        Err(ServiceError::Unauthorized) => unauthenticated(&req),
        Err(ServiceError::Forbidden) => HttpResponse::Forbidden().finish(),
        Err(err) => {
            log::error!("Failed to render dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/profile", name = "profile.edit")]
pub async fn edit_profile(
    req: HttpRequest,
    auth: AuthContext,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_profile_service(&auth) {
        Ok(page) => render_page(
            &req,
            &tera,
            base_context(&flash_messages, &auth),
            "Profile/Edit",
            &page,
        ),
        Err(ServiceError::Unauthorized) => unauthenticated(&req),
        Err(err) => {
            log::error!("Failed to render profile: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn delegate_profile_change(
    req: &HttpRequest,
    auth: &AuthContext,
    server_config: &ServerConfig,
) -> HttpResponse {
    match profile_management_url(auth, server_config.auth_service_url.as_deref()) {
        Ok(Some(url)) => redirect(&url),
        Ok(None) => HttpResponse::NotImplemented().finish(),
        Err(ServiceError::Unauthorized) => unauthenticated(req),
        Err(err) => {
            log::error!("Failed to delegate profile change: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[patch("/profile", name = "profile.update")]
pub async fn update_profile(
    req: HttpRequest,
    auth: AuthContext,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    delegate_profile_change(&req, &auth, &server_config)
}

#[delete("/profile", name = "profile.destroy")]
pub async fn destroy_profile(
    req: HttpRequest,
    auth: AuthContext,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    delegate_profile_change(&req, &auth, &server_config)
}
