use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpRequest, HttpResponse, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use serde::Serialize;
use tera::{Context, Tera};

use crate::auth::AuthContext;
use crate::forms::FieldErrors;

pub mod account;
pub mod admin;
pub mod storefront;

/// Header marking a client-side navigation that wants page data as JSON.
pub const INERTIA_HEADER: &str = "X-Inertia";

/// Bumped whenever the front-end assets change.
pub const ASSET_VERSION: &str = "1";

/// Page object handed to the front-end: which component to mount and its props.
#[derive(Serialize)]
pub struct Page<'a, P: Serialize> {
    pub component: &'a str,
    pub props: &'a P,
    pub url: String,
    pub version: &'a str,
}

/// Registers every route. `login` and `register` are external resources on
/// the auth service and only exist when its URL is configured.
pub fn configure(auth_service_url: Option<String>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        if let Some(base) = auth_service_url {
            let base = base.trim_end_matches('/');
            cfg.external_resource("login", format!("{base}/login"));
            cfg.external_resource("register", format!("{base}/register"));
        }

        cfg.service(storefront::index)
            .service(storefront::show)
            .service(admin::index)
            .service(admin::show)
            .service(admin::store_image)
            .service(account::dashboard)
            .service(account::edit_profile)
            .service(account::update_profile)
            .service(account::destroy_profile);
    }
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(tera.render(template, context).unwrap_or_else(|e| {
            log::error!("Failed to render template '{template}': {e}");
            String::new()
        }))
}

fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info => "info",
        Level::Debug => "secondary",
    }
}

pub fn base_context(flash_messages: &IncomingFlashMessages, auth: &AuthContext) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &auth.user());
    context
}

/// `Admin/ProductDetail` -> `admin/product_detail.html`.
pub fn template_for(component: &str) -> String {
    let mut name = String::with_capacity(component.len() + 8);
    let mut prev: Option<char> = None;
    for c in component.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            name.push('_');
        }
        name.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    name.push_str(".html");
    name
}

fn is_inertia(req: &HttpRequest) -> bool {
    req.headers().contains_key(INERTIA_HEADER)
}

/// Whether the client asked for JSON rather than an HTML page.
pub fn wants_json(req: &HttpRequest) -> bool {
    is_inertia(req)
        || req
            .headers()
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"))
}

/// Renders a page either as JSON page data (client-side navigation) or as the
/// server-side template named after the component.
pub fn render_page<P: Serialize>(
    req: &HttpRequest,
    tera: &Tera,
    base: Context,
    component: &str,
    props: &P,
) -> HttpResponse {
    let page = Page {
        component,
        props,
        url: req.uri().to_string(),
        version: ASSET_VERSION,
    };

    if is_inertia(req) {
        return HttpResponse::Ok()
            .insert_header((INERTIA_HEADER, "true"))
            .insert_header((header::VARY, INERTIA_HEADER))
            .json(&page);
    }

    let mut context = match Context::from_serialize(props) {
        Ok(context) => context,
        Err(e) => {
            log::error!("Failed to build context for page '{component}': {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    context.extend(base);
    match serde_json::to_string(&page) {
        Ok(json) => context.insert("page", &json),
        Err(e) => {
            log::error!("Failed to serialize page '{component}': {e}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    render_template(tera, &template_for(component), &context)
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirects to the referring page, or `fallback` when there is none.
pub fn redirect_back(req: &HttpRequest, fallback: &str) -> HttpResponse {
    let location = req
        .headers()
        .get(header::REFERER)
        .and_then(|value: &HeaderValue| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback);
    redirect(location)
}

#[derive(Serialize)]
struct ValidationResponse<'a> {
    message: &'a str,
    errors: &'a FieldErrors,
}

/// 422 with the error bag for JSON clients; flash messages and a redirect
/// back for form posts.
pub fn validation_failed(req: &HttpRequest, errors: &FieldErrors, fallback: &str) -> HttpResponse {
    if wants_json(req) {
        return HttpResponse::UnprocessableEntity().json(ValidationResponse {
            message: errors.first_message().unwrap_or("The given data was invalid."),
            errors,
        });
    }

    for message in errors.messages() {
        FlashMessage::error(message.to_string()).send();
    }
    redirect_back(req, fallback)
}

/// Sends anonymous users to the auth service's login page when it is known.
pub fn unauthenticated(req: &HttpRequest) -> HttpResponse {
    match req.url_for_static("login") {
        Ok(url) if !wants_json(req) => redirect(url.as_str()),
        _ => HttpResponse::Unauthorized().finish(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn maps_components_to_templates() {
        assert_eq!(template_for("Welcome"), "welcome.html");
        assert_eq!(template_for("ProductDetail"), "product_detail.html");
        assert_eq!(template_for("Admin/ProductDetail"), "admin/product_detail.html");
        assert_eq!(template_for("Profile/Edit"), "profile/edit.html");
    }

    #[test]
    fn detects_json_clients() {
        let req = TestRequest::default()
            .insert_header((header::ACCEPT, "application/json"))
            .to_http_request();
        assert!(wants_json(&req));

        let req = TestRequest::default()
            .insert_header((INERTIA_HEADER, "true"))
            .to_http_request();
        assert!(wants_json(&req));

        let req = TestRequest::default()
            .insert_header((header::ACCEPT, "text/html"))
            .to_http_request();
        assert!(!wants_json(&req));
    }

    #[test]
    fn redirects_back_to_referer() {
        let req = TestRequest::default()
            .insert_header((header::REFERER, "/admin/products/3"))
            .to_http_request();
        let resp = redirect_back(&req, "/admin");
        assert_eq!(resp.status(), 303);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/admin/products/3");

        let req = TestRequest::default().to_http_request();
        let resp = redirect_back(&req, "/admin");
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/admin");
    }
}
