//! Request-scoped authentication state.
//!
//! Login and registration belong to an external auth service which writes the
//! identity cookie; this crate only reads it. The identity id is a JSON encoded
//! [`SessionUser`].

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::services::{ServiceError, ServiceResult};

/// Claims carried by the identity cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Who is making the request, if anyone.
///
/// Extraction never fails: a missing, expired or malformed identity yields an
/// anonymous context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<SessionUser>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_verified(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.email_verified)
    }

    /// The current user, or `Unauthorized`.
    pub fn require_authenticated(&self) -> ServiceResult<&SessionUser> {
        self.user.as_ref().ok_or(ServiceError::Unauthorized)
    }

    /// The current user if their email is verified; `Unauthorized` for
    /// anonymous requests and `Forbidden` for unverified users.
    pub fn require_verified(&self) -> ServiceResult<&SessionUser> {
        let user = self.require_authenticated()?;
        if user.email_verified {
            Ok(user)
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    fn from_identity_id(id: &str) -> Self {
        match serde_json::from_str::<SessionUser>(id) {
            Ok(user) => Self::authenticated(user),
            Err(e) => {
                log::warn!("Ignoring malformed identity: {e}");
                Self::anonymous()
            }
        }
    }
}

impl FromRequest for AuthContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = req
            .get_identity()
            .ok()
            .and_then(|identity| identity.id().ok())
            .map(|id| Self::from_identity_id(&id))
            .unwrap_or_default();
        ready(Ok(context))
    }
}
