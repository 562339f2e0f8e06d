use serde::Serialize;

use crate::auth::{AuthContext, SessionUser};

use super::ServiceResult;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardPage {
    pub user: SessionUser,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    pub user: SessionUser,
    pub must_verify_email: bool,
}

/// Dashboard data; requires a verified user.
pub fn show_dashboard(auth: &AuthContext) -> ServiceResult<DashboardPage> {
    let user = auth.require_verified()?;
    Ok(DashboardPage { user: user.clone() })
}

/// Profile data; requires an authenticated user.
pub fn show_profile(auth: &AuthContext) -> ServiceResult<ProfilePage> {
    let user = auth.require_authenticated()?;
    Ok(ProfilePage {
        user: user.clone(),
        must_verify_email: !user.email_verified,
    })
}

/// Where profile changes are handled.
///
/// Updating and deleting a profile belongs to the auth service; this returns
/// its profile URL, or `None` when no auth service is configured.
pub fn profile_management_url(
    auth: &AuthContext,
    auth_service_url: Option<&str>,
) -> ServiceResult<Option<String>> {
    auth.require_authenticated()?;
    Ok(auth_service_url.map(|base| format!("{}/profile", base.trim_end_matches('/'))))
}
