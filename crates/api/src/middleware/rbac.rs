//! Permission-aware extractor.
//!
//! [`Authorized`] wraps [`AuthUser`] and resolves the caller's role into a
//! full permission matrix. The matrix is re-read from the database on every
//! request, so a permission change applies to the next call.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tms_core::rbac::{Authorizer, PermissionSet};
use tms_db::repositories::RoleRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// The caller plus its resolved permissions.
///
/// ```ignore
/// async fn edit_trip(Authorized(authz): Authorized) -> AppResult<Json<()>> {
///     authz.require_any(&[Module::Trips, Module::Dashboard], Action::Edit)?;
///     Ok(Json(()))
/// }
/// ```
pub struct Authorized(pub Authorizer);

impl FromRequestParts<AppState> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { principal } = AuthUser::from_request_parts(parts, state).await?;

        let permissions = match principal.role_id {
            Some(_) if principal.is_super_admin() => PermissionSet::full(),
            Some(role_id) => RoleRepo::resolve_permissions(&state.pool, role_id).await?,
            None => PermissionSet::deny_all(),
        };

        Ok(Authorized(Authorizer::new(principal, permissions)))
    }
}
