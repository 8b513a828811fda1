use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use crate::state::AppState;

pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Grants access to the admin routes when the `x-admin-password` header
/// equals the configured password. Plain equality, as configured deployments
/// expect: no hashing, no rate limiting, no lockout.
#[derive(Debug)]
pub struct AdminGate;

#[async_trait]
impl FromRequestParts<AppState> for AdminGate {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_password.as_deref().unwrap_or("");
        if expected.is_empty() {
            warn!("admin access attempted but no admin password is configured");
            return Err((StatusCode::UNAUTHORIZED, "admin access disabled".into()));
        }

        let given = parts
            .headers
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");

        if given != expected {
            warn!("admin password mismatch");
            return Err((StatusCode::UNAUTHORIZED, "invalid admin password".into()));
        }

        Ok(AdminGate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use std::sync::Arc;

    fn parts_with_password(pw: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/admin/signups");
        if let Some(pw) = pw {
            builder = builder.header(ADMIN_PASSWORD_HEADER, pw);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    fn state_with_password(pw: Option<&str>) -> AppState {
        let base = AppState::fake();
        let config = AppConfig {
            admin_password: pw.map(|p| p.to_string()),
            ..(*base.config).clone()
        };
        AppState::from_parts(Arc::new(config), base.sheets)
    }

    #[tokio::test]
    async fn correct_password_passes() {
        let state = state_with_password(Some("hunter2"));
        let mut parts = parts_with_password(Some("hunter2"));
        assert!(AdminGate::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let state = state_with_password(Some("hunter2"));
        let mut parts = parts_with_password(Some("hunter3"));
        let (status, _) = AdminGate::from_request_parts(&mut parts, &state)
            .await
            .expect_err("must deny");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let state = state_with_password(Some("hunter2"));
        let mut parts = parts_with_password(None);
        let (status, _) = AdminGate::from_request_parts(&mut parts, &state)
            .await
            .expect_err("must deny");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unset_expected_password_denies_everyone() {
        let state = state_with_password(None);
        let mut parts = parts_with_password(Some(""));
        let (status, _) = AdminGate::from_request_parts(&mut parts, &state)
            .await
            .expect_err("must deny");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
