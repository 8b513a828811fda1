use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::signup::dto::{SignupRequest, SignupResponse, SourceParam};
use crate::signup::services::{self, SignupError};
use crate::signup::store::SignupStore;
use crate::state::AppState;

pub fn signup_routes() -> Router<AppState> {
    Router::new().route("/signups", post(create_signup))
}

#[instrument(skip(state, payload))]
pub async fn create_signup(
    State(state): State<AppState>,
    Query(params): Query<SourceParam>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), (StatusCode, String)> {
    let store = SignupStore::new(state.sheets.clone());

    match services::submit(
        &store,
        &payload.handle,
        &payload.email,
        payload.consent,
        &params.src,
    )
    .await
    {
        Ok(record) => {
            info!(handle = %record.handle, source = %record.source, "signup stored");
            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    handle: record.handle,
                    created_at: record.created_at,
                }),
            ))
        }
        Err(e) => {
            // Store causes are already logged in the service; the client only
            // ever sees the generic message.
            warn!(error = %e, "signup rejected");
            Err((e.status(), e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(handle: &str, consent: bool) -> SignupRequest {
        SignupRequest {
            handle: handle.to_string(),
            email: String::new(),
            consent,
        }
    }

    #[tokio::test]
    async fn create_signup_returns_created_with_normalized_handle() {
        let state = AppState::fake();
        let (status, Json(body)) = create_signup(
            State(state),
            Query(SourceParam { src: "yt".into() }),
            Json(request("@John_Doe", true)),
        )
        .await
        .expect("signup should succeed");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.handle, "john_doe");
    }

    #[tokio::test]
    async fn create_signup_maps_validation_errors_to_bad_request() {
        let state = AppState::fake();
        let (status, message) = create_signup(
            State(state),
            Query(SourceParam { src: String::new() }),
            Json(request("jo hn", true)),
        )
        .await
        .expect_err("invalid handle");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("Invalid handle"));
    }

    #[tokio::test]
    async fn create_signup_without_consent_is_rejected() {
        let state = AppState::fake();
        let (status, message) = create_signup(
            State(state.clone()),
            Query(SourceParam { src: String::new() }),
            Json(request("fine_handle", false)),
        )
        .await
        .expect_err("consent required");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("consent"));

        let table = SignupStore::new(state.sheets.clone())
            .read_all()
            .await
            .expect("read_all");
        assert!(table.rows.is_empty());
    }
}
