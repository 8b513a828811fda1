use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use crate::admin::dto::SignupListResponse;
use crate::admin::extractors::AdminGate;
use crate::signup::store::{SignupStore, SignupTable};
use crate::state::AppState;

pub const EXPORT_FILE_NAME: &str = "smiley_close_friends_signups.csv";

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/signups", get(list_signups))
        .route("/admin/export", get(export_csv))
}

async fn load_table(state: &AppState) -> Result<SignupTable, (StatusCode, String)> {
    SignupStore::new(state.sheets.clone())
        .read_all()
        .await
        .map_err(|e| {
            error!(error = ?e, "read signup sheet failed");
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        })
}

#[instrument(skip(state))]
pub async fn list_signups(
    State(state): State<AppState>,
    _gate: AdminGate,
) -> Result<Json<SignupListResponse>, (StatusCode, String)> {
    let table = load_table(&state).await?;
    Ok(Json(SignupListResponse {
        total: table.rows.len(),
        columns: table.columns,
        rows: table.rows,
    }))
}

#[instrument(skip(state))]
pub async fn export_csv(
    State(state): State<AppState>,
    _gate: AdminGate,
) -> Result<(HeaderMap, Vec<u8>), (StatusCode, String)> {
    let table = load_table(&state).await?;
    let csv = table.to_csv().map_err(|e| {
        error!(error = ?e, "csv export failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?,
    );

    Ok((headers, csv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::services::submit;

    async fn seeded_state() -> AppState {
        let state = AppState::fake();
        let store = SignupStore::new(state.sheets.clone());
        submit(&store, "first_user", "a@b.com", true, "tiktok")
            .await
            .expect("seed signup");
        submit(&store, "second_user", "", true, "yt")
            .await
            .expect("seed signup");
        state
    }

    #[tokio::test]
    async fn list_signups_exposes_all_rows() {
        let state = seeded_state().await;
        let Json(body) = list_signups(State(state), AdminGate)
            .await
            .expect("list should succeed");
        assert_eq!(body.total, 2);
        assert_eq!(body.rows.len(), 2);
        assert_eq!(body.rows[0][0], "first_user");
        assert_eq!(body.rows[1][0], "second_user");
    }

    #[tokio::test]
    async fn export_row_count_matches_list() {
        let state = seeded_state().await;
        let (headers, csv) = export_csv(State(state), AdminGate)
            .await
            .expect("export should succeed");

        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|h| h.to_str().ok())
            .expect("disposition header");
        assert!(disposition.contains(EXPORT_FILE_NAME));

        let text = String::from_utf8(csv).expect("utf-8");
        // header line + one line per stored row
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn export_of_empty_sheet_is_header_only() {
        let state = AppState::fake();
        let (_headers, csv) = export_csv(State(state), AdminGate)
            .await
            .expect("export should succeed");
        let text = String::from_utf8(csv).expect("utf-8");
        assert_eq!(
            text.trim_end(),
            "ig_handle,email,source,created_at_utc,consent"
        );
    }
}
