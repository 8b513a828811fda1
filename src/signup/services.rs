use axum::http::StatusCode;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::error;

use crate::signup::store::{SignupRecord, SignupStore, StoreError};

/// Trims whitespace and strips one leading `@`. No case change here; the
/// submission path lower-cases separately.
pub fn normalize_handle(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).to_string()
}

/// Full-string match: 1-30 characters of letters, digits, dot or underscore.
pub fn is_valid_handle(handle: &str) -> bool {
    lazy_static! {
        static ref HANDLE_RE: Regex = Regex::new(r"^[A-Za-z0-9._]{1,30}$").unwrap();
    }
    HANDLE_RE.is_match(handle)
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("Please enter your handle.")]
    EmptyHandle,
    #[error("Invalid handle. Use letters, digits, dot or underscore (max 30 characters).")]
    InvalidHandle,
    #[error("Please tick the consent box to submit.")]
    ConsentRequired,
    #[error("Could not save your signup right now. Please try again later.")]
    Store(#[from] StoreError),
}

impl SignupError {
    pub fn status(&self) -> StatusCode {
        match self {
            SignupError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Validates a submission and appends it to the store. The record is only
/// built after consent and validation pass; nothing reaches the sheet before
/// that.
pub async fn submit(
    store: &SignupStore,
    handle: &str,
    email: &str,
    consent: bool,
    source: &str,
) -> Result<SignupRecord, SignupError> {
    let handle = normalize_handle(handle).to_lowercase();

    if handle.is_empty() {
        return Err(SignupError::EmptyHandle);
    }
    if !is_valid_handle(&handle) {
        return Err(SignupError::InvalidHandle);
    }
    if !consent {
        return Err(SignupError::ConsentRequired);
    }

    let record = SignupRecord::consented(
        handle,
        email.trim().to_string(),
        source.trim().to_string(),
    );

    store.append(&record).await.map_err(|e| {
        error!(error = ?e, handle = %record.handle, "could not append signup row");
        SignupError::from(e)
    })?;

    Ok(record)
}
