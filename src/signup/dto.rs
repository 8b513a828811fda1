use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Body of a public submission.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub handle: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub consent: bool,
}

/// Optional campaign tag carried in the query string, e.g. `?src=tiktok`.
#[derive(Debug, Deserialize)]
pub struct SourceParam {
    #[serde(default)]
    pub src: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub handle: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
