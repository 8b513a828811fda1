use serde::Serialize;

/// Everything the sheet currently holds, for the gated admin view.
#[derive(Debug, Serialize)]
pub struct SignupListResponse {
    pub total: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
