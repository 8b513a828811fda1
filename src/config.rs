use anyhow::Context;
use serde::Deserialize;

use crate::sheets::ServiceAccountKey;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sheet_id: String,
    pub service_account: ServiceAccountKey,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let sheet_id = std::env::var("SHEET_ID").context("SHEET_ID must be set")?;

        // Inline JSON wins; otherwise read the key file.
        let raw_key = match std::env::var("GOOGLE_SERVICE_ACCOUNT") {
            Ok(json) => json,
            Err(_) => {
                let path = std::env::var("GOOGLE_SERVICE_ACCOUNT_FILE")
                    .context("GOOGLE_SERVICE_ACCOUNT or GOOGLE_SERVICE_ACCOUNT_FILE must be set")?;
                std::fs::read_to_string(&path)
                    .with_context(|| format!("read service account file {path}"))?
            }
        };
        let service_account: ServiceAccountKey =
            serde_json::from_str(&raw_key).context("parse service account JSON")?;

        let admin_password = std::env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|pw| !pw.is_empty());

        Ok(Self {
            sheet_id,
            service_account,
            admin_password,
        })
    }
}
