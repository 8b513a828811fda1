use anyhow::Context;
use axum::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Service-account key material, parsed from the JSON blob Google issues.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[async_trait]
pub trait SheetsClient: Send + Sync {
    async fn get_range(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>>;
    async fn append_row(&self, row: Vec<String>) -> anyhow::Result<()>;
}

/// Claims of the OAuth2 JWT-bearer assertion for a service account.
#[derive(Debug, Serialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: usize,
    exp: usize,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Wire shape of the spreadsheet values API. `values` is omitted by the
/// server when the requested range is entirely empty.
#[derive(Debug, Serialize, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct Sheets {
    http: reqwest::Client,
    sheet_id: String,
    key: ServiceAccountKey,
    encoding: EncodingKey,
}

impl Sheets {
    pub fn new(sheet_id: String, key: ServiceAccountKey) -> anyhow::Result<Self> {
        let encoding = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("parse service account private key")?;
        Ok(Self {
            http: reqwest::Client::new(),
            sheet_id,
            key,
            encoding,
        })
    }

    /// Mints a short-lived bearer token for the spreadsheet scope. One token
    /// per operation; nothing depends on reuse.
    async fn bearer_token(&self) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.unix_timestamp() as usize,
            exp: (now + TimeDuration::minutes(10)).unix_timestamp() as usize,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding)
            .context("sign token assertion")?;
        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("token request")?
            .error_for_status()
            .context("token exchange rejected")?
            .json::<TokenResponse>()
            .await
            .context("decode token response")?;
        debug!(client_email = %self.key.client_email, "service account token minted");
        Ok(resp.access_token)
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            self.sheet_id, range
        )
    }
}

#[async_trait]
impl SheetsClient for Sheets {
    async fn get_range(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let token = self.bearer_token().await?;
        let resp = self
            .http
            .get(self.values_url(range))
            .bearer_auth(token)
            .send()
            .await
            .context("sheet read request")?
            .error_for_status()
            .context("sheet read rejected")?
            .json::<ValueRange>()
            .await
            .context("decode sheet values")?;
        Ok(resp.values)
    }

    async fn append_row(&self, row: Vec<String>) -> anyhow::Result<()> {
        let token = self.bearer_token().await?;
        self.http
            .post(format!("{}:append", self.values_url("A1")))
            .bearer_auth(token)
            // RAW keeps cell text verbatim, no formula evaluation
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueRange { values: vec![row] })
            .send()
            .await
            .context("sheet append request")?
            .error_for_status()
            .context("sheet append rejected")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_range_defaults_to_no_rows() {
        let parsed: ValueRange = serde_json::from_str(r#"{"range":"Sheet1!A1:E1"}"#)
            .expect("empty range payload should parse");
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn value_range_parses_rows() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"values":[["a","b"],["c"]]}"#).expect("values should parse");
        assert_eq!(parsed.values.len(), 2);
        assert_eq!(parsed.values[0], vec!["a", "b"]);
    }

    #[test]
    fn service_account_key_falls_back_to_default_token_uri() {
        let key: ServiceAccountKey = serde_json::from_str(
            r#"{"client_email":"svc@example.iam.gserviceaccount.com","private_key":"pem"}"#,
        )
        .expect("key without token_uri should parse");
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }
}
