use crate::config::AppConfig;
use crate::sheets::{ServiceAccountKey, Sheets, SheetsClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sheets: Arc<dyn SheetsClient>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let sheets = Arc::new(Sheets::new(
            config.sheet_id.clone(),
            config.service_account.clone(),
        )?) as Arc<dyn SheetsClient>;

        Ok(Self { config, sheets })
    }

    pub fn from_parts(config: Arc<AppConfig>, sheets: Arc<dyn SheetsClient>) -> Self {
        Self { config, sheets }
    }

    /// State backed by an in-memory worksheet, for tests.
    pub fn fake() -> Self {
        use axum::async_trait;
        use std::sync::Mutex;

        #[derive(Default)]
        struct FakeSheets {
            rows: Mutex<Vec<Vec<String>>>,
        }

        #[async_trait]
        impl SheetsClient for FakeSheets {
            async fn get_range(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>> {
                let rows = self.rows.lock().expect("fake sheet lock");
                match range {
                    // First-row probe: the live API omits rows with no content.
                    "A1:E1" => Ok(rows
                        .first()
                        .filter(|r| r.iter().any(|c| !c.is_empty()))
                        .map(|r| vec![r.iter().take(5).cloned().collect()])
                        .unwrap_or_default()),
                    _ => Ok(rows.clone()),
                }
            }

            async fn append_row(&self, row: Vec<String>) -> anyhow::Result<()> {
                self.rows.lock().expect("fake sheet lock").push(row);
                Ok(())
            }
        }

        let config = Arc::new(AppConfig {
            sheet_id: "fake-sheet".into(),
            service_account: ServiceAccountKey {
                client_email: "test@example.iam.gserviceaccount.com".into(),
                private_key: "unused".into(),
                token_uri: "https://oauth2.googleapis.com/token".into(),
            },
            admin_password: Some("test-admin".into()),
        });

        let sheets = Arc::new(FakeSheets::default()) as Arc<dyn SheetsClient>;
        Self { config, sheets }
    }
}
