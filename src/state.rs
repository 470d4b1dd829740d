use crate::auth::SessionStore;
use crate::config::Config;
use crate::errors::{AppError, StoreError};
use crate::models::AppData;
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub bcrypt_cost: u32,
    pub data: Arc<Mutex<AppData>>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(config: &Config, data: AppData) -> Self {
        Self {
            data_path: config.data_path.clone(),
            bcrypt_cost: config.bcrypt_cost,
            data: Arc::new(Mutex::new(data)),
            sessions: Arc::new(Mutex::new(SessionStore::new(config.session_ttl()))),
        }
    }

    /// Runs `change` against a copy of the data and keeps the copy only once
    /// it has been written to disk. On any error the in-memory data is left
    /// exactly as it was.
    pub async fn commit<T>(
        &self,
        change: impl FnOnce(&mut AppData) -> Result<T, StoreError>,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let outcome = change(&mut next)?;
        persist_data(&self.data_path, &next).await?;
        *data = next;
        Ok(outcome)
    }
}
