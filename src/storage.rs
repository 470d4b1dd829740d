use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<AppData>(&bytes) {
            Ok(data) => {
                info!(
                    users = data.users.len(),
                    stats = data.stats.len(),
                    stat_items = data.stat_items.len(),
                    "loaded data file"
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Writes to a sibling temp file first so a crash never leaves a truncated
/// document behind.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use chrono::Utc;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("stat_tracker_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn persisted_data_loads_back() {
        let path = temp_path("roundtrip");
        let mut data = AppData::default();
        data.users.insert(
            "u1".into(),
            User {
                id: "u1".into(),
                username: "ana".into(),
                email: "ana@example.com".into(),
                password_hash: "hash".into(),
                created_at: Utc::now(),
            },
        );

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        assert_eq!(loaded.users["u1"].email, "ana@example.com");
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_starts_empty() {
        let missing = load_data(&temp_path("missing")).await;
        assert!(missing.users.is_empty());

        let path = temp_path("corrupt");
        std::fs::write(&path, b"{ not json").unwrap();
        let corrupt = load_data(&path).await;
        assert!(corrupt.stats.is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
