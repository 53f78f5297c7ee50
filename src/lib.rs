use crate::app_config::AppConfig;
use crate::services::report_service::ReportService;
use crate::services::tender_api::{HttpTenderApi, SnapshotTenderApi, TenderApi};
use dotenvy::dotenv;
use log::{debug, info, warn};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod core;
pub mod services;
pub mod commands;
pub mod app_config;
pub mod error;

pub fn initialize_environment() {
    pretty_env_logger::init();
    if let Err(e) = dotenv() {
        debug!("No .env file loaded: {}", e);
    }
}

/// Pick the data source: a snapshot file when one is given (on the command
/// line or in the config), the HTTP API otherwise.
pub fn initialize_api(config: &AppConfig, snapshot: Option<&Path>) -> Result<Arc<dyn TenderApi>, Box<dyn Error>> {
    let snapshot = snapshot
        .map(Path::to_path_buf)
        .or_else(|| config.snapshot_file.as_ref().map(PathBuf::from));

    match snapshot {
        Some(path) => {
            info!("Reading tenders and bids from snapshot {}", path.display());
            Ok(Arc::new(SnapshotTenderApi::from_file(&path)?))
        }
        None => {
            info!("Fetching tenders and bids from {}", config.api_base_url);
            if config.auth_token.is_none() {
                warn!("No auth token configured; the bids endpoint will likely reject the request");
            }
            Ok(Arc::new(HttpTenderApi::new(
                &config.api_base_url,
                config.auth_token.clone(),
                config.request_timeout(),
            )?))
        }
    }
}

pub fn initialize_service(
    config: &AppConfig,
    snapshot: Option<&Path>,
    user_id: Option<&str>,
) -> Result<ReportService, Box<dyn Error>> {
    let api = initialize_api(config, snapshot)?;
    let user_id = user_id.unwrap_or(config.user_id.as_str());
    if user_id.is_empty() {
        warn!("No user id configured; tender lookups are unscoped");
    }
    Ok(ReportService::new(api, user_id).with_top_n(config.top_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_system::{FileSystem, Snapshot};
    use tempfile::TempDir;

    #[test]
    fn test_initialize_service_prefers_cli_user_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");
        FileSystem::save_snapshot(&Snapshot::default(), &path).unwrap();

        let config = AppConfig {
            user_id: "from-config".to_string(),
            ..AppConfig::default()
        };
        let service = initialize_service(&config, Some(&path), Some("from-cli")).unwrap();
        assert_eq!(service.user_id(), "from-cli");

        let service = initialize_service(&config, Some(&path), None).unwrap();
        assert_eq!(service.user_id(), "from-config");
    }

    #[test]
    fn test_initialize_api_with_missing_snapshot_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            snapshot_file: Some(temp_dir.path().join("missing.json").to_string_lossy().into_owned()),
            ..AppConfig::default()
        };
        assert!(initialize_api(&config, None).is_err());
    }

    #[test]
    fn test_initialize_api_defaults_to_http() {
        assert!(initialize_api(&AppConfig::default(), None).is_ok());
    }
}
