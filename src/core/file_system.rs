// src/core/file_system.rs
use crate::core::models::{Bid, Tender};
use crate::core::reporting::Report;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Tenders and bids captured from the API, as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tenders: Vec<Tender>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

pub struct FileSystem;

impl FileSystem {
    pub fn load_snapshot(path: &Path) -> Result<Snapshot, std::io::Error> {
        let json = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&json)?;
        debug!(
            "Loaded snapshot from {}: {} tenders, {} bids",
            path.display(),
            snapshot.tenders.len(),
            snapshot.bids.len()
        );
        Ok(snapshot)
    }

    pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), Box<dyn Error>> {
        Self::write_atomic(path, &serde_json::to_string_pretty(snapshot)?)
    }

    pub fn save_report(report: &Report, path: &Path) -> Result<(), Box<dyn Error>> {
        Self::write_atomic(path, &serde_json::to_string_pretty(report)?)?;
        info!("Saved report to {}", path.display());
        Ok(())
    }

    pub fn load_report(path: &Path) -> Result<Report, Box<dyn Error>> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// `<reports_dir>/YYYYMMDD-<window>.json`
    pub fn generate_report_file_path(report: &Report, reports_dir: &Path) -> PathBuf {
        let file_name = format!("{}-{}.json", report.end_date.format("%Y%m%d"), report.window);
        reports_dir.join(file_name)
    }

    fn write_atomic(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_file = PathBuf::from(format!("{}.temp", path.display()));
        fs::write(&temp_file, contents)?;
        fs::rename(&temp_file, path)?;

        Ok(())
    }
}
