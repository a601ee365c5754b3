use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default directory for exported session reports.
    pub fn report_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let data_dir = PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("openfield");
            Some(data_dir.join("reports"))
        } else {
            ProjectDirs::from("", "", "openfield")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("reports"))
        }
    }
}
