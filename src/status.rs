use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Publishes generation-in-flight status for tray/status-bar scripts to read
pub struct StatusWriter {
    status_file: PathBuf,
}

impl StatusWriter {
    pub fn new() -> Result<Self> {
        let config_dir = directories::ProjectDirs::from("", "", "promptwand-rs")
            .context("Failed to get config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(Self {
            status_file: config_dir.join("generating_status"),
        })
    }

    /// Set generation status
    /// - generating=true: writes "true" to file
    /// - generating=false: removes the file to avoid stale state
    pub fn set_generating(&self, generating: bool) -> Result<()> {
        if generating {
            fs::write(&self.status_file, "true").context("Failed to write generating status")?;
            tracing::debug!("Set generating status: true");
        } else if self.status_file.exists() {
            fs::remove_file(&self.status_file)
                .context("Failed to remove generating status file")?;
            tracing::debug!("Removed generating status file");
        }
        Ok(())
    }

    pub fn is_generating(&self) -> bool {
        if let Ok(content) = fs::read_to_string(&self.status_file) {
            content.trim() == "true"
        } else {
            false
        }
    }
}
