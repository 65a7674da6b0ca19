use anyhow::{anyhow, Context, Result};
use jsonc_parser::{parse_to_serde_value, ParseOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::time;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Copy each freshly generated prompt to the clipboard without waiting
    /// for an explicit copy command.
    #[serde(default)]
    pub auto_copy_clipboard: bool,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            auto_copy_clipboard: false,
        }
    }
}

#[derive(Clone)]
pub struct ConfigManager {
    inner: Arc<ConfigManagerInner>,
}

struct ConfigManagerInner {
    config: RwLock<Config>,
    config_path: PathBuf,
    change_tx: watch::Sender<Config>,
    watcher_active: AtomicBool,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        let config_dir = directories::ProjectDirs::from("", "", "promptwand-rs")
            .context("Failed to get config directory")?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        let config_path = config_dir.join("config.jsonc");
        let config = if config_path.exists() {
            Self::read_config_from_disk(&config_path)?
        } else {
            let default_config = Config::default();
            Self::write_config_file(&config_path, &default_config)?;
            tracing::info!("Created default config at: {:?}", config_path);
            default_config
        };

        tracing::info!("Loaded config from: {:?}", config_path);

        let (change_tx, _) = watch::channel(config.clone());

        Ok(Self {
            inner: Arc::new(ConfigManagerInner {
                config: RwLock::new(config),
                config_path,
                change_tx,
                watcher_active: AtomicBool::new(false),
            }),
        })
    }

    pub fn start_watching(&self) {
        if self.inner.watcher_active.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let mut last_state = Self::file_state(&inner.config_path);
            let mut ticker = time::interval(Duration::from_millis(500));

            loop {
                ticker.tick().await;

                let current_state = Self::file_state(&inner.config_path);
                if current_state == last_state {
                    continue;
                }

                last_state = current_state;

                match Self::read_config_from_disk(&inner.config_path) {
                    Ok(new_config) => {
                        let mut guard = inner.config.write().expect("config lock poisoned");
                        if *guard != new_config {
                            *guard = new_config.clone();
                            drop(guard);

                            if inner.change_tx.send(new_config).is_ok() {
                                tracing::info!("Reloaded config from: {:?}", inner.config_path);
                            }
                        }
                    }
                    Err(err) => {
                        tracing::warn!("Failed to reload config: {err}");
                    }
                }
            }
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<Config> {
        self.inner.change_tx.subscribe()
    }

    pub fn get(&self) -> Config {
        self.inner
            .config
            .read()
            .expect("config lock poisoned")
            .clone()
    }

    fn read_config_from_disk(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        Self::parse_config(&content)
    }

    fn write_config_file(path: &Path, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(path, json).with_context(|| format!("Failed to write config file at {:?}", path))
    }

    fn parse_config(content: &str) -> Result<Config> {
        let value = parse_to_serde_value(content, &ParseOptions::default())
            .context("Failed to parse config as JSONC")?
            .ok_or_else(|| anyhow!("Config file did not contain a JSON value"))?;
        serde_json::from_value(value).context("Failed to deserialize config")
    }

    fn file_state(path: &Path) -> Option<(SystemTime, u64)> {
        let metadata = fs::metadata(path).ok()?;
        let modified = metadata.modified().ok()?;
        Some((modified, metadata.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_gemini_flash() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.endpoint.starts_with("https://generativelanguage.googleapis.com"));
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.auto_copy_clipboard);
    }

    #[test]
    fn jsonc_comments_are_tolerated() {
        let parsed = ConfigManager::parse_config(
            r#"{
                // which model refines the prompt
                "model": "gemini-2.5-pro",
                "request_timeout_secs": 10
            }"#,
        )
        .expect("jsonc config parses");

        assert_eq!(parsed.model, "gemini-2.5-pro");
        assert_eq!(parsed.request_timeout_secs, 10);
        assert_eq!(parsed.endpoint, Config::default().endpoint);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(ConfigManager::parse_config("// nothing here").is_err());
    }
}
