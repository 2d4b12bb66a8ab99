use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Default cap on text size accepted by the suggestion workflow, in bytes.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 65536;

/// Default cap, in characters, on quoted change text in review output.
/// Longer spans are elided in the middle.
pub const DEFAULT_REVIEW_CONTEXT: usize = 24;

pub struct Config {
    db_path: PathBuf,
    max_document_bytes: usize,
    review_context: usize,
}

/// On-disk mirror of `Config`. Every field is optional so a config file may
/// set only the keys it cares about.
#[derive(Deserialize, Serialize, Default)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_document_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_context: Option<usize>,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Access the global configuration. Lazily initializes on first use.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(build_config)
    }

    /// Where the SQLite database lives.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn max_document_bytes(&self) -> usize {
        self.max_document_bytes
    }

    pub fn review_context(&self) -> usize {
        self.review_context
    }
}

fn build_config() -> Config {
    let file_cfg = load_file_config();
    let db_path = env::var("COPYDESK_DB_PATH")
        .ok()
        .map(PathBuf::from)
        .or_else(|| file_cfg.as_ref().and_then(|c| c.db_path.clone()))
        .unwrap_or_else(default_db_path);
    let max_document_bytes = file_cfg
        .as_ref()
        .and_then(|c| c.max_document_bytes)
        .unwrap_or(DEFAULT_MAX_DOCUMENT_BYTES);
    let review_context = file_cfg
        .as_ref()
        .and_then(|c| c.review_context)
        .unwrap_or(DEFAULT_REVIEW_CONTEXT);
    Config {
        db_path,
        max_document_bytes,
        review_context,
    }
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_file_path()?;
    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: ignoring malformed config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// `$COPYDESK_CONFIG` wins over `~/.copydesk/config.toml`.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("COPYDESK_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = dirs::home_dir()?;
    Some(home.join(".copydesk").join("config.toml"))
}

fn default_db_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".copydesk").join("copydesk.db"),
        None => PathBuf::from(".copydesk.db"),
    }
}
