use config::{Config, ConfigError, File as ConfigFile, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".file-roulette.toml";
pub const DEFAULT_SEEN_FILE_NAME: &str = ".file-roulette-seen.json";

/// How a file's identity key is derived for seen-set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Normalized path string. Cheap, breaks if files are moved.
    Path,
    /// XxHash64 of the file contents. Survives renames, costs one read per candidate.
    Content,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Glob patterns excluded from selection (matched against file and directory names).
    pub exclude_patterns: Vec<String>,
    /// Extensions never selected, lowercase without the dot.
    pub deny_extensions: Vec<String>,
    /// If non-empty, only these extensions are selected.
    pub allow_extensions: Vec<String>,
    pub include_hidden: bool,
    pub include_zero_byte: bool,
    pub min_file_size: u64,
    pub max_file_size: Option<u64>,
    pub max_depth: Option<usize>,
    pub follow_symlinks: bool,
    pub identity: IdentityMode,
    /// Seen-set file name, resolved relative to the scan root.
    pub seen_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![
                "*.tmp".to_string(),
                "~$*".to_string(),
                "*.swp".to_string(),
                "*.swo".to_string(),
                "*.pyc".to_string(),
                "*.log".to_string(),
                "Thumbs.db".to_string(),
                ".DS_Store".to_string(),
                "desktop.ini".to_string(),
            ],
            deny_extensions: vec![
                "exe", "dll", "sys", "msi", "bat", "cmd", "com", "scr", "lnk", "so", "dylib",
                "drv", "ocx", "app", "deb", "rpm", "dmg", "pkg",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            allow_extensions: Vec::new(),
            include_hidden: false,
            include_zero_byte: false,
            min_file_size: 0,
            max_file_size: None,
            max_depth: None,
            follow_symlinks: false,
            identity: IdentityMode::Path,
            seen_file: DEFAULT_SEEN_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Absolute path of the seen-set file for a given scan root.
    pub fn seen_path(&self, root: &Path) -> PathBuf {
        let configured = Path::new(&self.seen_file);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            root.join(configured)
        }
    }
}

/// Load configuration for a scan root. A missing config file yields defaults.
pub fn load_configuration(root: &Path) -> Result<AppConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    let builder = Config::builder()
        .add_source(
            ConfigFile::from(config_path)
                .format(FileFormat::Toml)
                .required(false),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Default configuration rendered as a commented TOML skeleton for `init-config`.
pub fn default_config_toml() -> String {
    let defaults = AppConfig::default();
    let patterns = defaults
        .exclude_patterns
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "\
# file-roulette configuration. All keys are optional.

# Glob patterns never selected (matched against file and directory names).
exclude_patterns = [{patterns}]

# Extensions never selected (lowercase, no dot). Defaults cover executables
# and installers; uncomment to replace.
# deny_extensions = [\"exe\", \"dll\"]

# If non-empty, only these extensions are eligible.
# allow_extensions = [\"jpg\", \"png\", \"pdf\"]

include_hidden = false
include_zero_byte = false
min_file_size = 0
# max_file_size = 104857600
# max_depth = 8
follow_symlinks = false

# \"path\" or \"content\" (content hashes every candidate, survives renames).
identity = \"path\"

seen_file = \"{seen}\"
",
        patterns = patterns,
        seen = defaults.seen_file,
    )
}
