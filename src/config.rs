use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the project-local configuration file.
pub const LOCAL_CONFIG_FILE: &str = "release.toml";

/// Name of the configuration file inside the user config directory.
pub const USER_CONFIG_FILE: &str = "pkg-release.toml";

/// Represents the complete configuration for pkg-release.
///
/// Holds the file locations, branch and remote names, and the external
/// commands used to build and upload a package.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    #[serde(default = "default_version_identifier")]
    pub version_identifier: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: PathBuf,

    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_test_repository")]
    pub test_repository: String,

    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    #[serde(default = "default_upload_command")]
    pub upload_command: Vec<String>,

    /// Artifact pattern handed to the upload tool; `{version}` is substituted.
    #[serde(default = "default_artifact_glob")]
    pub artifact_glob: String,
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version.py")
}

fn default_version_identifier() -> String {
    "__version__".to_string()
}

fn default_changelog_file() -> PathBuf {
    PathBuf::from("CHANGELOG.rst")
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_test_repository() -> String {
    "testpypi".to_string()
}

fn default_build_command() -> Vec<String> {
    vec!["python".to_string(), "-m".to_string(), "build".to_string()]
}

fn default_upload_command() -> Vec<String> {
    vec!["twine".to_string(), "upload".to_string()]
}

fn default_artifact_glob() -> String {
    "dist/*-{version}*".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version_file: default_version_file(),
            version_identifier: default_version_identifier(),
            changelog_file: default_changelog_file(),
            main_branch: default_main_branch(),
            remote: default_remote(),
            test_repository: default_test_repository(),
            build_command: default_build_command(),
            upload_command: default_upload_command(),
            artifact_glob: default_artifact_glob(),
        }
    }
}

impl Config {
    /// Artifact pattern with the version substituted in.
    pub fn artifact_pattern(&self, version: &str) -> String {
        self.artifact_glob.replace("{version}", version)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `pkg-release.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        fs::read_to_string(LOCAL_CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(USER_CONFIG_FILE);
        if user_path.exists() {
            fs::read_to_string(user_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}
