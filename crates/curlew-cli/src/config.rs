//! Configuration resolution for the CLI.
//!
//! The parser settings for a run are layered. A TOML file supplies the
//! base, command-line switches override it, and the input path names the
//! template when the file does not.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use curlew::{
    CurlewError,
    config::{AppConfig, ParserConfig},
};

use crate::Args;

/// Project-local configuration, relative to the working directory.
const LOCAL_CONFIG: &str = "curlew/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for CurlewError {
    fn from(err: ConfigError) -> Self {
        CurlewError::Config(err.to_string())
    }
}

/// Where the configuration of a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigSource {
    /// Named with `--config`. Must exist.
    Explicit(PathBuf),
    /// `curlew/config.toml` under the working directory.
    Local(PathBuf),
    /// `config.toml` in the platform configuration directory.
    Platform(PathBuf),
    /// No file; built-in defaults.
    Default,
}

impl ConfigSource {
    /// Pick the first source that applies, in search order.
    fn locate(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            return Self::Local(local);
        }

        match ProjectDirs::from("com", "curlew", "curlew") {
            Some(dirs) => {
                let platform = dirs.config_dir().join("config.toml");
                if platform.exists() {
                    return Self::Platform(platform);
                }
                debug!(path = platform.display().to_string(); "No platform configuration");
            }
            None => debug!("No platform configuration directory"),
        }

        Self::Default
    }

    fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(path) | Self::Local(path) | Self::Platform(path) => Some(path),
            Self::Default => None,
        }
    }

    fn load(&self) -> Result<AppConfig, ConfigError> {
        let Some(path) = self.path() else {
            return Ok(AppConfig::default());
        };
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| parse_error(e.to_string()))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) => write!(f, "{} (--config)", path.display()),
            Self::Local(path) => write!(f, "{} (project)", path.display()),
            Self::Platform(path) => write!(f, "{} (platform)", path.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

/// Settle the configuration for a run.
///
/// Looks for a file at `--config`, then `curlew/config.toml`, then the
/// platform configuration directory, and falls back to the defaults.
/// `--ignore-standalone` forces standalone padding to be kept, and the
/// input path becomes the source name unless the file sets one.
///
/// # Errors
///
/// Fails when `--config` names a missing file or any found file does not
/// parse.
pub fn resolve(args: &Args) -> Result<AppConfig, CurlewError> {
    let source = ConfigSource::locate(args.config.as_deref().map(Path::new));
    info!(source:% = source; "Loading configuration");

    let parser = source.load()?.parser().clone();
    let source_name = parser
        .source_name()
        .map_or_else(|| args.input.clone(), str::to_string);

    Ok(AppConfig::new(ParserConfig::new(
        parser.ignore_standalone() || args.ignore_standalone,
        parser.square(),
        Some(source_name),
    )))
}

#[cfg(test)]
mod tests {
    use curlew::config::SquareMode;
    use tempfile::tempdir;

    use super::*;

    fn args(input: &str, config: Option<&Path>) -> Args {
        Args {
            input: input.to_string(),
            output: None,
            config: config.map(|path| path.display().to_string()),
            log_level: "info".to_string(),
            raw: false,
            ignore_standalone: false,
        }
    }

    #[test]
    fn test_explicit_file_is_used() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser]\nignore_standalone = true\nsquare = \"node\"\n").unwrap();

        let config = resolve(&args("page.hbs", Some(&path))).unwrap();
        assert!(config.parser().ignore_standalone());
        assert_eq!(config.parser().square(), SquareMode::Node);
    }

    #[test]
    fn test_explicit_path_wins_the_search() {
        let path = Path::new("somewhere/else.toml");
        assert_eq!(
            ConfigSource::locate(Some(path)),
            ConfigSource::Explicit(path.to_path_buf())
        );
        assert_eq!(ConfigSource::Default.path(), None);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let err = resolve(&args("page.hbs", Some(&path))).unwrap_err();
        assert!(matches!(
            err,
            CurlewError::Config(message) if message.starts_with("Missing configuration file")
        ));
    }

    #[test]
    fn test_malformed_file_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser\n").unwrap();

        let err = resolve(&args("page.hbs", Some(&path))).unwrap_err();
        let CurlewError::Config(message) = err else {
            panic!("Expected a configuration error");
        };
        assert!(message.contains("config.toml"), "{message}");
    }

    #[test]
    fn test_switch_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser]\nignore_standalone = false\n").unwrap();

        let mut args = args("page.hbs", Some(&path));
        args.ignore_standalone = true;
        assert!(resolve(&args).unwrap().parser().ignore_standalone());
    }

    #[test]
    fn test_source_name_falls_back_to_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let config = resolve(&args("views/page.hbs", Some(&path))).unwrap();
        assert_eq!(config.parser().source_name(), Some("views/page.hbs"));
    }

    #[test]
    fn test_configured_source_name_is_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[parser]\nsource_name = \"layout\"\n").unwrap();

        let config = resolve(&args("views/page.hbs", Some(&path))).unwrap();
        assert_eq!(config.parser().source_name(), Some("layout"));
    }
}
