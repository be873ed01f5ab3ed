//! User configuration (`config.toml`).
//!
//! Problems with the file never stop the program: they are returned as
//! warnings and the defaults are used instead.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tabula_core::OutputMode;
use tabula_engine::engine::RenderOptions;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    delimiter: Option<String>,
    log_level: Option<String>,
    output: Option<OutputMode>,
}

/// Effective configuration.
#[derive(Debug, Default)]
pub struct Config {
    pub render: RenderOptions,
    /// `env_logger` filter used when `RUST_LOG` is not set.
    pub log_level: Option<String>,
    /// Rendering written by `--output`.
    pub output: OutputMode,
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("org", "tabula", "tabula")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Load configuration from `config_file`, or from the user config dir when none is given.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let file = match read_config_file(&path) {
        Ok(file) => file,
        Err(message) => {
            warnings.push(message);
            return (Config::default(), warnings);
        }
    };
    (apply(file, &mut warnings), warnings)
}

fn read_config_file(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<ConfigFile>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn apply(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let mut config = Config {
        log_level: file.log_level,
        output: file.output.unwrap_or_default(),
        ..Config::default()
    };
    if let Some(delimiter) = file.delimiter {
        let mut chars = delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => config.render.delimiter = c,
            _ => warnings.push(format!(
                "Ignoring delimiter {:?}: expected a single character",
                delimiter
            )),
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> (Config, Vec<String>) {
        let mut warnings = Vec::new();
        let file: ConfigFile = toml::from_str(content).unwrap();
        let config = apply(file, &mut warnings);
        (config, warnings)
    }

    #[test]
    fn test_defaults() {
        let (config, warnings) = parse("");
        assert!(warnings.is_empty());
        assert_eq!(config.render.delimiter, '\t');
        assert_eq!(config.output, OutputMode::Values);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_full_config() {
        let (config, warnings) = parse("delimiter = \",\"\nlog_level = \"debug\"\noutput = \"texts\"\n");
        assert!(warnings.is_empty());
        assert_eq!(config.render.delimiter, ',');
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.output, OutputMode::Texts);
    }

    #[test]
    fn test_bad_delimiter_warns() {
        let (config, warnings) = parse("delimiter = \";;\"\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.render.delimiter, '\t');
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<ConfigFile>("colour = \"red\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let path = PathBuf::from("/nonexistent/tabula/config.toml");
        let (_, warnings) = load_config(Some(&path));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn user_config_path_is_deterministic() {
        // Should never panic and should either be Some(path) or None.
        let _ = user_config_path();
    }
}
