use color_eyre::eyre::{OptionExt, WrapErr};
use cubist_core::{ColorScheme, ida::IdaOptions, two_phase::TwoPhaseOptions};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Settings read from `config.toml`. Every field is optional; command-line
/// flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the sticker colour scheme, `faces` or `western`.
    pub colors: Option<String>,
    pub fast: FastConfig,
    pub research: ResearchConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FastConfig {
    pub max_length: Option<usize>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResearchConfig {
    pub max_depth: Option<usize>,
    /// Zero disables the timeout.
    pub timeout_ms: Option<u64>,
}

impl Config {
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cubist").join("config.toml"))
    }

    /// Reads `path`, or the default location when `path` is `None`. Only a
    /// missing file at the default location is silently replaced by the
    /// defaults.
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Config> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Config::default_path() {
                Some(path) => (path, false),
                None => return Ok(Config::default()),
            },
        };

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Config::default());
            }
            Err(error) => {
                return Err(error).wrap_err_with(|| format!("Failed to read {}", path.display()));
            }
        };
        log::debug!("Loading configuration from {}", path.display());
        toml::from_str(&text).wrap_err_with(|| format!("Failed to parse {}", path.display()))
    }

    pub fn scheme(&self) -> color_eyre::Result<ColorScheme> {
        match &self.colors {
            None => Ok(ColorScheme::FACE_LETTERS),
            Some(name) => ColorScheme::by_name(name)
                .ok_or_eyre(format!("Unknown colour scheme `{name}` in the configuration")),
        }
    }

    #[must_use]
    pub fn two_phase_options(
        &self,
        max_length: Option<usize>,
        timeout_ms: Option<u64>,
    ) -> TwoPhaseOptions {
        let mut options = TwoPhaseOptions::default();
        if let Some(max_length) = max_length.or(self.fast.max_length) {
            options = options.with_max_length(max_length);
        }
        if let Some(timeout_ms) = timeout_ms.or(self.fast.timeout_ms) {
            options = options.with_timeout(Duration::from_millis(timeout_ms));
        }
        options
    }

    #[must_use]
    pub fn ida_options(&self, max_depth: Option<usize>, timeout_ms: Option<u64>) -> IdaOptions {
        let mut options = IdaOptions::default();
        if let Some(max_depth) = max_depth.or(self.research.max_depth) {
            options = options.with_max_depth(max_depth);
        }
        match timeout_ms.or(self.research.timeout_ms) {
            Some(0) => options = options.without_timeout(),
            Some(timeout_ms) => options = options.with_timeout(Duration::from_millis(timeout_ms)),
            None => {}
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            colors = "western"

            [fast]
            max_length = 24
            timeout_ms = 500

            [research]
            max_depth = 18
            timeout_ms = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.scheme().unwrap(), ColorScheme::WESTERN);

        let fast = config.two_phase_options(None, None);
        assert_eq!(fast.max_length, 24);
        assert_eq!(fast.timeout, Some(Duration::from_millis(500)));

        let research = config.ida_options(None, None);
        assert_eq!(research.max_depth, 18);
        assert_eq!(research.timeout, None);
    }

    #[test]
    fn test_flags_override_config() {
        let config: Config = toml::from_str("[fast]\nmax_length = 24").unwrap();
        assert_eq!(config.two_phase_options(Some(21), None).max_length, 21);
        assert_eq!(config.ida_options(None, None).max_depth, 25);
    }

    #[test]
    fn test_empty_and_invalid_configs() {
        assert_eq!(toml::from_str::<Config>("").unwrap(), Config::default());
        assert!(toml::from_str::<Config>("colour = \"western\"").is_err());

        let config = Config {
            colors: Some("neon".to_string()),
            ..Config::default()
        };
        assert!(config.scheme().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/cubist.toml"))).is_err());
    }
}
