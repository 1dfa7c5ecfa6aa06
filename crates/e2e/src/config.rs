//! Suite configuration
//!
//! Layered as: built-in defaults, then an optional YAML file, then the
//! environment (`BASE_URL`, `HEADLESS`, `SCREENSHOT_ON_FAILURE`, `BROWSER`).
//! The harness applies its CLI flags last.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::{BrowserKind, BrowserOptions, Viewport};
use crate::error::{E2eError, E2eResult};

pub const DEFAULT_BASE_URL: &str = "https://www.bbc.com/sport";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Root of the site under test; page objects build their URLs from it
    pub base_url: String,

    pub browser: BrowserKind,

    pub headless: bool,

    pub viewport: Viewport,

    pub navigation_timeout_ms: u64,

    /// How long polled assertions keep re-querying the DOM
    pub assertion_timeout_ms: u64,

    pub poll_interval_ms: u64,

    /// Fixed delay after network idle for late client-side rendering
    pub settle_ms: u64,

    pub screenshot_on_failure: bool,

    pub screenshot_dir: PathBuf,

    pub features_dir: PathBuf,

    pub output_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::Chromium,
            headless: true,
            viewport: Viewport::default(),
            navigation_timeout_ms: 30_000,
            assertion_timeout_ms: 5_000,
            poll_interval_ms: 250,
            settle_ms: 1_000,
            screenshot_on_failure: false,
            screenshot_dir: PathBuf::from("screenshots"),
            features_dir: PathBuf::from("features"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

impl SuiteConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults, overlaid with `path` if given, overlaid with the process environment.
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading suite config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        // Headless unless explicitly "false"
        if let Some(value) = lookup("HEADLESS") {
            self.headless = value.trim() != "false";
        }
        // Screenshots only when explicitly "true"
        if let Some(value) = lookup("SCREENSHOT_ON_FAILURE") {
            self.screenshot_on_failure = value.trim() == "true";
        }
        if let Some(value) = lookup("BROWSER").filter(|v| !v.trim().is_empty()) {
            self.browser = value.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(E2eError::Config("poll_interval_ms must be > 0".to_string()));
        }
        Ok(())
    }

    /// Anchor relative `features_dir`, `output_dir` and `screenshot_dir` at `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        for dir in [
            &mut self.features_dir,
            &mut self.output_dir,
            &mut self.screenshot_dir,
        ] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }

    /// `base_url` joined with a relative path, without doubling slashes.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            browser: self.browser,
            headless: self.headless,
            viewport: self.viewport,
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms),
        }
    }

    pub fn assertion_timeout(&self) -> Duration {
        Duration::from_millis(self.assertion_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://www.bbc.com/sport");
        assert!(config.headless);
        assert!(!config.screenshot_on_failure);
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.navigation_timeout_ms, 30_000);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SuiteConfig::default();
        config
            .apply_env(env(&[
                ("BASE_URL", "http://localhost:8080/sport/"),
                ("HEADLESS", "false"),
                ("SCREENSHOT_ON_FAILURE", "true"),
                ("BROWSER", "firefox"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/sport/");
        assert!(!config.headless);
        assert!(config.screenshot_on_failure);
        assert_eq!(config.browser, BrowserKind::Firefox);
    }

    #[test]
    fn test_headless_only_disabled_by_literal_false() {
        let mut config = SuiteConfig::default();
        config.apply_env(env(&[("HEADLESS", "0")])).unwrap();
        assert!(config.headless);

        config.apply_env(env(&[("SCREENSHOT_ON_FAILURE", "1")])).unwrap();
        assert!(!config.screenshot_on_failure);
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = SuiteConfig::default();
        assert!(config.apply_env(env(&[("BROWSER", "lynx")])).is_err());

        let mut config = SuiteConfig::default();
        assert!(config.apply_env(env(&[("BASE_URL", "www.bbc.com")])).is_err());
    }

    #[test]
    fn test_yaml_partial_overrides() {
        let yaml = r#"
base_url: https://www.bbc.co.uk/sport
settle_ms: 0
viewport:
  width: 1920
  height: 1080
"#;
        let config = SuiteConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url, "https://www.bbc.co.uk/sport");
        assert_eq!(config.settle_ms, 0);
        assert_eq!(config.viewport.width, 1920);
        assert_eq!(config.assertion_timeout_ms, 5_000);
    }

    #[test]
    fn test_resolve_paths_anchors_every_relative_dir() {
        let mut config = SuiteConfig {
            output_dir: PathBuf::from("/tmp/results"),
            ..Default::default()
        };
        config.resolve_paths(Path::new("/work/crates/e2e"));

        assert_eq!(config.features_dir, Path::new("/work/crates/e2e/features"));
        assert_eq!(config.screenshot_dir, Path::new("/work/crates/e2e/screenshots"));
        assert_eq!(config.output_dir, Path::new("/tmp/results"));
    }

    #[test]
    fn test_url_join() {
        let mut config = SuiteConfig::default();
        assert_eq!(config.url("formula1"), "https://www.bbc.com/sport/formula1");
        assert_eq!(config.url(""), "https://www.bbc.com/sport");

        config.base_url = "https://www.bbc.com/sport/".to_string();
        assert_eq!(config.url("/formula1"), "https://www.bbc.com/sport/formula1");
    }
}
