//! Browser automation seam
//!
//! Step definitions and page objects only ever talk to [`PageDriver`]. The
//! real implementation drives Playwright through a Node bridge process
//! ([`playwright`]); tests substitute a scripted driver.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

pub mod playwright;

pub use playwright::{PlaywrightLauncher, PlaywrightPage};

/// A single open page in a launched browser.
///
/// Selectors use Playwright syntax, so both CSS (`h3, h2`) and text
/// (`text=Max Verstappen`) locators are accepted.
#[async_trait]
pub trait PageDriver: Send {
    async fn goto(&mut self, url: &str) -> E2eResult<()>;

    async fn wait_for_load_state(&mut self, state: LoadState) -> E2eResult<()>;

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()>;

    /// Number of elements currently matching `selector`.
    async fn count(&mut self, selector: &str) -> E2eResult<usize>;

    async fn click_first(&mut self, selector: &str) -> E2eResult<()>;

    async fn fill_first(&mut self, selector: &str, value: &str) -> E2eResult<()>;

    async fn press_first(&mut self, selector: &str, key: &str) -> E2eResult<()>;

    async fn keyboard_press(&mut self, key: &str) -> E2eResult<()>;

    async fn inner_texts(&mut self, selector: &str) -> E2eResult<Vec<String>>;

    async fn title(&mut self) -> E2eResult<String>;

    async fn current_url(&mut self) -> E2eResult<String>;

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Close the browser. Calling it twice is a no-op.
    async fn close(&mut self) -> E2eResult<()>;
}

/// Launches a browser and opens a fresh page in a fresh context.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, options: &BrowserOptions) -> E2eResult<Box<dyn PageDriver>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" | "safari" => Ok(BrowserKind::Webkit),
            other => Err(E2eError::Config(format!(
                "unknown browser '{}'. Must be one of: chromium, firefox, webkit",
                other
            ))),
        }
    }
}

/// Playwright load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport: Viewport,
    pub navigation_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chromium,
            headless: true,
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_kind_from_str() {
        assert_eq!("Chromium".parse::<BrowserKind>().unwrap(), BrowserKind::Chromium);
        assert_eq!("firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert_eq!("safari".parse::<BrowserKind>().unwrap(), BrowserKind::Webkit);
        assert!("opera".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn test_load_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&LoadState::NetworkIdle).unwrap(),
            r#""networkidle""#
        );
        assert_eq!(
            serde_json::to_string(&LoadState::DomContentLoaded).unwrap(),
            r#""domcontentloaded""#
        );
    }
}
