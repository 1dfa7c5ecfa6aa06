//! Page objects over the BBC Sport site

use std::path::PathBuf;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::browser::{LoadState, PageDriver};
use crate::config::SuiteConfig;
use crate::error::E2eResult;

mod formula_one;
mod search_results;
mod sport_home;

pub use formula_one::FormulaOnePage;
pub use search_results::SearchResultsPage;
pub use sport_home::SportHomePage;

/// Shared behavior for all page objects
pub struct BasePage<'a> {
    driver: &'a mut dyn PageDriver,
    config: &'a SuiteConfig,
}

impl<'a> BasePage<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: &'a SuiteConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &SuiteConfig {
        self.config
    }

    pub fn driver(&mut self) -> &mut dyn PageDriver {
        &mut *self.driver
    }

    pub async fn navigate(&mut self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        self.driver.goto(url).await
    }

    /// Save a screenshot as `<screenshot_dir>/<name>.png`.
    pub async fn screenshot(&mut self, name: &str) -> E2eResult<PathBuf> {
        let path = self.config.screenshot_dir.join(format!("{}.png", name));
        self.driver.screenshot(&path, true).await?;
        Ok(path)
    }

    /// Wait for network idle, then the configured settle delay.
    ///
    /// Network idle is best effort: ad and analytics traffic can keep a page
    /// busy past the timeout, and the polled queries that follow still
    /// decide the outcome.
    pub async fn wait_until_settled(&mut self) -> E2eResult<()> {
        self.wait_for_network_idle().await;

        let settle = self.config.settle();
        if !settle.is_zero() {
            self.driver.wait_for_timeout(settle).await?;
        }
        Ok(())
    }

    pub async fn wait_for_network_idle(&mut self) {
        if let Err(e) = self.driver.wait_for_load_state(LoadState::NetworkIdle).await {
            warn!("Page never reached network idle: {}", e);
        }
    }

    pub async fn count(&mut self, selector: &str) -> E2eResult<usize> {
        self.driver.count(selector).await
    }

    /// Re-count `selector` until `done` holds or the assertion timeout
    /// elapses. Returns the last count either way.
    pub async fn poll_count<F>(&mut self, selector: &str, done: F) -> E2eResult<usize>
    where
        F: Fn(usize) -> bool,
    {
        let deadline = Instant::now() + self.config.assertion_timeout();

        loop {
            let count = self.driver.count(selector).await?;
            if done(count) || Instant::now() >= deadline {
                debug!("{} -> {} match(es)", selector, count);
                return Ok(count);
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}
