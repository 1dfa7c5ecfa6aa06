//! Per-scenario state

use std::sync::Arc;

use tracing::{debug, warn};

use crate::browser::{BrowserLauncher, PageDriver};
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::pages::{BasePage, FormulaOnePage, SearchResultsPage, SportHomePage};

/// State shared by the steps of one scenario. A new world is built for
/// every scenario, so nothing leaks between them.
pub struct SportWorld {
    config: Arc<SuiteConfig>,
    launcher: Arc<dyn BrowserLauncher>,
    page: Option<Box<dyn PageDriver>>,
    scenario: String,
}

impl SportWorld {
    pub fn new(
        config: Arc<SuiteConfig>,
        launcher: Arc<dyn BrowserLauncher>,
        scenario: impl Into<String>,
    ) -> Self {
        Self {
            config,
            launcher,
            page: None,
            scenario: scenario.into(),
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn is_browser_open(&self) -> bool {
        self.page.is_some()
    }

    /// Launch a browser with a fresh context and page. An already open
    /// browser is closed first.
    pub async fn open_browser(&mut self) -> E2eResult<()> {
        if self.page.is_some() {
            warn!("Browser already open in '{}'; relaunching", self.scenario);
            self.close_browser().await?;
        }

        let options = self.config.browser_options();
        self.page = Some(self.launcher.launch(&options).await?);
        debug!("Browser open for '{}'", self.scenario);
        Ok(())
    }

    pub fn driver(&mut self) -> E2eResult<&mut dyn PageDriver> {
        match self.page.as_mut() {
            Some(page) => Ok(page.as_mut()),
            None => Err(E2eError::NoBrowserSession),
        }
    }

    pub fn base_page(&mut self) -> E2eResult<BasePage<'_>> {
        let driver = self.page.as_mut().ok_or(E2eError::NoBrowserSession)?;
        Ok(BasePage::new(driver.as_mut(), &self.config))
    }

    pub fn home_page(&mut self) -> E2eResult<SportHomePage<'_>> {
        let driver = self.page.as_mut().ok_or(E2eError::NoBrowserSession)?;
        Ok(SportHomePage::new(driver.as_mut(), &self.config))
    }

    pub fn formula_one_page(&mut self) -> E2eResult<FormulaOnePage<'_>> {
        let driver = self.page.as_mut().ok_or(E2eError::NoBrowserSession)?;
        Ok(FormulaOnePage::new(driver.as_mut(), &self.config))
    }

    pub fn search_results_page(&mut self) -> E2eResult<SearchResultsPage<'_>> {
        let driver = self.page.as_mut().ok_or(E2eError::NoBrowserSession)?;
        Ok(SearchResultsPage::new(driver.as_mut(), &self.config))
    }

    /// Close the browser if one is open. Safe to call repeatedly.
    pub async fn close_browser(&mut self) -> E2eResult<()> {
        match self.page.take() {
            Some(mut page) => page.close().await,
            None => Ok(()),
        }
    }
}
