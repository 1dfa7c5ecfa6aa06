use tracing::{debug, info};

use super::BasePage;
use crate::browser::PageDriver;
use crate::config::SuiteConfig;
use crate::error::E2eResult;

/// Header search controls. The site ships several variants; first match wins.
pub const SEARCH_TRIGGER: &str =
    r#"button[aria-label="Search"], button[data-testid="search-button"], button:has-text("Search")"#;

pub const SEARCH_INPUT: &str = r#"input[type="search"], input[placeholder*="Search"]"#;

/// Keyboard shortcut that opens search when no trigger button is rendered
const SEARCH_SHORTCUT: &str = "/";

/// The BBC Sport front page and its global navigation
pub struct SportHomePage<'a> {
    base: BasePage<'a>,
}

impl<'a> SportHomePage<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: &'a SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    pub async fn open(&mut self) -> E2eResult<()> {
        let url = self.base.config().url("");
        self.base.navigate(&url).await
    }

    pub async fn go_to_formula1(&mut self) -> E2eResult<()> {
        let url = self.base.config().url("formula1");
        self.base.navigate(&url).await
    }

    /// Open search, submit `query` and wait for the results to render.
    pub async fn search(&mut self, query: &str) -> E2eResult<()> {
        self.base.wait_for_network_idle().await;

        if self.base.count(SEARCH_TRIGGER).await? > 0 {
            self.base.driver().click_first(SEARCH_TRIGGER).await?;
        } else {
            debug!("No search button; trying the '{}' shortcut", SEARCH_SHORTCUT);
            self.base.driver().keyboard_press(SEARCH_SHORTCUT).await?;
        }

        let driver = self.base.driver();
        driver.fill_first(SEARCH_INPUT, query).await?;
        driver.press_first(SEARCH_INPUT, "Enter").await?;

        info!("Searched for '{}'", query);
        self.base.wait_until_settled().await
    }
}
