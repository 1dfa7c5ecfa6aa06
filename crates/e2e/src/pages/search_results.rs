use super::BasePage;
use crate::browser::PageDriver;
use crate::config::SuiteConfig;
use crate::error::E2eResult;

/// Each search hit renders its title as a heading
pub const RESULT_HEADINGS: &str = "h3, h2";

pub struct SearchResultsPage<'a> {
    base: BasePage<'a>,
}

impl<'a> SearchResultsPage<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: &'a SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Number of result headings, polled until at least `minimum` render.
    pub async fn result_count(&mut self, minimum: usize) -> E2eResult<usize> {
        self.base.poll_count(RESULT_HEADINGS, |n| n >= minimum).await
    }

    pub async fn result_titles(&mut self) -> E2eResult<Vec<String>> {
        self.base.driver().inner_texts(RESULT_HEADINGS).await
    }
}
