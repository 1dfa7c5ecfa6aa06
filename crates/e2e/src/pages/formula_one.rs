use super::BasePage;
use crate::browser::PageDriver;
use crate::config::SuiteConfig;
use crate::error::E2eResult;

/// BBC Sport Formula 1 section, including its race results
pub struct FormulaOnePage<'a> {
    base: BasePage<'a>,
}

impl<'a> FormulaOnePage<'a> {
    pub fn new(driver: &'a mut dyn PageDriver, config: &'a SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Results are rendered client-side; wait for them to settle.
    pub async fn locate_results(&mut self) -> E2eResult<()> {
        self.base.wait_until_settled().await
    }

    /// Whether `driver` appears anywhere in the page text.
    pub async fn finisher_present(&mut self, driver: &str) -> E2eResult<bool> {
        let selector = format!("text={}", driver);
        let count = self.base.poll_count(&selector, |n| n > 0).await?;
        Ok(count > 0)
    }
}
