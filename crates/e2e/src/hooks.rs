//! Scenario lifecycle hooks

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::E2eResult;
use crate::world::SportWorld;

/// A screenshot captured for a failed scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureScreenshot {
    pub path: PathBuf,
    pub sha256: String,
}

/// What the after-hook did
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AfterHookReport {
    pub screenshot: Option<FailureScreenshot>,

    /// Problems during cleanup; these never mask the scenario's own error
    pub errors: Vec<String>,
}

pub fn before_scenario(world: &SportWorld) {
    debug!(
        "Starting '{}' against {}",
        world.scenario(),
        world.config().base_url
    );
}

/// Screenshot on failure (when enabled), then always release the browser.
pub async fn after_scenario(world: &mut SportWorld, failed: bool) -> AfterHookReport {
    let mut report = AfterHookReport::default();

    if failed && world.config().screenshot_on_failure && world.is_browser_open() {
        let name = screenshot_name(world.scenario());
        match capture(world, &name).await {
            Ok(shot) => {
                info!("Saved failure screenshot: {}", shot.path.display());
                report.screenshot = Some(shot);
            }
            Err(e) => {
                warn!("Failure screenshot for '{}' failed: {}", world.scenario(), e);
                report.errors.push(format!("screenshot: {}", e));
            }
        }
    }

    if let Err(e) = world.close_browser().await {
        warn!("Closing browser for '{}' failed: {}", world.scenario(), e);
        report.errors.push(format!("close: {}", e));
    }

    report
}

async fn capture(world: &mut SportWorld, name: &str) -> E2eResult<FailureScreenshot> {
    let path = world.base_page()?.screenshot(name).await?;
    let sha256 = hash_file(&path)?;
    Ok(FailureScreenshot { path, sha256 })
}

/// Scenario name as a file stem: whitespace and path separators become `_`.
pub fn screenshot_name(scenario: &str) -> String {
    scenario
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Hash a file using SHA256
fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
