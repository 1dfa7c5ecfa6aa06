//! Error types for the sport suite

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Browser bridge error: {0}")]
    Bridge(String),

    #[error("{}:{line}: {reason}", path.display())]
    FeatureParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid step expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Undefined step: {0}")]
    UndefinedStep(String),

    #[error("Ambiguous step '{step}' matches: {candidates:?}")]
    AmbiguousStep {
        step: String,
        candidates: Vec<String>,
    },

    #[error("Step already defined: {0}")]
    DuplicateStep(String),

    #[error("Step argument {index}: {reason}")]
    StepArgument { index: usize, reason: String },

    #[error("Data table error: {0}")]
    DataTable(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("No browser session open; a Given step must launch one first")]
    NoBrowserSession,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Site {url} unreachable after {attempts} attempts")]
    SiteUnreachable { url: String, attempts: usize },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Errors that mean the environment cannot run the suite at all, as opposed
    /// to a scenario failing.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            E2eError::PlaywrightNotFound | E2eError::SiteUnreachable { .. }
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
