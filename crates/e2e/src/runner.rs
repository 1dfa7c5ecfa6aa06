//! Feature runner: executes scenarios step by step against a fresh world

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, Instrument};

use crate::browser::BrowserLauncher;
use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::gherkin::{Feature, Scenario, Step};
use crate::hooks::{self, FailureScreenshot};
use crate::steps::StepRegistry;
use crate::world::SportWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    Undefined,
    Ambiguous,
    Skipped,
}

/// Result of executing one step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub keyword: String,
    pub text: String,
    pub line: usize,
    pub status: StepStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub feature: String,
    pub name: String,
    pub tags: Vec<String>,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
    pub screenshot: Option<FailureScreenshot>,
    #[serde(default)]
    pub cleanup_errors: Vec<String>,
}

/// Result of running all selected scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    All,
    /// Scenarios carrying this tag (own or inherited from the feature)
    Tagged(String),
    /// Scenarios whose name contains this text
    Named(String),
    /// Scenarios carrying the tag whose name also contains the text
    TaggedAndNamed { tag: String, name: String },
}

impl Selection {
    /// Build a selection from optional tag and name filters; both must hold
    /// when both are given.
    pub fn from_filters(tag: Option<String>, name: Option<String>) -> Self {
        match (tag, name) {
            (Some(tag), Some(name)) => Selection::TaggedAndNamed { tag, name },
            (Some(tag), None) => Selection::Tagged(tag),
            (None, Some(name)) => Selection::Named(name),
            (None, None) => Selection::All,
        }
    }

    pub fn matches(&self, scenario: &Scenario) -> bool {
        match self {
            Selection::All => true,
            Selection::Tagged(tag) => has_tag(scenario, tag),
            Selection::Named(name) => scenario.name.contains(name.as_str()),
            Selection::TaggedAndNamed { tag, name } => {
                has_tag(scenario, tag) && scenario.name.contains(name.as_str())
            }
        }
    }
}

fn has_tag(scenario: &Scenario, tag: &str) -> bool {
    let tag = if tag.starts_with('@') {
        tag.to_string()
    } else {
        format!("@{}", tag)
    };
    scenario.tags.contains(&tag)
}

/// Main BDD runner
pub struct FeatureRunner {
    config: Arc<SuiteConfig>,
    registry: StepRegistry<SportWorld>,
    launcher: Arc<dyn BrowserLauncher>,
}

impl FeatureRunner {
    pub fn new(
        config: SuiteConfig,
        registry: StepRegistry<SportWorld>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            launcher,
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run every scenario in the features directory
    pub async fn run_all(&self) -> E2eResult<SuiteResult> {
        self.run(&Selection::All).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<SuiteResult> {
        self.run(&Selection::Tagged(tag.to_string())).await
    }

    /// Run scenarios whose name contains `filter`
    pub async fn run_named(&self, filter: &str) -> E2eResult<SuiteResult> {
        self.run(&Selection::Named(filter.to_string())).await
    }

    pub async fn run(&self, selection: &Selection) -> E2eResult<SuiteResult> {
        let features = Feature::load_all(&self.config.features_dir)?;
        if features.is_empty() {
            return Err(E2eError::Config(format!(
                "no .feature files under {}",
                self.config.features_dir.display()
            )));
        }
        Ok(self.run_features(&features, selection).await)
    }

    /// Run the selected scenarios of already-parsed features
    pub async fn run_features(&self, features: &[Feature], selection: &Selection) -> SuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut scenarios = Vec::new();

        let selected: Vec<(&Feature, &Scenario)> = features
            .iter()
            .flat_map(|f| f.scenarios.iter().map(move |s| (f, s)))
            .filter(|(_, s)| selection.matches(s))
            .collect();

        info!("Running {} scenario(s)...", selected.len());

        for (feature, scenario) in selected {
            let result = self.run_scenario(feature, scenario).await;
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            scenarios.push(result);
        }

        let passed = scenarios.iter().filter(|s| s.success).count();
        let failed = scenarios.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "{} scenario(s): {} passed, {} failed ({} ms)",
            scenarios.len(),
            passed,
            failed,
            duration_ms
        );

        SuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            started_at,
            scenarios,
        }
    }

    /// Run a single scenario; the after-hook runs whatever happens to the steps
    pub async fn run_scenario(&self, feature: &Feature, scenario: &Scenario) -> ScenarioResult {
        let span = info_span!("scenario", name = %scenario.name);
        self.execute(feature, scenario).instrument(span).await
    }

    async fn execute(&self, feature: &Feature, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        let mut world = SportWorld::new(
            Arc::clone(&self.config),
            Arc::clone(&self.launcher),
            scenario.name.clone(),
        );
        hooks::before_scenario(&world);

        let mut steps = Vec::with_capacity(scenario.steps.len());
        let mut scenario_error: Option<String> = None;

        for step in &scenario.steps {
            if scenario_error.is_some() {
                steps.push(skipped(step));
                continue;
            }

            let result = self.execute_step(&mut world, step).await;
            if let Some(e) = &result.error {
                scenario_error = Some(format!("{} {}: {}", step.keyword, step.text, e));
            }
            steps.push(result);
        }

        let after = hooks::after_scenario(&mut world, scenario_error.is_some()).await;

        ScenarioResult {
            feature: feature.name.clone(),
            name: scenario.name.clone(),
            tags: scenario.tags.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
            error: scenario_error,
            screenshot: after.screenshot,
            cleanup_errors: after.errors,
        }
    }

    async fn execute_step(&self, world: &mut SportWorld, step: &Step) -> StepResult {
        let start = Instant::now();
        debug!("{} {}", step.keyword, step.text);

        let outcome = match self.registry.find(step) {
            Ok(matched) => matched.run(world).await,
            Err(e) => Err(e),
        };

        let status = match &outcome {
            Ok(()) => StepStatus::Passed,
            Err(E2eError::UndefinedStep(_)) => StepStatus::Undefined,
            Err(E2eError::AmbiguousStep { .. }) => StepStatus::Ambiguous,
            Err(_) => StepStatus::Failed,
        };

        StepResult {
            keyword: step.keyword.clone(),
            text: step.text.clone(),
            line: step.line,
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            error: outcome.err().map(|e| e.to_string()),
        }
    }
}

fn skipped(step: &Step) -> StepResult {
    StepResult {
        keyword: step.keyword.clone(),
        text: step.text.clone(),
        line: step.line,
        status: StepStatus::Skipped,
        duration_ms: 0,
        error: None,
    }
}
