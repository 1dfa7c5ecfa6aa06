//! BBC Sport BDD Test Suite
//!
//! Gherkin features under `features/` describe what the site must show;
//! step definitions drive a real browser through Playwright to check it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  FeatureRunner (Rust)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Feature::load_all(features/) -> [Feature]                  │
//! │  for each scenario:                                         │
//! │    SportWorld::new()          fresh per scenario            │
//! │    StepRegistry::find(step)   Cucumber expression match     │
//! │      └── sport_steps handler                                │
//! │            └── page object (SportHomePage, FormulaOnePage,  │
//! │                 SearchResultsPage)                          │
//! │                  └── PageDriver (Playwright bridge)         │
//! │    hooks::after_scenario()    screenshot + close browser    │
//! │  report::write_json()                                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod expression;
pub mod gherkin;
pub mod hooks;
pub mod pages;
pub mod preflight;
pub mod report;
pub mod runner;
pub mod sport_steps;
pub mod steps;
pub mod world;

pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use gherkin::{Feature, Scenario, Step, StepKind};
pub use runner::{FeatureRunner, SuiteResult};
pub use world::SportWorld;
