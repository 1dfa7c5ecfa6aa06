//! Step definitions for the BBC Sport features

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::gherkin::DataTable;
use crate::steps::{StepCall, StepRegistry};
use crate::world::SportWorld;

/// Podium of the 2023 Las Vegas Grand Prix as the suite checks it, used when
/// the step carries no table.
pub const LAS_VEGAS_2023_PODIUM: [&str; 3] = ["Max Verstappen", "George Russell", "Sergio Perez"];

/// How many result titles to quote when a search comes up short
const QUOTED_TITLES: usize = 5;

pub fn registry() -> E2eResult<StepRegistry<SportWorld>> {
    StepRegistry::new()
        .given("I navigate to the BBC Sport homepage", navigate_to_homepage)?
        .given("I navigate to the BBC Sport Formula 1 page", navigate_to_formula1)?
        .when("I locate the {int} {} Grand Prix results table", locate_results_table)?
        .when("I search for {string}", search_for)?
        .then("I should see the top {int} finishers as:", top_finishers)?
        .then("I should see at least {int} relevant results", at_least_results)
}

fn navigate_to_homepage(world: &mut SportWorld, _call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        world.open_browser().await?;
        world.home_page()?.open().await
    }
    .boxed()
}

fn navigate_to_formula1(world: &mut SportWorld, _call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        world.open_browser().await?;
        world.home_page()?.go_to_formula1().await
    }
    .boxed()
}

fn locate_results_table(world: &mut SportWorld, call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let season = call.int_arg(0)?;
        let race = call.str_arg(1)?.to_string();
        info!("Waiting for {} {} Grand Prix results", season, race);
        world.formula_one_page()?.locate_results().await
    }
    .boxed()
}

fn search_for(world: &mut SportWorld, call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let query = call.str_arg(0)?.to_string();
        world.home_page()?.search(&query).await
    }
    .boxed()
}

fn top_finishers(world: &mut SportWorld, call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let expected = call.count_arg(0)?;
        let drivers = match &call.table {
            Some(table) => drivers_from_table(table)?,
            None => LAS_VEGAS_2023_PODIUM.iter().map(|d| d.to_string()).collect(),
        };

        if drivers.len() != expected {
            return Err(E2eError::AssertionFailed(format!(
                "step names the top {} finishers but lists {}",
                expected,
                drivers.len()
            )));
        }

        let mut page = world.formula_one_page()?;
        let mut missing = Vec::new();
        for driver in &drivers {
            if !page.finisher_present(driver).await? {
                missing.push(driver.as_str());
            }
        }

        if !missing.is_empty() {
            return Err(E2eError::AssertionFailed(format!(
                "Expected to find {} on the page",
                missing.join(", ")
            )));
        }

        info!("Podium confirmed: {}", drivers.join(", "));
        Ok(())
    }
    .boxed()
}

fn at_least_results(world: &mut SportWorld, call: StepCall) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let minimum = call.count_arg(0)?;
        let mut page = world.search_results_page()?;
        let found = page.result_count(minimum).await?;

        if found < minimum {
            let titles = page.result_titles().await.unwrap_or_default();
            let quoted: Vec<&str> = titles
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .take(QUOTED_TITLES)
                .collect();
            return Err(E2eError::AssertionFailed(format!(
                "Expected at least {} results, found {} {:?}",
                minimum, found, quoted
            )));
        }

        info!("Found {} results (minimum {})", found, minimum);
        Ok(())
    }
    .boxed()
}

/// Driver names from a podium table.
///
/// Accepts a header row with a `driver` column, a headerless
/// `| position | driver |` table, or a single column of names.
pub fn drivers_from_table(table: &DataTable) -> E2eResult<Vec<String>> {
    let header = table
        .rows()
        .first()
        .ok_or_else(|| E2eError::DataTable("podium table is empty".to_string()))?;

    if header.iter().any(|h| h.eq_ignore_ascii_case("driver")) {
        return table.column("driver");
    }

    match header.len() {
        1 => Ok(table.rows().iter().map(|row| row[0].clone()).collect()),
        2 => Ok(table
            .rows_hash()?
            .into_iter()
            .map(|(_, driver)| driver)
            .collect()),
        n => Err(E2eError::DataTable(format!(
            "podium table needs a 'driver' column, got {} unnamed columns",
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_registry_builds() {
        let registry = registry().unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_drivers_from_header_table() {
        let t = table(&[
            &["Position", "Driver"],
            &["1", "Max Verstappen"],
            &["2", "George Russell"],
            &["3", "Sergio Perez"],
        ]);
        assert_eq!(drivers_from_table(&t).unwrap(), LAS_VEGAS_2023_PODIUM);
    }

    #[test]
    fn test_drivers_from_rows_hash() {
        let t = table(&[
            &["1", "Max Verstappen"],
            &["2", "George Russell"],
            &["3", "Sergio Perez"],
        ]);
        assert_eq!(drivers_from_table(&t).unwrap(), LAS_VEGAS_2023_PODIUM);
    }

    #[test]
    fn test_drivers_from_single_column() {
        let t = table(&[&["Max Verstappen"], &["George Russell"]]);
        assert_eq!(
            drivers_from_table(&t).unwrap(),
            vec!["Max Verstappen", "George Russell"]
        );
    }

    #[test]
    fn test_drivers_from_wide_table() {
        let t = table(&[&["1", "Max Verstappen", "Red Bull"]]);
        assert!(drivers_from_table(&t).is_err());
    }
}
