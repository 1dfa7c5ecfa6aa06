//! Gherkin feature files
//!
//! Parses the subset of Gherkin the suite's `.feature` files use: features,
//! tags, backgrounds, scenarios, scenario outlines with example tables,
//! data tables and doc strings. Background steps are folded into every
//! scenario and outlines are expanded at parse time, so the runner only
//! ever sees flat, linear scenarios.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// A parsed `.feature` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,

    /// Free text between the `Feature:` line and the first block
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Background steps, already prepended to each scenario below
    #[serde(default)]
    pub background: Vec<Step>,

    pub scenarios: Vec<Scenario>,

    pub path: PathBuf,
}

/// A single linear scenario (outline rows are expanded into these)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    /// Own tags plus the feature's tags
    #[serde(default)]
    pub tags: Vec<String>,

    pub steps: Vec<Step>,

    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Keyword as written (`Given`, `And`, `*`, ...)
    pub keyword: String,

    /// Resolved kind; `And`/`But`/`*` take the kind of the previous step
    pub kind: StepKind,

    pub text: String,

    #[serde(default)]
    pub table: Option<DataTable>,

    #[serde(default)]
    pub doc_string: Option<String>,

    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Given,
    When,
    Then,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Given => write!(f, "Given"),
            StepKind::When => write!(f, "When"),
            StepKind::Then => write!(f, "Then"),
        }
    }
}

/// A `|`-delimited table attached to a step or an Examples block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Two-column table read as ordered key/value pairs.
    pub fn rows_hash(&self) -> E2eResult<Vec<(String, String)>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [key, value] => Ok((key.clone(), value.clone())),
                other => Err(E2eError::DataTable(format!(
                    "rows_hash needs exactly 2 columns, found {}",
                    other.len()
                ))),
            })
            .collect()
    }

    /// First row as header, remaining rows keyed by it.
    pub fn hashes(&self) -> E2eResult<Vec<HashMap<String, String>>> {
        let (header, body) = self
            .rows
            .split_first()
            .ok_or_else(|| E2eError::DataTable("table is empty".to_string()))?;

        body.iter()
            .map(|row| {
                if row.len() != header.len() {
                    return Err(E2eError::DataTable(format!(
                        "row has {} cells but header has {}",
                        row.len(),
                        header.len()
                    )));
                }
                Ok(header.iter().cloned().zip(row.iter().cloned()).collect())
            })
            .collect()
    }

    /// Values of the named header column (case-insensitive), excluding the header.
    pub fn column(&self, name: &str) -> E2eResult<Vec<String>> {
        let header = self
            .rows
            .first()
            .ok_or_else(|| E2eError::DataTable("table is empty".to_string()))?;
        let index = header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| E2eError::DataTable(format!("no column named '{}'", name)))?;

        self.rows[1..]
            .iter()
            .map(|row| {
                row.get(index).cloned().ok_or_else(|| {
                    E2eError::DataTable(format!("row is missing column '{}'", name))
                })
            })
            .collect()
    }

    fn substitute(&self, values: &HashMap<&str, &str>) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|c| substitute(c, values)).collect())
                .collect(),
        }
    }
}

impl Feature {
    /// Parse a feature from source text. `path` is only used for error messages.
    pub fn parse(source: &str, path: &Path) -> E2eResult<Self> {
        Parser::new(path).parse(source)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Load every `.feature` file under `dir`, in path order.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut features = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "feature")
                    .unwrap_or(false)
            })
        {
            features.push(Self::from_file(entry.path())?);
        }

        Ok(features)
    }
}

const STEP_KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

struct ScenarioDraft {
    name: String,
    tags: Vec<String>,
    line: usize,
    steps: Vec<Step>,
    outline: bool,
    examples: Vec<ExamplesDraft>,
}

struct ExamplesDraft {
    tags: Vec<String>,
    line: usize,
    table: DataTable,
}

enum Block {
    Description,
    Background,
    Scenario(ScenarioDraft),
}

struct DocString {
    indent: usize,
    fence: &'static str,
    lines: Vec<String>,
}

struct Parser<'a> {
    path: &'a Path,
    name: Option<String>,
    description: Vec<String>,
    tags: Vec<String>,
    background: Vec<Step>,
    scenarios: Vec<Scenario>,
    pending_tags: Vec<String>,
    block: Block,
    last_kind: Option<StepKind>,
    doc: Option<DocString>,
}

impl<'a> Parser<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            name: None,
            description: Vec::new(),
            tags: Vec::new(),
            background: Vec::new(),
            scenarios: Vec::new(),
            pending_tags: Vec::new(),
            block: Block::Description,
            last_kind: None,
            doc: None,
        }
    }

    fn error(&self, line: usize, reason: impl Into<String>) -> E2eError {
        E2eError::FeatureParse {
            path: self.path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    fn parse(mut self, source: &str) -> E2eResult<Feature> {
        for (index, raw) in source.lines().enumerate() {
            self.line(index + 1, raw)?;
        }

        if self.doc.is_some() {
            return Err(self.error(source.lines().count(), "unterminated doc string"));
        }

        self.finish_block()?;

        let name = self
            .name
            .ok_or_else(|| E2eError::FeatureParse {
                path: self.path.to_path_buf(),
                line: 1,
                reason: "no 'Feature:' line".to_string(),
            })?;

        Ok(Feature {
            name,
            description: self.description.join("\n"),
            tags: self.tags,
            background: self.background,
            scenarios: self.scenarios,
            path: self.path.to_path_buf(),
        })
    }

    fn line(&mut self, number: usize, raw: &str) -> E2eResult<()> {
        let trimmed = raw.trim();

        if let Some(doc) = self.doc.as_mut() {
            if trimmed == doc.fence {
                let text = std::mem::take(&mut doc.lines).join("\n");
                self.doc = None;
                let path = self.path;
                let step = self
                    .current_steps()
                    .and_then(|steps| steps.last_mut())
                    .ok_or_else(|| E2eError::FeatureParse {
                        path: path.to_path_buf(),
                        line: number,
                        reason: "doc string without a step".to_string(),
                    })?;
                step.doc_string = Some(text);
            } else {
                // Byte offset past the fence's indentation
                let strip = raw
                    .char_indices()
                    .take_while(|(i, c)| *i < doc.indent && c.is_whitespace())
                    .last()
                    .map(|(i, c)| i + c.len_utf8())
                    .unwrap_or(0);
                doc.lines.push(raw[strip..].to_string());
            }
            return Ok(());
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        if trimmed.starts_with('@') {
            for tag in trimmed.split_whitespace() {
                if tag.starts_with('#') {
                    break;
                }
                self.pending_tags.push(tag.to_string());
            }
            return Ok(());
        }

        if trimmed.starts_with("\"\"\"") || trimmed.starts_with("```") {
            let fence = if trimmed.starts_with("```") { "```" } else { "\"\"\"" };
            let indent = raw.len() - raw.trim_start().len();
            self.doc = Some(DocString {
                indent,
                fence,
                lines: Vec::new(),
            });
            return Ok(());
        }

        if trimmed.starts_with('|') {
            let row = parse_row(trimmed).map_err(|reason| self.error(number, reason))?;
            return self.table_row(number, row);
        }

        if let Some(rest) = trimmed.strip_prefix("Feature:") {
            if self.name.is_some() {
                return Err(self.error(number, "only one Feature per file"));
            }
            self.name = Some(rest.trim().to_string());
            self.tags = std::mem::take(&mut self.pending_tags);
            return Ok(());
        }

        if self.name.is_none() {
            return Err(self.error(number, "expected 'Feature:' first"));
        }

        if trimmed.starts_with("Background:") {
            self.finish_block()?;
            if !self.background.is_empty() || !self.scenarios.is_empty() {
                return Err(self.error(number, "Background must come before any scenario"));
            }
            self.block = Block::Background;
            self.last_kind = None;
            return Ok(());
        }

        for (prefix, outline) in [
            ("Scenario Outline:", true),
            ("Scenario Template:", true),
            ("Scenario:", false),
            ("Example:", false),
        ] {
            if let Some(rest) = trimmed.strip_prefix(prefix) {
                self.finish_block()?;
                self.block = Block::Scenario(ScenarioDraft {
                    name: rest.trim().to_string(),
                    tags: std::mem::take(&mut self.pending_tags),
                    line: number,
                    steps: Vec::new(),
                    outline,
                    examples: Vec::new(),
                });
                self.last_kind = None;
                return Ok(());
            }
        }

        if trimmed.starts_with("Examples:") || trimmed.starts_with("Scenarios:") {
            let tags = std::mem::take(&mut self.pending_tags);
            if let Block::Scenario(draft) = &mut self.block {
                if draft.outline {
                    draft.examples.push(ExamplesDraft {
                        tags,
                        line: number,
                        table: DataTable::default(),
                    });
                    return Ok(());
                }
            }
            return Err(self.error(number, "Examples outside a Scenario Outline"));
        }

        if let Some((keyword, text)) = split_step(trimmed) {
            return self.step(number, keyword, text);
        }

        match &self.block {
            Block::Description => {
                self.description.push(trimmed.to_string());
                Ok(())
            }
            // Free text under a scenario header, before its first step
            Block::Scenario(draft) if draft.steps.is_empty() => Ok(()),
            Block::Background if self.background.is_empty() => Ok(()),
            _ => Err(self.error(number, format!("unexpected line: {}", trimmed))),
        }
    }

    fn step(&mut self, number: usize, keyword: &str, text: &str) -> E2eResult<()> {
        let kind = match keyword {
            "Given" => StepKind::Given,
            "When" => StepKind::When,
            "Then" => StepKind::Then,
            _ => self.last_kind.ok_or_else(|| {
                self.error(number, format!("'{}' cannot start a scenario", keyword))
            })?,
        };

        if let Block::Scenario(draft) = &self.block {
            if !draft.examples.is_empty() {
                return Err(self.error(number, "steps after Examples"));
            }
        }

        let step = Step {
            keyword: keyword.to_string(),
            kind,
            text: text.to_string(),
            table: None,
            doc_string: None,
            line: number,
        };

        let path = self.path;
        let steps = self
            .current_steps()
            .ok_or_else(|| E2eError::FeatureParse {
                path: path.to_path_buf(),
                line: number,
                reason: "step outside a Scenario or Background".to_string(),
            })?;
        steps.push(step);
        self.last_kind = Some(kind);
        Ok(())
    }

    fn table_row(&mut self, number: usize, row: Vec<String>) -> E2eResult<()> {
        let path = self.path;

        if let Block::Scenario(draft) = &mut self.block {
            if let Some(examples) = draft.examples.last_mut() {
                return push_row(&mut examples.table, row, path, number);
            }
        }

        let step = self
            .current_steps()
            .and_then(|steps| steps.last_mut())
            .ok_or_else(|| E2eError::FeatureParse {
                path: path.to_path_buf(),
                line: number,
                reason: "table row without a step".to_string(),
            })?;

        let table = step.table.get_or_insert_with(DataTable::default);
        push_row(table, row, path, number)
    }

    fn current_steps(&mut self) -> Option<&mut Vec<Step>> {
        match &mut self.block {
            Block::Description => None,
            Block::Background => Some(&mut self.background),
            Block::Scenario(draft) => Some(&mut draft.steps),
        }
    }

    fn finish_block(&mut self) -> E2eResult<()> {
        let block = std::mem::replace(&mut self.block, Block::Description);
        let Block::Scenario(draft) = block else {
            return Ok(());
        };

        let mut tags = draft.tags.clone();
        for tag in &self.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }

        let with_background = |steps: Vec<Step>| -> Vec<Step> {
            self.background.iter().cloned().chain(steps).collect()
        };

        if !draft.outline {
            let steps = with_background(draft.steps);
            self.scenarios.push(Scenario {
                name: draft.name,
                tags,
                steps,
                line: draft.line,
            });
            return Ok(());
        }

        if draft.examples.is_empty() {
            return Err(self.error(draft.line, "Scenario Outline without Examples"));
        }

        let mut expanded = Vec::new();
        let mut n = 0;
        for examples in &draft.examples {
            let Some((header, rows)) = examples.table.rows.split_first() else {
                return Err(self.error(examples.line, "Examples table is empty"));
            };

            let mut example_tags = tags.clone();
            example_tags.extend(examples.tags.iter().cloned());

            for row in rows {
                n += 1;
                let values: HashMap<&str, &str> = header
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(String::as_str))
                    .collect();

                let steps = draft
                    .steps
                    .iter()
                    .map(|step| Step {
                        text: substitute(&step.text, &values),
                        table: step.table.as_ref().map(|t| t.substitute(&values)),
                        doc_string: step.doc_string.as_ref().map(|d| substitute(d, &values)),
                        ..step.clone()
                    })
                    .collect();

                expanded.push(Scenario {
                    name: format!("{} (example {})", draft.name, n),
                    tags: example_tags.clone(),
                    steps: with_background(steps),
                    line: draft.line,
                });
            }
        }

        self.scenarios.extend(expanded);
        Ok(())
    }
}

fn split_step(line: &str) -> Option<(&'static str, &str)> {
    STEP_KEYWORDS.iter().find_map(|keyword| {
        let rest = line.strip_prefix(keyword)?;
        if rest.starts_with(' ') || rest.is_empty() {
            Some((*keyword, rest.trim()))
        } else {
            None
        }
    })
}

/// Split `| a | b\|c |` into trimmed cells, honoring `\|`, `\\` and `\n`.
fn parse_row(line: &str) -> Result<Vec<String>, String> {
    if !line.ends_with('|') || line.len() < 2 {
        return Err("table row must end with '|'".to_string());
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line[1..].chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('n') => cell.push('\n'),
                Some('\\') => cell.push('\\'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            other => cell.push(other),
        }
    }

    Ok(cells)
}

/// Append `row` to `table`, rejecting rows whose width differs from the first.
fn push_row(table: &mut DataTable, row: Vec<String>, path: &Path, line: usize) -> E2eResult<()> {
    let expected = table.rows.first().map(Vec::len).unwrap_or(row.len());
    if expected != row.len() {
        return Err(E2eError::FeatureParse {
            path: path.to_path_buf(),
            line,
            reason: format!("table row has {} cells, expected {}", row.len(), expected),
        });
    }
    table.rows.push(row);
    Ok(())
}

/// Replace `<name>` placeholders in one left-to-right pass. Substituted
/// values are never rescanned; unknown placeholders are left as written.
fn substitute(text: &str, values: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('>').and_then(|close| {
            values
                .get(&after[..close])
                .map(|value| (close, *value))
        }) {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('<');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> E2eResult<Feature> {
        Feature::parse(source, Path::new("test.feature"))
    }

    #[test]
    fn test_parse_podium_feature() {
        let source = r#"
@f1
Feature: Formula 1 results
  Checks race results on BBC Sport

  Scenario: Las Vegas podium
    Given I navigate to the BBC Sport Formula 1 page
    When I locate the 2023 Las Vegas Grand Prix results table
    Then I should see the top 3 finishers as:
      | position | driver         |
      | 1        | Max Verstappen |
      | 2        | George Russell |
      | 3        | Sergio Perez   |
"#;
        let feature = parse(source).unwrap();
        assert_eq!(feature.name, "Formula 1 results");
        assert_eq!(feature.description, "Checks race results on BBC Sport");
        assert_eq!(feature.scenarios.len(), 1);

        let scenario = &feature.scenarios[0];
        assert_eq!(scenario.tags, vec!["@f1"]);
        assert_eq!(scenario.steps.len(), 3);
        assert_eq!(scenario.steps[2].kind, StepKind::Then);

        let table = scenario.steps[2].table.as_ref().unwrap();
        assert_eq!(
            table.column("driver").unwrap(),
            vec!["Max Verstappen", "George Russell", "Sergio Perez"]
        );
    }

    #[test]
    fn test_and_inherits_previous_kind() {
        let source = r#"
Feature: Search
  Scenario: two whens
    Given I navigate to the BBC Sport homepage
    When I search for "Sport in 2023"
    And I search for "Formula 1"
    But I search for "Cricket"
    Then I should see at least 1 relevant results
"#;
        let feature = parse(source).unwrap();
        let kinds: Vec<StepKind> = feature.scenarios[0].steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Given,
                StepKind::When,
                StepKind::When,
                StepKind::When,
                StepKind::Then
            ]
        );
        assert_eq!(feature.scenarios[0].steps[2].keyword, "And");
    }

    #[test]
    fn test_and_cannot_start_scenario() {
        let source = "Feature: x\n  Scenario: y\n    And something\n";
        let err = parse(source).unwrap_err();
        assert!(matches!(err, E2eError::FeatureParse { line: 3, .. }), "{err}");
    }

    #[test]
    fn test_background_prepended_to_each_scenario() {
        let source = r#"
Feature: Search
  Background:
    Given I navigate to the BBC Sport homepage

  Scenario: one
    When I search for "a"

  Scenario: two
    When I search for "b"
"#;
        let feature = parse(source).unwrap();
        assert_eq!(feature.background.len(), 1);
        for scenario in &feature.scenarios {
            assert_eq!(scenario.steps.len(), 2);
            assert_eq!(scenario.steps[0].text, "I navigate to the BBC Sport homepage");
        }
    }

    #[test]
    fn test_outline_expands_examples() {
        let source = r#"
@search
Feature: Search
  Scenario Outline: search for <term>
    Given I navigate to the BBC Sport homepage
    When I search for "<term>"
    Then I should see at least <min> relevant results

    @smoke
    Examples:
      | term          | min |
      | Sport in 2023 | 5   |
      | Formula 1     | 3   |
"#;
        let feature = parse(source).unwrap();
        assert_eq!(feature.scenarios.len(), 2);
        assert_eq!(feature.scenarios[0].name, "search for <term> (example 1)");
        assert_eq!(feature.scenarios[1].steps[1].text, r#"I search for "Formula 1""#);
        assert_eq!(
            feature.scenarios[1].steps[2].text,
            "I should see at least 3 relevant results"
        );
        assert!(feature.scenarios[0].tags.contains(&"@smoke".to_string()));
        assert!(feature.scenarios[0].tags.contains(&"@search".to_string()));
    }

    #[test]
    fn test_outline_without_examples_is_error() {
        let source = "Feature: x\n  Scenario Outline: y\n    Given a <b>\n";
        assert!(parse(source).is_err());
    }

    #[test]
    fn test_doc_string_and_comments() {
        let source = r#"
# leading comment
Feature: Docs
  Scenario: doc
    Given a note
      """
      first line
        indented
      """
    # trailing comment
"#;
        let feature = parse(source).unwrap();
        let doc = feature.scenarios[0].steps[0].doc_string.as_deref().unwrap();
        assert_eq!(doc, "first line\n  indented");
    }

    #[test]
    fn test_table_escapes() {
        let row = parse_row(r"| a\|b | c\\d | e |").unwrap();
        assert_eq!(row, vec!["a|b", r"c\d", "e"]);
    }

    #[test]
    fn test_ragged_table_is_error() {
        let source = "Feature: x\n  Scenario: y\n    Given t\n      | a | b |\n      | c |\n";
        let err = parse(source).unwrap_err();
        assert!(matches!(err, E2eError::FeatureParse { line: 5, .. }), "{err}");
    }

    #[test]
    fn test_ragged_examples_row_is_error() {
        let source = r#"
Feature: Search
  Scenario Outline: search
    When I search for "<term>"
    Then I should see at least <min> relevant results

    Examples:
      | term | min |
      | a    |
"#;
        let err = parse(source).unwrap_err();
        assert!(matches!(err, E2eError::FeatureParse { line: 9, .. }), "{err}");
    }

    #[test]
    fn test_doc_string_with_wide_leading_space() {
        let source = "Feature: Docs\n  Scenario: doc\n    Given a note\n    \"\"\"\n\u{3000}wide\n    \u{00A0}nbsp\n    \"\"\"\n";
        let feature = parse(source).unwrap();
        let doc = feature.scenarios[0].steps[0].doc_string.as_deref().unwrap();
        assert_eq!(doc, "wide\n\u{00A0}nbsp");
    }

    #[test]
    fn test_substitute_does_not_rescan_values() {
        let values: HashMap<&str, &str> = [("a", "<b>"), ("b", "x")].into_iter().collect();
        assert_eq!(substitute("<a> and <b>", &values), "<b> and x");
        assert_eq!(substitute("a < b <c> <b", &values), "a < b <c> <b");
        assert_eq!(substitute("<<b>>", &values), "<x>");
    }

    #[test]
    fn test_missing_feature_line() {
        assert!(parse("Scenario: nope\n").is_err());
    }

    #[test]
    fn test_rows_hash() {
        let table = DataTable::new(vec![
            vec!["1".into(), "Max Verstappen".into()],
            vec!["2".into(), "George Russell".into()],
        ]);
        let pairs = table.rows_hash().unwrap();
        assert_eq!(pairs[1], ("2".to_string(), "George Russell".to_string()));

        let wide = DataTable::new(vec![vec!["a".into(), "b".into(), "c".into()]]);
        assert!(wide.rows_hash().is_err());
    }

    #[test]
    fn test_hashes() {
        let table = DataTable::new(vec![
            vec!["position".into(), "driver".into()],
            vec!["1".into(), "Max Verstappen".into()],
        ]);
        let hashes = table.hashes().unwrap();
        assert_eq!(hashes[0]["driver"], "Max Verstappen");
    }

    #[test]
    fn test_load_all_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(
            dir.path().join("b.feature"),
            "Feature: B\n  Scenario: s\n    Given x\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("nested/a.feature"),
            "Feature: A\n  Scenario: s\n    Given x\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let features = Feature::load_all(dir.path()).unwrap();
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
