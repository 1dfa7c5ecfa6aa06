//! Step registry
//!
//! Binds Cucumber expressions to async handlers over a world type `W`.

use futures::future::BoxFuture;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::expression::{StepArg, StepExpression};
use crate::gherkin::{DataTable, Step, StepKind};

/// Handler signature. Plain `fn` items keep the registry `Send + Sync`
/// without boxing closures.
pub type StepFn<W> = for<'a> fn(&'a mut W, StepCall) -> BoxFuture<'a, E2eResult<()>>;

/// Everything a handler receives about the step being executed
#[derive(Debug, Clone)]
pub struct StepCall {
    pub text: String,
    pub args: Vec<StepArg>,
    pub table: Option<DataTable>,
    pub doc_string: Option<String>,
}

impl StepCall {
    fn arg(&self, index: usize) -> E2eResult<&StepArg> {
        self.args.get(index).ok_or_else(|| E2eError::StepArgument {
            index,
            reason: format!("step only captured {} argument(s)", self.args.len()),
        })
    }

    pub fn str_arg(&self, index: usize) -> E2eResult<&str> {
        let arg = self.arg(index)?;
        arg.as_str().ok_or_else(|| E2eError::StepArgument {
            index,
            reason: format!("expected text, got {:?}", arg),
        })
    }

    pub fn int_arg(&self, index: usize) -> E2eResult<i64> {
        let arg = self.arg(index)?;
        arg.as_int().ok_or_else(|| E2eError::StepArgument {
            index,
            reason: format!("expected an integer, got {:?}", arg),
        })
    }

    /// Non-negative integer argument, for counts.
    pub fn count_arg(&self, index: usize) -> E2eResult<usize> {
        let n = self.int_arg(index)?;
        usize::try_from(n).map_err(|_| E2eError::StepArgument {
            index,
            reason: format!("expected a non-negative count, got {}", n),
        })
    }

    pub fn table(&self) -> E2eResult<&DataTable> {
        self.table
            .as_ref()
            .ok_or_else(|| E2eError::DataTable(format!("step '{}' has no data table", self.text)))
    }
}

struct StepDefinition<W> {
    kind: StepKind,
    expression: StepExpression,
    handler: StepFn<W>,
}

/// A resolved step, ready to run
pub struct MatchedStep<W> {
    pub expression: String,
    pub call: StepCall,
    handler: StepFn<W>,
}

impl<W> MatchedStep<W> {
    pub fn run<'a>(self, world: &'a mut W) -> BoxFuture<'a, E2eResult<()>> {
        (self.handler)(world, self.call)
    }
}

pub struct StepRegistry<W> {
    definitions: Vec<StepDefinition<W>>,
}

impl<W> Default for StepRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StepRegistry<W> {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn given(self, expression: &str, handler: StepFn<W>) -> E2eResult<Self> {
        self.register(StepKind::Given, expression, handler)
    }

    pub fn when(self, expression: &str, handler: StepFn<W>) -> E2eResult<Self> {
        self.register(StepKind::When, expression, handler)
    }

    pub fn then(self, expression: &str, handler: StepFn<W>) -> E2eResult<Self> {
        self.register(StepKind::Then, expression, handler)
    }

    pub fn register(
        mut self,
        kind: StepKind,
        expression: &str,
        handler: StepFn<W>,
    ) -> E2eResult<Self> {
        if self
            .definitions
            .iter()
            .any(|d| d.kind == kind && d.expression.source() == expression)
        {
            return Err(E2eError::DuplicateStep(format!("{} {}", kind, expression)));
        }

        self.definitions.push(StepDefinition {
            kind,
            expression: StepExpression::new(expression)?,
            handler,
        });
        Ok(self)
    }

    /// Resolve `step` to exactly one definition.
    ///
    /// Definitions of the step's own kind win; if none of them match, the
    /// other kinds are tried, since Gherkin keywords are not semantic.
    pub fn find(&self, step: &Step) -> E2eResult<MatchedStep<W>> {
        let same_kind = self.matching(step, |d| d.kind == step.kind);
        let candidates = if same_kind.is_empty() {
            self.matching(step, |d| d.kind != step.kind)
        } else {
            same_kind
        };

        match candidates.len() {
            0 => Err(E2eError::UndefinedStep(format!("{} {}", step.keyword, step.text))),
            1 => {
                let (definition, args) = candidates.into_iter().next().ok_or_else(|| {
                    E2eError::UndefinedStep(format!("{} {}", step.keyword, step.text))
                })?;
                debug!("'{}' matched '{}'", step.text, definition.expression);
                Ok(MatchedStep {
                    expression: definition.expression.source().to_string(),
                    call: StepCall {
                        text: step.text.clone(),
                        args,
                        table: step.table.clone(),
                        doc_string: step.doc_string.clone(),
                    },
                    handler: definition.handler,
                })
            }
            _ => Err(E2eError::AmbiguousStep {
                step: step.text.clone(),
                candidates: candidates
                    .iter()
                    .map(|(d, _)| format!("{} {}", d.kind, d.expression))
                    .collect(),
            }),
        }
    }

    fn matching<F>(&self, step: &Step, filter: F) -> Vec<(&StepDefinition<W>, Vec<StepArg>)>
    where
        F: Fn(&StepDefinition<W>) -> bool,
    {
        self.definitions
            .iter()
            .filter(|d| filter(*d))
            .filter_map(|d| d.expression.matches(&step.text).map(|args| (d, args)))
            .collect()
    }
}
