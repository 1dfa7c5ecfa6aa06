//! Cucumber expressions
//!
//! Step definitions are bound with Cucumber expressions such as
//! `I search for {string}`. Each expression is compiled once into an
//! anchored regex; matching yields typed arguments.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamType {
    String,
    Int,
    Float,
    Word,
    Anonymous,
}

impl ParamType {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(ParamType::String),
            "int" => Some(ParamType::Int),
            "float" => Some(ParamType::Float),
            "word" => Some(ParamType::Word),
            "" => Some(ParamType::Anonymous),
            _ => None,
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            ParamType::String => r#"("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*')"#,
            ParamType::Int => r"(-?\d+)",
            ParamType::Float => r"(-?(?:\d+\.?\d*|\.\d+))",
            ParamType::Word => r"(\S+)",
            ParamType::Anonymous => r"(.*)",
        }
    }
}

/// A typed argument captured from step text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StepArg {
    Str(String),
    Int(i64),
    Float(f64),
    Word(String),
    Any(String),
}

impl StepArg {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StepArg::Str(s) | StepArg::Word(s) | StepArg::Any(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StepArg::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            StepArg::Float(f) => Some(*f),
            StepArg::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// A compiled Cucumber expression
#[derive(Debug, Clone)]
pub struct StepExpression {
    source: String,
    regex: Regex,
    params: Vec<ParamType>,
}

impl StepExpression {
    pub fn new(source: &str) -> E2eResult<Self> {
        let invalid = |reason: &str| E2eError::InvalidExpression {
            expression: source.to_string(),
            reason: reason.to_string(),
        };

        let mut pattern = String::from("^");
        let mut params = Vec::new();
        // (char, escaped) pairs of the literal word being built
        let mut word: Vec<(char, bool)> = Vec::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| invalid("trailing backslash"))?;
                    word.push((escaped, true));
                }
                '{' => {
                    push_word(&mut pattern, &mut word).map_err(|r| invalid(r))?;
                    let name = read_until(&mut chars, '}').ok_or_else(|| invalid("unclosed '{'"))?;
                    let param = ParamType::from_name(name.trim())
                        .ok_or_else(|| invalid(&format!("unknown parameter type {{{}}}", name)))?;
                    pattern.push_str(param.pattern());
                    params.push(param);
                }
                '(' => {
                    push_word(&mut pattern, &mut word).map_err(|r| invalid(r))?;
                    let optional =
                        read_until(&mut chars, ')').ok_or_else(|| invalid("unclosed '('"))?;
                    if optional.is_empty() {
                        return Err(invalid("empty optional text"));
                    }
                    pattern.push_str(&format!("(?:{})?", regex::escape(&optional)));
                }
                c if c.is_whitespace() => {
                    push_word(&mut pattern, &mut word).map_err(|r| invalid(r))?;
                    pattern.push_str(&regex::escape(&c.to_string()));
                }
                c => word.push((c, false)),
            }
        }
        push_word(&mut pattern, &mut word).map_err(|r| invalid(r))?;
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            regex,
            params,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match step text, returning the captured arguments in order.
    pub fn matches(&self, text: &str) -> Option<Vec<StepArg>> {
        let captures = self.regex.captures(text)?;
        let mut args = Vec::with_capacity(self.params.len());

        for (i, param) in self.params.iter().enumerate() {
            let raw = captures.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
            let arg = match param {
                ParamType::String => StepArg::Str(unquote(raw)),
                ParamType::Int => StepArg::Int(raw.parse().ok()?),
                ParamType::Float => StepArg::Float(raw.parse().ok()?),
                ParamType::Word => StepArg::Word(raw.to_string()),
                ParamType::Anonymous => StepArg::Any(raw.to_string()),
            };
            args.push(arg);
        }

        Some(args)
    }
}

impl fmt::Display for StepExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn read_until(chars: &mut std::str::Chars<'_>, close: char) -> Option<String> {
    let mut out = String::new();
    for c in chars.by_ref() {
        if c == close {
            return Some(out);
        }
        out.push(c);
    }
    None
}

/// Flush a literal word, turning unescaped `/` into alternation.
fn push_word(pattern: &mut String, word: &mut Vec<(char, bool)>) -> Result<(), &'static str> {
    if word.is_empty() {
        return Ok(());
    }

    let mut alternatives = vec![String::new()];
    for (c, escaped) in word.drain(..) {
        if c == '/' && !escaped {
            alternatives.push(String::new());
        } else if let Some(last) = alternatives.last_mut() {
            last.push(c);
        }
    }

    if alternatives.len() == 1 {
        pattern.push_str(&regex::escape(&alternatives[0]));
        return Ok(());
    }

    if alternatives.iter().any(String::is_empty) {
        return Err("empty alternative");
    }

    let escaped: Vec<String> = alternatives.iter().map(|a| regex::escape(a)).collect();
    pattern.push_str(&format!("(?:{})", escaped.join("|")));
    Ok(())
}

fn unquote(raw: &str) -> String {
    let quote = raw.chars().next().unwrap_or('"');
    let inner = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default();
    inner.replace(&format!("\\{}", quote), &quote.to_string())
}
