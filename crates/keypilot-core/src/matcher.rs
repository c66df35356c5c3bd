//! Named line predicates.
//!
//! A [`Matcher`] is a plain value carrying a predicate and a description. The
//! description is what shows up in failure diagnostics, so constructors spell
//! out the match intent (`contains 'commit 02'`) rather than a type name.

use core::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};

/// Outcome of testing one line against a [`Matcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Whether the line satisfied the predicate
    pub matched: bool,
    /// Extra information: the explanation on a miss, or extracted text on a hit
    pub detail: Option<String>,
}

impl MatchOutcome {
    /// A successful match with no extra detail.
    pub const fn hit() -> Self {
        Self {
            matched: true,
            detail: None,
        }
    }

    /// A successful match carrying extracted text.
    pub fn hit_with(detail: impl Into<String>) -> Self {
        Self {
            matched: true,
            detail: Some(detail.into()),
        }
    }

    /// A failed match with an explanation.
    pub fn miss(detail: impl Into<String>) -> Self {
        Self {
            matched: false,
            detail: Some(detail.into()),
        }
    }
}

type Predicate = dyn Fn(&str) -> MatchOutcome + Send + Sync;

/// A named, pure predicate over a single line of rendered text.
///
/// Evaluating a matcher must not have side effects: the poll loop calls it
/// any number of times per attempt.
#[derive(Clone)]
pub struct Matcher {
    name: String,
    predicate: Arc<Predicate>,
}

impl Matcher {
    /// Build a matcher from a description and a predicate.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> MatchOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// The description used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Test a line.
    pub fn test(&self, line: &str) -> MatchOutcome {
        (self.predicate)(line)
    }

    /// Test a line, discarding the detail.
    pub fn is_match(&self, line: &str) -> bool {
        self.test(line).matched
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Matcher")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.name)
    }
}

/// Matches lines containing `target` as a substring.
pub fn contains(target: impl Into<String>) -> Matcher {
    let target = target.into();
    Matcher::new(format!("contains '{target}'"), move |line| {
        if line.contains(target.as_str()) {
            MatchOutcome::hit()
        } else {
            MatchOutcome::miss(format!("Expected '{target}' to be found in '{line}'"))
        }
    })
}

/// Matches lines that do not contain `target`.
pub fn not_contains(target: impl Into<String>) -> Matcher {
    let target = target.into();
    Matcher::new(format!("does not contain '{target}'"), move |line| {
        if line.contains(target.as_str()) {
            MatchOutcome::miss(format!("Expected '{target}' to NOT be found in '{line}'"))
        } else {
            MatchOutcome::hit()
        }
    })
}

/// Matches lines equal to `target`.
pub fn equals(target: impl Into<String>) -> Matcher {
    let target = target.into();
    Matcher::new(format!("equals '{target}'"), move |line| {
        if line == target {
            MatchOutcome::hit()
        } else {
            MatchOutcome::miss(format!("Expected '{target}' to equal '{line}'"))
        }
    })
}

/// Matches lines in which `pattern` finds a match. The matched text is
/// returned as the outcome's detail.
///
/// # Errors
/// Returns [`Error::Config`] if `pattern` is not a valid regular expression.
pub fn matches_regex(pattern: &str) -> Result<Matcher> {
    let regex = Regex::new(pattern)
        .map_err(|err| Error::Config(format!("Invalid matcher regex '{pattern}': {err}")))?;
    Ok(Matcher::new(
        format!("matches regex '{pattern}'"),
        move |line| {
            regex.find(line).map_or_else(
                || MatchOutcome::miss(format!("Expected '{line}' to match regex '{regex}'")),
                |found| MatchOutcome::hit_with(found.as_str()),
            )
        },
    ))
}

/// Matches lines satisfying at least one of `matchers`.
pub fn any_of(matchers: Vec<Matcher>) -> Matcher {
    let names = matchers
        .iter()
        .map(Matcher::name)
        .collect::<Vec<_>>()
        .join(" or ");
    let description = format!("any of ({names})");
    let miss_description = description.clone();
    Matcher::new(description, move |line| {
        matchers
            .iter()
            .map(|matcher| matcher.test(line))
            .find(|outcome| outcome.matched)
            .unwrap_or_else(|| {
                MatchOutcome::miss(format!("Expected '{line}' to match {miss_description}"))
            })
    })
}
