//! Moving a list selection onto the single line that satisfies a matcher.
//!
//! Only the lines on the currently rendered page are searched. An item that
//! is scrolled out of view is reported as missing, and a duplicate that is
//! scrolled out of view does not count against uniqueness.

use keypilot_core::{Attempt, KeybindingConfig, Matcher, Result};
use tracing::info;

use crate::assert::Assert;
use crate::keyboard::Keyboard;

/// Outcome of searching the visible page for a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Exactly one line matched, at this index
    Unique(usize),
    /// No line matched
    Absent,
    /// More than one line matched; the matching lines in page order
    Multiple(Vec<String>),
}

impl MatchResult {
    /// Search `lines` for `matcher`.
    pub fn locate<S: AsRef<str>>(lines: &[S], matcher: &Matcher) -> Self {
        let mut found = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| matcher.is_match(line.as_ref()))
            .map(|(index, line)| (index, line.as_ref().to_owned()))
            .collect::<Vec<_>>();
        match found.len() {
            0 => Self::Absent,
            1 => found.pop().map_or(Self::Absent, |(index, _)| Self::Unique(index)),
            _ => Self::Multiple(found.into_iter().map(|(_, line)| line).collect()),
        }
    }

    /// Failure reason for a non-unique result, naming `matcher`.
    pub fn failure_reason(&self, matcher: &Matcher) -> Option<String> {
        match self {
            Self::Unique(_) => None,
            Self::Absent => Some(format!("Could not find item matching: {}", matcher.name())),
            Self::Multiple(lines) => Some(format!(
                "Found {} matches for `{}`, expected only a single match. Lines:\n{}",
                lines.len(),
                matcher.name(),
                lines.join("\n")
            )),
        }
    }
}

/// Which way the selection has to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher indices
    Next,
    /// Towards lower indices
    Previous,
}

/// Presses needed to move the selection from one index to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    /// Which key to press
    pub direction: Direction,
    /// How many times to press it
    pub presses: usize,
}

impl Movement {
    /// Movement from `selected` to `target`, or `None` if they are equal.
    pub const fn between(selected: usize, target: usize) -> Option<Self> {
        if selected < target {
            Some(Self {
                direction: Direction::Next,
                presses: target - selected,
            })
        } else if selected > target {
            Some(Self {
                direction: Direction::Previous,
                presses: selected - target,
            })
        } else {
            None
        }
    }
}

/// Result of a successful navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Selected index when the match was found
    pub from: usize,
    /// Index of the matching line
    pub to: usize,
    /// Number of keys pressed
    pub presses: usize,
}

/// Drives a list selection to a matching line.
#[derive(Clone)]
pub struct ListNavigator {
    keyboard: Keyboard,
    assert: Assert,
    next_key: String,
    prev_key: String,
}

impl ListNavigator {
    /// Navigator pressing `keys`' next/previous item bindings.
    pub fn new(keyboard: Keyboard, assert: Assert, keys: &KeybindingConfig) -> Self {
        Self {
            keyboard,
            assert,
            next_key: keys.universal.next_item.clone(),
            prev_key: keys.universal.prev_item.clone(),
        }
    }

    /// Move the selection onto the only visible line matching `matcher`.
    ///
    /// The selected index and the match index are taken from the same
    /// snapshot, so the number of presses is exact for the frame that was
    /// searched.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::Precondition`] if no list has focus,
    /// or [`keypilot_core::Error::Timeout`] if the match is never unique or
    /// the selection never lands on it.
    pub async fn navigate_to(&self, matcher: &Matcher) -> Result<Navigation> {
        let context = self.assert.require_list_context().await?;
        info!(view = %context.view, matcher = %matcher, "navigating to list item");

        let (from, to) = self
            .assert
            .poll_context(|context| {
                let Some(list) = context.list.as_ref() else {
                    return Attempt::pending(format!(
                        "Expected to be in a list context, but current view is {}",
                        context.describe()
                    ));
                };
                let located = MatchResult::locate(&list.lines, matcher);
                match located {
                    MatchResult::Unique(index) => Attempt::Ready((list.selected, index)),
                    MatchResult::Absent | MatchResult::Multiple(_) => {
                        Attempt::Pending(located.failure_reason(matcher).unwrap_or_default())
                    }
                }
            })
            .await?;

        let presses = match Movement::between(from, to) {
            Some(movement) => {
                let key = match movement.direction {
                    Direction::Next => &self.next_key,
                    Direction::Previous => &self.prev_key,
                };
                for _ in 0..movement.presses {
                    self.keyboard.press(key).await?;
                }
                movement.presses
            }
            None => 0,
        };

        self.assert.selected_line(matcher).await?;
        info!(from, to, presses, "navigated to list item");
        Ok(Navigation { from, to, presses })
    }
}
