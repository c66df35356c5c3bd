//! Point-in-time views of the application's focused region.

use core::fmt;

/// What kind of region currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// One of the side panels (files, branches, commits, ...)
    SideList,
    /// A popup menu of options
    Menu,
    /// The suggestions list attached to a prompt
    Suggestions,
    /// A yes/no confirmation popup
    Confirmation,
    /// A single-line text prompt
    Prompt,
    /// A dismissable message popup
    Alert,
    /// A region with no selectable lines
    Other,
}

impl ContextKind {
    /// Whether the region renders an ordered, indexable sequence of selectable lines.
    pub const fn is_list(self) -> bool {
        matches!(self, Self::SideList | Self::Menu | Self::Suggestions)
    }

    /// Lowercase label used in diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            Self::SideList => "list",
            Self::Menu => "menu",
            Self::Suggestions => "suggestions",
            Self::Confirmation => "confirmation",
            Self::Prompt => "prompt",
            Self::Alert => "alert",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Visible lines of a list view together with the selected index.
///
/// Both fields come from the same render. Two snapshots taken at different
/// times are never assumed consistent with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Lines on the visible page, top to bottom
    pub lines: Vec<String>,
    /// Index of the selected line within `lines`
    pub selected: usize,
}

impl ListSnapshot {
    /// Create a snapshot.
    pub fn new<I, S>(lines: I, selected: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            selected,
        }
    }

    /// The selected line, if the index falls on the visible page.
    pub fn selected_line(&self) -> Option<&str> {
        self.lines.get(self.selected).map(String::as_str)
    }
}

/// A single consistent read of the focused region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    /// View name of the focused region (e.g. `commits`, `menu`)
    pub view: String,
    /// Window the view is displayed in (side panels share windows with their tabs)
    pub window: String,
    /// Kind of region
    pub kind: ContextKind,
    /// Title drawn on the view's frame
    pub title: String,
    /// Full text content of the view
    pub content: String,
    /// Visible lines and selection, present only for list-shaped regions
    pub list: Option<ListSnapshot>,
}

impl ContextSnapshot {
    /// Short `view (kind)` label for diagnostics.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.view, self.kind)
    }
}
