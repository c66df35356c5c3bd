//! Keybinding table mapping symbolic actions to literal key strings.
//!
//! Key strings follow the `<name>` convention for special keys (`<enter>`,
//! `<esc>`, `<down>`, `<c-a>`) and bare characters for printable keys.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Keys bound to a symbolic action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// A single key
    Single(String),
    /// An ordered family of keys (e.g. one per side window)
    Sequence(Vec<String>),
}

impl KeyBinding {
    /// All keys in order.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Single(key) => vec![key.as_str()],
            Self::Sequence(keys) => keys.iter().map(String::as_str).collect(),
        }
    }

    /// The key at `index` in the binding.
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.keys().get(index).copied()
    }
}

/// Complete keybinding table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeybindingConfig {
    /// Bindings active in every view
    pub universal: UniversalKeys,
    /// Bindings for the commits view
    pub commits: CommitKeys,
    /// Bindings for the branches view
    pub branches: BranchKeys,
}

/// Bindings active in every view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UniversalKeys {
    /// Confirm a popup or submit a prompt
    pub confirm: String,
    /// Close a popup or leave the current context
    #[serde(rename = "return")]
    pub return_key: String,
    /// Primary action on the selected item
    pub select: String,
    /// Move selection down one line
    pub next_item: String,
    /// Move selection up one line
    pub prev_item: String,
    /// Focus a side window directly, one key per window
    pub jump_to_block: Vec<String>,
    /// Switch between a prompt and its suggestions
    pub toggle_panel: String,
    /// Open the merge/rebase options menu
    pub create_rebase_options_menu: String,
    /// Edit the selected item
    pub edit: String,
    /// Remove the selected item
    pub remove: String,
    /// Create a new item
    pub new: String,
}

impl Default for UniversalKeys {
    fn default() -> Self {
        Self {
            confirm: "<enter>".to_owned(),
            return_key: "<esc>".to_owned(),
            select: "<space>".to_owned(),
            next_item: "<down>".to_owned(),
            prev_item: "<up>".to_owned(),
            jump_to_block: ["1", "2", "3", "4", "5"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            toggle_panel: "<tab>".to_owned(),
            create_rebase_options_menu: "m".to_owned(),
            edit: "e".to_owned(),
            remove: "d".to_owned(),
            new: "n".to_owned(),
        }
    }
}

/// Bindings for the commits view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommitKeys {
    /// Mark the selected rebase entry as a fixup
    pub mark_commit_as_fixup: String,
    /// Mark the selected rebase entry as a squash
    pub squash_down: String,
}

impl Default for CommitKeys {
    fn default() -> Self {
        Self {
            mark_commit_as_fixup: "f".to_owned(),
            squash_down: "s".to_owned(),
        }
    }
}

/// Bindings for the branches view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchKeys {
    /// Prompt for a branch name to check out
    pub checkout_branch_by_name: String,
}

impl Default for BranchKeys {
    fn default() -> Self {
        Self {
            checkout_branch_by_name: "c".to_owned(),
        }
    }
}

impl KeybindingConfig {
    /// Resolve a dotted symbolic action name such as `universal.confirm` or
    /// `commits.squashDown`.
    ///
    /// # Errors
    /// Returns [`Error::UnknownAction`] if the name has no binding.
    pub fn lookup(&self, action: &str) -> Result<KeyBinding> {
        let universal = &self.universal;
        let commits = &self.commits;
        let branches = &self.branches;
        let single = match action {
            "universal.confirm" => &universal.confirm,
            "universal.return" => &universal.return_key,
            "universal.select" => &universal.select,
            "universal.nextItem" => &universal.next_item,
            "universal.prevItem" => &universal.prev_item,
            "universal.togglePanel" => &universal.toggle_panel,
            "universal.createRebaseOptionsMenu" => &universal.create_rebase_options_menu,
            "universal.edit" => &universal.edit,
            "universal.remove" => &universal.remove,
            "universal.new" => &universal.new,
            "universal.jumpToBlock" => {
                return Ok(KeyBinding::Sequence(universal.jump_to_block.clone()));
            }
            "commits.markCommitAsFixup" => &commits.mark_commit_as_fixup,
            "commits.squashDown" => &commits.squash_down,
            "branches.checkoutBranchByName" => &branches.checkout_branch_by_name,
            unknown => return Err(Error::UnknownAction(unknown.to_owned())),
        };
        Ok(KeyBinding::Single(single.clone()))
    }

    /// Key that focuses the side window at `index` (0 = status, 1 = files, ...).
    ///
    /// # Errors
    /// Returns [`Error::UnknownAction`] if the jump-to-block family is too short.
    pub fn jump_to_block(&self, index: usize) -> Result<&str> {
        self.universal
            .jump_to_block
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownAction(format!("universal.jumpToBlock[{index}]")))
    }
}
