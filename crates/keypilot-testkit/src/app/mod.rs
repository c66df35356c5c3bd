//! A scripted, git-client-shaped terminal application.
//!
//! [`ScriptedApp`] keeps a small repository model (commits, branches, files,
//! stash), five side panels, and a single popup slot for menus,
//! confirmations, prompts and alerts. It reacts to key strings the same way a
//! list-oriented git TUI would, which makes it a realistic target for the
//! harness without launching a real process.

mod render;
mod repo;

pub use render::Screen;
pub use repo::{RepoFixture, TodoAction};

use core::mem;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use keypilot_core::{KeybindingConfig, Result};
use tracing::debug;

use crate::keys::parse_key;
use repo::Rebase;

/// Name of the status panel's view and window.
pub const STATUS: &str = "status";
/// Name of the files panel's view and window.
pub const FILES: &str = "files";
/// Name of the branches panel's view and window.
pub const BRANCHES: &str = "localBranches";
/// Name of the commits panel's view and window.
pub const COMMITS: &str = "commits";
/// Name of the stash panel's view and window.
pub const STASH: &str = "stash";

const STATUS_INDEX: usize = 0;
const FILES_INDEX: usize = 1;
const BRANCHES_INDEX: usize = 2;
const COMMITS_INDEX: usize = 3;
const STASH_INDEX: usize = 4;

/// One of the side panels.
#[derive(Debug, Clone)]
pub(crate) struct SidePanel {
    pub(crate) name: &'static str,
    pub(crate) title: &'static str,
    pub(crate) items: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) offset: usize,
}

impl SidePanel {
    fn new(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            items: Vec::new(),
            selected: 0,
            offset: 0,
        }
    }

    fn move_by(&mut self, forward: bool) {
        self.selected = step(self.selected, self.items.len(), forward);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }
}

/// Options offered by the rebase options menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuOption {
    Continue,
    Abort,
}

impl MenuOption {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Abort => "abort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Confirmed {
    DeleteBranch(String),
    DropCommit(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromptPurpose {
    NewBranch,
    CheckoutBranch,
}

/// The popup currently covering the side panels.
#[derive(Debug, Clone)]
pub(crate) enum Popup {
    Menu {
        title: String,
        options: Vec<MenuOption>,
        selected: usize,
        offset: usize,
    },
    Confirmation {
        title: String,
        content: String,
        on_confirm: Confirmed,
    },
    Prompt {
        title: String,
        text: String,
        purpose: PromptPurpose,
        suggestions_focused: bool,
        suggestion_selected: usize,
        suggestion_offset: usize,
    },
    Alert {
        title: String,
        content: String,
    },
}

impl Popup {
    /// Branches offered under a checkout prompt. Every other popup offers none.
    pub(crate) fn suggestions(&self, branches: &[String]) -> Vec<String> {
        match self {
            Self::Prompt {
                text,
                purpose: PromptPurpose::CheckoutBranch,
                ..
            } => branches
                .iter()
                .filter(|branch| branch.contains(text.as_str()))
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Scripted git-client application driven by key strings.
#[derive(Debug, Clone)]
pub struct ScriptedApp {
    keys: KeybindingConfig,
    pub(crate) panels: Vec<SidePanel>,
    pub(crate) focused: usize,
    pub(crate) popup: Option<Popup>,
    commits: Vec<String>,
    pub(crate) branches: Vec<String>,
    checked_out: String,
    rebase: Option<Rebase>,
    logs: Vec<String>,
    dirty: bool,
}

impl ScriptedApp {
    /// Application over `fixture`, interpreting keys with `keys`.
    #[must_use]
    pub fn new(fixture: RepoFixture, keys: KeybindingConfig) -> Self {
        let mut panels = vec![
            SidePanel::new(STATUS, "Status"),
            SidePanel::new(FILES, "Files"),
            SidePanel::new(BRANCHES, "Local Branches"),
            SidePanel::new(COMMITS, "Commits"),
            SidePanel::new(STASH, "Stash"),
        ];
        panels[FILES_INDEX].items = fixture.files;
        panels[STASH_INDEX].items = fixture.stash;
        let checked_out = fixture.branches.first().cloned().unwrap_or_default();
        let mut app = Self {
            keys,
            panels,
            focused: STATUS_INDEX,
            popup: None,
            commits: fixture.commits,
            branches: fixture.branches,
            checked_out,
            rebase: None,
            logs: Vec::new(),
            dirty: true,
        };
        app.sync_panels();
        app
    }

    /// Commits, newest first.
    pub fn commits(&self) -> &[String] {
        &self.commits
    }

    /// Local branches.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    /// Currently checked-out branch.
    pub fn checked_out(&self) -> &str {
        &self.checked_out
    }

    /// Whether an interactive rebase is in progress.
    pub fn is_rebasing(&self) -> bool {
        self.rebase.is_some()
    }

    /// Messages received through the driver's log channel.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Record an out-of-band log message.
    pub fn log(&mut self, message: &str) {
        self.logs.push(message.to_owned());
    }

    /// Whether state changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        mem::take(&mut self.dirty)
    }

    /// Handle one key press.
    ///
    /// # Errors
    /// Returns [`keypilot_core::Error::InvalidKey`] if `key` cannot be decoded;
    /// the application state is left untouched in that case.
    pub fn handle_key(&mut self, key: &str) -> Result<()> {
        let event = parse_key(key)?;
        debug!(key, view = self.focused_view(), "scripted app handling key");
        self.popup = match self.popup.take() {
            Some(popup) => self.handle_popup_key(popup, key, event),
            None => {
                self.handle_panel_key(key);
                self.popup.take()
            }
        };
        self.sync_panels();
        self.dirty = true;
        Ok(())
    }

    fn focused_view(&self) -> &'static str {
        match &self.popup {
            Some(Popup::Menu { .. }) => "menu",
            Some(Popup::Confirmation { .. }) => "confirmation",
            Some(Popup::Prompt {
                suggestions_focused: true,
                ..
            }) => "suggestions",
            Some(Popup::Prompt { .. }) => "prompt",
            Some(Popup::Alert { .. }) => "alert",
            None => self.panels[self.focused].name,
        }
    }

    fn handle_panel_key(&mut self, key: &str) {
        let universal = self.keys.universal.clone();
        if let Some(index) = universal.jump_to_block.iter().position(|jump| jump == key) {
            if index < self.panels.len() {
                self.focused = index;
            }
            return;
        }
        if key == universal.next_item || key == universal.prev_item {
            self.panels[self.focused].move_by(key == universal.next_item);
            return;
        }
        if key == universal.create_rebase_options_menu {
            self.popup = Some(if self.rebase.is_some() {
                Popup::Menu {
                    title: "Rebase Options".to_owned(),
                    options: vec![MenuOption::Continue, MenuOption::Abort],
                    selected: 0,
                    offset: 0,
                }
            } else {
                alert("Error", "You are not in a rebase")
            });
            return;
        }
        match self.focused {
            COMMITS_INDEX => self.handle_commits_key(key),
            BRANCHES_INDEX => self.handle_branches_key(key),
            _ => {}
        }
    }

    fn handle_commits_key(&mut self, key: &str) {
        let selected = self.panels[COMMITS_INDEX].selected;
        let universal = &self.keys.universal;
        let commit_keys = &self.keys.commits;
        if let Some(rebase) = self.rebase.as_mut() {
            let action = if key == commit_keys.mark_commit_as_fixup {
                TodoAction::Fixup
            } else if key == commit_keys.squash_down {
                TodoAction::Squash
            } else if key == universal.remove {
                TodoAction::Drop
            } else {
                return;
            };
            if let Some(entry) = rebase.todo.get_mut(selected) {
                entry.action = action;
            }
            return;
        }

        if key == universal.edit {
            self.rebase = Rebase::start(&self.commits, selected);
        } else if key == universal.remove && selected < self.commits.len() {
            self.popup = Some(Popup::Confirmation {
                title: "Drop commit".to_owned(),
                content: "Are you sure you want to drop this commit?".to_owned(),
                on_confirm: Confirmed::DropCommit(selected),
            });
        }
    }

    fn handle_branches_key(&mut self, key: &str) {
        let universal = &self.keys.universal;
        let selected = self.panels[BRANCHES_INDEX].selected;
        if key == universal.new {
            self.popup = Some(prompt("New branch name", PromptPurpose::NewBranch));
        } else if key == self.keys.branches.checkout_branch_by_name {
            self.popup = Some(prompt("Branch name:", PromptPurpose::CheckoutBranch));
        } else if key == universal.select {
            if let Some(branch) = self.branches.get(selected) {
                self.checked_out = branch.clone();
            }
        } else if key == universal.remove {
            let Some(branch) = self.branches.get(selected).cloned() else {
                return;
            };
            self.popup = Some(if branch == self.checked_out {
                alert("Error", "You cannot delete the checked out branch!")
            } else {
                Popup::Confirmation {
                    title: "Delete branch".to_owned(),
                    content: format!("Are you sure you want to delete the branch '{branch}'?"),
                    on_confirm: Confirmed::DeleteBranch(branch),
                }
            });
        }
    }

    fn handle_popup_key(&mut self, popup: Popup, key: &str, event: KeyEvent) -> Option<Popup> {
        let universal = self.keys.universal.clone();
        let confirm = key == universal.confirm;
        let cancel = key == universal.return_key;
        let suggestions = popup.suggestions(&self.branches);
        match popup {
            Popup::Alert { .. } if confirm || cancel => None,
            Popup::Confirmation { on_confirm, .. } if confirm => self.apply_confirmed(on_confirm),
            Popup::Confirmation { .. } if cancel => None,
            Popup::Menu { options, selected, .. } if confirm => {
                options.get(selected).and_then(|option| self.apply_menu_option(*option))
            }
            Popup::Menu { .. } if cancel => None,
            Popup::Menu {
                title,
                options,
                selected,
                offset,
            } => {
                let selected = if key == universal.next_item || key == universal.prev_item {
                    step(selected, options.len(), key == universal.next_item)
                } else {
                    selected
                };
                Some(Popup::Menu {
                    title,
                    options,
                    selected,
                    offset,
                })
            }
            Popup::Prompt { .. } if cancel => None,
            Popup::Prompt {
                title,
                text,
                purpose,
                suggestions_focused,
                suggestion_selected,
                suggestion_offset,
            } => {
                if confirm {
                    let value = if suggestions_focused {
                        suggestions.get(suggestion_selected).cloned().unwrap_or_default()
                    } else {
                        text
                    };
                    return self.submit_prompt(purpose, &value);
                }
                let mut text = text;
                let mut suggestions_focused = suggestions_focused;
                let mut suggestion_selected = suggestion_selected;
                if key == universal.toggle_panel {
                    suggestions_focused = !suggestions_focused && !suggestions.is_empty();
                    suggestion_selected = 0;
                } else if suggestions_focused {
                    if key == universal.next_item || key == universal.prev_item {
                        suggestion_selected = step(
                            suggestion_selected,
                            suggestions.len(),
                            key == universal.next_item,
                        );
                    }
                } else {
                    edit_text(&mut text, event);
                }
                Some(Popup::Prompt {
                    title,
                    text,
                    purpose,
                    suggestions_focused,
                    suggestion_selected,
                    suggestion_offset,
                })
            }
            other => Some(other),
        }
    }

    fn apply_confirmed(&mut self, confirmed: Confirmed) -> Option<Popup> {
        match confirmed {
            Confirmed::DeleteBranch(branch) => self.branches.retain(|name| *name != branch),
            Confirmed::DropCommit(index) => {
                if index < self.commits.len() {
                    self.commits.remove(index);
                }
            }
        }
        None
    }

    fn apply_menu_option(&mut self, option: MenuOption) -> Option<Popup> {
        let rebase = self.rebase.take()?;
        self.commits = match option {
            MenuOption::Continue => rebase.finish(),
            MenuOption::Abort => rebase.original,
        };
        self.panels[COMMITS_INDEX].selected = 0;
        None
    }

    fn submit_prompt(&mut self, purpose: PromptPurpose, value: &str) -> Option<Popup> {
        let name = value.trim();
        match purpose {
            PromptPurpose::NewBranch if name.is_empty() => {
                Some(alert("Error", "Branch name cannot be blank"))
            }
            PromptPurpose::NewBranch => {
                self.branches.insert(0, name.to_owned());
                self.checked_out = name.to_owned();
                self.panels[BRANCHES_INDEX].selected = 0;
                None
            }
            PromptPurpose::CheckoutBranch => {
                if let Some(index) = self.branches.iter().position(|branch| branch == name) {
                    self.checked_out = name.to_owned();
                    self.panels[BRANCHES_INDEX].selected = index;
                    None
                } else {
                    Some(alert("Error", &format!("Branch '{name}' not found")))
                }
            }
        }
    }

    fn sync_panels(&mut self) {
        let branch_label = if self.rebase.is_some() {
            format!("keypilot-demo -> {} (rebasing)", self.checked_out)
        } else {
            format!("keypilot-demo -> {}", self.checked_out)
        };
        self.panels[STATUS_INDEX].items = vec![branch_label];
        self.panels[BRANCHES_INDEX].items = self
            .branches
            .iter()
            .map(|branch| {
                if *branch == self.checked_out {
                    format!("* {branch}")
                } else {
                    branch.clone()
                }
            })
            .collect();
        self.panels[COMMITS_INDEX].items = self
            .rebase
            .as_ref()
            .map_or_else(|| self.commits.clone(), Rebase::lines);
        for panel in &mut self.panels {
            panel.clamp_selection();
        }
    }
}

fn step(selected: usize, len: usize, forward: bool) -> usize {
    if forward {
        (selected + 1).min(len.saturating_sub(1))
    } else {
        selected.saturating_sub(1)
    }
}

fn edit_text(text: &mut String, event: KeyEvent) {
    match event.code {
        KeyCode::Backspace => {
            text.pop();
        }
        KeyCode::Char(character)
            if !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            text.push(character);
        }
        _ => {}
    }
}

fn alert(title: &str, content: &str) -> Popup {
    Popup::Alert {
        title: title.to_owned(),
        content: content.to_owned(),
    }
}

fn prompt(title: &str, purpose: PromptPurpose) -> Popup {
    Popup::Prompt {
        title: title.to_owned(),
        text: String::new(),
        purpose,
        suggestions_focused: false,
        suggestion_selected: 0,
        suggestion_offset: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_commits(count: usize) -> ScriptedApp {
        ScriptedApp::new(
            RepoFixture::with_commits(count).branches(["master", "feature/login", "hotfix"]),
            KeybindingConfig::default(),
        )
    }

    fn press_all(app: &mut ScriptedApp, keys: &[&str]) {
        for key in keys {
            app.handle_key(key).unwrap();
        }
    }

    #[test]
    fn test_jump_and_move() {
        let mut app = app_with_commits(5);
        press_all(&mut app, &["4", "<down>", "<down>"]);
        assert_eq!(app.focused_view(), COMMITS);
        assert_eq!(app.panels[COMMITS_INDEX].selected, 2);
        press_all(&mut app, &["<up>", "<up>", "<up>"]);
        assert_eq!(app.panels[COMMITS_INDEX].selected, 0);
    }

    #[test]
    fn test_interactive_rebase() {
        let mut app = app_with_commits(5);
        press_all(&mut app, &["4", "<down>", "<down>", "<down>", "e"]);
        assert!(app.is_rebasing());
        assert_eq!(app.panels[COMMITS_INDEX].items[3], "<-- YOU ARE HERE --- commit 02");
        press_all(&mut app, &["<up>", "f", "<up>", "d", "<up>", "s", "m"]);
        assert_eq!(app.focused_view(), "menu");
        press_all(&mut app, &["<enter>"]);
        assert!(!app.is_rebasing());
        assert_eq!(app.commits(), ["commit 02", "commit 01"]);
    }

    #[test]
    fn test_abort_restores_commits() {
        let mut app = app_with_commits(3);
        press_all(&mut app, &["4", "<down>", "e", "<up>", "d", "m", "<down>", "<enter>"]);
        assert_eq!(app.commits(), RepoFixture::with_commits(3).commits);
    }

    #[test]
    fn test_rebase_menu_outside_rebase_alerts() {
        let mut app = app_with_commits(2);
        press_all(&mut app, &["m"]);
        assert_eq!(app.focused_view(), "alert");
        press_all(&mut app, &["<esc>"]);
        assert_eq!(app.focused_view(), STATUS);
    }

    #[test]
    fn test_delete_branch_confirmation() {
        let mut app = app_with_commits(1);
        press_all(&mut app, &["3", "<down>", "d"]);
        assert_eq!(app.focused_view(), "confirmation");
        press_all(&mut app, &["<esc>"]);
        assert_eq!(app.branches().len(), 3);
        press_all(&mut app, &["d", "<enter>"]);
        assert_eq!(app.branches(), ["master", "hotfix"]);
    }

    #[test]
    fn test_prompt_typing_does_not_trigger_bindings() {
        let mut app = app_with_commits(1);
        press_all(&mut app, &["3", "n", "d", "e", "v", "1", "<backspace>", "2", "<enter>"]);
        assert_eq!(app.checked_out(), "dev2");
        assert_eq!(app.branches()[0], "dev2");
    }

    #[test]
    fn test_checkout_via_suggestions() {
        let mut app = app_with_commits(1);
        press_all(&mut app, &["3", "c", "h", "o", "<tab>"]);
        assert_eq!(app.focused_view(), "suggestions");
        press_all(&mut app, &["<enter>"]);
        assert_eq!(app.checked_out(), "hotfix");
    }

    #[test]
    fn test_invalid_key_leaves_state() {
        let mut app = app_with_commits(1);
        app.take_dirty();
        assert!(app.handle_key("<warp>").is_err());
        assert!(!app.take_dirty());
    }
}
