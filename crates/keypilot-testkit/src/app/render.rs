//! Rendering of the scripted application and capture of what is on screen.
//!
//! Visible lines are read back from the rendered buffer, so a list taller
//! than its panel only exposes the rows that actually fit.

use keypilot_core::{ContextKind, ContextSnapshot, ListSnapshot, Result};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::{Popup, ScriptedApp};

const MESSAGE_POPUP_HEIGHT: u16 = 5;
const PROMPT_HEIGHT: u16 = 3;
const MAX_SUGGESTION_ROWS: u16 = 6;

/// Off-screen terminal the scripted application draws into.
pub struct Screen {
    terminal: Terminal<TestBackend>,
}

/// Position of the focused list after a render.
struct ListPlacement {
    area: Rect,
    len: usize,
    selected: usize,
    offset: usize,
}

impl Screen {
    /// Terminal of `width` × `height` cells.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be initialised.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let terminal = Terminal::new(TestBackend::new(width, height))?;
        Ok(Self { terminal })
    }

    /// Render `app` and capture its focused region.
    ///
    /// # Errors
    /// Returns an error if drawing to the terminal fails.
    pub fn capture(&mut self, app: &mut ScriptedApp) -> Result<ContextSnapshot> {
        let mut placement = None;
        let completed = self.terminal.draw(|frame| placement = render(app, frame))?;
        let list = placement.map(|placed| {
            let visible = placed.len.saturating_sub(placed.offset);
            ListSnapshot {
                lines: visible_rows(completed.buffer, placed.area, visible),
                selected: placed.selected.saturating_sub(placed.offset),
            }
        });
        Ok(describe(app, list))
    }

    /// The whole screen as text, one line per terminal row.
    pub fn text(&self) -> String {
        let buffer = self.terminal.backend().buffer();
        visible_rows(buffer, buffer.area, usize::MAX).join("\n")
    }
}

fn render(app: &mut ScriptedApp, frame: &mut Frame<'_>) -> Option<ListPlacement> {
    let area = frame.area();
    let focused = app.focused;
    let panel = &mut app.panels[focused];
    let panel_placement = render_list(
        frame,
        area,
        panel.title,
        &panel.items,
        panel.selected,
        &mut panel.offset,
    );

    let Some(popup) = app.popup.as_mut() else {
        return Some(panel_placement);
    };
    let suggestions = popup.suggestions(&app.branches);
    match popup {
        Popup::Menu {
            title,
            options,
            selected,
            offset,
        } => {
            let labels = options
                .iter()
                .map(|option| option.label().to_owned())
                .collect::<Vec<_>>();
            let popup_area = centered(area, rows(labels.len()).saturating_add(2));
            frame.render_widget(Clear, popup_area);
            Some(render_list(frame, popup_area, title, &labels, *selected, offset))
        }
        Popup::Confirmation { title, content, .. } | Popup::Alert { title, content } => {
            let popup_area = centered(area, MESSAGE_POPUP_HEIGHT);
            frame.render_widget(Clear, popup_area);
            frame.render_widget(
                Paragraph::new(content.as_str())
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).title(title.as_str())),
                popup_area,
            );
            None
        }
        Popup::Prompt {
            title,
            text,
            suggestions_focused,
            suggestion_selected,
            suggestion_offset,
            ..
        } => {
            let suggestions_height = if suggestions.is_empty() {
                0
            } else {
                rows(suggestions.len()).min(MAX_SUGGESTION_ROWS) + 2
            };
            let popup_area = centered(area, PROMPT_HEIGHT + suggestions_height);
            frame.render_widget(Clear, popup_area);
            let prompt_area = Rect {
                height: PROMPT_HEIGHT.min(popup_area.height),
                ..popup_area
            };
            frame.render_widget(
                Paragraph::new(text.as_str())
                    .block(Block::default().borders(Borders::ALL).title(title.as_str())),
                prompt_area,
            );
            if suggestions.is_empty() {
                return None;
            }
            let suggestions_area = Rect {
                y: prompt_area.bottom(),
                height: popup_area.height.saturating_sub(prompt_area.height),
                ..popup_area
            };
            let placement = render_list(
                frame,
                suggestions_area,
                "Suggestions",
                &suggestions,
                *suggestion_selected,
                suggestion_offset,
            );
            suggestions_focused.then_some(placement)
        }
    }
}

fn render_list(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    items: &[String],
    selected: usize,
    offset: &mut usize,
) -> ListPlacement {
    let block = Block::default().borders(Borders::ALL).title(title.to_owned());
    let inner = block.inner(area);
    let list = List::new(items.iter().map(|item| ListItem::new(item.as_str())))
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default()
        .with_offset(*offset)
        .with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
    *offset = state.offset();
    ListPlacement {
        area: inner,
        len: items.len(),
        selected,
        offset: *offset,
    }
}

fn centered(area: Rect, height: u16) -> Rect {
    let width = area.width.saturating_mul(3) / 5;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn rows(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

fn visible_rows(buffer: &Buffer, area: Rect, count: usize) -> Vec<String> {
    (area.top()..area.bottom())
        .take(count)
        .map(|row| {
            let mut line = String::new();
            for column in area.left()..area.right() {
                if let Some(cell) = buffer.cell((column, row)) {
                    line.push_str(cell.symbol());
                }
            }
            line.trim_end().to_owned()
        })
        .collect()
}

fn describe(app: &ScriptedApp, list: Option<ListSnapshot>) -> ContextSnapshot {
    let (view, kind, title, content) = match &app.popup {
        None => {
            let panel = &app.panels[app.focused];
            (
                panel.name,
                ContextKind::SideList,
                panel.title.to_owned(),
                panel.items.join("\n"),
            )
        }
        Some(Popup::Menu { title, options, .. }) => (
            "menu",
            ContextKind::Menu,
            title.clone(),
            options
                .iter()
                .map(|option| option.label())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Some(Popup::Confirmation { title, content, .. }) => {
            ("confirmation", ContextKind::Confirmation, title.clone(), content.clone())
        }
        Some(Popup::Alert { title, content }) => {
            ("alert", ContextKind::Alert, title.clone(), content.clone())
        }
        Some(
            popup @ Popup::Prompt {
                suggestions_focused: true,
                ..
            },
        ) => (
            "suggestions",
            ContextKind::Suggestions,
            "Suggestions".to_owned(),
            popup.suggestions(&app.branches).join("\n"),
        ),
        Some(Popup::Prompt { title, text, .. }) => {
            ("prompt", ContextKind::Prompt, title.clone(), text.clone())
        }
    };
    let list = if kind.is_list() { list } else { None };
    ContextSnapshot {
        view: view.to_owned(),
        window: view.to_owned(),
        kind,
        title,
        content,
        list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RepoFixture;
    use keypilot_core::KeybindingConfig;

    fn commits_app(count: usize) -> ScriptedApp {
        let mut app = ScriptedApp::new(RepoFixture::with_commits(count), KeybindingConfig::default());
        app.handle_key("4").unwrap();
        app
    }

    #[test]
    fn test_capture_side_list() {
        let mut screen = Screen::new(40, 12).unwrap();
        let mut app = commits_app(5);
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.view, "commits");
        assert_eq!(context.kind, ContextKind::SideList);
        assert_eq!(context.title, "Commits");
        let list = context.list.unwrap();
        assert_eq!(
            list.lines,
            vec!["commit 05", "commit 04", "commit 03", "commit 02", "commit 01"]
        );
        assert_eq!(list.selected, 0);
        assert!(screen.text().contains("Commits"));
    }

    #[test]
    fn test_capture_only_visible_page() {
        let mut screen = Screen::new(40, 8).unwrap();
        let mut app = commits_app(20);
        let list = screen.capture(&mut app).unwrap().list.unwrap();
        assert_eq!(list.lines.len(), 6);
        assert_eq!(list.lines[0], "commit 20");
        assert_eq!(list.lines[5], "commit 15");
    }

    #[test]
    fn test_selection_relative_to_scrolled_page() {
        let mut screen = Screen::new(40, 8).unwrap();
        let mut app = commits_app(20);
        for _ in 0..8 {
            app.handle_key("<down>").unwrap();
        }
        let list = screen.capture(&mut app).unwrap().list.unwrap();
        assert_eq!(list.selected_line(), Some("commit 12"));
        assert_eq!(list.lines.len(), 6);
    }

    #[test]
    fn test_capture_menu_popup() {
        let mut screen = Screen::new(60, 20).unwrap();
        let mut app = commits_app(3);
        for key in ["<down>", "e", "m"] {
            app.handle_key(key).unwrap();
        }
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.kind, ContextKind::Menu);
        assert_eq!(context.title, "Rebase Options");
        let list = context.list.unwrap();
        assert_eq!(list.lines, vec!["continue", "abort"]);
        assert_eq!(list.selected_line(), Some("continue"));
    }

    #[test]
    fn test_capture_confirmation_has_no_list() {
        let mut screen = Screen::new(60, 20).unwrap();
        let mut app = ScriptedApp::new(
            RepoFixture::default().branches(["master", "old"]),
            KeybindingConfig::default(),
        );
        for key in ["3", "<down>", "d"] {
            app.handle_key(key).unwrap();
        }
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.kind, ContextKind::Confirmation);
        assert_eq!(context.title, "Delete branch");
        assert_eq!(
            context.content,
            "Are you sure you want to delete the branch 'old'?"
        );
        assert!(context.list.is_none());
    }

    #[test]
    fn test_new_branch_prompt_offers_no_suggestions() {
        let mut screen = Screen::new(60, 20).unwrap();
        let mut app = ScriptedApp::new(
            RepoFixture::default().branches(["master", "hotfix"]),
            KeybindingConfig::default(),
        );
        for key in ["3", "n"] {
            app.handle_key(key).unwrap();
        }
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.kind, ContextKind::Prompt);
        assert_eq!(context.title, "New branch name");
        let text = screen.text();
        assert!(text.contains("New branch name"), "{text}");
        assert!(!text.contains("Suggestions"), "{text}");

        app.handle_key("<tab>").unwrap();
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.kind, ContextKind::Prompt);
        assert_eq!(context.view, "prompt");
    }

    #[test]
    fn test_checkout_prompt_draws_focusable_suggestions() {
        let mut screen = Screen::new(60, 20).unwrap();
        let mut app = ScriptedApp::new(
            RepoFixture::default().branches(["master", "hotfix"]),
            KeybindingConfig::default(),
        );
        for key in ["3", "c", "h"] {
            app.handle_key(key).unwrap();
        }
        screen.capture(&mut app).unwrap();
        assert!(screen.text().contains("Suggestions"));

        app.handle_key("<tab>").unwrap();
        let context = screen.capture(&mut app).unwrap();
        assert_eq!(context.kind, ContextKind::Suggestions);
        assert_eq!(context.content, "hotfix");
        assert_eq!(context.list.unwrap().lines, vec!["hotfix"]);
    }
}
