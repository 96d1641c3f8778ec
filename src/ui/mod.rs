pub mod theme;

use crate::app::{
    AppModel, ConfirmSelection, DeleteConfirmDialog, FormField, Pane, Phase, SidebarEntry,
    TodoForm, entry_matches_nav, sidebar_entries,
};
use crate::domain::{Group, TodoRow, ViewState};
use ratatui::prelude::*;
use ratatui::widgets::*;
use time::OffsetDateTime;
use time::macros::format_description;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SIDEBAR_WIDTH: u16 = 28;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    frame.render_widget(Block::default().style(Style::default().bg(theme::BG)), full_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(full_area);

    render_status_bar(frame, chunks[0], model);

    let view = model.view_state();
    if model.phase == Phase::Loading {
        render_loading(frame, chunks[1], model);
    } else {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(chunks[1]);
        render_sidebar(frame, panes[0], model, &view);
        render_todo_list(frame, panes[1], model, &view);
    }

    render_hint_bar(frame, chunks[2], model);

    if let Some(form) = &model.form {
        render_form_overlay(frame, chunks[1], form);
    }
    if let Some(confirm) = &model.delete_confirm {
        render_delete_confirm_overlay(frame, chunks[1], confirm);
    }
    if model.help_open {
        render_help_overlay(frame, chunks[1]);
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, model: &AppModel) {
    let base_style = Style::default().fg(theme::FG).bg(theme::BAR_BG);

    let status = if let Some(pending) = &model.pending {
        let label = pending.kind.progress_label();
        let text = match pending.todo_id {
            Some(id) => format!("{label} #{id}"),
            None => label.to_string(),
        };
        Span::styled(text, Style::default().fg(theme::ACCENT).bg(theme::BAR_BG))
    } else if model.fetch_in_flight {
        Span::styled(
            "Refreshing…".to_string(),
            Style::default().fg(theme::MUTED).bg(theme::BAR_BG),
        )
    } else if let Some(last_sync) = model.last_sync {
        Span::styled(
            format!("Synced {}", format_sync_time(last_sync)),
            Style::default().fg(theme::SUCCESS).bg(theme::BAR_BG),
        )
    } else {
        Span::styled(String::new(), base_style)
    };

    let name = " tudu ";
    let url = format!(" {} ", model.api_url);
    let used = UnicodeWidthStr::width(name)
        + UnicodeWidthStr::width(url.as_str())
        + UnicodeWidthStr::width(status.content.as_ref())
        + 1;
    let padding = (area.width as usize).saturating_sub(used);

    let spans = vec![
        Span::styled(
            name,
            Style::default()
                .fg(theme::ACCENT)
                .bg(theme::BAR_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(url, Style::default().fg(theme::MUTED).bg(theme::BAR_BG)),
        Span::styled(" ".repeat(padding), base_style),
        status,
        Span::styled(" ", base_style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)).style(base_style), area);
}

fn render_hint_bar(frame: &mut Frame, area: Rect, model: &AppModel) {
    let (text, style) = if let Some(notice) = &model.notice {
        (
            notice.clone(),
            Style::default().fg(theme::ACCENT).bg(theme::BAR_BG),
        )
    } else {
        let hints = if model.form.is_some() {
            "Tab next field  Ctrl+S save  Esc cancel"
        } else if model.delete_confirm.is_some() {
            "←/→ choose  Enter confirm  Esc cancel  y/n"
        } else if model.phase == Phase::Loading {
            "r retry  q quit"
        } else {
            "Tab pane  ↑/↓ move  Enter open  Space toggle  n new  e edit  d delete  r refresh  ? help  q quit"
        };
        (
            hints.to_string(),
            Style::default().fg(theme::DIM).bg(theme::BAR_BG),
        )
    };

    let text = truncate_end(&text, area.width as usize);
    frame.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}

fn render_loading(frame: &mut Frame, area: Rect, model: &AppModel) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Loading todos from {}…", model.api_url),
            Style::default().fg(theme::MUTED),
        )),
    ];

    if let Some(error) = &model.load_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Failed to load: {error}"),
            Style::default().fg(theme::ERROR),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press r to retry.",
            Style::default().fg(theme::DIM),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, model: &AppModel, view: &ViewState) {
    let focused = model.focus == Pane::Sidebar;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { theme::ACCENT } else { theme::BORDER }))
        .title(" Groups ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let entries = sidebar_entries(view);
    let inner_width = inner.width as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| sidebar_item(entry, view, &model.nav, inner_width))
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    if focused && !entries.is_empty() {
        state.select(Some(model.sidebar_selected.min(entries.len() - 1)));
    }
    frame.render_stateful_widget(list, inner, &mut state);
}

fn sidebar_item<'a>(
    entry: &SidebarEntry,
    view: &ViewState,
    nav: &crate::domain::NavState,
    inner_width: usize,
) -> ListItem<'a> {
    // The active navigation entry gets the accent; when the selected
    // bucket no longer exists there is simply no match to highlight.
    let active = entry_matches_nav(entry, nav);
    let base = if active {
        Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::FG)
    };

    let (label, count, indent) = match entry {
        SidebarEntry::Group(Group::All) => (Group::All.label().to_string(), view.all_total, 0),
        SidebarEntry::Group(Group::Completed) => {
            (Group::Completed.label().to_string(), view.completed_total, 0)
        }
        SidebarEntry::DueDate { label, count, .. } => (label.clone(), *count, 2),
    };

    let style = match entry {
        SidebarEntry::Group(_) => base.add_modifier(Modifier::BOLD),
        SidebarEntry::DueDate { .. } if !active => Style::default().fg(theme::MUTED),
        SidebarEntry::DueDate { .. } => base,
    };

    let count_text = count.to_string();
    let label_width = UnicodeWidthStr::width(label.as_str()) + indent;
    let count_width = UnicodeWidthStr::width(count_text.as_str());
    let line = if inner_width > label_width + count_width + 1 {
        let padding = inner_width - label_width - count_width;
        Line::from(vec![
            Span::styled(format!("{}{label}", " ".repeat(indent)), style),
            Span::styled(
                format!("{}{count_text}", " ".repeat(padding)),
                Style::default().fg(theme::DIM),
            ),
        ])
    } else {
        Line::from(Span::styled(
            truncate_end(&format!("{}{label}", " ".repeat(indent)), inner_width),
            style,
        ))
    };

    ListItem::new(line)
}

fn render_todo_list(frame: &mut Frame, area: Rect, model: &AppModel, view: &ViewState) {
    let focused = model.focus == Pane::List;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { theme::ACCENT } else { theme::BORDER }))
        .title(format!(" {} ({}) ", view.heading, view.rows.len()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if view.rows.is_empty() {
        let message = if view.all_total == 0 {
            "No todos yet. Press n to add one."
        } else {
            "No todos in this view."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().fg(theme::DIM))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
        return;
    }

    let inner_width = inner.width as usize;
    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| todo_item(row, inner_width))
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    if focused {
        state.select(Some(model.list_selected.min(view.rows.len() - 1)));
    }
    frame.render_stateful_widget(list, inner, &mut state);
}

fn todo_item<'a>(row: &TodoRow, inner_width: usize) -> ListItem<'a> {
    let checkbox = if row.completed { "[x] " } else { "[ ] " };
    let title_style = if row.completed {
        Style::default()
            .fg(theme::DIM)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(theme::FG)
    };

    let label_width = UnicodeWidthStr::width(row.due_label.as_str());
    let fixed = UnicodeWidthStr::width(checkbox) + label_width + 2;
    let title_room = inner_width.saturating_sub(fixed);
    let title = truncate_end(&row.title, title_room);
    let padding = inner_width
        .saturating_sub(UnicodeWidthStr::width(checkbox))
        .saturating_sub(UnicodeWidthStr::width(title.as_str()))
        .saturating_sub(label_width);

    ListItem::new(Line::from(vec![
        Span::styled(checkbox.to_string(), Style::default().fg(theme::MUTED)),
        Span::styled(title, title_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(row.due_label.clone(), Style::default().fg(theme::DIM)),
    ]))
}

fn render_form_overlay(frame: &mut Frame, area: Rect, form: &TodoForm) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .padding(Padding::horizontal(1))
        .title(format!(" {} ", form.title_text()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    render_field(frame, rows[0], FormField::Title.label(), &form.title.text, form.title.cursor_col, form.focus == FormField::Title);

    let date_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Min(0),
        ])
        .split(rows[1]);
    render_field(frame, date_row[0], FormField::Day.label(), &form.day.text, form.day.cursor_col, form.focus == FormField::Day);
    render_field(frame, date_row[1], FormField::Month.label(), &form.month.text, form.month.cursor_col, form.focus == FormField::Month);
    render_field(frame, date_row[2], FormField::Year.label(), &form.year.text, form.year.cursor_col, form.focus == FormField::Year);

    let completed_focused = form.focus == FormField::Completed;
    let completed_style = if completed_focused {
        Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::FG)
    };
    let marker = if form.completed { "[x]" } else { "[ ]" };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{marker} {}", FormField::Completed.label()),
                completed_style,
            ),
            Span::styled(
                if completed_focused { "  (Space toggles)" } else { "" },
                Style::default().fg(theme::DIM),
            ),
        ])),
        rows[2],
    );

    render_description(frame, rows[3], form);

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(error.to_string()).style(Style::default().fg(theme::ERROR)),
            rows[4],
        );
    }
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    text: &str,
    cursor_col: usize,
    focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { theme::ACCENT } else { theme::BORDER }))
        .title(label.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let prefix: String = text.chars().take(cursor_col).collect();
    let prefix_width = UnicodeWidthStr::width(prefix.as_str());
    // Scroll the field horizontally so the cursor stays visible.
    let scroll = prefix_width.saturating_sub(width.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(text.to_string())
            .style(Style::default().fg(theme::FG))
            .scroll((0, scroll as u16)),
        inner,
    );

    if focused && inner.width > 0 {
        let x = inner.x + (prefix_width - scroll) as u16;
        frame.set_cursor_position((x.min(inner.x + inner.width - 1), inner.y));
    }
}

fn render_description(frame: &mut Frame, area: Rect, form: &TodoForm) {
    let focused = form.focus == FormField::Description;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { theme::ACCENT } else { theme::BORDER }))
        .title(FormField::Description.label());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let editor = &form.description;
    let visible = inner.height as usize;
    let scroll = editor.cursor_row.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = editor
        .lines
        .iter()
        .map(|line| Line::from(line.clone()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(theme::FG))
            .scroll((scroll as u16, 0)),
        inner,
    );

    if focused && inner.width > 0 && inner.height > 0 {
        let prefix: String = editor
            .lines
            .get(editor.cursor_row)
            .map(|line| line.chars().take(editor.cursor_col).collect())
            .unwrap_or_default();
        let x = inner.x + (UnicodeWidthStr::width(prefix.as_str()) as u16).min(inner.width - 1);
        let y = inner.y + (editor.cursor_row - scroll) as u16;
        frame.set_cursor_position((x, y.min(inner.y + inner.height - 1)));
    }
}

fn render_delete_confirm_overlay(frame: &mut Frame, area: Rect, confirm: &DeleteConfirmDialog) {
    let popup = centered_rect(60, 36, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .title(" Delete Todo ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let max_line_width = (chunks[0].width as usize).saturating_sub(1);
    let message = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!("\"{}\"", truncate_end(&confirm.todo_title, max_line_width.saturating_sub(9))),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Due: {}", confirm.due_label),
            Style::default().fg(theme::MUTED),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "The todo is removed here only after the server confirms.",
            Style::default().fg(theme::DIM),
        )),
    ];
    frame.render_widget(Paragraph::new(message).wrap(Wrap { trim: false }), chunks[0]);

    let cancel_style = if confirm.selection == ConfirmSelection::Cancel {
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let delete_base = Style::default().fg(theme::ERROR);
    let delete_style = if confirm.selection == ConfirmSelection::Delete {
        delete_base
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    } else {
        delete_base.add_modifier(Modifier::BOLD)
    };

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled("[ Cancel ]", cancel_style),
        Span::raw("   "),
        Span::styled("[ Delete ]", delete_style),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(buttons, chunks[1]);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(56, 70, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .title(" Keys ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = [
        ("Tab / ← →", "switch between groups and list"),
        ("↑ ↓ / j k", "move the selection"),
        ("Enter", "select group / edit todo"),
        ("Space", "toggle completion"),
        ("n / a", "new todo"),
        ("e", "edit todo"),
        ("d / Del", "delete todo (with confirmation)"),
        ("r", "refresh from the server"),
        ("? / F1", "this help"),
        ("q / Ctrl+C", "quit"),
    ];

    let key_width = rows
        .iter()
        .map(|(keys, _)| UnicodeWidthStr::width(*keys))
        .max()
        .unwrap_or(0);

    let lines: Vec<Line> = rows
        .iter()
        .map(|(keys, what)| {
            let pad = key_width - UnicodeWidthStr::width(*keys);
            Line::from(vec![
                Span::styled(
                    format!("{keys}{}", " ".repeat(pad + 2)),
                    Style::default().fg(theme::ACCENT),
                ),
                Span::styled((*what).to_string(), Style::default().fg(theme::FG)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn format_sync_time(timestamp: OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    timestamp.format(&format).unwrap_or_default()
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > max_width.saturating_sub(1) {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_end_respects_display_width() {
        assert_eq!(truncate_end("short", 10), "short");
        assert_eq!(truncate_end("a longer title", 8), "a longe…");
        assert_eq!(truncate_end("anything", 0), "");
    }

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert!(popup.width <= area.width);
        assert!(popup.height <= area.height);
        assert!(popup.x >= area.x && popup.y >= area.y);
    }
}
