mod form;
mod line_editor;
mod text_editor;

pub use form::{FormField, FormTarget, TodoForm};
pub use line_editor::{InputMode, LineEditor};
pub use text_editor::TextEditor;

use crate::domain::{Group, NavState, TodoDraft, TodoList, TodoRecord, ViewState, build_view_state};
use crate::infra::TodoListing;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

const BUSY_NOTICE: &str = "Another request is in flight.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `Loading` until the first successful list fetch; `Ready` after.
/// A failed initial fetch stays in `Loading` with the error on display
/// and retry on `r`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationKind {
    Create,
    Update,
    Toggle,
    Delete,
}

impl MutationKind {
    pub fn progress_label(self) -> &'static str {
        match self {
            Self::Create => "Saving…",
            Self::Update | Self::Toggle => "Updating…",
            Self::Delete => "Deleting…",
        }
    }
}

/// At most one mutation is in flight at a time; further mutation keys
/// bounce with a notice until the result lands. This serializes the
/// rapid-double-click race instead of leaving its order undefined.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PendingMutation {
    pub kind: MutationKind,
    pub todo_id: Option<u64>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pane {
    Sidebar,
    List,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfirmSelection {
    Cancel,
    Delete,
}

#[derive(Clone, Debug)]
pub struct DeleteConfirmDialog {
    pub todo_id: u64,
    pub todo_title: String,
    pub due_label: String,
    pub selection: ConfirmSelection,
}

/// One row of the sidebar: a top-level group header or a due-date
/// bucket beneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SidebarEntry {
    Group(Group),
    DueDate {
        group: Group,
        label: String,
        count: usize,
    },
}

pub fn sidebar_entries(view: &ViewState) -> Vec<SidebarEntry> {
    let mut entries =
        Vec::with_capacity(2 + view.all_sections.len() + view.completed_sections.len());
    entries.push(SidebarEntry::Group(Group::All));
    for (label, count) in &view.all_sections {
        entries.push(SidebarEntry::DueDate {
            group: Group::All,
            label: label.clone(),
            count: *count,
        });
    }
    entries.push(SidebarEntry::Group(Group::Completed));
    for (label, count) in &view.completed_sections {
        entries.push(SidebarEntry::DueDate {
            group: Group::Completed,
            label: label.clone(),
            count: *count,
        });
    }
    entries
}

pub fn nav_for_entry(entry: &SidebarEntry) -> NavState {
    match entry {
        SidebarEntry::Group(group) => NavState {
            group: *group,
            due_label: None,
        },
        SidebarEntry::DueDate { group, label, .. } => NavState {
            group: *group,
            due_label: Some(label.clone()),
        },
    }
}

pub fn entry_matches_nav(entry: &SidebarEntry, nav: &NavState) -> bool {
    match entry {
        SidebarEntry::Group(group) => nav.due_label.is_none() && nav.group == *group,
        SidebarEntry::DueDate { group, label, .. } => {
            nav.group == *group && nav.due_label.as_deref() == Some(label.as_str())
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub todos: TodoList,
    pub nav: NavState,
    pub phase: Phase,
    pub load_error: Option<String>,
    pub pending: Option<PendingMutation>,
    pub fetch_in_flight: bool,
    pub freshness: Option<String>,
    pub last_sync: Option<time::OffsetDateTime>,
    pub focus: Pane,
    pub sidebar_selected: usize,
    pub list_selected: usize,
    pub form: Option<TodoForm>,
    pub delete_confirm: Option<DeleteConfirmDialog>,
    pub help_open: bool,
    pub notice: Option<String>,
    pub api_url: String,
}

impl AppModel {
    pub fn new(api_url: String) -> Self {
        Self {
            todos: TodoList::new(),
            nav: NavState::default(),
            phase: Phase::Loading,
            load_error: None,
            pending: None,
            fetch_in_flight: false,
            freshness: None,
            last_sync: None,
            focus: Pane::List,
            sidebar_selected: 0,
            list_selected: 0,
            form: None,
            delete_confirm: None,
            help_open: false,
            notice: None,
            api_url,
        }
    }

    /// Derived views are rebuilt from scratch on every call; nothing is
    /// cached across mutations.
    pub fn view_state(&self) -> ViewState {
        build_view_state(&self.todos, &self.nav)
    }

    pub fn selected_todo_id(&self) -> Option<u64> {
        self.view_state()
            .rows
            .get(self.list_selected)
            .map(|row| row.id)
    }

    /// Clamps both cursors after the underlying data changed.
    pub fn prune_selection(&mut self) {
        let view = self.view_state();
        let rows = view.rows.len();
        if self.list_selected >= rows {
            self.list_selected = rows.saturating_sub(1);
        }
        let entries = sidebar_entries(&view).len();
        if self.sidebar_selected >= entries {
            self.sidebar_selected = entries.saturating_sub(1);
        }
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Refresh,
    CreateTodo { draft: TodoDraft },
    UpdateTodo { id: u64, draft: TodoDraft },
    ToggleTodo { id: u64, draft: TodoDraft },
    DeleteTodo { id: u64 },
}

/// Outcome of a confirmed server mutation, as decoded from the
/// response. In-memory state only changes when one of these lands.
#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome {
    Created(TodoRecord),
    Updated(TodoRecord),
    Deleted { id: u64 },
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Paste(text) => update_on_paste(model, text),
    }
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;
    model.notice = None;

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return (model, AppCommand::Quit);
    }

    if model.help_open {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::F(1)
        ) {
            model.help_open = false;
        }
        return (model, AppCommand::None);
    }

    if model.delete_confirm.is_some() {
        return update_on_confirm_key(model, key);
    }

    if model.form.is_some() {
        return update_on_form_key(model, key);
    }

    match key.code {
        KeyCode::Char('q') => (model, AppCommand::Quit),
        KeyCode::Char('r') => (model, AppCommand::Refresh),
        KeyCode::Char('?') | KeyCode::F(1) => {
            model.help_open = true;
            (model, AppCommand::None)
        }
        _ if model.phase == Phase::Loading => (model, AppCommand::None),
        KeyCode::Char('n') | KeyCode::Char('a') => {
            model.form = Some(TodoForm::create());
            (model, AppCommand::None)
        }
        KeyCode::Tab => {
            model.focus = match model.focus {
                Pane::Sidebar => Pane::List,
                Pane::List => Pane::Sidebar,
            };
            (model, AppCommand::None)
        }
        KeyCode::Left | KeyCode::Char('h') => {
            model.focus = Pane::Sidebar;
            (model, AppCommand::None)
        }
        KeyCode::Right | KeyCode::Char('l') => {
            model.focus = Pane::List;
            (model, AppCommand::None)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(&mut model, -1);
            (model, AppCommand::None)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(&mut model, 1);
            (model, AppCommand::None)
        }
        KeyCode::Enter => match model.focus {
            Pane::Sidebar => {
                apply_sidebar_selection(&mut model);
                (model, AppCommand::None)
            }
            Pane::List => open_edit_form(model),
        },
        KeyCode::Char('e') => open_edit_form(model),
        KeyCode::Char(' ') => toggle_selected(model),
        KeyCode::Char('d') | KeyCode::Delete => open_delete_confirm(model),
        _ => (model, AppCommand::None),
    }
}

fn move_selection(model: &mut AppModel, delta: isize) {
    let view = model.view_state();
    let (selected, len) = match model.focus {
        Pane::Sidebar => (&mut model.sidebar_selected, sidebar_entries(&view).len()),
        Pane::List => (&mut model.list_selected, view.rows.len()),
    };
    if len == 0 {
        *selected = 0;
        return;
    }
    let next = selected.saturating_add_signed(delta);
    *selected = next.min(len - 1);
}

fn apply_sidebar_selection(model: &mut AppModel) {
    let view = model.view_state();
    let entries = sidebar_entries(&view);
    let Some(entry) = entries.get(model.sidebar_selected) else {
        return;
    };
    model.nav = nav_for_entry(entry);
    model.list_selected = 0;
}

fn open_edit_form(mut model: AppModel) -> (AppModel, AppCommand) {
    let Some(id) = model.selected_todo_id() else {
        model.notice = Some("No todo selected.".to_string());
        return (model, AppCommand::None);
    };
    match model.todos.fetch(id) {
        Ok(todo) => model.form = Some(TodoForm::edit(todo)),
        Err(error) => model.notice = Some(error.to_string()),
    }
    (model, AppCommand::None)
}

fn toggle_selected(mut model: AppModel) -> (AppModel, AppCommand) {
    if model.pending.is_some() {
        model.notice = Some(BUSY_NOTICE.to_string());
        return (model, AppCommand::None);
    }
    let Some(id) = model.selected_todo_id() else {
        model.notice = Some("No todo selected.".to_string());
        return (model, AppCommand::None);
    };
    match model.todos.fetch(id) {
        Ok(todo) => {
            let mut draft = todo.to_draft();
            draft.completed = !draft.completed;
            (model, AppCommand::ToggleTodo { id, draft })
        }
        Err(error) => {
            model.notice = Some(error.to_string());
            (model, AppCommand::None)
        }
    }
}

fn open_delete_confirm(mut model: AppModel) -> (AppModel, AppCommand) {
    if model.pending.is_some() {
        model.notice = Some(BUSY_NOTICE.to_string());
        return (model, AppCommand::None);
    }
    let Some(id) = model.selected_todo_id() else {
        model.notice = Some("No todo selected.".to_string());
        return (model, AppCommand::None);
    };
    match model.todos.fetch(id) {
        Ok(todo) => {
            model.delete_confirm = Some(DeleteConfirmDialog {
                todo_id: todo.id,
                todo_title: todo.title.clone(),
                due_label: todo.due_label(),
                selection: ConfirmSelection::Cancel,
            });
        }
        Err(error) => model.notice = Some(error.to_string()),
    }
    (model, AppCommand::None)
}

fn update_on_confirm_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(selection) = model.delete_confirm.as_ref().map(|confirm| confirm.selection) else {
        return (model, AppCommand::None);
    };

    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('n') => {
            model.delete_confirm = None;
            (model, AppCommand::None)
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(confirm) = model.delete_confirm.as_mut() {
                confirm.selection = ConfirmSelection::Cancel;
            }
            (model, AppCommand::None)
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(confirm) = model.delete_confirm.as_mut() {
                confirm.selection = ConfirmSelection::Delete;
            }
            (model, AppCommand::None)
        }
        KeyCode::Char('y') => confirm_delete(model),
        KeyCode::Enter => {
            if selection == ConfirmSelection::Delete {
                confirm_delete(model)
            } else {
                model.delete_confirm = None;
                (model, AppCommand::None)
            }
        }
        _ => (model, AppCommand::None),
    }
}

fn confirm_delete(mut model: AppModel) -> (AppModel, AppCommand) {
    let Some(confirm) = model.delete_confirm.take() else {
        return (model, AppCommand::None);
    };
    if model.pending.is_some() {
        model.notice = Some(BUSY_NOTICE.to_string());
        return (model, AppCommand::None);
    }
    (
        model,
        AppCommand::DeleteTodo {
            id: confirm.todo_id,
        },
    )
}

fn update_on_form_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(form) = model.form.as_mut() else {
        return (model, AppCommand::None);
    };

    if key.code == KeyCode::Esc {
        model.form = None;
        return (model, AppCommand::None);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        if model.pending.is_some() {
            model.notice = Some(BUSY_NOTICE.to_string());
            return (model, AppCommand::None);
        }
        let target = form.target;
        let Some(draft) = form.submit() else {
            return (model, AppCommand::None);
        };
        // The form stays open until the server confirms; failure keeps
        // the user's input intact.
        let command = match target {
            FormTarget::Create => AppCommand::CreateTodo { draft },
            FormTarget::Edit { id } => AppCommand::UpdateTodo { id, draft },
        };
        return (model, command);
    }

    match key.code {
        KeyCode::Tab => form.focus_next(),
        KeyCode::BackTab => form.focus_prev(),
        _ => match form.focus {
            FormField::Completed => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => form.toggle_completed(),
                KeyCode::Up => form.focus_prev(),
                KeyCode::Down => form.focus_next(),
                _ => {}
            },
            FormField::Description => {
                let editor = &mut form.description;
                match key.code {
                    KeyCode::Enter => editor.insert_newline(),
                    KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        editor.insert_char(ch)
                    }
                    KeyCode::Backspace => editor.backspace(),
                    KeyCode::Delete => editor.delete_forward(),
                    KeyCode::Left => editor.move_left(),
                    KeyCode::Right => editor.move_right(),
                    KeyCode::Up => editor.move_up(),
                    KeyCode::Down => editor.move_down(),
                    KeyCode::Home => editor.move_home(),
                    KeyCode::End => editor.move_end(),
                    _ => {}
                }
            }
            FormField::Title | FormField::Day | FormField::Month | FormField::Year => {
                match key.code {
                    KeyCode::Enter | KeyCode::Down => form.focus_next(),
                    KeyCode::Up => form.focus_prev(),
                    code => {
                        let editor = match form.focus {
                            FormField::Day => &mut form.day,
                            FormField::Month => &mut form.month,
                            FormField::Year => &mut form.year,
                            _ => &mut form.title,
                        };
                        match code {
                            KeyCode::Char(ch)
                                if !key.modifiers.contains(KeyModifiers::CONTROL) =>
                            {
                                editor.insert_char(ch)
                            }
                            KeyCode::Backspace => editor.backspace(),
                            KeyCode::Delete => editor.delete_forward(),
                            KeyCode::Left => editor.move_left(),
                            KeyCode::Right => editor.move_right(),
                            KeyCode::Home => editor.move_home(),
                            KeyCode::End => editor.move_end(),
                            _ => {}
                        }
                    }
                }
            }
        },
    }

    (model, AppCommand::None)
}

fn update_on_paste(mut model: AppModel, text: String) -> (AppModel, AppCommand) {
    if let Some(form) = model.form.as_mut() {
        match form.focus {
            FormField::Title => form.title.insert_str(&text),
            FormField::Day => form.day.insert_str(&text),
            FormField::Month => form.month.insert_str(&text),
            FormField::Year => form.year.insert_str(&text),
            FormField::Description => form.description.insert_str(&text),
            FormField::Completed => {}
        }
    }
    (model, AppCommand::None)
}

/// Installs a list fetch result. Navigation survives a refresh; only a
/// successful create resets it.
pub fn apply_load_result(model: &mut AppModel, result: Result<TodoListing, String>) {
    match result {
        Ok(listing) => {
            model.todos.replace_all(listing.records);
            model.freshness = listing.freshness;
            model.phase = Phase::Ready;
            model.load_error = None;
            model.prune_selection();
        }
        Err(error) => {
            tracing::warn!(%error, "todo list fetch failed");
            if model.phase == Phase::Loading {
                model.load_error = Some(error);
            } else {
                model.notice = Some(format!("Refresh failed: {error}"));
            }
        }
    }
}

/// Installs a mutation result. On failure nothing is applied: the
/// collection, the form, and the rendered counts stay as they were.
pub fn apply_mutation_result(
    model: &mut AppModel,
    kind: MutationKind,
    result: Result<MutationOutcome, String>,
) {
    model.pending = None;
    match result {
        Ok(MutationOutcome::Created(record)) => {
            let title = record.title.clone();
            model.todos.add(record);
            model.nav = NavState::default();
            model.form = None;
            model.sidebar_selected = 0;
            model.list_selected = 0;
            model.notice = Some(format!("Added \"{title}\"."));
            model.prune_selection();
        }
        Ok(MutationOutcome::Updated(record)) => {
            let id = record.id;
            match model.todos.apply_record(record) {
                Ok(_) => {
                    let editing_this = matches!(
                        model.form.as_ref().map(|form| form.target),
                        Some(FormTarget::Edit { id: target }) if target == id
                    );
                    if editing_this {
                        model.form = None;
                    }
                }
                Err(error) => {
                    // A refresh removed the todo while the PUT was in
                    // flight; the next refresh settles it.
                    tracing::warn!(%error, "updated todo vanished locally");
                    model.notice = Some(error.to_string());
                }
            }
            model.prune_selection();
        }
        Ok(MutationOutcome::Deleted { id }) => {
            model.todos.remove(id);
            model.prune_selection();
        }
        Err(error) => {
            tracing::warn!(%error, mutation = ?kind, "mutation failed");
            model.notice = Some(format!("Request failed: {error}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NO_DUE_DATE;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(ch: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn record(id: u64, title: &str, month: Option<&str>, year: Option<&str>, completed: bool) -> TodoRecord {
        TodoRecord {
            id,
            title: title.to_string(),
            day: None,
            month: month.map(str::to_string),
            year: year.map(str::to_string),
            completed,
            description: String::new(),
        }
    }

    fn ready_model() -> AppModel {
        let mut model = AppModel::new("http://localhost:3000/api".to_string());
        apply_load_result(
            &mut model,
            Ok(TodoListing {
                records: vec![
                    record(1, "file taxes", Some("04"), Some("2019"), false),
                    record(2, "book flights", Some("04"), Some("2019"), true),
                    record(3, "renew passport", Some("05"), Some("2019"), false),
                ],
                freshness: Some("\"v1\"".to_string()),
            }),
        );
        model
    }

    #[test]
    fn load_result_moves_the_model_to_ready() {
        let model = ready_model();
        assert_eq!(model.phase, Phase::Ready);
        assert_eq!(model.todos.len(), 3);
        assert_eq!(model.freshness.as_deref(), Some("\"v1\""));
    }

    #[test]
    fn failed_initial_load_stays_on_the_placeholder() {
        let mut model = AppModel::new("http://localhost:3000/api".to_string());
        apply_load_result(&mut model, Err("connection refused".to_string()));
        assert_eq!(model.phase, Phase::Loading);
        assert_eq!(model.load_error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn n_opens_the_create_form() {
        let (model, command) = update(ready_model(), key(KeyCode::Char('n')));
        assert_eq!(command, AppCommand::None);
        let form = model.form.expect("form open");
        assert_eq!(form.target, FormTarget::Create);
    }

    #[test]
    fn short_title_submit_produces_no_command() {
        let mut model = ready_model();
        model.form = Some(TodoForm::create());
        let (model, _) = update(model, key(KeyCode::Char('a')));
        let (model, _) = update(model, key(KeyCode::Char('b')));
        let (model, command) = update(model, ctrl('s'));

        // The validation gate fires before any network command exists.
        assert_eq!(command, AppCommand::None);
        let form = model.form.expect("form still open");
        assert!(form.error.is_some());
    }

    #[test]
    fn valid_submit_emits_a_create_command_and_keeps_the_form() {
        let mut model = ready_model();
        let mut form = TodoForm::create();
        form.title.insert_str("water plants");
        model.form = Some(form);
        let (model, command) = update(model, ctrl('s'));

        match command {
            AppCommand::CreateTodo { draft } => assert_eq!(draft.title, "water plants"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(model.form.is_some());
    }

    #[test]
    fn successful_create_appends_and_resets_navigation() {
        let mut model = ready_model();
        model.nav = NavState {
            group: Group::Completed,
            due_label: Some("04/19".to_string()),
        };
        model.form = Some(TodoForm::create());
        apply_mutation_result(
            &mut model,
            MutationKind::Create,
            Ok(MutationOutcome::Created(record(9, "water plants", None, None, false))),
        );

        assert_eq!(model.nav, NavState::default());
        assert!(model.form.is_none());
        assert!(model.todos.fetch(9).is_ok());
        assert_eq!(model.todos.fetch(9).unwrap().due_label(), NO_DUE_DATE);
    }

    #[test]
    fn toggle_emits_a_put_with_the_flipped_flag() {
        let model = ready_model();
        let (_, command) = update(model, key(KeyCode::Char(' ')));
        match command {
            AppCommand::ToggleTodo { id, draft } => {
                assert_eq!(id, 1);
                assert!(draft.completed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mutations_are_serialized_while_one_is_pending() {
        let mut model = ready_model();
        model.pending = Some(PendingMutation {
            kind: MutationKind::Toggle,
            todo_id: Some(1),
        });
        let (model, command) = update(model, key(KeyCode::Char(' ')));
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.notice.as_deref(), Some(BUSY_NOTICE));
    }

    #[test]
    fn delete_requires_confirmation() {
        let (model, command) = update(ready_model(), key(KeyCode::Char('d')));
        assert_eq!(command, AppCommand::None);
        let confirm = model.delete_confirm.clone().expect("dialog open");
        assert_eq!(confirm.todo_id, 1);
        assert_eq!(confirm.selection, ConfirmSelection::Cancel);

        // Enter on the default (Cancel) closes without a command.
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::None);
        assert!(model.delete_confirm.is_none());
    }

    #[test]
    fn confirmed_delete_emits_the_command() {
        let (model, _) = update(ready_model(), key(KeyCode::Char('d')));
        let (model, _) = update(model, key(KeyCode::Right));
        let (model, command) = update(model, key(KeyCode::Enter));
        assert_eq!(command, AppCommand::DeleteTodo { id: 1 });
        assert!(model.delete_confirm.is_none());
    }

    #[test]
    fn failed_delete_leaves_the_collection_and_counts_alone() {
        let mut model = ready_model();
        let before = model.view_state();
        apply_mutation_result(
            &mut model,
            MutationKind::Delete,
            Err("500 from server".to_string()),
        );

        assert_eq!(model.todos.len(), 3);
        assert!(model.todos.fetch(1).is_ok());
        let after = model.view_state();
        assert_eq!(before.rows, after.rows);
        assert_eq!(before.all_sections, after.all_sections);
        assert!(model.notice.as_deref().unwrap_or("").contains("500"));
    }

    #[test]
    fn confirmed_delete_applies_only_after_the_server_says_so() {
        let mut model = ready_model();
        apply_mutation_result(
            &mut model,
            MutationKind::Delete,
            Ok(MutationOutcome::Deleted { id: 2 }),
        );
        assert_eq!(model.todos.len(), 2);
        assert!(model.todos.fetch(2).is_err());
    }

    #[test]
    fn sidebar_enter_applies_the_navigation_selection() {
        let mut model = ready_model();
        model.focus = Pane::Sidebar;
        // Entries: All, 04/19, 05/19, Completed, 04/19.
        model.sidebar_selected = 3;
        let (model, _) = update(model, key(KeyCode::Enter));
        assert_eq!(model.nav.group, Group::Completed);
        assert_eq!(model.nav.due_label, None);
        assert_eq!(model.view_state().rows.len(), 1);
    }

    #[test]
    fn sidebar_entries_cover_both_groups() {
        let model = ready_model();
        let view = model.view_state();
        let entries = sidebar_entries(&view);
        assert_eq!(entries.len(), 5);
        assert!(entry_matches_nav(&entries[0], &NavState::default()));
        assert!(!entry_matches_nav(&entries[3], &NavState::default()));
    }

    #[test]
    fn refresh_failure_after_ready_is_a_notice_not_a_reset() {
        let mut model = ready_model();
        apply_load_result(&mut model, Err("timed out".to_string()));
        assert_eq!(model.phase, Phase::Ready);
        assert_eq!(model.todos.len(), 3);
        assert!(model.notice.as_deref().unwrap_or("").contains("timed out"));
    }

    #[test]
    fn refresh_preserves_navigation_and_prunes_selection() {
        let mut model = ready_model();
        model.nav = NavState {
            group: Group::All,
            due_label: Some("05/19".to_string()),
        };
        model.list_selected = 0;
        apply_load_result(
            &mut model,
            Ok(TodoListing {
                records: vec![record(1, "file taxes", Some("04"), Some("2019"), false)],
                freshness: Some("\"v2\"".to_string()),
            }),
        );

        // The bucket vanished; the heading survives, rows are empty,
        // and nothing panics.
        assert_eq!(model.nav.due_label.as_deref(), Some("05/19"));
        assert!(model.view_state().rows.is_empty());
        assert_eq!(model.freshness.as_deref(), Some("\"v2\""));
    }

    #[test]
    fn any_key_clears_the_previous_notice() {
        let mut model = ready_model();
        model.notice = Some("stale notice".to_string());
        let (model, _) = update(model, key(KeyCode::Down));
        assert_eq!(model.notice, None);
    }

    #[test]
    fn escape_discards_the_form() {
        let mut model = ready_model();
        let mut form = TodoForm::create();
        form.title.insert_str("half-typed");
        model.form = Some(form);
        let (model, _) = update(model, key(KeyCode::Esc));
        assert!(model.form.is_none());
        assert_eq!(model.todos.len(), 3);
    }
}
