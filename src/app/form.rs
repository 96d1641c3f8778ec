use crate::app::line_editor::LineEditor;
use crate::app::text_editor::TextEditor;
use crate::domain::{DraftError, Todo, TodoDraft, validate_draft};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormTarget {
    Create,
    Edit { id: u64 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormField {
    Title,
    Day,
    Month,
    Year,
    Completed,
    Description,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Day => "Day",
            Self::Month => "Month",
            Self::Year => "Year",
            Self::Completed => "Completed",
            Self::Description => "Description",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Title => Self::Day,
            Self::Day => Self::Month,
            Self::Month => Self::Year,
            Self::Year => Self::Completed,
            Self::Completed => Self::Description,
            Self::Description => Self::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Day => Self::Title,
            Self::Month => Self::Day,
            Self::Year => Self::Month,
            Self::Completed => Self::Year,
            Self::Description => Self::Completed,
        }
    }
}

/// The modal create/edit form. This is a scratch buffer: nothing in it
/// touches the collection until the server confirms the submit, and a
/// refresh landing mid-edit never touches it.
#[derive(Clone, Debug)]
pub struct TodoForm {
    pub target: FormTarget,
    pub title: LineEditor,
    pub day: LineEditor,
    pub month: LineEditor,
    pub year: LineEditor,
    pub completed: bool,
    pub description: TextEditor,
    pub focus: FormField,
    pub error: Option<DraftError>,
}

impl TodoForm {
    pub fn create() -> Self {
        Self {
            target: FormTarget::Create,
            title: LineEditor::text_input(),
            day: LineEditor::digit_input(2),
            month: LineEditor::digit_input(2),
            year: LineEditor::digit_input(4),
            completed: false,
            description: TextEditor::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            target: FormTarget::Edit { id: todo.id },
            title: LineEditor::text_input().with_text(&todo.title),
            day: LineEditor::digit_input(2).with_text(todo.day.as_deref().unwrap_or("")),
            month: LineEditor::digit_input(2).with_text(todo.month.as_deref().unwrap_or("")),
            year: LineEditor::digit_input(4).with_text(todo.year.as_deref().unwrap_or("")),
            completed: todo.completed,
            description: TextEditor::with_text(&todo.description),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn title_text(&self) -> &'static str {
        match self.target {
            FormTarget::Create => "New Todo",
            FormTarget::Edit { .. } => "Edit Todo",
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Serializes the fields into the wire draft. Empty date parts
    /// become null, matching what the API expects.
    pub fn draft(&self) -> TodoDraft {
        TodoDraft {
            title: self.title.text.trim().to_string(),
            day: optional_field(&self.day.text),
            month: optional_field(&self.month.text),
            year: optional_field(&self.year.text),
            completed: self.completed,
            description: self.description.text().trim_end().to_string(),
        }
    }

    /// Validation gate in front of the network: a violation pins the
    /// specific rule on the form and produces no draft at all.
    pub fn submit(&mut self) -> Option<TodoDraft> {
        let draft = self.draft();
        match validate_draft(&draft) {
            Ok(()) => {
                self.error = None;
                Some(draft)
            }
            Err(error) => {
                self.error = Some(error);
                None
            }
        }
    }
}

fn optional_field(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
