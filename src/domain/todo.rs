use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NO_DUE_DATE: &str = "No Due Date";
pub const MIN_TITLE_CHARS: usize = 3;

/// Wire shape of a todo record as the API sends and receives it.
/// The due-date label never crosses the wire; it is derived locally.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TodoRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub description: String,
}

/// Outgoing body for create/update calls. The server assigns the id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct TodoDraft {
    pub title: String,
    pub day: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub completed: bool,
    pub description: String,
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DraftError {
    #[error("title must be at least {MIN_TITLE_CHARS} characters long")]
    TitleTooShort,

    #[error("month must be two digits (e.g. 04)")]
    MonthFormat,
}

/// Client-side validation, applied before any network call is made.
pub fn validate_draft(draft: &TodoDraft) -> Result<(), DraftError> {
    if draft.title.trim().chars().count() < MIN_TITLE_CHARS {
        return Err(DraftError::TitleTooShort);
    }

    if let Some(month) = draft.month.as_deref() {
        let month = month.trim();
        if !month.is_empty()
            && (month.len() != 2 || !month.bytes().all(|byte| byte.is_ascii_digit()))
        {
            return Err(DraftError::MonthFormat);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub day: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub completed: bool,
    pub description: String,
}

impl Todo {
    pub fn from_record(record: TodoRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            day: record.day,
            month: record.month,
            year: record.year,
            completed: record.completed,
            description: record.description,
        }
    }

    /// Derived display label; recomputed on demand so it can never go
    /// stale relative to month/year.
    pub fn due_label(&self) -> String {
        due_date_label(self.month.as_deref(), self.year.as_deref())
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    /// Full field replacement from a submitted draft. The id is the
    /// only field an update cannot touch.
    pub fn update(&mut self, draft: &TodoDraft) {
        self.title = draft.title.clone();
        self.day = draft.day.clone();
        self.month = draft.month.clone();
        self.year = draft.year.clone();
        self.completed = draft.completed;
        self.description = draft.description.clone();
    }

    /// Full field replacement from a server-returned record.
    pub fn apply_record(&mut self, record: TodoRecord) {
        self.title = record.title;
        self.day = record.day;
        self.month = record.month;
        self.year = record.year;
        self.completed = record.completed;
        self.description = record.description;
    }

    pub fn to_draft(&self) -> TodoDraft {
        TodoDraft {
            title: self.title.clone(),
            day: self.day.clone(),
            month: self.month.clone(),
            year: self.year.clone(),
            completed: self.completed,
            description: self.description.clone(),
        }
    }
}

/// `"{month}/{last two digits of year}"` when both parts are present
/// and non-empty, else the sentinel. `day` never participates.
pub fn due_date_label(month: Option<&str>, year: Option<&str>) -> String {
    let month = month.unwrap_or("").trim();
    let year = year.unwrap_or("").trim();
    if month.is_empty() || year.is_empty() {
        return NO_DUE_DATE.to_string();
    }

    let year_chars = year.chars().count();
    let short_year: String = year.chars().skip(year_chars.saturating_sub(2)).collect();
    format!("{month}/{short_year}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, month: Option<&str>, year: Option<&str>, completed: bool) -> TodoRecord {
        TodoRecord {
            id,
            title: format!("todo {id}"),
            day: None,
            month: month.map(str::to_string),
            year: year.map(str::to_string),
            completed,
            description: String::new(),
        }
    }

    #[test]
    fn due_date_label_joins_month_and_two_digit_year() {
        assert_eq!(due_date_label(Some("04"), Some("2019")), "04/19");
        assert_eq!(due_date_label(Some("12"), Some("19")), "12/19");
    }

    #[test]
    fn due_date_label_falls_back_to_sentinel() {
        assert_eq!(due_date_label(None, Some("2019")), NO_DUE_DATE);
        assert_eq!(due_date_label(Some("04"), None), NO_DUE_DATE);
        assert_eq!(due_date_label(Some(""), Some("2019")), NO_DUE_DATE);
        assert_eq!(due_date_label(None, None), NO_DUE_DATE);
    }

    #[test]
    fn toggle_twice_is_an_involution() {
        let mut todo = Todo::from_record(record(1, None, None, false));
        todo.toggle();
        assert!(todo.completed);
        todo.toggle();
        assert!(!todo.completed);
    }

    #[test]
    fn complete_is_unconditional() {
        let mut todo = Todo::from_record(record(1, None, None, true));
        todo.complete();
        assert!(todo.completed);
    }

    #[test]
    fn update_rederives_the_due_label() {
        let mut todo = Todo::from_record(record(1, Some("04"), Some("2019"), false));
        assert_eq!(todo.due_label(), "04/19");

        let mut draft = todo.to_draft();
        draft.month = Some("05".to_string());
        draft.year = Some("2020".to_string());
        todo.update(&draft);
        assert_eq!(todo.due_label(), "05/20");

        draft.year = None;
        todo.update(&draft);
        assert_eq!(todo.due_label(), NO_DUE_DATE);
    }

    #[test]
    fn validate_draft_rejects_short_titles() {
        let draft = TodoDraft {
            title: "ab".to_string(),
            ..TodoDraft::default()
        };
        assert_eq!(validate_draft(&draft), Err(DraftError::TitleTooShort));

        let draft = TodoDraft {
            title: "  ab  ".to_string(),
            ..TodoDraft::default()
        };
        assert_eq!(validate_draft(&draft), Err(DraftError::TitleTooShort));
    }

    #[test]
    fn validate_draft_requires_two_digit_months() {
        let base = TodoDraft {
            title: "water plants".to_string(),
            ..TodoDraft::default()
        };

        for bad in ["4", "004", "4a", "ap"] {
            let draft = TodoDraft {
                month: Some(bad.to_string()),
                ..base.clone()
            };
            assert_eq!(validate_draft(&draft), Err(DraftError::MonthFormat), "{bad}");
        }

        let draft = TodoDraft {
            month: Some("04".to_string()),
            ..base.clone()
        };
        assert_eq!(validate_draft(&draft), Ok(()));

        // An absent or empty month is valid: the todo simply has no due date.
        assert_eq!(validate_draft(&base), Ok(()));
    }

    #[test]
    fn record_decodes_with_null_date_parts() {
        let raw = r#"{"id":7,"title":"pay rent","day":null,"month":"06","year":null,"completed":false,"description":""}"#;
        let record: TodoRecord = serde_json::from_str(raw).expect("decode");
        assert_eq!(record.id, 7);
        assert_eq!(record.month.as_deref(), Some("06"));
        assert_eq!(record.year, None);
        let todo = Todo::from_record(record);
        assert_eq!(todo.due_label(), NO_DUE_DATE);
    }
}
