use crate::domain::todo::{NO_DUE_DATE, Todo, TodoDraft, TodoRecord};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("todo not found: id {0}")]
pub struct TodoNotFound(pub u64);

/// Optional predicates composed by intersection. An empty filter
/// matches every todo.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub due_label: Option<String>,
}

impl TodoFilter {
    fn matches(&self, todo: &Todo) -> bool {
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        if let Some(due_label) = self.due_label.as_deref() {
            if todo.due_label() != due_label {
                return false;
            }
        }
        true
    }
}

/// The in-memory collection. Order follows the server; id uniqueness
/// is trusted from server responses.
#[derive(Clone, Debug, Default)]
pub struct TodoList {
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TodoRecord>) -> Self {
        Self {
            todos: records.into_iter().map(Todo::from_record).collect(),
        }
    }

    pub fn replace_all(&mut self, records: Vec<TodoRecord>) {
        self.todos = records.into_iter().map(Todo::from_record).collect();
    }

    pub fn add(&mut self, record: TodoRecord) -> &Todo {
        self.todos.push(Todo::from_record(record));
        let index = self.todos.len() - 1;
        &self.todos[index]
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.todos.iter()
    }

    pub fn fetch(&self, id: u64) -> Result<&Todo, TodoNotFound> {
        self.todos
            .iter()
            .find(|todo| todo.id == id)
            .ok_or(TodoNotFound(id))
    }

    fn fetch_mut(&mut self, id: u64) -> Result<&mut Todo, TodoNotFound> {
        self.todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(TodoNotFound(id))
    }

    pub fn toggle(&mut self, id: u64) -> Result<&Todo, TodoNotFound> {
        let todo = self.fetch_mut(id)?;
        todo.toggle();
        Ok(todo)
    }

    pub fn complete(&mut self, id: u64) -> Result<&Todo, TodoNotFound> {
        let todo = self.fetch_mut(id)?;
        todo.complete();
        Ok(todo)
    }

    pub fn update(&mut self, id: u64, draft: &TodoDraft) -> Result<&Todo, TodoNotFound> {
        let todo = self.fetch_mut(id)?;
        todo.update(draft);
        Ok(todo)
    }

    /// Installs a server-returned record over the matching todo,
    /// replacing every field rather than merging.
    pub fn apply_record(&mut self, record: TodoRecord) -> Result<&Todo, TodoNotFound> {
        let todo = self.fetch_mut(record.id)?;
        todo.apply_record(record);
        Ok(todo)
    }

    /// No-op when the id is absent; removal only happens after the
    /// server confirmed a delete, so a miss means a refresh won the race.
    pub fn remove(&mut self, id: u64) {
        self.todos.retain(|todo| todo.id != id);
    }

    pub fn filter(&self, filter: &TodoFilter) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| filter.matches(todo)).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    /// Due-label -> count over all todos. The sequence is ordered for
    /// the sidebar (sentinel first, then year/month ascending); the
    /// counts themselves are order-independent.
    pub fn all_due_dates(&self) -> Vec<(String, usize)> {
        due_date_counts(self.todos.iter())
    }

    /// Like `all_due_dates`, restricted to completed todos.
    pub fn completed_due_dates(&self) -> Vec<(String, usize)> {
        due_date_counts(self.todos.iter().filter(|todo| todo.completed))
    }
}

fn due_date_counts<'a>(todos: impl Iterator<Item = &'a Todo>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for todo in todos {
        let label = todo.due_label();
        match counts.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }
    counts.sort_by(|(a, _), (b, _)| compare_due_labels(a, b));
    counts
}

fn compare_due_labels(a: &str, b: &str) -> Ordering {
    match (a == NO_DUE_DATE, b == NO_DUE_DATE) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let (a_month, a_year) = split_label(a);
            let (b_month, b_year) = split_label(b);
            a_year
                .cmp(&b_year)
                .then(a_month.cmp(&b_month))
                .then_with(|| a.cmp(b))
        }
    }
}

fn split_label(label: &str) -> (u32, u32) {
    let (month, year) = label.split_once('/').unwrap_or((label, ""));
    (
        month.parse::<u32>().unwrap_or(u32::MAX),
        year.parse::<u32>().unwrap_or(u32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: u64,
        title: &str,
        month: Option<&str>,
        year: Option<&str>,
        completed: bool,
    ) -> TodoRecord {
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

    fn sample_list() -> TodoList {
        TodoList::from_records(vec![
            record(1, "file taxes", Some("04"), Some("2019"), false),
            record(2, "book flights", Some("04"), Some("2019"), true),
            record(3, "renew passport", Some("05"), Some("2019"), false),
        ])
    }

    #[test]
    fn add_then_fetch_returns_the_added_todo() {
        let mut list = TodoList::new();
        list.add(record(9, "water plants", None, None, false));
        let todo = list.fetch(9).expect("present");
        assert_eq!(todo.title, "water plants");
        assert_eq!(todo.due_label(), NO_DUE_DATE);
    }

    #[test]
    fn remove_then_fetch_is_not_found() {
        let mut list = sample_list();
        list.remove(2);
        assert_eq!(list.fetch(2), Err(TodoNotFound(2)));
        assert_eq!(list.len(), 2);

        // Removing an absent id stays a silent no-op.
        list.remove(2);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn mutations_on_missing_ids_fail_explicitly() {
        let mut list = sample_list();
        assert_eq!(list.toggle(42).unwrap_err(), TodoNotFound(42));
        assert_eq!(list.complete(42).unwrap_err(), TodoNotFound(42));
        let draft = TodoDraft {
            title: "anything".to_string(),
            ..TodoDraft::default()
        };
        assert_eq!(list.update(42, &draft).unwrap_err(), TodoNotFound(42));
    }

    #[test]
    fn apply_record_replaces_every_field() {
        let mut list = sample_list();
        let replacement = TodoRecord {
            description: "rebooked".to_string(),
            ..record(2, "book trains", Some("06"), Some("2020"), false)
        };
        let todo = list.apply_record(replacement).expect("present");
        assert_eq!(todo.title, "book trains");
        assert_eq!(todo.due_label(), "06/20");
        assert!(!todo.completed);
        assert_eq!(todo.description, "rebooked");
    }

    #[test]
    fn filter_composes_predicates_by_intersection() {
        let mut list = sample_list();
        // Cover all four combinations of completed x matching-date.
        list.add(record(4, "send invites", Some("05"), Some("2019"), true));

        let filter = TodoFilter {
            completed: Some(true),
            due_label: Some("04/19".to_string()),
        };
        let matched = list.filter(&filter);
        assert_eq!(matched.iter().map(|todo| todo.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn empty_filter_returns_everything() {
        let list = sample_list();
        assert_eq!(list.filter(&TodoFilter::default()).len(), 3);
    }

    #[test]
    fn date_only_filter_matches_both_completion_states() {
        let list = sample_list();
        let filter = TodoFilter {
            completed: None,
            due_label: Some("04/19".to_string()),
        };
        let ids: Vec<u64> = list.filter(&filter).iter().map(|todo| todo.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn due_date_counts_group_by_label_for_all_and_completed() {
        let list = sample_list();
        assert_eq!(
            list.all_due_dates(),
            vec![("04/19".to_string(), 2), ("05/19".to_string(), 1)]
        );
        assert_eq!(list.completed_due_dates(), vec![("04/19".to_string(), 1)]);
    }

    #[test]
    fn counts_sum_to_totals_and_completed_never_exceeds_all() {
        let mut list = sample_list();
        list.add(record(5, "no date yet", None, None, true));

        let all = list.all_due_dates();
        let completed = list.completed_due_dates();
        assert_eq!(all.iter().map(|(_, count)| count).sum::<usize>(), list.len());
        assert_eq!(
            completed.iter().map(|(_, count)| count).sum::<usize>(),
            list.completed_count()
        );
        for (label, count) in &completed {
            let all_count = all
                .iter()
                .find(|(all_label, _)| all_label == label)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            assert!(*count <= all_count, "{label}");
        }
    }

    #[test]
    fn counts_include_the_sentinel_bucket_first() {
        let mut list = sample_list();
        list.add(record(6, "someday", None, None, false));
        let all = list.all_due_dates();
        assert_eq!(all[0], (NO_DUE_DATE.to_string(), 1));
    }

    #[test]
    fn due_label_ordering_is_year_then_month() {
        let list = TodoList::from_records(vec![
            record(1, "a", Some("12"), Some("2019"), false),
            record(2, "b", Some("01"), Some("2020"), false),
            record(3, "c", Some("04"), Some("2019"), false),
        ]);
        let labels: Vec<String> = list
            .all_due_dates()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["04/19", "12/19", "01/20"]);
    }
}
