use crate::domain::list::{TodoFilter, TodoList};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Group {
    #[default]
    All,
    Completed,
}

impl Group {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Todos",
            Self::Completed => "Completed",
        }
    }
}

/// Current navigation selection. Together with the collection this
/// fully determines what gets rendered.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NavState {
    pub group: Group,
    pub due_label: Option<String>,
}

impl NavState {
    pub fn to_filter(&self) -> TodoFilter {
        TodoFilter {
            completed: match self.group {
                Group::All => None,
                Group::Completed => Some(true),
            },
            due_label: self.due_label.clone(),
        }
    }
}

/// One renderable line of the main list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TodoRow {
    pub id: u64,
    pub title: String,
    pub due_label: String,
    pub completed: bool,
}

/// Everything the renderer needs for one frame, recomputed from
/// scratch on every render. Nothing here survives a mutation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewState {
    pub heading: String,
    pub rows: Vec<TodoRow>,
    pub all_total: usize,
    pub completed_total: usize,
    pub all_sections: Vec<(String, usize)>,
    pub completed_sections: Vec<(String, usize)>,
}

pub fn build_view_state(list: &TodoList, nav: &NavState) -> ViewState {
    let heading = nav
        .due_label
        .clone()
        .unwrap_or_else(|| nav.group.label().to_string());

    // A selection pointing at a vanished date bucket simply yields an
    // empty row set; the sidebar highlight is skipped, never an error.
    let mut rows: Vec<TodoRow> = list
        .filter(&nav.to_filter())
        .into_iter()
        .map(|todo| TodoRow {
            id: todo.id,
            title: todo.title.clone(),
            due_label: todo.due_label(),
            completed: todo.completed,
        })
        .collect();
    rows.sort_by_key(|row| row.completed);

    ViewState {
        heading,
        rows,
        all_total: list.len(),
        completed_total: list.completed_count(),
        all_sections: list.all_due_dates(),
        completed_sections: list.completed_due_dates(),
    }
}
