//! Navigation state and the store that owns it.
//!
//! `SelectionStore` is the only writer of `NavigationState`. Every public
//! mutation restores all invariants before returning; callers only ever
//! observe consistent snapshots.

use crate::model::{Pane, SelectOption};
use crate::workspace::{DetailLevel, WorkspaceAction};

/// Which counter a load is tagged with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Projects,
    Repositories,
    Details,
}

/// Monotonic counters used to spot superseded async results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadGeneration {
    pub projects: u64,
    pub repositories: u64,
    pub details: u64,
}

impl LoadGeneration {
    pub fn get(&self, kind: LoadKind) -> u64 {
        match kind {
            LoadKind::Projects => self.projects,
            LoadKind::Repositories => self.repositories,
            LoadKind::Details => self.details,
        }
    }

    fn bump(&mut self, kind: LoadKind) -> u64 {
        let counter = match kind {
            LoadKind::Projects => &mut self.projects,
            LoadKind::Repositories => &mut self.repositories,
            LoadKind::Details => &mut self.details,
        };
        *counter += 1;
        *counter
    }
}

/// Result panel of the last invoked workspace action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDetails {
    pub action: WorkspaceAction,
    pub repository_id: String,
    pub level: DetailLevel,
    pub rows: Vec<SelectOption>,
    pub cursor: usize,
    /// Navigation goes to the rows rather than the action list
    pub focused: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Levels above the current one, innermost last
    pub trail: Vec<DetailFrame>,
}

/// A level left behind by drilling deeper, restored on the way back up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailFrame {
    pub level: DetailLevel,
    pub rows: Vec<SelectOption>,
    pub cursor: usize,
}

impl ActionDetails {
    pub fn highlighted_row(&self) -> Option<&SelectOption> {
        self.rows.get(self.cursor)
    }

    /// Titles from the action down to the current level
    pub fn breadcrumb(&self) -> String {
        self.trail
            .iter()
            .map(|frame| frame.level)
            .chain(std::iter::once(self.level))
            .map(|level| level.title(self.action))
            .collect::<Vec<_>>()
            .join(" › ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub focused_pane: Pane,

    pub projects: Vec<SelectOption>,
    pub selected_project_index: Option<usize>,
    pub project_cursor: usize,
    pub projects_error: Option<String>,
    pub projects_loading: bool,

    pub repositories: Vec<SelectOption>,
    pub selected_repo_index: Option<usize>,
    pub repo_cursor: usize,
    pub repositories_error: Option<String>,
    pub repositories_loading: bool,

    pub workspace_options: Vec<SelectOption>,
    /// Highlighted workspace action; `None` outside workspace mode
    pub selected_workspace_index: Option<usize>,
    pub in_workspace: bool,

    pub details: Option<ActionDetails>,

    pub load_generation: LoadGeneration,
}

impl NavigationState {
    pub fn selected_project(&self) -> Option<&SelectOption> {
        self.selected_project_index.and_then(|i| self.projects.get(i))
    }

    pub fn selected_repository(&self) -> Option<&SelectOption> {
        self.selected_repo_index.and_then(|i| self.repositories.get(i))
    }

    pub fn selected_workspace_option(&self) -> Option<&SelectOption> {
        self.selected_workspace_index
            .and_then(|i| self.workspace_options.get(i))
    }

    /// Highlight position for a pane, if its list has anything to point at
    pub fn cursor(&self, pane: Pane) -> Option<usize> {
        match pane {
            Pane::Projects => (!self.projects.is_empty()).then_some(self.project_cursor),
            Pane::Repositories => (!self.repositories.is_empty()).then_some(self.repo_cursor),
            Pane::Workspace => self.selected_workspace_index,
        }
    }

    pub fn list(&self, pane: Pane) -> &[SelectOption] {
        match pane {
            Pane::Projects => &self.projects,
            Pane::Repositories => &self.repositories,
            Pane::Workspace => &self.workspace_options,
        }
    }

    /// Names of the invariants the state currently breaks (empty when consistent)
    pub fn invariant_violations(&self) -> Vec<&'static str> {
        let mut broken = Vec::new();
        if !index_valid(self.selected_project_index, self.projects.len()) {
            broken.push("selected project index out of bounds");
        }
        if !index_valid(self.selected_repo_index, self.repositories.len()) {
            broken.push("selected repository index out of bounds");
        }
        if !index_valid(self.selected_workspace_index, self.workspace_options.len()) {
            broken.push("selected workspace index out of bounds");
        }
        if self.in_workspace
            && (self.selected_project_index.is_none() || self.selected_repo_index.is_none())
        {
            broken.push("workspace mode without project and repository selected");
        }
        if self.focused_pane == Pane::Workspace && !self.in_workspace {
            broken.push("workspace focused outside workspace mode");
        }
        if !self.in_workspace && !self.workspace_options.is_empty() {
            broken.push("workspace options present outside workspace mode");
        }
        if !cursor_valid(self.project_cursor, self.projects.len())
            || !cursor_valid(self.repo_cursor, self.repositories.len())
        {
            broken.push("cursor out of bounds");
        }
        if let Some(details) = &self.details {
            if !self.in_workspace {
                broken.push("details present outside workspace mode");
            }
            if !cursor_valid(details.cursor, details.rows.len()) {
                broken.push("details cursor out of bounds");
            }
        }
        broken
    }
}

fn index_valid(index: Option<usize>, len: usize) -> bool {
    index.is_none_or(|i| i < len)
}

fn cursor_valid(cursor: usize, len: usize) -> bool {
    if len == 0 { cursor == 0 } else { cursor < len }
}

/// Clamp an index into a list of `len` items; `None` for an empty list
fn clamp_index(index: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| index.min(len - 1))
}

#[derive(Debug, Default)]
pub struct SelectionStore {
    state: NavigationState,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> NavigationState {
        self.state.clone()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn set_focus(&mut self, pane: Pane) {
        if pane == Pane::Workspace && !self.state.in_workspace {
            return;
        }
        self.state.focused_pane = pane;
        self.settle();
    }

    /// Replace the project list, keeping the current selection if its id survived
    pub fn set_projects(&mut self, projects: Vec<SelectOption>) {
        let previous = self.state.selected_project().map(|p| p.id.clone());
        self.state.projects = projects;
        self.state.projects_error = None;
        self.state.projects_loading = false;

        if let Some(id) = previous {
            match self.state.projects.iter().position(|p| p.id == id) {
                Some(index) => self.state.selected_project_index = Some(index),
                None => {
                    self.state.selected_project_index = None;
                    self.clear_children();
                }
            }
        }
        self.state.project_cursor = clamp_index(self.state.project_cursor, self.state.projects.len())
            .unwrap_or(0);
        self.settle();
    }

    /// Commit a project. Its repositories, workspace and details are dropped.
    pub fn select_project(&mut self, index: usize) {
        let Some(index) = clamp_index(index, self.state.projects.len()) else {
            return;
        };
        self.state.selected_project_index = Some(index);
        self.state.project_cursor = index;
        self.clear_children();
        self.settle();
    }

    /// Replace the repository list, keeping the current selection if its id survived
    pub fn set_repositories(&mut self, repositories: Vec<SelectOption>) {
        let previous = self.state.selected_repository().map(|r| r.id.clone());
        self.state.repositories = repositories;
        self.state.repositories_error = None;
        self.state.repositories_loading = false;

        if let Some(id) = previous {
            match self.state.repositories.iter().position(|r| r.id == id) {
                Some(index) => self.state.selected_repo_index = Some(index),
                None => {
                    self.state.selected_repo_index = None;
                    self.leave_workspace();
                }
            }
        }
        self.state.repo_cursor =
            clamp_index(self.state.repo_cursor, self.state.repositories.len()).unwrap_or(0);
        self.settle();
    }

    pub fn select_repository(&mut self, index: usize) {
        let Some(index) = clamp_index(index, self.state.repositories.len()) else {
            return;
        };
        if self.state.in_workspace && self.state.selected_repo_index != Some(index) {
            self.leave_workspace();
        }
        self.state.selected_repo_index = Some(index);
        self.state.repo_cursor = index;
        self.settle();
    }

    /// Enter workspace mode with the given actions. Ignored unless both a
    /// project and a repository are selected.
    pub fn enter_workspace(&mut self, options: Vec<SelectOption>) -> bool {
        if self.state.selected_project().is_none() || self.state.selected_repository().is_none() {
            return false;
        }
        self.state.selected_workspace_index = (!options.is_empty()).then_some(0);
        self.state.workspace_options = options;
        self.state.details = None;
        self.state.in_workspace = true;
        self.state.focused_pane = Pane::Workspace;
        self.settle();
        true
    }

    /// Leave workspace mode, returning focus to the repository pane
    pub fn exit_workspace(&mut self) -> bool {
        if !self.state.in_workspace {
            return false;
        }
        self.leave_workspace();
        self.state.focused_pane = Pane::Repositories;
        self.settle();
        true
    }

    /// Move a pane's transient highlight without committing anything
    pub fn highlight(&mut self, pane: Pane, index: usize) {
        match pane {
            Pane::Projects => {
                if let Some(i) = clamp_index(index, self.state.projects.len()) {
                    self.state.project_cursor = i;
                }
            }
            Pane::Repositories => {
                if let Some(i) = clamp_index(index, self.state.repositories.len()) {
                    self.state.repo_cursor = i;
                }
            }
            Pane::Workspace => {
                if !self.state.in_workspace {
                    return;
                }
                if let Some(i) = clamp_index(index, self.state.workspace_options.len()) {
                    self.state.selected_workspace_index = Some(i);
                }
            }
        }
        self.settle();
    }

    // --- Load bookkeeping (driven by the orchestrator) ---

    /// Start a new load of `kind` and return its generation
    pub fn begin_load(&mut self, kind: LoadKind) -> u64 {
        let generation = self.state.load_generation.bump(kind);
        match kind {
            LoadKind::Projects => self.state.projects_loading = true,
            LoadKind::Repositories => self.state.repositories_loading = true,
            LoadKind::Details => {
                if let Some(details) = self.state.details.as_mut() {
                    details.loading = true;
                }
            }
        }
        generation
    }

    pub fn current_generation(&self, kind: LoadKind) -> u64 {
        self.state.load_generation.get(kind)
    }

    /// Record a failed load; the list already shown stays untouched
    pub fn fail_load(&mut self, kind: LoadKind, message: String) {
        match kind {
            LoadKind::Projects => {
                self.state.projects_loading = false;
                self.state.projects_error = Some(message);
            }
            LoadKind::Repositories => {
                self.state.repositories_loading = false;
                self.state.repositories_error = Some(message);
            }
            LoadKind::Details => {
                if let Some(details) = self.state.details.as_mut() {
                    details.loading = false;
                    details.error = Some(message);
                }
            }
        }
    }

    /// Open the details panel for an action on the selected repository
    pub fn show_details(&mut self, action: WorkspaceAction) -> bool {
        if !self.state.in_workspace {
            return false;
        }
        let Some(repository_id) = self.state.selected_repository().map(|r| r.id.clone()) else {
            return false;
        };
        self.state.details = Some(ActionDetails {
            action,
            repository_id,
            level: DetailLevel::Action,
            rows: Vec::new(),
            cursor: 0,
            focused: false,
            loading: false,
            error: None,
            trail: Vec::new(),
        });
        self.settle();
        true
    }

    pub fn set_details_rows(&mut self, rows: Vec<SelectOption>) {
        if let Some(details) = self.state.details.as_mut() {
            details.cursor = clamp_index(details.cursor, rows.len()).unwrap_or(0);
            details.rows = rows;
            details.loading = false;
            details.error = None;
        }
        self.settle();
    }

    /// Route navigation to the detail rows (`true`) or back to the actions.
    /// Entering needs something to point at.
    pub fn focus_details(&mut self, focused: bool) -> bool {
        let Some(details) = self.state.details.as_mut() else {
            return false;
        };
        if focused && details.rows.is_empty() && details.trail.is_empty() {
            return false;
        }
        details.focused = focused;
        true
    }

    pub fn highlight_detail(&mut self, index: usize) {
        if let Some(details) = self.state.details.as_mut() {
            if let Some(i) = clamp_index(index, details.rows.len()) {
                details.cursor = i;
            }
        }
        self.settle();
    }

    /// Descend into `level`, remembering the current rows
    pub fn push_detail_level(&mut self, level: DetailLevel) -> bool {
        if !self.state.in_workspace {
            return false;
        }
        let Some(details) = self.state.details.as_mut() else {
            return false;
        };
        details.trail.push(DetailFrame {
            level: details.level,
            rows: std::mem::take(&mut details.rows),
            cursor: details.cursor,
        });
        details.level = level;
        details.cursor = 0;
        details.focused = true;
        details.loading = false;
        details.error = None;
        self.settle();
        true
    }

    /// Return to the level above, restoring its rows and highlight
    pub fn pop_detail_level(&mut self) -> bool {
        let Some(details) = self.state.details.as_mut() else {
            return false;
        };
        let Some(frame) = details.trail.pop() else {
            return false;
        };
        details.level = frame.level;
        details.rows = frame.rows;
        details.cursor = frame.cursor;
        details.loading = false;
        details.error = None;
        self.settle();
        true
    }

    // --- Internal helpers ---

    /// Drop everything that hangs off the selected project
    fn clear_children(&mut self) {
        self.state.repositories.clear();
        self.state.selected_repo_index = None;
        self.state.repo_cursor = 0;
        self.state.repositories_error = None;
        self.state.repositories_loading = false;
        self.leave_workspace();
    }

    fn leave_workspace(&mut self) {
        self.state.in_workspace = false;
        self.state.workspace_options.clear();
        self.state.selected_workspace_index = None;
        self.state.details = None;
        if self.state.focused_pane == Pane::Workspace {
            self.state.focused_pane = Pane::Repositories;
        }
    }

    fn settle(&self) {
        debug_assert!(
            self.state.invariant_violations().is_empty(),
            "navigation invariants broken: {:?}",
            self.state.invariant_violations()
        );
    }
}
