//! Focus controller: turns navigation commands into store transitions.

use tracing::{debug, info};

use crate::model::{Pane, ProjectId, RepositoryId};
use crate::orchestrator::{Applied, LoadOrchestrator, LoadOutcome};
use crate::store::{NavigationState, SelectionStore};
use crate::workspace::{self, ActionInvocation, DetailLevel, WorkspaceAction};

/// Device-independent navigation commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavCommand {
    NextPane,
    Move(isize),
    Confirm,
    Back,
    /// Enter the details panel, then open the highlighted row
    DrillIn,
    /// Up one details level, then back to the action list
    DrillOut,
}

/// How `advance_focus` behaves while workspace mode is active
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkspaceFocusPolicy {
    /// Focus stays on the workspace until `back`
    #[default]
    Blocked,
    /// Keep cycling Projects/Repositories without leaving workspace mode
    SkipWorkspace,
}

/// Observable result of a `confirm`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirmed {
    ProjectSelected {
        project_id: ProjectId,
        generation: u64,
    },
    WorkspaceEntered {
        repository_id: RepositoryId,
    },
    ActionInvoked(ActionInvocation),
    DetailsOpened {
        level: DetailLevel,
        generation: u64,
    },
}

pub struct FocusController {
    store: SelectionStore,
    orchestrator: LoadOrchestrator,
    policy: WorkspaceFocusPolicy,
}

impl FocusController {
    pub fn new(store: SelectionStore, orchestrator: LoadOrchestrator, policy: WorkspaceFocusPolicy) -> Self {
        Self {
            store,
            orchestrator,
            policy,
        }
    }

    pub fn snapshot(&self) -> NavigationState {
        self.store.snapshot()
    }

    pub fn state(&self) -> &NavigationState {
        self.store.state()
    }

    pub fn policy(&self) -> WorkspaceFocusPolicy {
        self.policy
    }

    pub fn orchestrator(&self) -> &LoadOrchestrator {
        &self.orchestrator
    }

    pub fn handle(&mut self, command: NavCommand) -> Option<Confirmed> {
        debug!(?command, pane = self.state().focused_pane.label(), "navigation command");
        match command {
            NavCommand::NextPane => {
                self.advance_focus();
                None
            }
            NavCommand::Move(delta) => {
                self.move_highlight(delta);
                None
            }
            NavCommand::Confirm => self.confirm(),
            NavCommand::Back => {
                self.back();
                None
            }
            NavCommand::DrillIn => self.drill_in(),
            NavCommand::DrillOut => {
                self.drill_out();
                None
            }
        }
    }

    /// Cycle Projects → Repositories → Projects. Returns whether focus moved.
    pub fn advance_focus(&mut self) -> bool {
        let state = self.store.state();
        if state.in_workspace && self.policy == WorkspaceFocusPolicy::Blocked {
            return false;
        }
        let next = match state.focused_pane {
            Pane::Projects => Pane::Repositories,
            Pane::Repositories | Pane::Workspace => Pane::Projects,
        };
        self.store.set_focus(next);
        true
    }

    pub fn confirm(&mut self) -> Option<Confirmed> {
        let pane = self.store.state().focused_pane;
        match pane {
            Pane::Projects => self.confirm_project(),
            Pane::Repositories => self.confirm_repository(),
            Pane::Workspace if self.details_focused() => self.drill_in(),
            Pane::Workspace => self.confirm_action(),
        }
    }

    /// Leave workspace mode. No-op outside of it.
    pub fn back(&mut self) -> bool {
        self.store.exit_workspace()
    }

    pub fn highlight(&mut self, pane: Pane, index: usize) {
        self.store.highlight(pane, index);
    }

    /// Move the focused pane's highlight by `delta`, clamped to the list
    pub fn move_highlight(&mut self, delta: isize) {
        if self.details_focused() {
            if let Some(details) = self.store.state().details.as_ref() {
                let last = details.rows.len().saturating_sub(1);
                let target = details.cursor.saturating_add_signed(delta).min(last);
                self.store.highlight_detail(target);
            }
            return;
        }
        let state = self.store.state();
        let pane = state.focused_pane;
        let len = state.list(pane).len();
        let Some(cursor) = state.cursor(pane) else {
            return;
        };
        let target = cursor.saturating_add_signed(delta).min(len.saturating_sub(1));
        self.store.highlight(pane, target);
    }

    /// Step into the details panel, or open the highlighted row one level deeper
    pub fn drill_in(&mut self) -> Option<Confirmed> {
        let state = self.store.state();
        if state.focused_pane != Pane::Workspace {
            return None;
        }
        let details = state.details.as_ref()?;
        if !details.focused {
            self.store.focus_details(true);
            return None;
        }
        let action = details.action;
        let level = details.level.child(action, &details.highlighted_row()?.id)?;
        let invocation = self.invocation(action)?;
        let generation = self
            .orchestrator
            .request_drill(&mut self.store, &invocation, level)?;
        info!(?level, repository = %invocation.repository_name, "details opened");
        Some(Confirmed::DetailsOpened { level, generation })
    }

    /// Go up one details level, or hand navigation back to the action list.
    /// Returns whether anything changed.
    pub fn drill_out(&mut self) -> bool {
        let Some(details) = self.store.state().details.as_ref() else {
            return false;
        };
        if !details.focused {
            return false;
        }
        if details.trail.is_empty() {
            self.store.focus_details(false)
        } else {
            self.store.pop_detail_level()
        }
    }

    fn details_focused(&self) -> bool {
        let state = self.store.state();
        state.focused_pane == Pane::Workspace && state.details.as_ref().is_some_and(|d| d.focused)
    }

    /// Initial load and manual refresh of the project list
    pub fn request_projects(&mut self) -> u64 {
        self.orchestrator.request_projects(&mut self.store)
    }

    /// Commit a finished load if it is still relevant
    pub fn apply_load(&mut self, outcome: LoadOutcome) -> Applied {
        self.orchestrator.apply(&mut self.store, outcome)
    }

    fn confirm_project(&mut self) -> Option<Confirmed> {
        let index = self.store.state().cursor(Pane::Projects)?;
        self.store.select_project(index);
        self.store.set_focus(Pane::Repositories);

        let project = self.store.state().selected_project()?;
        let project_id = project.id.clone();
        info!(%project_id, project = %project.label, "project selected");
        let generation = self
            .orchestrator
            .request_repositories(&mut self.store, &project_id);
        Some(Confirmed::ProjectSelected {
            project_id,
            generation,
        })
    }

    fn confirm_repository(&mut self) -> Option<Confirmed> {
        let index = self.store.state().cursor(Pane::Repositories)?;
        self.store.select_repository(index);

        let repository = self.store.state().selected_repository()?.clone();
        if !self.store.enter_workspace(workspace::options_for(&repository)) {
            return None;
        }
        info!(repository_id = %repository.id, repository = %repository.label, "workspace entered");
        Some(Confirmed::WorkspaceEntered {
            repository_id: repository.id,
        })
    }

    fn invocation(&self, action: WorkspaceAction) -> Option<ActionInvocation> {
        let state = self.store.state();
        let project = state.selected_project()?;
        let repository = state.selected_repository()?;
        Some(ActionInvocation {
            action,
            project_id: project.id.clone(),
            repository_id: repository.id.clone(),
            repository_name: repository.label.clone(),
        })
    }

    fn confirm_action(&mut self) -> Option<Confirmed> {
        let state = self.store.state();
        let action = WorkspaceAction::from_id(&state.selected_workspace_option()?.id)?;
        let invocation = self.invocation(action)?;

        info!(action = action.id(), repository = %invocation.repository_name, "workspace action invoked");
        self.orchestrator.request_details(&mut self.store, &invocation);
        Some(Confirmed::ActionInvoked(invocation))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    use super::*;
    use crate::catalog::{CatalogResult, RemoteCatalog};
    use crate::model::{
        Branch, CommentThread, Pipeline, PipelineRun, Project, PullRequest, Repository, SelectOption,
        TimelineRecord,
    };
    use crate::orchestrator::DiscardReason;
    use crate::orchestrator::tests::{GatedCatalog, project, pull_request, repo};

    /// Catalog that answers immediately with a fixed tree
    struct StaticCatalog;

    #[async_trait]
    impl RemoteCatalog for StaticCatalog {
        async fn list_projects(&self) -> CatalogResult<Vec<Project>> {
            Ok(vec![project("p1", "Alpha"), project("p2", "Beta"), project("p3", "Gamma")])
        }

        async fn list_repositories(&self, project_id: &str) -> CatalogResult<Vec<Repository>> {
            Ok((1..=3)
                .map(|i| {
                    let id = format!("{}-r{}", project_id, i);
                    repo(&id, &id)
                })
                .collect())
        }

        async fn list_pipelines(&self, _project_id: &str) -> CatalogResult<Vec<Pipeline>> {
            Ok(Vec::new())
        }

        async fn list_runs(&self, _project_id: &str, _pipeline_id: u64) -> CatalogResult<Vec<PipelineRun>> {
            Ok(Vec::new())
        }

        async fn get_timeline(&self, _project_id: &str, _build_id: u64) -> CatalogResult<Vec<TimelineRecord>> {
            Ok(Vec::new())
        }

        async fn list_pull_requests(&self, _project_id: &str, _repository_id: &str) -> CatalogResult<Vec<PullRequest>> {
            Ok(Vec::new())
        }

        async fn get_pull_request(
            &self,
            _project_id: &str,
            _repository_id: &str,
            pull_request_id: u64,
        ) -> CatalogResult<PullRequest> {
            Ok(pull_request(pull_request_id))
        }

        async fn list_pull_request_threads(
            &self,
            _project_id: &str,
            _repository_id: &str,
            _pull_request_id: u64,
        ) -> CatalogResult<Vec<CommentThread>> {
            Ok(Vec::new())
        }

        async fn list_branches(&self, _project_id: &str, _repository_id: &str) -> CatalogResult<Vec<Branch>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    fn controller_with(
        store: SelectionStore,
        catalog: Arc<dyn RemoteCatalog>,
        policy: WorkspaceFocusPolicy,
    ) -> (FocusController, mpsc::UnboundedReceiver<LoadOutcome>) {
        let (orchestrator, rx) = LoadOrchestrator::channel(catalog);
        (FocusController::new(store, orchestrator, policy), rx)
    }

    fn store_with_project(project_id: &str, name: &str) -> SelectionStore {
        let mut store = SelectionStore::new();
        store.set_projects(vec![SelectOption::from(&project(project_id, name))]);
        store
    }

    fn store_with_repository() -> SelectionStore {
        let mut store = store_with_project("p1", "Alpha");
        store.select_project(0);
        store.set_repositories(vec![SelectOption::from(&repo("r1", "core"))]);
        store.set_focus(Pane::Repositories);
        store
    }

    #[tokio::test]
    async fn test_confirm_project_requests_repositories() {
        let (mut controller, _rx) = controller_with(
            store_with_project("p1", "Alpha"),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.highlight(Pane::Projects, 0);

        let confirmed = controller.confirm();
        assert_eq!(
            confirmed,
            Some(Confirmed::ProjectSelected {
                project_id: "p1".into(),
                generation: 1,
            })
        );
        let state = controller.snapshot();
        assert_eq!(state.selected_project_index, Some(0));
        assert_eq!(state.focused_pane, Pane::Repositories);
        assert!(state.repositories_loading);
    }

    #[tokio::test]
    async fn test_confirm_repository_enters_workspace() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.highlight(Pane::Repositories, 0);

        let confirmed = controller.confirm();
        assert_eq!(
            confirmed,
            Some(Confirmed::WorkspaceEntered {
                repository_id: "r1".into()
            })
        );
        let state = controller.snapshot();
        assert!(state.in_workspace);
        assert_eq!(state.focused_pane, Pane::Workspace);
        assert!(!state.workspace_options.is_empty());
    }

    #[tokio::test]
    async fn test_back_leaves_workspace() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();
        assert!(controller.state().in_workspace);

        assert!(controller.back());
        let state = controller.snapshot();
        assert!(!state.in_workspace);
        assert_eq!(state.focused_pane, Pane::Repositories);
    }

    #[tokio::test]
    async fn test_back_outside_workspace_changes_nothing() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        let before = controller.snapshot();
        assert!(!controller.back());
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_advance_focus_wraps_to_projects() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        assert!(controller.advance_focus());
        assert_eq!(controller.state().focused_pane, Pane::Projects);
        assert!(controller.advance_focus());
        assert_eq!(controller.state().focused_pane, Pane::Repositories);
    }

    #[tokio::test]
    async fn test_advance_focus_blocked_in_workspace() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();
        let before = controller.snapshot();
        assert!(!controller.advance_focus());
        assert_eq!(controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_skip_workspace_policy_cycles_panes_in_workspace() {
        let (mut controller, _rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::SkipWorkspace,
        );
        controller.confirm();
        assert!(controller.advance_focus());
        assert_eq!(controller.state().focused_pane, Pane::Projects);
        assert!(controller.state().in_workspace);
        assert!(controller.advance_focus());
        assert_eq!(controller.state().focused_pane, Pane::Repositories);

        assert!(controller.back());
        assert_eq!(controller.state().focused_pane, Pane::Repositories);
    }

    #[tokio::test]
    async fn test_selecting_second_project_clears_children() {
        let mut store = SelectionStore::new();
        store.set_projects(vec![
            SelectOption::from(&project("p1", "Alpha")),
            SelectOption::from(&project("p2", "Beta")),
        ]);
        let (mut controller, mut rx) =
            controller_with(store, Arc::new(StaticCatalog), WorkspaceFocusPolicy::Blocked);

        controller.confirm();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        controller.confirm();
        assert!(controller.state().in_workspace);

        controller.back();
        controller.advance_focus();
        controller.move_highlight(1);
        controller.confirm();

        let state = controller.snapshot();
        assert_eq!(state.selected_project_index, Some(1));
        assert!(state.repositories.is_empty());
        assert_eq!(state.selected_repo_index, None);
        assert!(!state.in_workspace);
    }

    #[tokio::test]
    async fn test_move_highlight_clamps_at_both_ends() {
        let mut store = SelectionStore::new();
        store.set_projects(vec![
            SelectOption::from(&project("p1", "Alpha")),
            SelectOption::from(&project("p2", "Beta")),
        ]);
        let (mut controller, _rx) =
            controller_with(store, Arc::new(GatedCatalog::default()), WorkspaceFocusPolicy::Blocked);

        controller.move_highlight(-3);
        assert_eq!(controller.state().project_cursor, 0);
        controller.move_highlight(10);
        assert_eq!(controller.state().project_cursor, 1);
        assert_eq!(controller.state().selected_project_index, None);
    }

    #[tokio::test]
    async fn test_confirm_on_empty_pane_does_nothing() {
        let (mut controller, _rx) = controller_with(
            SelectionStore::new(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        assert_eq!(controller.confirm(), None);
        assert_eq!(controller.snapshot(), NavigationState::default());
    }

    #[tokio::test]
    async fn test_action_invocation_loads_details() {
        let (mut controller, mut rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();

        let confirmed = controller.confirm();
        let Some(Confirmed::ActionInvoked(invocation)) = confirmed else {
            panic!("expected an action invocation, got {:?}", confirmed);
        };
        assert_eq!(invocation.action, WorkspaceAction::PullRequests);
        assert_eq!(invocation.repository_name, "core");
        assert!(controller.state().details.as_ref().is_some_and(|d| d.loading));

        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        let details = controller.snapshot().details.unwrap();
        assert_eq!(details.rows.len(), 1);
        assert!(!details.loading);
    }

    #[tokio::test]
    async fn test_details_discarded_after_leaving_workspace() {
        let (mut controller, mut rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();
        controller.move_highlight(2);
        controller.confirm();
        controller.back();

        let outcome = rx.recv().await.unwrap();
        assert_eq!(
            controller.apply_load(outcome),
            Applied::Discarded(DiscardReason::SelectionChanged)
        );
        assert_eq!(controller.state().details, None);
    }

    async fn workspace_with_loaded_action(
        action_index: usize,
    ) -> (FocusController, mpsc::UnboundedReceiver<LoadOutcome>) {
        let (mut controller, mut rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();
        controller.move_highlight(action_index as isize);
        controller.confirm();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        (controller, rx)
    }

    #[tokio::test]
    async fn test_pull_request_drills_into_details() {
        let (mut controller, mut rx) = workspace_with_loaded_action(0).await;

        assert_eq!(controller.handle(NavCommand::DrillIn), None);
        assert!(controller.state().details.as_ref().unwrap().focused);

        let opened = controller.handle(NavCommand::Confirm);
        assert_eq!(
            opened,
            Some(Confirmed::DetailsOpened {
                level: DetailLevel::PullRequest { pull_request_id: 12 },
                generation: 2,
            })
        );
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        let details = controller.snapshot().details.unwrap();
        assert_eq!(details.rows[0].label, "Add retries");

        // a pull request's rows are leaves
        assert_eq!(controller.handle(NavCommand::DrillIn), None);
    }

    #[tokio::test]
    async fn test_pipeline_drills_to_runs_then_timeline() {
        let (mut controller, mut rx) = workspace_with_loaded_action(1).await;
        controller.drill_in();

        controller.drill_in();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        assert_eq!(
            controller.state().details.as_ref().unwrap().level,
            DetailLevel::Runs { pipeline_id: 7 }
        );

        controller.drill_in();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Committed);
        let details = controller.snapshot().details.unwrap();
        assert_eq!(details.level, DetailLevel::Timeline { build_id: 705 });
        assert_eq!(details.breadcrumb(), "Pipelines › Runs of pipeline #7 › Timeline of build 705");

        assert!(controller.drill_out());
        assert!(controller.drill_out());
        assert!(controller.drill_out());
        let details = controller.snapshot().details.unwrap();
        assert_eq!(details.level, DetailLevel::Action);
        assert!(!details.focused);
        assert!(!controller.drill_out());
        assert!(controller.state().in_workspace);
    }

    #[tokio::test]
    async fn test_moves_follow_details_focus() {
        let (mut controller, _rx) = workspace_with_loaded_action(1).await;
        controller.drill_in();
        controller.move_highlight(-1);
        assert_eq!(controller.state().selected_workspace_index, Some(1));
        assert_eq!(controller.state().details.as_ref().unwrap().cursor, 0);

        controller.drill_out();
        controller.move_highlight(-1);
        assert_eq!(controller.state().selected_workspace_index, Some(0));
    }

    #[tokio::test]
    async fn test_failed_action_has_nothing_to_enter() {
        let (mut controller, mut rx) = controller_with(
            store_with_repository(),
            Arc::new(GatedCatalog::default()),
            WorkspaceFocusPolicy::Blocked,
        );
        controller.confirm();
        controller.move_highlight(2);
        controller.confirm();
        let outcome = rx.recv().await.unwrap();
        assert_eq!(controller.apply_load(outcome), Applied::Failed);

        assert_eq!(controller.drill_in(), None);
        let details = controller.snapshot().details.unwrap();
        assert!(!details.focused);
        assert!(details.error.is_some());
    }

    #[tokio::test]
    async fn test_back_from_drilled_details_leaves_workspace() {
        let (mut controller, mut rx) = workspace_with_loaded_action(1).await;
        controller.drill_in();
        controller.drill_in();

        assert!(controller.back());
        let state = controller.snapshot();
        assert!(!state.in_workspace);
        assert_eq!(state.details, None);
        assert_eq!(state.focused_pane, Pane::Repositories);

        let outcome = rx.recv().await.unwrap();
        assert_eq!(
            controller.apply_load(outcome),
            Applied::Discarded(DiscardReason::SelectionChanged)
        );
    }

    #[derive(Clone, Debug)]
    enum Step {
        Nav(NavCommand),
        Refresh,
        /// Answer one parked catalog call with one of its canned variants
        Release { slot: usize, variant: usize },
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            1 => Just(Step::Nav(NavCommand::NextPane)),
            2 => (-3isize..=3).prop_map(|delta| Step::Nav(NavCommand::Move(delta))),
            3 => Just(Step::Nav(NavCommand::Confirm)),
            1 => Just(Step::Nav(NavCommand::Back)),
            1 => Just(Step::Nav(NavCommand::DrillIn)),
            1 => Just(Step::Nav(NavCommand::DrillOut)),
            1 => Just(Step::Refresh),
            3 => (0usize..6, 0usize..4).prop_map(|(slot, variant)| Step::Release { slot, variant }),
        ]
    }

    fn focus_policy() -> impl Strategy<Value = WorkspaceFocusPolicy> {
        prop_oneof![
            Just(WorkspaceFocusPolicy::Blocked),
            Just(WorkspaceFocusPolicy::SkipWorkspace),
        ]
    }

    /// Let spawned loads run until they park or report
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    /// Apply everything that has arrived, checking that committed
    /// repositories belong to the project selected at that moment
    fn drain(
        controller: &mut FocusController,
        rx: &mut mpsc::UnboundedReceiver<LoadOutcome>,
    ) -> Result<(), TestCaseError> {
        while let Ok(outcome) = rx.try_recv() {
            let for_project = match &outcome {
                LoadOutcome::Repositories { project_id, .. } => Some(project_id.clone()),
                _ => None,
            };
            let applied = controller.apply_load(outcome);
            if let (Applied::Committed, Some(project_id)) = (applied, for_project) {
                let selected = controller.state().selected_project().map(|p| p.id.clone());
                prop_assert_eq!(selected, Some(project_id));
            }
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn prop_invariants_hold_for_any_command_sequence(
            policy in focus_policy(),
            steps in prop::collection::vec(step(), 1..120),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let catalog = Arc::new(GatedCatalog::holding());
                let (mut controller, mut rx) =
                    controller_with(SelectionStore::new(), catalog.clone(), policy);
                controller.request_projects();

                for (i, step) in steps.iter().enumerate() {
                    match step {
                        Step::Nav(command) => {
                            controller.handle(*command);
                        }
                        Step::Refresh => {
                            controller.request_projects();
                        }
                        Step::Release { slot, variant } => {
                            settle().await;
                            catalog.release(*slot, *variant);
                        }
                    }
                    settle().await;
                    drain(&mut controller, &mut rx)?;

                    let violations = controller.state().invariant_violations();
                    prop_assert!(violations.is_empty(), "step {} {:?}: {:?}", i, step, violations);
                }
                Ok(())
            })?;
        }
    }
}
