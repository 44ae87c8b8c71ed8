//! Load orchestration
//!
//! Requests spawn the catalog call on the tokio runtime and return right
//! away with the generation they were tagged with. Completions come back as
//! `LoadOutcome` messages on a channel drained by the UI loop, which hands
//! each one to `apply`. Only outcomes carrying the current generation (and,
//! for child loads, the still-selected parent) are committed.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::catalog::{CatalogResult, RemoteCatalog};
use crate::model::{CommentThread, IdentityRef, ProjectId, PullRequest, RepositoryId, SelectOption, short_ref};
use crate::store::{LoadKind, SelectionStore};
use crate::workspace::{ActionInvocation, DetailLevel, WorkspaceAction};

/// A finished catalog call, tagged with the generation it was issued under
#[derive(Clone, Debug)]
pub enum LoadOutcome {
    Projects {
        generation: u64,
        result: CatalogResult<Vec<SelectOption>>,
    },
    Repositories {
        generation: u64,
        project_id: ProjectId,
        result: CatalogResult<Vec<SelectOption>>,
    },
    Details {
        generation: u64,
        action: WorkspaceAction,
        repository_id: RepositoryId,
        level: DetailLevel,
        result: CatalogResult<Vec<SelectOption>>,
    },
}

impl LoadOutcome {
    pub fn kind(&self) -> LoadKind {
        match self {
            LoadOutcome::Projects { .. } => LoadKind::Projects,
            LoadOutcome::Repositories { .. } => LoadKind::Repositories,
            LoadOutcome::Details { .. } => LoadKind::Details,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            LoadOutcome::Projects { generation, .. }
            | LoadOutcome::Repositories { generation, .. }
            | LoadOutcome::Details { generation, .. } => *generation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscardReason {
    /// A newer request of the same kind was issued after this one
    StaleGeneration,
    /// The parent selection the load was made for is gone
    SelectionChanged,
}

/// What `apply` did with an outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Committed,
    Failed,
    Discarded(DiscardReason),
}

pub struct LoadOrchestrator {
    catalog: Arc<dyn RemoteCatalog>,
    outcome_tx: mpsc::UnboundedSender<LoadOutcome>,
}

impl LoadOrchestrator {
    pub fn new(catalog: Arc<dyn RemoteCatalog>, outcome_tx: mpsc::UnboundedSender<LoadOutcome>) -> Self {
        Self {
            catalog,
            outcome_tx,
        }
    }

    /// Build an orchestrator together with the receiver its outcomes arrive on
    pub fn channel(catalog: Arc<dyn RemoteCatalog>) -> (Self, mpsc::UnboundedReceiver<LoadOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(catalog, tx), rx)
    }

    pub fn catalog(&self) -> &Arc<dyn RemoteCatalog> {
        &self.catalog
    }

    pub fn request_projects(&self, store: &mut SelectionStore) -> u64 {
        let generation = store.begin_load(LoadKind::Projects);
        debug!(generation, catalog = self.catalog.name(), "requesting projects");

        let catalog = self.catalog.clone();
        self.dispatch(async move {
            let result = catalog
                .list_projects()
                .await
                .map(|projects| projects.iter().map(SelectOption::from).collect());
            LoadOutcome::Projects { generation, result }
        });
        generation
    }

    pub fn request_repositories(&self, store: &mut SelectionStore, project_id: &str) -> u64 {
        let generation = store.begin_load(LoadKind::Repositories);
        debug!(generation, project_id, "requesting repositories");

        let catalog = self.catalog.clone();
        let project_id = project_id.to_string();
        self.dispatch(async move {
            let result = catalog
                .list_repositories(&project_id)
                .await
                .map(|repos| repos.iter().map(SelectOption::from).collect());
            LoadOutcome::Repositories {
                generation,
                project_id,
                result,
            }
        });
        generation
    }

    /// Load the rows behind a workspace action. `None` when the store is not
    /// in workspace mode for a repository.
    pub fn request_details(&self, store: &mut SelectionStore, invocation: &ActionInvocation) -> Option<u64> {
        if !store.show_details(invocation.action) {
            return None;
        }
        Some(self.dispatch_details(store, invocation, DetailLevel::Action))
    }

    /// Open `level` beneath the details currently shown for the invocation
    pub fn request_drill(
        &self,
        store: &mut SelectionStore,
        invocation: &ActionInvocation,
        level: DetailLevel,
    ) -> Option<u64> {
        let showing = store.state().details.as_ref().is_some_and(|d| {
            d.action == invocation.action && d.repository_id == invocation.repository_id
        });
        if !showing || !store.push_detail_level(level) {
            return None;
        }
        Some(self.dispatch_details(store, invocation, level))
    }

    fn dispatch_details(&self, store: &mut SelectionStore, invocation: &ActionInvocation, level: DetailLevel) -> u64 {
        let generation = store.begin_load(LoadKind::Details);
        debug!(
            generation,
            action = invocation.action.id(),
            ?level,
            repository_id = %invocation.repository_id,
            "requesting action details"
        );

        let catalog = self.catalog.clone();
        let invocation = invocation.clone();
        self.dispatch(async move {
            let result = detail_rows(catalog.as_ref(), &invocation, level).await;
            LoadOutcome::Details {
                generation,
                action: invocation.action,
                repository_id: invocation.repository_id,
                level,
                result,
            }
        });
        generation
    }

    /// Commit an outcome into the store if it is still relevant
    pub fn apply(&self, store: &mut SelectionStore, outcome: LoadOutcome) -> Applied {
        let kind = outcome.kind();
        let generation = outcome.generation();
        let current = store.current_generation(kind);
        if generation != current {
            debug!(?kind, generation, current, "discarding stale load result");
            return Applied::Discarded(DiscardReason::StaleGeneration);
        }

        match outcome {
            LoadOutcome::Projects { result, .. } => match result {
                Ok(projects) => {
                    debug!(generation, count = projects.len(), "projects loaded");
                    store.set_projects(projects);
                    Applied::Committed
                }
                Err(e) => {
                    warn!(generation, error = %e, "failed to load projects");
                    store.fail_load(LoadKind::Projects, e.to_string());
                    Applied::Failed
                }
            },
            LoadOutcome::Repositories {
                project_id, result, ..
            } => {
                let selected = store.state().selected_project().map(|p| p.id.as_str());
                if selected != Some(project_id.as_str()) {
                    debug!(generation, %project_id, "discarding repositories for deselected project");
                    return Applied::Discarded(DiscardReason::SelectionChanged);
                }
                match result {
                    Ok(repos) => {
                        debug!(generation, %project_id, count = repos.len(), "repositories loaded");
                        store.set_repositories(repos);
                        Applied::Committed
                    }
                    Err(e) => {
                        warn!(generation, %project_id, error = %e, "failed to load repositories");
                        store.fail_load(LoadKind::Repositories, e.to_string());
                        Applied::Failed
                    }
                }
            }
            LoadOutcome::Details {
                action,
                repository_id,
                level,
                result,
                ..
            } => {
                let state = store.state();
                let still_open = state.in_workspace
                    && state.details.as_ref().is_some_and(|d| {
                        d.action == action && d.repository_id == repository_id && d.level == level
                    });
                if !still_open {
                    debug!(generation, action = action.id(), "discarding details for closed workspace");
                    return Applied::Discarded(DiscardReason::SelectionChanged);
                }
                match result {
                    Ok(rows) => {
                        store.set_details_rows(rows);
                        Applied::Committed
                    }
                    Err(e) => {
                        warn!(generation, action = action.id(), error = %e, "failed to load action details");
                        store.fail_load(LoadKind::Details, e.to_string());
                        Applied::Failed
                    }
                }
            }
        }
    }

    fn dispatch<F>(&self, load: F)
    where
        F: Future<Output = LoadOutcome> + Send + 'static,
    {
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = load.await;
            if tx.send(outcome).is_err() {
                debug!("load finished after the receiver closed");
            }
        });
    }
}

/// Fetch and project the rows shown at `level` of a workspace action
pub async fn detail_rows(
    catalog: &dyn RemoteCatalog,
    invocation: &ActionInvocation,
    level: DetailLevel,
) -> CatalogResult<Vec<SelectOption>> {
    let project_id = invocation.project_id.as_str();
    let repository_id = invocation.repository_id.as_str();
    match level {
        DetailLevel::Action => action_rows(catalog, invocation).await,
        DetailLevel::PullRequest { pull_request_id } => {
            let pr = catalog
                .get_pull_request(project_id, repository_id, pull_request_id)
                .await?;
            let threads = catalog
                .list_pull_request_threads(project_id, repository_id, pull_request_id)
                .await?;
            Ok(pull_request_rows(&pr, &threads))
        }
        DetailLevel::Runs { pipeline_id } => {
            let runs = catalog.list_runs(project_id, pipeline_id).await?;
            Ok(runs
                .iter()
                .map(|run| {
                    let outcome = run.result.as_deref().unwrap_or(&run.state);
                    let description = match run.created_date.as_deref() {
                        Some(date) => format!("{} {}", outcome, date),
                        None => outcome.to_string(),
                    };
                    SelectOption::new(run.id.to_string(), &run.name, description)
                })
                .collect())
        }
        DetailLevel::Timeline { build_id } => {
            let mut records = catalog.get_timeline(project_id, build_id).await?;
            records.sort_by_key(|r| r.order.unwrap_or(i64::MAX));
            Ok(records
                .iter()
                .map(|r| {
                    let status = r.result.as_deref().or(r.state.as_deref()).unwrap_or("pending");
                    SelectOption::new(&r.id, &r.name, format!("{} · {}", r.record_type, status))
                })
                .collect())
        }
    }
}

async fn action_rows(catalog: &dyn RemoteCatalog, invocation: &ActionInvocation) -> CatalogResult<Vec<SelectOption>> {
    let project_id = invocation.project_id.as_str();
    match invocation.action {
        WorkspaceAction::PullRequests => {
            let prs = catalog
                .list_pull_requests(project_id, &invocation.repository_id)
                .await?;
            Ok(prs
                .iter()
                .map(|pr| {
                    SelectOption::new(
                        pr.id.to_string(),
                        &pr.title,
                        format!(
                            "{} → {} ({})",
                            short_ref(&pr.source_ref),
                            short_ref(&pr.target_ref),
                            pr.status
                        ),
                    )
                })
                .collect())
        }
        WorkspaceAction::Pipelines => {
            let pipelines = catalog
                .list_pipelines_for_repository(project_id, &invocation.repository_name)
                .await?;
            Ok(pipelines
                .iter()
                .map(|p| {
                    let description = p
                        .folder
                        .clone()
                        .unwrap_or_else(|| format!("#{}", p.id));
                    SelectOption::new(p.id.to_string(), &p.name, description)
                })
                .collect())
        }
        WorkspaceAction::Branches => {
            let branches = catalog
                .list_branches(project_id, &invocation.repository_id)
                .await?;
            Ok(branches
                .iter()
                .map(|b| {
                    let short_sha: String = b.object_id.chars().take(8).collect();
                    SelectOption::new(&b.name, b.short_name(), short_sha)
                })
                .collect())
        }
    }
}

/// Summary rows followed by one row per live comment thread
fn pull_request_rows(pr: &PullRequest, threads: &[CommentThread]) -> Vec<SelectOption> {
    let author = pr.author.as_ref().map_or("unknown", IdentityRef::display);
    let status = if pr.is_draft {
        format!("{} (draft)", pr.status)
    } else {
        pr.status.clone()
    };
    let mut rows = vec![
        SelectOption::new(pr.id.to_string(), &pr.title, format!("{} · {}", author, status)),
        SelectOption::new(
            "branches",
            format!("{} → {}", short_ref(&pr.source_ref), short_ref(&pr.target_ref)),
            "",
        ),
    ];
    if let Some(description) = pr.description.as_deref().map(first_line).filter(|d| !d.is_empty()) {
        rows.push(SelectOption::new("description", description, ""));
    }
    rows.extend(threads.iter().filter(|t| !t.is_deleted).filter_map(|thread| {
        let comment = thread.opening_comment()?;
        let author = comment.author.as_ref().map_or("unknown", IdentityRef::display);
        let text = comment.content.as_deref().map(first_line).unwrap_or_default();
        Some(SelectOption::new(
            format!("thread-{}", thread.id),
            format!("{}: {}", author, text),
            thread.status.clone().unwrap_or_default(),
        ))
    }));
    rows
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default().trim()
}
