//! Fixed set of follow-on actions offered once a repository is opened.

use crate::model::SelectOption;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkspaceAction {
    PullRequests,
    Pipelines,
    Branches,
}

impl WorkspaceAction {
    pub const ALL: [WorkspaceAction; 3] = [
        WorkspaceAction::PullRequests,
        WorkspaceAction::Pipelines,
        WorkspaceAction::Branches,
    ];

    /// Stable id carried in the option list
    pub fn id(&self) -> &'static str {
        match self {
            WorkspaceAction::PullRequests => "pull-requests",
            WorkspaceAction::Pipelines => "pipelines",
            WorkspaceAction::Branches => "branches",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkspaceAction::PullRequests => "Pull Requests",
            WorkspaceAction::Pipelines => "Pipelines",
            WorkspaceAction::Branches => "Branches",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    fn describe(&self, repo_label: &str) -> String {
        match self {
            WorkspaceAction::PullRequests => format!("Active pull requests in {}", repo_label),
            WorkspaceAction::Pipelines => format!("Pipelines building {}", repo_label),
            WorkspaceAction::Branches => format!("Branches of {}", repo_label),
        }
    }
}

/// How far into an action's results the details panel has drilled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// The list the action itself produces
    Action,
    PullRequest { pull_request_id: u64 },
    Runs { pipeline_id: u64 },
    Timeline { build_id: u64 },
}

impl DetailLevel {
    /// Level opened by confirming the row `row_id` at this level, if any.
    /// Branches, pull request details and timelines are leaves.
    pub fn child(&self, action: WorkspaceAction, row_id: &str) -> Option<DetailLevel> {
        let id = row_id.parse::<u64>().ok()?;
        match (self, action) {
            (DetailLevel::Action, WorkspaceAction::PullRequests) => {
                Some(DetailLevel::PullRequest { pull_request_id: id })
            }
            (DetailLevel::Action, WorkspaceAction::Pipelines) => Some(DetailLevel::Runs { pipeline_id: id }),
            // a run id is the build id of the timeline
            (DetailLevel::Runs { .. }, _) => Some(DetailLevel::Timeline { build_id: id }),
            _ => None,
        }
    }

    pub fn title(&self, action: WorkspaceAction) -> String {
        match self {
            DetailLevel::Action => action.label().to_string(),
            DetailLevel::PullRequest { pull_request_id } => format!("Pull Request !{}", pull_request_id),
            DetailLevel::Runs { pipeline_id } => format!("Runs of pipeline #{}", pipeline_id),
            DetailLevel::Timeline { build_id } => format!("Timeline of build {}", build_id),
        }
    }
}

/// A confirmed workspace action together with what it applies to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInvocation {
    pub action: WorkspaceAction,
    pub project_id: String,
    pub repository_id: String,
    pub repository_name: String,
}

/// Options shown in the workspace pane for the given repository
pub fn options_for(repository: &SelectOption) -> Vec<SelectOption> {
    WorkspaceAction::ALL
        .iter()
        .map(|action| SelectOption::new(action.id(), action.label(), action.describe(&repository.label)))
        .collect()
}
