//! Preselect the project and repository of the git checkout aztui runs in

use tokio::process::Command;
use tracing::{debug, info};

use aztui_core::focus::FocusController;
use aztui_core::model::{Pane, ProjectId};
use aztui_core::remote::{RemoteInfo, find_by_name, organization_matches, parse_remote_url};

/// `origin` of the current directory, if it is an Azure DevOps remote of `org_url`
pub async fn detect_remote(org_url: &str) -> Option<RemoteInfo> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        debug!("no git origin in the current directory");
        return None;
    }
    let url = String::from_utf8_lossy(&output.stdout);
    let remote = parse_remote_url(&url)?;
    if !organization_matches(org_url, &remote.organization) {
        debug!(organization = %remote.organization, "origin belongs to another organization");
        return None;
    }
    info!(project = %remote.project, repository = %remote.repository, "detected repository from git origin");
    Some(remote)
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Stage {
    Project,
    Repository(ProjectId),
    Done,
}

/// Walks the detected project and repository through the normal
/// highlight/confirm path as their lists arrive
#[derive(Debug)]
pub struct AutoSelect {
    remote: RemoteInfo,
    stage: Stage,
}

impl AutoSelect {
    pub fn new(remote: RemoteInfo) -> Self {
        Self {
            remote,
            stage: Stage::Project,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Call after every committed load
    pub fn advance(&mut self, controller: &mut FocusController) {
        let state = controller.state();
        match &self.stage {
            Stage::Project => {
                if state.projects.is_empty() {
                    return;
                }
                // the user got there first
                if state.selected_project_index.is_some() || state.focused_pane != Pane::Projects {
                    self.stage = Stage::Done;
                    return;
                }
                let Some(index) = find_by_name(&state.projects, &self.remote.project) else {
                    debug!(project = %self.remote.project, "detected project not in catalog");
                    self.stage = Stage::Done;
                    return;
                };
                let project_id = state.projects[index].id.clone();
                controller.highlight(Pane::Projects, index);
                controller.confirm();
                self.stage = Stage::Repository(project_id);
            }
            Stage::Repository(project_id) => {
                let selected = state.selected_project().map(|p| p.id.as_str());
                if selected != Some(project_id.as_str()) || state.focused_pane != Pane::Repositories {
                    self.stage = Stage::Done;
                    return;
                }
                if state.repositories_loading {
                    return;
                }
                if let Some(index) = find_by_name(&state.repositories, &self.remote.repository) {
                    controller.highlight(Pane::Repositories, index);
                    controller.confirm();
                } else {
                    debug!(repository = %self.remote.repository, "detected repository not in project");
                }
                self.stage = Stage::Done;
            }
            Stage::Done => {}
        }
    }
}
