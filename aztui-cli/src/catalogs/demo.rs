use std::time::Duration;

use async_trait::async_trait;

use aztui_core::catalog::{CatalogError, CatalogResult, RemoteCatalog};
use aztui_core::model::{
    Branch, Comment, CommentThread, IdentityRef, Pipeline, PipelineRun, Project, PullRequest, Repository,
    TimelineRecord,
};

/// (project, repositories)
const TREE: &[(&str, &[&str])] = &[
    ("Platform", &["gateway", "identity", "billing-service"]),
    ("Mobile", &["ios-app", "android-app"]),
    ("Data", &["ingest", "warehouse", "notebooks", "dbt-models"]),
    ("Sandbox", &[]),
];

/// Canned organization with artificial latency, used by `--demo` and when
/// no credentials are configured
pub struct DemoCatalog {
    latency: Duration,
}

impl DemoCatalog {
    pub fn new() -> Self {
        Self {
            latency: Duration::from_millis(350),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn repositories_of(project_id: &str) -> CatalogResult<&'static [&'static str]> {
        TREE.iter()
            .find(|(name, _)| project_key(name) == project_id || *name == project_id)
            .map(|(_, repos)| *repos)
            .ok_or_else(|| CatalogError::Http {
                status: 404,
                url: format!("demo://{}", project_id),
            })
    }
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn project_key(name: &str) -> String {
    format!("proj-{}", name.to_lowercase())
}

fn repo_key(name: &str) -> String {
    format!("repo-{}", name)
}

/// Accepts either the repository id or its name
fn repo_name(repository_id: &str) -> &str {
    repository_id.strip_prefix("repo-").unwrap_or(repository_id)
}

fn demo_user(name: &str) -> IdentityRef {
    IdentityRef {
        display_name: Some(name.into()),
        unique_name: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
    }
}

/// Active pull requests of a repository; between zero and three of them
fn pull_requests_of(repository_id: &str) -> Vec<PullRequest> {
    let name = repo_name(repository_id);
    let count = seed(name) % 4;
    (0..count)
        .map(|i| PullRequest {
            id: 1000 + seed(name) * 10 + i,
            title: format!("{}: change #{}", name, i + 1),
            source_ref: format!("refs/heads/feature/{}-{}", name, i + 1),
            target_ref: "refs/heads/main".into(),
            status: "active".into(),
            author: Some(demo_user("Demo User")),
            description: Some(format!("Part {} of the {} cleanup", i + 1, name)),
            is_draft: i == 2,
        })
        .collect()
}

/// Stable small number derived from a name so runs and ids look varied
fn seed(name: &str) -> u64 {
    name.bytes().fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64)) % 97
}

#[async_trait]
impl RemoteCatalog for DemoCatalog {
    async fn list_projects(&self) -> CatalogResult<Vec<Project>> {
        self.wait().await;
        Ok(TREE
            .iter()
            .map(|(name, _)| Project {
                id: project_key(name),
                name: name.to_string(),
                description: Some(format!("{} demo project", name)),
            })
            .collect())
    }

    async fn list_repositories(&self, project_id: &str) -> CatalogResult<Vec<Repository>> {
        self.wait().await;
        let repos = Self::repositories_of(project_id)?;
        Ok(repos
            .iter()
            .map(|name| Repository {
                id: repo_key(name),
                name: name.to_string(),
                remote_url: Some(format!("https://dev.azure.com/demo/{}/_git/{}", project_id, name)),
                default_branch: Some("refs/heads/main".into()),
            })
            .collect())
    }

    async fn list_pipelines(&self, project_id: &str) -> CatalogResult<Vec<Pipeline>> {
        self.wait().await;
        let repos = Self::repositories_of(project_id)?;
        let mut pipelines: Vec<Pipeline> = repos
            .iter()
            .map(|name| Pipeline {
                id: 100 + seed(name),
                name: name.to_string(),
                folder: Some("\\".into()),
            })
            .collect();
        if !repos.is_empty() {
            pipelines.push(Pipeline {
                id: 99,
                name: "nightly-release".into(),
                folder: Some("\\release".into()),
            });
        }
        Ok(pipelines)
    }

    async fn list_runs(&self, _project_id: &str, pipeline_id: u64) -> CatalogResult<Vec<PipelineRun>> {
        self.wait().await;
        let results = ["succeeded", "failed", "succeeded", "canceled", "succeeded"];
        Ok((0..5u64)
            .map(|i| {
                let id = pipeline_id.saturating_mul(100).saturating_add(5 - i);
                let (state, result) = if i == 0 && pipeline_id % 2 == 0 {
                    ("inProgress", None)
                } else {
                    ("completed", Some(results[i as usize].to_string()))
                };
                PipelineRun {
                    id,
                    name: format!("20261014.{}", 5 - i),
                    state: state.into(),
                    result,
                    created_date: Some(format!("2026-10-{:02}T09:30:00Z", 14 - i)),
                }
            })
            .collect())
    }

    async fn get_timeline(&self, _project_id: &str, build_id: u64) -> CatalogResult<Vec<TimelineRecord>> {
        self.wait().await;
        let failed = build_id % 3 == 0;
        let steps = ["Checkout", "Restore", "Build", "Test", "Publish"];
        Ok(steps
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let result = if failed && *name == "Test" { "failed" } else { "succeeded" };
                TimelineRecord {
                    id: format!("{}-{}", build_id, i),
                    name: name.to_string(),
                    record_type: "Task".into(),
                    state: Some("completed".into()),
                    result: Some(result.into()),
                    order: Some(i as i64 + 1),
                }
            })
            .collect())
    }

    async fn list_pull_requests(
        &self,
        _project_id: &str,
        repository_id: &str,
    ) -> CatalogResult<Vec<PullRequest>> {
        self.wait().await;
        Ok(pull_requests_of(repository_id))
    }

    async fn get_pull_request(
        &self,
        _project_id: &str,
        repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<PullRequest> {
        self.wait().await;
        pull_requests_of(repository_id)
            .into_iter()
            .find(|pr| pr.id == pull_request_id)
            .ok_or_else(|| CatalogError::Http {
                status: 404,
                url: format!("demo://{}/pullrequests/{}", repository_id, pull_request_id),
            })
    }

    async fn list_pull_request_threads(
        &self,
        _project_id: &str,
        _repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<Vec<CommentThread>> {
        self.wait().await;
        let base = pull_request_id.saturating_mul(10);
        let comment = |id: u64, author: &str, content: &str, kind: &str| Comment {
            id,
            author: Some(demo_user(author)),
            content: Some(content.into()),
            comment_type: Some(kind.into()),
        };
        Ok(vec![
            CommentThread {
                id: base.saturating_add(1),
                status: None,
                comments: vec![comment(1, "Build Service", "Policy checks passed", "system")],
                is_deleted: false,
            },
            CommentThread {
                id: base.saturating_add(2),
                status: Some("active".into()),
                comments: vec![
                    comment(1, "Ana Ruiz", "Could this reuse the existing client?", "text"),
                    comment(2, "Demo User", "Switched to it.", "text"),
                ],
                is_deleted: false,
            },
            CommentThread {
                id: base.saturating_add(3),
                status: Some("fixed".into()),
                comments: vec![comment(1, "Lee Park", "Typo in the log message", "text")],
                is_deleted: false,
            },
        ])
    }

    async fn list_branches(&self, _project_id: &str, repository_id: &str) -> CatalogResult<Vec<Branch>> {
        self.wait().await;
        let name = repo_name(repository_id);
        Ok(["main", "develop", "release/2026.10"]
            .iter()
            .map(|branch| Branch {
                name: format!("refs/heads/{}", branch),
                object_id: format!("{:040x}", seed(name) as u128 * 0x9e3779b97f4a7c15 + seed(branch) as u128),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}
