//! Remote catalog contract
//!
//! The navigation core only depends on this trait. Implementations live in
//! the CLI crate (Azure DevOps over HTTP, and a demo catalog with canned data).

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    Branch, CommentThread, Pipeline, PipelineRun, Project, PullRequest, Repository, TimelineRecord,
};

/// Errors a catalog call can fail with. The core never interprets them
/// beyond their display text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("request to {url} failed with status {status}")]
    Http { status: u16, url: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("catalog is not configured (missing organization URL or token)")]
    NotConfigured,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    async fn list_projects(&self) -> CatalogResult<Vec<Project>>;

    async fn list_repositories(&self, project_id: &str) -> CatalogResult<Vec<Repository>>;

    async fn list_pipelines(&self, project_id: &str) -> CatalogResult<Vec<Pipeline>>;

    async fn list_runs(&self, project_id: &str, pipeline_id: u64) -> CatalogResult<Vec<PipelineRun>>;

    async fn get_timeline(&self, project_id: &str, build_id: u64) -> CatalogResult<Vec<TimelineRecord>>;

    /// Active pull requests targeting or originating in the repository
    async fn list_pull_requests(
        &self,
        project_id: &str,
        repository_id: &str,
    ) -> CatalogResult<Vec<PullRequest>>;

    async fn get_pull_request(
        &self,
        project_id: &str,
        repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<PullRequest>;

    async fn list_pull_request_threads(
        &self,
        project_id: &str,
        repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<Vec<CommentThread>>;

    async fn list_branches(&self, project_id: &str, repository_id: &str) -> CatalogResult<Vec<Branch>>;

    /// Pipelines whose name matches the repository name
    async fn list_pipelines_for_repository(
        &self,
        project_id: &str,
        repository_name: &str,
    ) -> CatalogResult<Vec<Pipeline>> {
        let pipelines = self.list_pipelines(project_id).await?;
        Ok(pipelines
            .into_iter()
            .filter(|p| p.name == repository_name)
            .collect())
    }

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
