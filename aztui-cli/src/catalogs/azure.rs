use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use aztui_core::catalog::{CatalogError, CatalogResult, RemoteCatalog};
use aztui_core::config::AppConfig;
use aztui_core::model::{
    Branch, CommentThread, ListResponse, Pipeline, PipelineRun, Project, PullRequest, Repository,
    Timeline, TimelineRecord,
};

const API_VERSION: &str = "7.1";

/// Azure DevOps REST catalog authenticated with a personal access token
pub struct AzureDevOpsCatalog {
    client: Client,
    base: Url,
    pat: String,
}

impl AzureDevOpsCatalog {
    pub fn new(config: &AppConfig) -> CatalogResult<Self> {
        if !config.is_complete() {
            return Err(CatalogError::NotConfigured);
        }
        // trailing slash so joined segments land under the organization
        let base = Url::parse(&format!("{}/", config.org_url()))
            .map_err(|e| CatalogError::Transport(format!("invalid organization URL: {}", e)))?;
        let mut builder = Client::builder().user_agent(concat!("aztui/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base,
            pat: config.azure_pat.trim().to_string(),
        })
    }

    /// `{org}/{segments...}?api-version=7.1&{query...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> CatalogResult<Url> {
        endpoint_url(&self.base, segments, query)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<T> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .basic_auth("", Some(&self.pat))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        decode(&body)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> CatalogResult<Vec<T>> {
        let list: ListResponse<T> = self.get(url).await?;
        Ok(list.value)
    }
}

fn endpoint_url(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> CatalogResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CatalogError::Transport(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    url.query_pairs_mut()
        .append_pair("api-version", API_VERSION)
        .extend_pairs(query);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteCatalog for AzureDevOpsCatalog {
    async fn list_projects(&self) -> CatalogResult<Vec<Project>> {
        let url = self.endpoint(&["_apis", "projects"], &[])?;
        self.get_list(url).await
    }

    async fn list_repositories(&self, project_id: &str) -> CatalogResult<Vec<Repository>> {
        let url = self.endpoint(&[project_id, "_apis", "git", "repositories"], &[])?;
        self.get_list(url).await
    }

    async fn list_pipelines(&self, project_id: &str) -> CatalogResult<Vec<Pipeline>> {
        let url = self.endpoint(&[project_id, "_apis", "pipelines"], &[])?;
        self.get_list(url).await
    }

    async fn list_runs(&self, project_id: &str, pipeline_id: u64) -> CatalogResult<Vec<PipelineRun>> {
        let pipeline_id = pipeline_id.to_string();
        let url = self.endpoint(&[project_id, "_apis", "pipelines", &pipeline_id, "runs"], &[])?;
        self.get_list(url).await
    }

    async fn get_timeline(&self, project_id: &str, build_id: u64) -> CatalogResult<Vec<TimelineRecord>> {
        let build_id = build_id.to_string();
        let url = self.endpoint(
            &[project_id, "_apis", "build", "builds", &build_id, "timeline"],
            &[],
        )?;
        let timeline: Timeline = self.get(url).await?;
        Ok(timeline.records)
    }

    async fn list_pull_requests(
        &self,
        project_id: &str,
        repository_id: &str,
    ) -> CatalogResult<Vec<PullRequest>> {
        let url = self.endpoint(
            &[project_id, "_apis", "git", "repositories", repository_id, "pullrequests"],
            &[("searchCriteria.status", "active")],
        )?;
        self.get_list(url).await
    }

    async fn get_pull_request(
        &self,
        project_id: &str,
        repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<PullRequest> {
        let pull_request_id = pull_request_id.to_string();
        let url = self.endpoint(
            &[project_id, "_apis", "git", "repositories", repository_id, "pullrequests", &pull_request_id],
            &[],
        )?;
        self.get(url).await
    }

    async fn list_pull_request_threads(
        &self,
        project_id: &str,
        repository_id: &str,
        pull_request_id: u64,
    ) -> CatalogResult<Vec<CommentThread>> {
        let pull_request_id = pull_request_id.to_string();
        let url = self.endpoint(
            &[
                project_id,
                "_apis",
                "git",
                "repositories",
                repository_id,
                "pullRequests",
                &pull_request_id,
                "threads",
            ],
            &[],
        )?;
        self.get_list(url).await
    }

    async fn list_branches(&self, project_id: &str, repository_id: &str) -> CatalogResult<Vec<Branch>> {
        let url = self.endpoint(
            &[project_id, "_apis", "git", "repositories", repository_id, "refs"],
            &[("filter", "heads/")],
        )?;
        self.get_list(url).await
    }

    fn name(&self) -> &'static str {
        "azure-devops"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_catalog_is_rejected() {
        let err = AzureDevOpsCatalog::new(&AppConfig::default()).err();
        assert_eq!(err, Some(CatalogError::NotConfigured));
    }

    #[test]
    fn test_zero_timeout_still_builds_a_client() {
        let mut config = AppConfig::new("https://dev.azure.com/contoso", "secret");
        config.request_timeout_secs = 0;
        assert!(AzureDevOpsCatalog::new(&config).is_ok());
    }

    #[test]
    fn test_decode_comment_threads() {
        let body = r#"{
            "count": 1,
            "value": [{
                "id": 9,
                "status": "active",
                "isDeleted": false,
                "comments": [{
                    "id": 1,
                    "content": "Can we log the retry count?",
                    "commentType": "text",
                    "author": { "displayName": "Kim Lee" }
                }]
            }]
        }"#;
        let list: ListResponse<CommentThread> = decode(body).unwrap();
        let comment = list.value[0].opening_comment().unwrap();
        assert_eq!(comment.content.as_deref(), Some("Can we log the retry count?"));
    }

    #[test]
    fn test_endpoint_encodes_project_names() {
        let base = Url::parse("https://dev.azure.com/contoso/").unwrap();
        let url = endpoint_url(&base, &["My Project", "_apis", "git", "repositories"], &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/contoso/My%20Project/_apis/git/repositories?api-version=7.1"
        );
    }

    #[test]
    fn test_endpoint_appends_query_after_api_version() {
        let base = Url::parse("https://contoso.visualstudio.com/").unwrap();
        let url = endpoint_url(&base, &["p", "_apis", "git", "repositories", "r", "refs"], &[("filter", "heads/")])
            .unwrap();
        assert_eq!(url.query(), Some("api-version=7.1&filter=heads%2F"));
    }

    #[test]
    fn test_decode_pull_request_list() {
        let body = r#"{
            "count": 1,
            "value": [{
                "pullRequestId": 42,
                "title": "Bump tokio",
                "sourceRefName": "refs/heads/deps/tokio",
                "targetRefName": "refs/heads/main",
                "status": "active",
                "createdBy": { "displayName": "Dana Reyes", "uniqueName": "dana@contoso.com" },
                "isDraft": false
            }]
        }"#;
        let list: ListResponse<PullRequest> = decode(body).unwrap();
        assert_eq!(list.count, 1);
        let pr = &list.value[0];
        assert_eq!(pr.id, 42);
        assert_eq!(pr.target_ref, "refs/heads/main");
        assert_eq!(
            pr.author.as_ref().and_then(|a| a.display_name.as_deref()),
            Some("Dana Reyes")
        );
    }

    #[test]
    fn test_decode_timeline_records() {
        let body = r#"{
            "records": [
                { "id": "a", "name": "Build", "type": "Stage", "state": "completed", "result": "succeeded", "order": 1 },
                { "id": "b", "name": "Checkout", "type": "Task", "state": "inProgress", "result": null }
            ]
        }"#;
        let timeline: Timeline = decode(body).unwrap();
        assert_eq!(timeline.records.len(), 2);
        assert_eq!(timeline.records[1].record_type, "Task");
        assert_eq!(timeline.records[1].result, None);
    }

    #[test]
    fn test_malformed_body_is_a_decode_error() {
        let err = decode::<ListResponse<Project>>("<html>sign in</html>").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
