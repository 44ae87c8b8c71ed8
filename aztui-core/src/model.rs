use serde::{Deserialize, Serialize};

pub type ProjectId = String;
pub type RepositoryId = String;

/// A presentation-ready selectable item projected from a catalog record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
    pub description: String,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Pane {
    #[default]
    Projects,
    Repositories,
    Workspace,
}

impl Pane {
    pub fn label(&self) -> &'static str {
        match self {
            Pane::Projects => "projects",
            Pane::Repositories => "repos",
            Pane::Workspace => "workspace",
        }
    }
}

// --- Catalog records (Azure DevOps REST shapes) ---

/// Envelope used by every Azure DevOps list endpoint
#[derive(Clone, Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    pub value: Vec<T>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<&Project> for SelectOption {
    fn from(project: &Project) -> Self {
        SelectOption::new(&project.id, &project.name, &project.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl From<&Repository> for SelectOption {
    fn from(repo: &Repository) -> Self {
        SelectOption::new(&repo.id, &repo.name, &repo.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub id: u64,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub created_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub records: Vec<TimelineRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
}

impl IdentityRef {
    pub fn display(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.unique_name.as_deref())
            .unwrap_or("unknown")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    #[serde(rename = "pullRequestId")]
    pub id: u64,
    pub title: String,
    #[serde(rename = "sourceRefName")]
    pub source_ref: String,
    #[serde(rename = "targetRefName")]
    pub target_ref: String,
    pub status: String,
    #[serde(default, rename = "createdBy")]
    pub author: Option<IdentityRef>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

/// A discussion on a pull request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub author: Option<IdentityRef>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub comment_type: Option<String>,
}

impl CommentThread {
    /// First comment written by a person; vote and push threads have none
    pub fn opening_comment(&self) -> Option<&Comment> {
        self.comments
            .iter()
            .find(|c| c.comment_type.as_deref() != Some("system"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub object_id: String,
}

/// Strip the `refs/heads/` prefix Azure DevOps puts on branch refs
pub fn short_ref(name: &str) -> &str {
    name.strip_prefix("refs/heads/").unwrap_or(name)
}

impl Branch {
    pub fn short_name(&self) -> &str {
        short_ref(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_list_decodes_azure_envelope() {
        let json = r#"{
            "count": 2,
            "value": [
                {"id": "p1", "name": "Alpha", "state": "wellFormed"},
                {"id": "p2", "name": "Beta", "description": "second"}
            ]
        }"#;
        let list: ListResponse<Project> = serde_json::from_str(json).unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(list.value[0].name, "Alpha");
        assert_eq!(list.value[1].description.as_deref(), Some("second"));
    }

    #[test]
    fn test_project_projects_to_option_with_id_description() {
        let project = Project {
            id: "p1".into(),
            name: "Alpha".into(),
            description: None,
        };
        let option = SelectOption::from(&project);
        assert_eq!(option, SelectOption::new("p1", "Alpha", "p1"));
    }

    #[test]
    fn test_pull_request_field_renames() {
        let json = r#"{
            "pullRequestId": 42,
            "title": "Add retries",
            "sourceRefName": "refs/heads/feature/retries",
            "targetRefName": "refs/heads/main",
            "status": "active",
            "createdBy": {"displayName": "Dana"}
        }"#;
        let pr: PullRequest = serde_json::from_str(json).unwrap();
        assert_eq!(pr.id, 42);
        assert_eq!(short_ref(&pr.source_ref), "feature/retries");
        assert_eq!(
            pr.author.and_then(|a| a.display_name).as_deref(),
            Some("Dana")
        );
    }

    #[test]
    fn test_system_comments_are_skipped() {
        let json = r#"{
            "id": 3,
            "status": "active",
            "comments": [
                {"id": 1, "content": "Policy check passed", "commentType": "system"},
                {"id": 2, "content": "Needs a test", "commentType": "text", "author": {"uniqueName": "kim@contoso.com"}}
            ]
        }"#;
        let thread: CommentThread = serde_json::from_str(json).unwrap();
        assert!(!thread.is_deleted);
        let comment = thread.opening_comment().unwrap();
        assert_eq!(comment.id, 2);
        assert_eq!(comment.author.as_ref().map(IdentityRef::display), Some("kim@contoso.com"));
    }

    #[test]
    fn test_timeline_record_type_field() {
        let json = r#"{"records": [
            {"id": "a", "name": "Build", "type": "Stage", "state": "completed", "result": "succeeded", "order": 1}
        ]}"#;
        let timeline: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(timeline.records[0].record_type, "Stage");
        assert_eq!(timeline.records[0].order, Some(1));
    }
}
