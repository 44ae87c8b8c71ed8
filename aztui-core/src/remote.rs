//! Recognising Azure DevOps git remotes

use crate::model::SelectOption;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteInfo {
    pub organization: String,
    pub project: String,
    pub repository: String,
}

/// Parse an `origin` URL into organization, project and repository.
///
/// Accepted forms:
/// - `https://[user@]dev.azure.com/{org}/{project}/_git/{repo}`
/// - `https://{org}.visualstudio.com/{project}/_git/{repo}`
/// - `git@ssh.dev.azure.com:v3/{org}/{project}/{repo}`
pub fn parse_remote_url(url: &str) -> Option<RemoteInfo> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    if let Some(path) = url.strip_prefix("git@ssh.dev.azure.com:v3/") {
        let mut parts = path.splitn(3, '/');
        return remote_info(parts.next()?, parts.next()?, parts.next()?);
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = rest.split_once('/')?;
    let host = host.rsplit_once('@').map_or(host, |(_, h)| h);

    if host.eq_ignore_ascii_case("dev.azure.com") {
        let (organization, path) = path.split_once('/')?;
        let (project, repository) = path.split_once("/_git/")?;
        remote_info(organization, project, repository)
    } else {
        let organization = host.strip_suffix(".visualstudio.com")?;
        let (project, repository) = path.split_once("/_git/")?;
        remote_info(organization, project, repository)
    }
}

fn remote_info(organization: &str, project: &str, repository: &str) -> Option<RemoteInfo> {
    if [organization, project, repository]
        .iter()
        .any(|s| s.is_empty() || s.contains('/'))
    {
        return None;
    }
    Some(RemoteInfo {
        organization: decode_segment(organization),
        project: decode_segment(project),
        repository: decode_segment(repository),
    })
}

/// Percent-decode a path segment, keeping the raw text if it is not UTF-8
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Organization named by a configured organization URL
pub fn organization_from_url(org_url: &str) -> Option<&str> {
    let url = org_url.trim().trim_end_matches('/');
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    match rest.split_once('/') {
        Some((host, path)) if host.eq_ignore_ascii_case("dev.azure.com") => {
            path.split('/').next().filter(|org| !org.is_empty())
        }
        Some((host, _)) => host.strip_suffix(".visualstudio.com"),
        None => rest.strip_suffix(".visualstudio.com"),
    }
}

/// Whether a remote's organization is the one the config points at
pub fn organization_matches(org_url: &str, organization: &str) -> bool {
    organization_from_url(org_url).is_some_and(|org| org.eq_ignore_ascii_case(organization))
}

/// Position of the option labelled `name`: exact match first, then case-insensitive
pub fn find_by_name(options: &[SelectOption], name: &str) -> Option<usize> {
    options
        .iter()
        .position(|o| o.label == name)
        .or_else(|| options.iter().position(|o| o.label.eq_ignore_ascii_case(name)))
}
