//! GitLab REST client.
//!
//! # Responsibilities
//! - Hold the authenticated session (API base URL + private token)
//! - Issue exactly one HTTP request per capability
//! - Map non-success statuses onto the classified failure kinds
//!
//! # Status Mapping
//! ```text
//! 401                → Authentication (any verb)
//! other non-2xx      → kind of the attempted action
//!                      POST → Create, GET one → Get, GET many → List,
//!                      PUT → Update, DELETE → Delete
//! transport / decode → unclassified
//! ```
//!
//! Collections are read page by page (`per_page=100`) following the
//! `X-Next-Page` header until GitLab sends it empty.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::GitlabConfig;
use crate::gitlab::api::GitlabApi;
use crate::gitlab::types::{
    GitlabError, GitlabResult, Group, GroupId, Member, NewGroup, NewMember, NewUser,
    RemoteFailureKind, User, UserId, UserUpdate,
};

/// Header carrying the personal access token.
pub const TOKEN_HEADER: &str = "private-token";

/// Header naming the next page of a collection; empty on the last page.
pub const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Page size requested for collections (GitLab's maximum).
pub const PER_PAGE: u32 = 100;

/// Authenticated GitLab session.
#[derive(Clone)]
pub struct GitlabClient {
    client: Client,
    api_base: Url,
}

impl GitlabClient {
    /// Create a new client.
    ///
    /// No request is made; authentication problems surface on the first call.
    pub fn new(config: &GitlabConfig) -> GitlabResult<Self> {
        let url: Url = config.url.parse().map_err(|e| {
            GitlabError::InvalidInput(format!("Invalid GitLab URL '{}': {}", config.url, e))
        })?;
        let api_base = api_base(&url)?;

        let mut token = HeaderValue::from_str(&config.token).map_err(|_| {
            GitlabError::InvalidInput("access token contains invalid header characters".into())
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("gitlab-provisioner/", env!("CARGO_PKG_VERSION")));
        if !config.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            api_base = %api_base,
            timeout_secs = config.timeout_secs,
            "GitLab client initialized"
        );

        Ok(Self { client, api_base })
    }

    /// Base URL every request is resolved against (`.../api/v4/`).
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> GitlabResult<Url> {
        self.api_base
            .join(path)
            .map_err(|e| GitlabError::InvalidInput(format!("Invalid API path '{}': {}", path, e)))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        kind: RemoteFailureKind,
    ) -> GitlabResult<T> {
        let response = check_status(request.send().await?, kind).await?;
        decode(response).await
    }

    /// GET every page of a collection.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> GitlabResult<Vec<T>> {
        let url = self.endpoint(path)?;
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let request = self
                .client
                .get(url.clone())
                .query(filters)
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let response = check_status(request.send().await?, RemoteFailureKind::List).await?;
            let next = next_page(response.headers());
            let batch: Vec<T> = decode(response).await?;
            items.extend(batch);

            match next {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        tracing::debug!(path, pages = page, count = items.len(), "Collection fetched");
        Ok(items)
    }

    async fn execute(&self, request: RequestBuilder, kind: RemoteFailureKind) -> GitlabResult<()> {
        check_status(request.send().await?, kind).await?;
        Ok(())
    }
}

#[async_trait]
impl GitlabApi for GitlabClient {
    async fn create_group(&self, group: &NewGroup) -> GitlabResult<Group> {
        let request = self.client.post(self.endpoint("groups")?).json(group);
        self.fetch(request, RemoteFailureKind::Create).await
    }

    async fn get_group(&self, id: GroupId) -> GitlabResult<Group> {
        let request = self.client.get(self.endpoint(&format!("groups/{}", id))?);
        self.fetch(request, RemoteFailureKind::Get).await
    }

    async fn list_groups(&self, search: Option<&str>) -> GitlabResult<Vec<Group>> {
        let filters: Vec<(&str, &str)> = search.map(|s| ("search", s)).into_iter().collect();
        self.fetch_all("groups", &filters).await
    }

    async fn create_user(&self, user: &NewUser) -> GitlabResult<User> {
        let request = self.client.post(self.endpoint("users")?).json(user);
        self.fetch(request, RemoteFailureKind::Create).await
    }

    async fn get_user(&self, id: UserId) -> GitlabResult<User> {
        let request = self.client.get(self.endpoint(&format!("users/{}", id))?);
        self.fetch(request, RemoteFailureKind::Get).await
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> GitlabResult<User> {
        let request = self
            .client
            .put(self.endpoint(&format!("users/{}", id))?)
            .json(update);
        self.fetch(request, RemoteFailureKind::Update).await
    }

    async fn delete_user(&self, id: UserId, hard_delete: bool) -> GitlabResult<()> {
        let mut request = self.client.delete(self.endpoint(&format!("users/{}", id))?);
        if hard_delete {
            request = request.query(&[("hard_delete", "true")]);
        }
        self.execute(request, RemoteFailureKind::Delete).await
    }

    async fn list_users(&self, username: Option<&str>) -> GitlabResult<Vec<User>> {
        let filters: Vec<(&str, &str)> = username.map(|u| ("username", u)).into_iter().collect();
        self.fetch_all("users", &filters).await
    }

    async fn create_member(&self, group: GroupId, member: &NewMember) -> GitlabResult<Member> {
        let request = self
            .client
            .post(self.endpoint(&format!("groups/{}/members", group))?)
            .json(member);
        self.fetch(request, RemoteFailureKind::Create).await
    }

    async fn list_members(&self, group: GroupId) -> GitlabResult<Vec<Member>> {
        self.fetch_all(&format!("groups/{}/members", group), &[]).await
    }
}

impl std::fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabClient")
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

/// Resolve `{url}/api/v4/`, keeping any path prefix of a relative-root install.
fn api_base(url: &Url) -> GitlabResult<Url> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(GitlabError::InvalidInput(format!(
            "Unsupported URL scheme '{}'",
            url.scheme()
        )));
    }
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/v4/")
        .map_err(|e| GitlabError::InvalidInput(format!("Invalid GitLab URL '{}': {}", url, e)))
}

async fn decode<T: DeserializeOwned>(response: Response) -> GitlabResult<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| GitlabError::Decode(e.to_string()))
}

fn next_page(headers: &HeaderMap) -> Option<u32> {
    headers.get(NEXT_PAGE_HEADER)?.to_str().ok()?.trim().parse().ok()
}

async fn check_status(response: Response, kind: RemoteFailureKind) -> GitlabResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let kind = if status == StatusCode::UNAUTHORIZED {
        RemoteFailureKind::Authentication
    } else {
        kind
    };
    Err(GitlabError::remote(
        kind,
        status.as_u16(),
        error_message(status, &body),
    ))
}

/// GitLab reports failures as `{"message": ...}` or `{"error": ...}`.
fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            trimmed.to_string()
        }
    };

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("message").or_else(|| map.get("error")) {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => fallback(),
        },
        _ => fallback(),
    }
}
