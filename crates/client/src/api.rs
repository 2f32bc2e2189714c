//! Conduit REST client
//!
//! One async method per remote operation. Methods that have a single
//! well-defined success status (201 on create, 204 on delete) enforce it and
//! surface anything else as [`Error::UnexpectedStatus`].

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{
    Article, ArticleDraft, ArticleEnvelope, CreateArticleRequest, LoginRequest, LoginUser,
    TagsEnvelope, User, UserEnvelope,
};

/// Default per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Conduit demo API
#[derive(Debug, Clone)]
pub struct ConduitClient {
    http: reqwest::Client,
    api_base: String,
}

impl ConduitClient {
    /// Create a new client against the given API base URL
    /// (e.g. `https://api.realworld.io/api`)
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_http(http, api_base))
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_http(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base }
    }

    /// Base URL this client talks to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Authenticate and return the user record, token included
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let url = format!("{}/users/login", self.api_base);
        let body = LoginRequest {
            user: LoginUser { email, password },
        };

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                operation: "login",
                expected: StatusCode::OK.as_u16(),
                actual: status.as_u16(),
            });
        }

        let envelope: UserEnvelope = response.json().await?;
        debug!("logged in as {}", envelope.user.email);
        Ok(envelope.user)
    }

    /// Create an article. The API answers 201 with the server-assigned slug.
    pub async fn create_article(
        &self,
        draft: &ArticleDraft,
        token: Option<&str>,
    ) -> Result<Article> {
        let url = format!("{}/articles/", self.api_base);
        let mut request = self.http.post(&url).json(&CreateArticleRequest { article: draft });
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::CREATED {
            return Err(Error::UnexpectedStatus {
                operation: "create article",
                expected: StatusCode::CREATED.as_u16(),
                actual: status.as_u16(),
            });
        }

        let envelope: ArticleEnvelope = response.json().await?;
        debug!("created article {}", envelope.article.slug);
        Ok(envelope.article)
    }

    /// Delete an article by slug. The API answers 204 with no body.
    pub async fn delete_article(&self, slug: &str, token: Option<&str>) -> Result<()> {
        let url = format!("{}/articles/{}", self.api_base, slug);
        let mut request = self.http.delete(&url);
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            return Err(Error::UnexpectedStatus {
                operation: "delete article",
                expected: StatusCode::NO_CONTENT.as_u16(),
                actual: status.as_u16(),
            });
        }

        debug!("deleted article {}", slug);
        Ok(())
    }

    /// Fetch the global tag list
    pub async fn tags(&self) -> Result<Vec<String>> {
        let url = format!("{}/tags", self.api_base);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                operation: "tags",
                expected: StatusCode::OK.as_u16(),
                actual: status.as_u16(),
            });
        }

        let envelope: TagsEnvelope = response.json().await?;
        Ok(envelope.tags)
    }
}
