//! Wire-format types for the Conduit API
//!
//! The Conduit API wraps every payload in a single-key envelope
//! (`{"user": ...}`, `{"article": ...}`); the envelope structs here mirror
//! that shape so request and response bodies serialize without hand-built
//! JSON.

use serde::{Deserialize, Serialize};

/// Authenticated user as returned by `POST /api/users/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    /// Session token. Absent or empty when authentication failed upstream.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// `{"user": ...}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

/// Login credentials in the wire shape the API expects
#[derive(Debug, Serialize)]
pub struct LoginUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `{"user": {"email", "password"}}` request body
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub user: LoginUser<'a>,
}

/// Fields of an article the caller provides on creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_list: Vec<String>,
}

/// `{"article": <draft>}` request body
#[derive(Debug, Serialize)]
pub struct CreateArticleRequest<'a> {
    pub article: &'a ArticleDraft,
}

/// Article as returned by the API, slug included
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

/// `{"article": ...}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleEnvelope {
    pub article: Article,
}

/// `{"tags": [...]}` envelope from `GET /api/tags`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsEnvelope {
    pub tags: Vec<String>,
}
