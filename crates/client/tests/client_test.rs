//! HTTP-level tests for the Conduit client against a local mock server.
//!
//! These cover the wire contract (envelope shapes, expected status codes)
//! and the session bootstrap without touching the real demo backend.

use conduit_client::error::Error;
use conduit_client::types::ArticleDraft;
use conduit_client::{bootstrap, ConduitClient, Credentials};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

fn test_credentials() -> Credentials {
    Credentials::new("hansi@horsti.de", "Hansi123")
}

#[tokio::test]
async fn login_sends_user_envelope_and_returns_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_json(json!({
            "user": { "email": "hansi@horsti.de", "password": "Hansi123" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "email": "hansi@horsti.de",
                "username": "hansi",
                "token": "jwt-abc123"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let user = client.login("hansi@horsti.de", "Hansi123").await.unwrap();

    assert_eq!(user.token, "jwt-abc123");
    assert_eq!(user.username, "hansi");
}

#[tokio::test]
async fn bootstrap_session_carries_token_into_storage_state() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "email": "hansi@horsti.de", "token": "jwt-snapshot" }
        })))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let session = bootstrap(&client, &test_credentials()).await.unwrap();

    assert_eq!(session.token(), "jwt-snapshot");

    let state = session.storage_state("https://angular.realworld.how");
    assert_eq!(state.token().unwrap(), "jwt-snapshot");
}

#[tokio::test]
async fn bootstrap_aborts_when_response_has_no_token() {
    let server = MockServer::start().await;

    // A 200 whose body lacks user.token must not yield a usable session.
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "email": "hansi@horsti.de" }
        })))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let result = bootstrap(&client, &test_credentials()).await;

    assert!(matches!(result, Err(Error::MissingToken)));
}

#[tokio::test]
async fn bootstrap_aborts_on_rejected_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": { "email or password": ["is invalid"] }
        })))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let result = bootstrap(&client, &test_credentials()).await;

    assert!(matches!(
        result,
        Err(Error::UnexpectedStatus {
            operation: "login",
            actual: 403,
            ..
        })
    ));
}

#[tokio::test]
async fn create_article_expects_201_and_returns_slug() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/articles/"))
        .and(header("authorization", "Token jwt-abc123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "article": {
                "slug": "my-new-article-k3x9a1",
                "title": "My new article",
                "description": "About testing",
                "body": "Body text"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let draft = ArticleDraft {
        title: "My new article".to_string(),
        description: "About testing".to_string(),
        body: "Body text".to_string(),
        tag_list: vec![],
    };

    let article = client
        .create_article(&draft, Some("jwt-abc123"))
        .await
        .unwrap();

    assert!(!article.slug.is_empty());
    assert_eq!(article.title, "My new article");
}

#[tokio::test]
async fn create_article_rejects_any_other_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/articles/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "article": { "slug": "s", "title": "t", "description": "d", "body": "b" }
        })))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let draft = ArticleDraft {
        title: "t".to_string(),
        description: "d".to_string(),
        body: "b".to_string(),
        tag_list: vec![],
    };

    let result = client.create_article(&draft, None).await;
    assert!(matches!(
        result,
        Err(Error::UnexpectedStatus {
            operation: "create article",
            expected: 201,
            actual: 200,
        })
    ));
}

#[tokio::test]
async fn delete_article_expects_204() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/articles/my-new-article-k3x9a1"))
        .and(header("authorization", "Token jwt-abc123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    client
        .delete_article("my-new-article-k3x9a1", Some("jwt-abc123"))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_article_surfaces_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/articles/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let result = client.delete_article("gone", None).await;

    assert!(matches!(
        result,
        Err(Error::UnexpectedStatus {
            operation: "delete article",
            expected: 204,
            actual: 404,
        })
    ));
}

#[tokio::test]
async fn tags_returns_list_from_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tags": ["automation", "rust", "testing"]
        })))
        .mount(&server)
        .await;

    let client = ConduitClient::new(api_base(&server)).unwrap();
    let tags = client.tags().await.unwrap();

    assert_eq!(tags, vec!["automation", "rust", "testing"]);
}
