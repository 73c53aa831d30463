use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::AccountsConfig;

/// Errors from the account-management service.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("account service returned {status} for {context}")]
    Status { status: u16, context: String },
}

/// A user record as returned by the account-management service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUser {
    pub id: String,
    pub email: String,
    /// Space-separated role names.
    #[serde(default)]
    pub roles: String,
    /// Deactivation timestamp in epoch millis; zero for active users.
    #[serde(default)]
    pub delete_at: i64,
}

impl AccountUser {
    pub fn is_deactivated(&self) -> bool {
        self.delete_at != 0
    }

    pub fn is_system_admin(&self) -> bool {
        self.roles
            .split_whitespace()
            .any(|role| role == "system_admin")
    }
}

/// Client for the account-management service.
///
/// User and channel removal return the raw HTTP status instead of
/// failing on non-2xx: the caller decides whether a status aborts the
/// run.
#[async_trait]
pub trait AccountClient: Send + Sync {
    /// Fetch one page of users. An empty page means the listing is done.
    async fn list_users(
        &self,
        page: u32,
        per_page: u32,
        inactive_only: bool,
    ) -> Result<Vec<AccountUser>, AccountError>;

    /// Permanently delete a user account. Returns the HTTP status code.
    async fn delete_user(&self, user_id: &str) -> Result<u16, AccountError>;

    /// Permanently delete a channel. Returns the HTTP status code.
    async fn delete_channel(&self, channel_id: &str) -> Result<u16, AccountError>;

    /// Create a post in a channel, returning the new post's ID.
    async fn create_post(&self, channel_id: &str, message: &str) -> Result<String, AccountError>;

    /// Replace the message of an existing post.
    async fn update_post(&self, post_id: &str, message: &str) -> Result<(), AccountError>;
}

/// HTTP implementation over the platform's REST API.
pub struct HttpAccountClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpAccountClient {
    pub fn new(config: &AccountsConfig) -> Result<Self, AccountError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    id: String,
}

#[async_trait]
impl AccountClient for HttpAccountClient {
    async fn list_users(
        &self,
        page: u32,
        per_page: u32,
        inactive_only: bool,
    ) -> Result<Vec<AccountUser>, AccountError> {
        let mut request = self
            .client
            .get(self.url("/api/v4/users"))
            .bearer_auth(&self.token)
            .query(&[("page", page), ("per_page", per_page)]);
        if inactive_only {
            request = request.query(&[("inactive", "true")]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AccountError::Status {
                status: response.status().as_u16(),
                context: "user listing".to_string(),
            });
        }

        Ok(response.json().await?)
    }

    async fn delete_user(&self, user_id: &str) -> Result<u16, AccountError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v4/users/{user_id}")))
            .bearer_auth(&self.token)
            .query(&[("permanent", "true")])
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<u16, AccountError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/v4/channels/{channel_id}")))
            .bearer_auth(&self.token)
            .query(&[("permanent", "true")])
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn create_post(&self, channel_id: &str, message: &str) -> Result<String, AccountError> {
        let response = self
            .client
            .post(self.url("/api/v4/posts"))
            .bearer_auth(&self.token)
            .json(&json!({ "channel_id": channel_id, "message": message }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AccountError::Status {
                status: response.status().as_u16(),
                context: "post creation".to_string(),
            });
        }

        let post: PostResponse = response.json().await?;
        Ok(post.id)
    }

    async fn update_post(&self, post_id: &str, message: &str) -> Result<(), AccountError> {
        let response = self
            .client
            .put(self.url(&format!("/api/v4/posts/{post_id}/patch")))
            .bearer_auth(&self.token)
            .json(&json!({ "message": message }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AccountError::Status {
                status: response.status().as_u16(),
                context: "post update".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> AccountsConfig {
        AccountsConfig {
            base_url,
            token: "test-token".to_string(),
            timeout_secs: 5,
            page_size: 100,
        }
    }

    #[tokio::test]
    async fn test_list_users_deserializes_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/users"))
            .and(query_param("page", "0"))
            .and(query_param("inactive", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": "u1",
                    "email": "u1@example.test",
                    "roles": "system_user",
                    "delete_at": 1700000000000i64
                }
            ])))
            .mount(&server)
            .await;

        let client = HttpAccountClient::new(&test_config(server.uri())).unwrap();
        let users = client.list_users(0, 100, true).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "u1");
        assert!(users[0].is_deactivated());
        assert!(!users[0].is_system_admin());
    }

    #[tokio::test]
    async fn test_list_users_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/users"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = HttpAccountClient::new(&test_config(server.uri())).unwrap();
        let err = client.list_users(0, 100, false).await.unwrap_err();
        assert!(matches!(err, AccountError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_delete_user_returns_status_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/users/gone"))
            .and(query_param("permanent", "true"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpAccountClient::new(&test_config(server.uri())).unwrap();
        let status = client.delete_user("gone").await.unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn test_create_and_update_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/posts"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "p1" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/posts/p1/patch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = HttpAccountClient::new(&test_config(server.uri())).unwrap();
        let post_id = client.create_post("town-square", "starting").await.unwrap();
        assert_eq!(post_id, "p1");
        client.update_post(&post_id, "done").await.unwrap();
    }

    #[test]
    fn test_system_admin_role_detection() {
        let user = AccountUser {
            id: "a".into(),
            email: "a@example.test".into(),
            roles: "system_user system_admin".into(),
            delete_at: 0,
        };
        assert!(user.is_system_admin());
        assert!(!user.is_deactivated());
    }
}
