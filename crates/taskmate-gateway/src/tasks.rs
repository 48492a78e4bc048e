//! HTTP implementation of the task gateway.
//!
//! Routes mirror the Taskmate backend:
//! `GET/POST /api/{user}/tasks`, `PUT/DELETE /api/{user}/tasks/{id}`,
//! `PATCH /api/{user}/tasks/{id}/complete`.

use crate::config::GatewayConfig;
use crate::http::{self, Channel};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use taskmate_core::auth::CredentialStore;
use taskmate_core::error::{Result, TaskmateError};
use taskmate_core::task::{Task, TaskGateway, TaskPatch};

/// Gateway to the remote task store over HTTP.
pub struct HttpTaskGateway {
    client: Client,
    base_url: String,
    credential: Arc<CredentialStore>,
}

impl HttpTaskGateway {
    /// Creates a gateway with the given configuration and credential store.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the underlying HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, credential: Arc<CredentialStore>) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config.timeout)?,
            base_url: config.base_url.clone(),
            credential,
        })
    }

    fn tasks_url(&self, user_id: i64) -> String {
        format!("{}/api/{}/tasks", self.base_url, user_id)
    }

    fn task_url(&self, user_id: i64, task_id: i64) -> String {
        format!("{}/api/{}/tasks/{}", self.base_url, user_id, task_id)
    }

    async fn parse_task(channel: Channel, response: reqwest::Response) -> Result<Task> {
        response
            .json::<Task>()
            .await
            .map_err(|err| channel.error(format!("failed to parse task: {err}")))
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn list(&self, user_id: i64) -> Result<Vec<Task>> {
        let token = self.credential.bearer_token().await?;
        let response = self
            .client
            .get(self.tasks_url(user_id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Read, err))?;
        let response = http::require_success(Channel::Read, response, &self.credential).await?;
        let tasks = response
            .json::<Vec<Task>>()
            .await
            .map_err(|err| TaskmateError::fetch(format!("failed to parse task list: {err}")))?;
        tracing::debug!("[HttpTaskGateway] listed {} tasks for user {}", tasks.len(), user_id);
        Ok(tasks)
    }

    async fn create(&self, user_id: i64, title: &str, description: Option<&str>) -> Result<Task> {
        let token = self.credential.bearer_token().await?;
        let response = self
            .client
            .post(self.tasks_url(user_id))
            .bearer_auth(&token)
            .json(&CreateTaskRequest { title, description })
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Write, err))?;
        let response = http::require_success(Channel::Write, response, &self.credential).await?;
        Self::parse_task(Channel::Write, response).await
    }

    async fn update(&self, user_id: i64, task_id: i64, patch: TaskPatch) -> Result<Task> {
        let token = self.credential.bearer_token().await?;
        let response = self
            .client
            .put(self.task_url(user_id, task_id))
            .bearer_auth(&token)
            .json(&patch)
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Write, err))?;
        let response = http::require_success(Channel::Write, response, &self.credential).await?;
        Self::parse_task(Channel::Write, response).await
    }

    async fn delete(&self, user_id: i64, task_id: i64) -> Result<()> {
        let token = self.credential.bearer_token().await?;
        let response = self
            .client
            .delete(self.task_url(user_id, task_id))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Write, err))?;
        http::require_success(Channel::Write, response, &self.credential).await?;
        Ok(())
    }

    async fn toggle(&self, user_id: i64, task_id: i64) -> Result<Task> {
        let token = self.credential.bearer_token().await?;
        let url = format!("{}/complete", self.task_url(user_id, task_id));
        let response = self
            .client
            .patch(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|err| http::transport_error(Channel::Write, err))?;
        let response = http::require_success(Channel::Write, response, &self.credential).await?;
        Self::parse_task(Channel::Write, response).await
    }
}

/// Wire shape of the create-task request body.
#[derive(Debug, Serialize)]
struct CreateTaskRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_omits_missing_description() {
        let body = serde_json::to_value(CreateTaskRequest {
            title: "Buy milk",
            description: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk"}));

        let body = serde_json::to_value(CreateTaskRequest {
            title: "Buy milk",
            description: Some("2%"),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"title": "Buy milk", "description": "2%"})
        );
    }

    #[test]
    fn test_task_wire_shape_matches_backend() {
        let json = serde_json::json!({
            "id": 3,
            "user_id": 1,
            "title": "Buy milk",
            "description": null,
            "completed": false,
            "created_at": "2026-08-01T09:30:00Z",
            "updated_at": "2026-08-01T09:30:00Z",
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.id, 3);
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits_before_network() {
        let gateway = HttpTaskGateway::new(
            // An unroutable endpoint: a network attempt would not return
            // AuthRequired.
            &GatewayConfig::new("http://192.0.2.1:1"),
            Arc::new(CredentialStore::new()),
        )
        .unwrap();

        let err = gateway.list(1).await.unwrap_err();
        assert!(err.is_auth_required());
    }
}
