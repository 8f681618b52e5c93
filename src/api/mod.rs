#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::error::TaskuiError;
use crate::task::model::{Task, TaskStatus};

/// Client for the task service. Every operation is a single best-effort
/// round trip: no retry, no batching, and no timeout beyond the transport
/// default. Non-2xx responses surface the server's `message` field when the
/// body carries one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub status: TaskStatus,
}

/// Partial update body for `PATCH /task/:id`; absent fields are left alone
/// by the server.
#[derive(Debug, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: TokenEnvelope,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Token plus display name, as handed out by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub name: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TaskuiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(TaskuiError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, TaskuiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        let response = check_status(response).await?;
        let out: LoginResponse = response.json().await.map_err(TaskuiError::Network)?;
        Ok(Credentials {
            token: out.token.access_token,
            name: out.name,
        })
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), TaskuiError> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&body)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, TaskuiError> {
        let response = self
            .http
            .get(self.url("/task/"))
            .header("Authorization", token)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        let response = check_status(response).await?;
        let out: DataEnvelope<Vec<Task>> = response.json().await.map_err(TaskuiError::Network)?;
        Ok(out.data)
    }

    pub async fn create_task(&self, token: &str, task: &NewTask<'_>) -> Result<Task, TaskuiError> {
        let response = self
            .http
            .post(self.url("/task"))
            .header("Authorization", token)
            .json(task)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        let response = check_status(response).await?;
        let out: DataEnvelope<Task> = response.json().await.map_err(TaskuiError::Network)?;
        Ok(out.data)
    }

    pub async fn update_task(
        &self,
        token: &str,
        id: i64,
        patch: &TaskPatch,
    ) -> Result<(), TaskuiError> {
        let response = self
            .http
            .patch(self.url(&format!("/task/{id}")))
            .header("Authorization", token)
            .json(patch)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn update_task_status(
        &self,
        token: &str,
        id: i64,
        status: TaskStatus,
    ) -> Result<(), TaskuiError> {
        let body = serde_json::json!({ "status": status });
        let response = self
            .http
            .patch(self.url(&format!("/task/status/{id}")))
            .header("Authorization", token)
            .json(&body)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        check_status(response).await?;
        Ok(())
    }

    pub async fn delete_task(&self, token: &str, id: i64) -> Result<(), TaskuiError> {
        let response = self
            .http
            .delete(self.url(&format!("/task/{id}")))
            .header("Authorization", token)
            .send()
            .await
            .map_err(TaskuiError::Network)?;

        check_status(response).await?;
        Ok(())
    }
}

/// Maps non-2xx responses onto the error taxonomy. The server-supplied
/// `message` is preferred; a generic fallback covers empty or non-JSON
/// bodies.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TaskuiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(TaskuiError::Unauthorized(
            message.unwrap_or_else(|| "unauthorized - please log in again".to_owned()),
        ));
    }

    Err(TaskuiError::Server {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| format!("request failed with status {status}")),
    })
}
