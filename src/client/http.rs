//! HTTP implementation of [`TodoApi`] over `reqwest`.

use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::api::{ApiFuture, ClientError, TodoApi};
use super::model::NewTodo;
use crate::api::DeleteResponse;

/// Base URL used when none is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// HTTP client for the todo API.
///
/// # Example
///
/// ```ignore
/// let client = TodoApiClient::new("http://localhost:4000/");
/// let todos = client.list_todos().await?;
/// ```
#[derive(Debug, Clone)]
pub struct TodoApiClient {
    client: Client,
    base_url: String,
}

impl Default for TodoApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoApiClient {
    /// Creates a client for `base_url`. One trailing slash is dropped.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        let base_url = base_url.strip_suffix('/').unwrap_or(base_url).to_string();
        Self { client, base_url }
    }

    /// Returns the base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    /// Deletes a todo through `DELETE /api/todos/{key}`, percent-encoding the key.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidArgument` for an empty key or an unusable
    /// base URL, and the usual request errors otherwise.
    pub async fn delete_todo_by_path(&self, key: &str) -> Result<DeleteResponse, ClientError> {
        if key.is_empty() {
            return Err(ClientError::InvalidArgument(
                "delete_todo_by_path requires a `key` string".to_string(),
            ));
        }

        let mut url = Url::parse(&self.base_url).map_err(|error| {
            ClientError::InvalidArgument(format!("Invalid base URL {}: {error}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidArgument(format!(
                    "Base URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "todos", key]);

        send(&self.client, Method::DELETE, url.to_string(), None).await
    }
}

impl TodoApi for TodoApiClient {
    fn list_todos(&self) -> ApiFuture<Value> {
        let client = self.client.clone();
        let url = self.todos_url();
        Box::pin(async move { send(&client, Method::GET, url, None).await })
    }

    fn create_todo(&self, todo: &NewTodo) -> ApiFuture<Value> {
        let client = self.client.clone();
        let url = self.todos_url();
        let body = json!({
            "title": todo.title,
            "description": todo.description,
            "completed": todo.completed,
        });
        Box::pin(async move { send(&client, Method::POST, url, Some(body)).await })
    }

    fn update_todo(&self, key: &str, updates: &Map<String, Value>) -> ApiFuture<Value> {
        let client = self.client.clone();
        let url = self.todos_url();
        let body = json!({ "key": key, "updates": updates });
        let argument = if key.is_empty() {
            Err(ClientError::InvalidArgument(
                "update_todo requires a `key` string".to_string(),
            ))
        } else {
            Ok(())
        };
        Box::pin(async move {
            argument?;
            send(&client, Method::PATCH, url, Some(body)).await
        })
    }

    fn delete_todo(&self, key: &str) -> ApiFuture<DeleteResponse> {
        let client = self.client.clone();
        let url = self.todos_url();
        let body = json!({ "key": key });
        let argument = if key.is_empty() {
            Err(ClientError::InvalidArgument(
                "delete_todo requires a `key` string".to_string(),
            ))
        } else {
            Ok(())
        };
        Box::pin(async move {
            argument?;
            send(&client, Method::DELETE, url, Some(body)).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn send<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: String,
    body: Option<Value>,
) -> Result<T, ClientError> {
    let mut request = client
        .request(method.clone(), &url)
        .header(reqwest::header::ACCEPT, "application/json");
    if let Some(body) = &body {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|error| ClientError::Transport {
            method: method.as_str().to_string(),
            url: url.clone(),
            reason: error.to_string(),
        })?;

    parse_response(method, url, response).await
}

async fn parse_response<T: DeserializeOwned>(
    method: Method,
    url: String,
    response: Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.text().await.unwrap_or(reason);
        return Err(ClientError::Status {
            method: method.as_str().to_string(),
            url,
            status: status.as_u16(),
            body,
        });
    }

    let text = response
        .text()
        .await
        .map_err(|error| ClientError::Transport {
            method: method.as_str().to_string(),
            url: url.clone(),
            reason: error.to_string(),
        })?;
    serde_json::from_str(&text).map_err(|error| ClientError::Decode {
        url,
        reason: error.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:4000", "http://localhost:4000")]
    #[case("http://localhost:4000/", "http://localhost:4000")]
    #[case("http://api.test/base/", "http://api.test/base")]
    fn test_new_trims_one_trailing_slash(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(TodoApiClient::new(input).base_url(), expected);
    }

    #[rstest]
    fn test_default_base_url() {
        assert_eq!(TodoApiClient::default().base_url(), "http://localhost:4000");
    }

    #[rstest]
    #[tokio::test]
    async fn test_update_todo_rejects_empty_key_without_sending() {
        // Port 1 is never listening; an attempted send would be a Transport error.
        let client = TodoApiClient::new("http://127.0.0.1:1");
        let result = client.update_todo("", &Map::new()).await;
        assert_eq!(
            result,
            Err(ClientError::InvalidArgument(
                "update_todo requires a `key` string".to_string()
            ))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_delete_todo_rejects_empty_key_without_sending() {
        let client = TodoApiClient::new("http://127.0.0.1:1");
        let result = client.delete_todo("").await;
        assert!(matches!(result, Err(ClientError::InvalidArgument(_))));

        let result = client.delete_todo_by_path("").await;
        assert!(matches!(result, Err(ClientError::InvalidArgument(_))));
    }

    #[rstest]
    #[tokio::test]
    async fn test_transport_error_names_method_and_url() {
        let client = TodoApiClient::new("http://127.0.0.1:1");
        let error = client.list_todos().await.unwrap_err();
        assert!(
            error
                .to_string()
                .starts_with("GET http://127.0.0.1:1/api/todos failed:")
        );
    }

    #[rstest]
    fn test_status_error_display() {
        let error = ClientError::Status {
            method: "PATCH".to_string(),
            url: "http://localhost:4000/api/todos".to_string(),
            status: 404,
            body: "{\"error\":\"Key not found\"}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "PATCH http://localhost:4000/api/todos failed: 404 {\"error\":\"Key not found\"}"
        );
    }
}
