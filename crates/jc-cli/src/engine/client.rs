//! Engine REST client
//!
//! Every call maps the engine's status codes onto [`ActionError`]; callers
//! print the error and decide whether to continue.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use jc_core::api::{
    ContainerConfig, ContainerSummary, IdResponse, ImageSummary, NetworkConfig, NetworkSummary,
};
use jc_core::error::ActionError;
use jc_core::EngineUrl;

/// Which resource a call acts on, and what a 304 means for it
#[derive(Debug, Clone, Copy)]
struct Resource {
    name: &'static str,
    not_modified: Option<&'static str>,
}

const CONTAINER: Resource = Resource {
    name: "container",
    not_modified: None,
};
const IMAGE: Resource = Resource {
    name: "image",
    not_modified: None,
};
const NETWORK: Resource = Resource {
    name: "network",
    not_modified: None,
};

/// Client for one engine
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: Client,
    url: EngineUrl,
}

impl EngineClient {
    pub fn new(url: EngineUrl) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Engine this client talks to
    pub fn url(&self) -> &EngineUrl {
        &self.url
    }

    /// Create a container; returns its id
    pub async fn create_container(
        &self,
        name: Option<&str>,
        config: &ContainerConfig,
    ) -> Result<String, ActionError> {
        let mut request = self
            .http
            .post(self.url.api(["containers", "create"]))
            .json(config);
        if let Some(name) = name {
            request = request.query(&[("name", name)]);
        }
        let response = send(request).await?;
        expect_id(response, StatusCode::CREATED, CONTAINER).await
    }

    /// List containers; stopped ones only when `all` is set
    pub async fn list_containers(&self, all: bool) -> Result<Vec<ContainerSummary>, ActionError> {
        let request = self
            .http
            .get(self.url.api(["containers", "list"]))
            .query(&[("all", all)]);
        let response = send(request).await?;
        expect_json(response, StatusCode::OK, CONTAINER).await
    }

    /// Start a container; returns its id
    pub async fn start_container(&self, container: &str) -> Result<String, ActionError> {
        let request = self
            .http
            .post(self.url.api(["containers", container, "start"]));
        let response = send(request).await?;
        let resource = Resource {
            not_modified: Some("container already started"),
            ..CONTAINER
        };
        expect_id(response, StatusCode::OK, resource).await
    }

    /// Stop a container; returns its id
    pub async fn stop_container(&self, container: &str) -> Result<String, ActionError> {
        let request = self
            .http
            .post(self.url.api(["containers", container, "stop"]));
        let response = send(request).await?;
        let resource = Resource {
            not_modified: Some("container already stopped"),
            ..CONTAINER
        };
        expect_id(response, StatusCode::OK, resource).await
    }

    /// Remove a container; returns its id
    pub async fn remove_container(&self, container: &str) -> Result<String, ActionError> {
        let request = self.http.delete(self.url.api(["containers", container]));
        let response = send(request).await?;
        expect_id(response, StatusCode::OK, CONTAINER).await
    }

    pub async fn list_images(&self) -> Result<Vec<ImageSummary>, ActionError> {
        let request = self.http.get(self.url.api(["images", "list"]));
        let response = send(request).await?;
        expect_json(response, StatusCode::OK, IMAGE).await
    }

    pub async fn remove_image(&self, image: &str) -> Result<String, ActionError> {
        let request = self.http.delete(self.url.api(["images", image]));
        let response = send(request).await?;
        expect_id(response, StatusCode::OK, IMAGE).await
    }

    pub async fn create_network(&self, config: &NetworkConfig) -> Result<String, ActionError> {
        let request = self
            .http
            .post(self.url.api(["networks", "create"]))
            .json(config);
        let response = send(request).await?;
        expect_id(response, StatusCode::CREATED, NETWORK).await
    }

    pub async fn list_networks(&self) -> Result<Vec<NetworkSummary>, ActionError> {
        let request = self.http.get(self.url.api(["networks", "list"]));
        let response = send(request).await?;
        expect_json(response, StatusCode::OK, NETWORK).await
    }

    pub async fn remove_network(&self, network: &str) -> Result<String, ActionError> {
        let request = self.http.delete(self.url.api(["networks", network]));
        let response = send(request).await?;
        expect_id(response, StatusCode::OK, NETWORK).await
    }

    /// Connect a container to a network
    pub async fn connect_network(&self, network: &str, container: &str) -> Result<(), ActionError> {
        let request = self
            .http
            .post(self.url.api(["networks", network, "connect", container]));
        let response = send(request).await?;
        expect_status(&response, StatusCode::NO_CONTENT, NETWORK)
    }

    /// Disconnect a container from a network
    pub async fn disconnect_network(
        &self,
        network: &str,
        container: &str,
    ) -> Result<(), ActionError> {
        let request = self
            .http
            .post(self.url.api(["networks", network, "disconnect", container]));
        let response = send(request).await?;
        expect_status(&response, StatusCode::NO_CONTENT, NETWORK)
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ActionError> {
    let response = request
        .send()
        .await
        .map_err(|e| ActionError::Request(e.to_string()))?;
    debug!(url = %response.url(), status = %response.status(), "Engine responded");
    Ok(response)
}

/// Map a status other than the expected one to an error
fn status_error(status: StatusCode, resource: Resource) -> ActionError {
    match status {
        StatusCode::NOT_MODIFIED => match resource.not_modified {
            Some(message) => ActionError::NotModified(message),
            None => ActionError::UnexpectedStatus(status.as_u16()),
        },
        StatusCode::NOT_FOUND => ActionError::NotFound(resource.name),
        StatusCode::INTERNAL_SERVER_ERROR => ActionError::ServerError,
        other => ActionError::UnexpectedStatus(other.as_u16()),
    }
}

fn expect_status(
    response: &Response,
    expected: StatusCode,
    resource: Resource,
) -> Result<(), ActionError> {
    let status = response.status();
    if status == expected {
        Ok(())
    } else {
        Err(status_error(status, resource))
    }
}

async fn expect_json<T: DeserializeOwned>(
    response: Response,
    expected: StatusCode,
    resource: Resource,
) -> Result<T, ActionError> {
    expect_status(&response, expected, resource)?;
    response
        .json::<T>()
        .await
        .map_err(|e| ActionError::InvalidResponse(e.to_string()))
}

async fn expect_id(
    response: Response,
    expected: StatusCode,
    resource: Resource,
) -> Result<String, ActionError> {
    let body: IdResponse = expect_json(response, expected, resource).await?;
    Ok(body.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_modified_depends_on_resource() {
        let start = Resource {
            not_modified: Some("container already started"),
            ..CONTAINER
        };
        assert_eq!(
            status_error(StatusCode::NOT_MODIFIED, start).to_string(),
            "container already started"
        );
        assert!(matches!(
            status_error(StatusCode::NOT_MODIFIED, IMAGE),
            ActionError::UnexpectedStatus(304)
        ));
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, NETWORK).to_string(),
            "no such network"
        );
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, CONTAINER),
            ActionError::ServerError
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, CONTAINER),
            ActionError::UnexpectedStatus(409)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = EngineUrl::parse(&format!("http://{}/", addr)).unwrap();
        let client = EngineClient::new(url);
        let err = client.list_images().await.unwrap_err();
        assert!(matches!(err, ActionError::Request(_)));
        assert!(err
            .to_string()
            .starts_with("Could not connect to jocker engine daemon"));
    }
}
