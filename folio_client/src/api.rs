use std::{future::Future, time::Duration};

use anyhow::Context;
use folio_models::contact::RawContactSubmission;
use serde::Deserialize;
use url::Url;

const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait ContactApi: Send + Sync + 'static {
    /// Posts the submission to the contact endpoint.
    ///
    /// Fails only if no decodable response was received.
    fn send(
        &self,
        submission: RawContactSubmission,
    ) -> impl Future<Output = anyhow::Result<ContactApiResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactApiResponse {
    pub status: u16,
    pub body: ContactResponseBody,
}

impl ContactApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactResponseBody {
    pub success: bool,
    pub message: Option<String>,
    /// Set instead of `message` by the rate limiter.
    pub error: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpContactApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpContactApi {
    pub fn new(endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self { client, endpoint })
    }
}

impl ContactApi for HttpContactApi {
    #[tracing::instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    async fn send(&self, submission: RawContactSubmission) -> anyhow::Result<ContactApiResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&submission)
            .send()
            .await
            .context("Failed to send contact request")?;

        let status = response.status().as_u16();
        let body = response
            .json()
            .await
            .context("Failed to decode contact response")?;

        Ok(ContactApiResponse { status, body })
    }
}

#[cfg(any(test, feature = "mock"))]
impl MockContactApi {
    pub fn with_send(
        mut self,
        submission: RawContactSubmission,
        status: u16,
        body: ContactResponseBody,
    ) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| {
                Box::pin(std::future::ready(Ok(ContactApiResponse { status, body })))
            });
        self
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing, Json, Router};
    use folio_demo::AL;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(router: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });
        format!("http://{addr}/api/contact").parse().unwrap()
    }

    fn sut(endpoint: Url) -> HttpContactApi {
        HttpContactApi::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let endpoint = serve(Router::new().route(
            "/api/contact",
            routing::post(|Json(body): Json<Value>| async move {
                assert_eq!(
                    body,
                    json!({"name": "Al", "email": "al@x.com", "message": "Hello there!"})
                );
                Json(json!({"success": true, "message": "Message sent successfully!"}))
            }),
        ))
        .await;

        // Act
        let result = sut(endpoint).send(AL.clone()).await;

        // Assert
        assert_eq!(
            result.unwrap(),
            ContactApiResponse {
                status: 200,
                body: ContactResponseBody {
                    success: true,
                    message: Some("Message sent successfully!".into()),
                    ..Default::default()
                }
            }
        );
    }

    #[tokio::test]
    async fn error_status() {
        // Arrange
        let endpoint = serve(Router::new().route(
            "/api/contact",
            routing::post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": "Too many requests, please try again later."})),
                )
            }),
        ))
        .await;

        // Act
        let result = sut(endpoint).send(AL.clone()).await.unwrap();

        // Assert
        assert!(!result.is_success());
        assert_eq!(result.status, 429);
        assert_eq!(
            result.body.error.as_deref(),
            Some("Too many requests, please try again later.")
        );
    }

    #[tokio::test]
    async fn undecodable_body() {
        // Arrange
        let endpoint = serve(Router::new().route(
            "/api/contact",
            routing::post(|| async { "<html>Bad Gateway</html>" }),
        ))
        .await;

        // Act
        let result = sut(endpoint).send(AL.clone()).await;

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn connection_refused() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        // Act
        let result = sut(format!("http://{addr}/api/contact").parse().unwrap())
            .send(AL.clone())
            .await;

        // Assert
        assert!(result.is_err());
    }
}
