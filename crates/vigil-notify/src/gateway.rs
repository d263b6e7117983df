//! HTTP client for the external message gateway.
//!
//! The gateway wraps the actual messaging transport behind a small HTTP
//! API: `POST /send` for text, `POST /send-image` and `POST /send-video`
//! for media, `GET /health` for connectivity. Every non-2xx response or
//! transport error becomes a failed receipt, never a panic.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vigil_models::SendReceipt;

use crate::channel::NotificationChannel;
use crate::error::{NotifyError, NotifyResult};

/// Gateway API client.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    success: bool,
    message: String,
    #[serde(rename = "messageId")]
    message_id: Option<String>,
}

/// Gateway connectivity report.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayHealth {
    /// Gateway process health ("healthy" when reachable and sane)
    pub status: String,
    /// Whether the downstream messaging session is connected
    #[serde(default)]
    pub connected: bool,
}

impl GatewayClient {
    /// Create a client for the gateway at `base_url`.
    ///
    /// No client-wide timeout is set; the dispatcher bounds each send.
    pub fn new(base_url: impl Into<String>) -> NotifyResult<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(NotifyError::config("gateway base URL is empty"));
        }
        let client = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Query the gateway health endpoint.
    pub async fn health(&self) -> NotifyResult<GatewayHealth> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::rejected(format!(
                "health check returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    async fn post_text(&self, recipient: &str, message: &str) -> NotifyResult<SendReceipt> {
        let url = format!("{}/send", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                phone: recipient,
                message,
            })
            .send()
            .await?;
        Self::into_receipt(response).await
    }

    async fn post_media(
        &self,
        endpoint: &str,
        part_name: &str,
        file_name: &str,
        mime: &str,
        recipient: &str,
        bytes: &[u8],
        caption: &str,
    ) -> NotifyResult<SendReceipt> {
        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(NotifyError::Gateway)?;
        let form = Form::new()
            .text("phone", recipient.to_string())
            .text("caption", caption.to_string())
            .part(part_name.to_string(), part);

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::into_receipt(response).await
    }

    async fn into_receipt(response: reqwest::Response) -> NotifyResult<SendReceipt> {
        let status = response.status();
        if status.is_success() {
            let body: SendMessageResponse = response.json().await?;
            debug!(message_id = ?body.message_id, "Gateway accepted message");
            return Ok(SendReceipt {
                success: body.success,
                message: body.message,
                message_id: body.message_id,
            });
        }
        let body = response.text().await.unwrap_or_default();
        Ok(SendReceipt::failed(format!(
            "gateway returned {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl NotificationChannel for GatewayClient {
    async fn send_text(&self, recipient: &str, message: &str) -> SendReceipt {
        match self.post_text(recipient, message).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(recipient, "Text send failed: {}", e);
                SendReceipt::failed(e.to_string())
            }
        }
    }

    async fn send_image(&self, recipient: &str, image: &[u8], caption: &str) -> SendReceipt {
        match self
            .post_media(
                "send-image",
                "image",
                "alert.jpg",
                "image/jpeg",
                recipient,
                image,
                caption,
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(recipient, "Image send failed: {}", e);
                SendReceipt::failed(e.to_string())
            }
        }
    }

    async fn send_video(&self, recipient: &str, video: &[u8], caption: &str) -> SendReceipt {
        match self
            .post_media(
                "send-video",
                "video",
                "alert.mp4",
                "video/mp4",
                recipient,
                video,
                caption,
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(recipient, "Video send failed: {}", e);
                SendReceipt::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_text_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Message sent",
                "messageId": "msg-123"
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri()).unwrap();
        let receipt = client.send_text("+100", "hello").await;
        assert!(receipt.success);
        assert_eq!(receipt.message_id.as_deref(), Some("msg-123"));
    }

    #[tokio::test]
    async fn test_non_2xx_becomes_failed_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(
                ResponseTemplate::new(503).set_body_string("gateway session disconnected"),
            )
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri()).unwrap();
        let receipt = client.send_text("+100", "hello").await;
        assert!(!receipt.success);
        assert!(receipt.message.contains("503"));
        assert!(receipt.message.contains("gateway session disconnected"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_becomes_failed_receipt() {
        // nothing listens on this port
        let client = GatewayClient::new("http://127.0.0.1:1").unwrap();
        let receipt = client.send_text("+100", "hello").await;
        assert!(!receipt.success);
    }

    #[tokio::test]
    async fn test_send_image_posts_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send-image"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "Image sent",
                "messageId": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri()).unwrap();
        let receipt = client.send_image("+100", &[0xff, 0xd8], "caption").await;
        assert!(receipt.success);
        assert!(receipt.message_id.is_none());
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "connected": true
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(server.uri()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert!(health.connected);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(GatewayClient::new("").is_err());
    }
}
