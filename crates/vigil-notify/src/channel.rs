//! The notification channel seam.

use vigil_models::SendReceipt;

/// A transport that can deliver a message to one recipient.
///
/// Implementations convert transport errors into failed receipts rather
/// than propagating them: a channel send always yields an outcome, so the
/// dispatcher can aggregate without special-casing errors.
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, recipient: &str, message: &str) -> SendReceipt;

    /// Send an image with a caption.
    async fn send_image(&self, recipient: &str, image: &[u8], caption: &str) -> SendReceipt;

    /// Send a video clip with a caption.
    async fn send_video(&self, recipient: &str, video: &[u8], caption: &str) -> SendReceipt;
}

#[async_trait::async_trait]
impl<C: NotificationChannel + ?Sized> NotificationChannel for std::sync::Arc<C> {
    async fn send_text(&self, recipient: &str, message: &str) -> SendReceipt {
        (**self).send_text(recipient, message).await
    }

    async fn send_image(&self, recipient: &str, image: &[u8], caption: &str) -> SendReceipt {
        (**self).send_image(recipient, image, caption).await
    }

    async fn send_video(&self, recipient: &str, video: &[u8], caption: &str) -> SendReceipt {
        (**self).send_video(recipient, video, caption).await
    }
}
