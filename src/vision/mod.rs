//! Access to the remote multimodal model.
//!
//! [`VisionModel`] is the seam between request handling and the provider:
//! production uses [`OpenAiVision`], tests plug in canned replies.

mod image;
mod openai;

pub use image::{ImageError, ImagePayload};
pub use openai::OpenAiVision;

use async_trait::async_trait;

use crate::session::Credential;

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The provider refused the user's key.
    #[error("credential rejected by provider")]
    CredentialRejected,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("provider reply had no content")]
    EmptyReply,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Sends `prompt` with the inline image and returns the model's text reply.
    async fn describe(
        &self,
        credential: &Credential,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, VisionError>;
}
