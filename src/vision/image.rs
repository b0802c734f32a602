use base64ct::{Base64, Encoding};

const DEFAULT_MIME: &str = "image/jpeg";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("no image provided")]
    Empty,
    #[error("image is not valid base64")]
    NotBase64,
}

/// A client-supplied photo, validated and ready to inline into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub base64: String,
    pub byte_len: usize,
}

impl ImagePayload {
    /// Accepts raw base64 or a `data:<mime>;base64,<data>` URL.
    pub fn from_client(raw: &str) -> Result<Self, ImageError> {
        let raw = raw.trim();
        let (header, data) = match raw.split_once(',') {
            Some((header, data)) => (Some(header), data),
            None => (None, raw),
        };

        let mime = header
            .and_then(mime_from_header)
            .unwrap_or(DEFAULT_MIME)
            .to_string();

        let base64: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        if base64.is_empty() {
            return Err(ImageError::Empty);
        }
        let bytes = Base64::decode_vec(&base64).map_err(|_| ImageError::NotBase64)?;
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }

        Ok(Self {
            mime,
            base64,
            byte_len: bytes.len(),
        })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

fn mime_from_header(header: &str) -> Option<&str> {
    let mime = header.strip_prefix("data:")?.split(';').next()?.trim();
    mime.starts_with("image/").then_some(mime)
}
