//! Attachment encoding: files and captured audio become transport-ready
//! base64 payloads. A pure transform with no session or network side effects.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Kind of payload an attachment carries.
///
/// The web client shipped every non-image upload as `image`; PDFs and other
/// documents get their own kind here so the gateway can label them honestly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
    Document,
}

/// An immutable encoded payload attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub mime_type: String,
    /// Base64 bytes with no data-URI prefix.
    pub data: String,
}

/// Failure while reading or encoding local input.
#[derive(Debug)]
pub enum EncodingError {
    /// The underlying file read failed.
    Io(std::io::Error),
    /// The transport payload could not be decoded back into bytes.
    InvalidBase64(base64::DecodeError),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::Io(e) => write!(f, "could not read attachment: {e}"),
            EncodingError::InvalidBase64(e) => write!(f, "invalid attachment payload: {e}"),
        }
    }
}

impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodingError::Io(e) => Some(e),
            EncodingError::InvalidBase64(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for EncodingError {
    fn from(e: std::io::Error) -> Self {
        EncodingError::Io(e)
    }
}

impl Attachment {
    pub fn new(kind: AttachmentKind, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            kind,
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Read a user-selected file and encode it for transport.
    ///
    /// The MIME type is inferred from the extension; unknown extensions ship
    /// as a generic document rather than being rejected.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EncodingError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime_type = mime_type_for(path);
        let kind = kind_for_mime(mime_type);
        Ok(Self::new(kind, mime_type, &bytes))
    }

    /// Finalize captured PCM samples into a single audio attachment.
    ///
    /// Zero captured samples produce an empty-data attachment; the session
    /// still sends it rather than rejecting the turn.
    pub fn from_audio(samples: &[f32], sample_rate: u32) -> Result<Self, EncodingError> {
        if samples.is_empty() {
            return Ok(Self {
                kind: AttachmentKind::Audio,
                mime_type: "audio/wav".to_string(),
                data: String::new(),
            });
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            for sample in samples {
                let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer
                    .write_sample(clamped)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
            }
            writer
                .finalize()
                .map_err(|e| std::io::Error::other(e.to_string()))?;
        }
        Ok(Self::new(AttachmentKind::Audio, "audio/wav", &cursor.into_inner()))
    }

    /// Decode the transport payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, EncodingError> {
        BASE64.decode(&self.data).map_err(EncodingError::InvalidBase64)
    }

    /// Payload size in encoded characters; zero for an empty capture.
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn kind_for_mime(mime_type: &str) -> AttachmentKind {
    if mime_type.starts_with("image/") {
        AttachmentKind::Image
    } else if mime_type.starts_with("audio/") {
        AttachmentKind::Audio
    } else {
        AttachmentKind::Document
    }
}
