//! Render request types.
//!
//! The wire shape (`RenderRequestBody`) is what the HTTP boundary accepts;
//! the domain shape (`RenderRequest`) only exists once validation has passed.
//! Validation always runs before any workspace is allocated.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;
use validator::Validate;

/// Error produced when a render payload fails boundary validation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RequestValidationError(pub String);

impl RequestValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A reference to a remotely retrievable media source.
///
/// Immutable once a request is accepted; only absolute http(s) URLs are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(Url);

impl AssetRef {
    /// Parse and validate an asset URL.
    pub fn parse(raw: &str) -> Result<Self, RequestValidationError> {
        let url = Url::parse(raw)
            .map_err(|e| RequestValidationError(format!("invalid URL '{}': {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RequestValidationError(format!(
                "unsupported URL scheme '{}' in '{}'",
                url.scheme(),
                raw
            )));
        }
        Ok(Self(url))
    }

    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// Lower-cased file extension taken from the URL path, if it has one.
    ///
    /// Used as a hint when naming the fetched file; FFmpeg sniffs the actual
    /// container from content, so a missing extension is fine.
    pub fn extension(&self) -> Option<String> {
        let name = self.0.path().rsplit('/').next()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One scene on the wire: narration video plus narration audio.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct SceneInput {
    #[validate(url)]
    pub video_url: String,
    #[validate(url)]
    pub audio_url: String,
}

/// Inbound render payload, as posted by clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct RenderInput {
    /// Optional cover clip or still image shown before the first scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub video_cover: Option<String>,

    /// Ordered scenes; order is preserved end-to-end.
    #[serde(default)]
    #[validate(length(min = 1, message = "scenes must not be empty"), nested)]
    pub scenes: Vec<SceneInput>,

    /// Background music looped under the whole video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub background_music_url: Option<String>,
}

/// Envelope the HTTP boundary accepts: `{ "input": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderRequestBody {
    pub input: RenderInput,
}

/// One validated scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub video: AssetRef,
    pub audio: AssetRef,
}

/// A validated render request. Only constructible through [`RenderRequest::from_body`].
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub cover: Option<AssetRef>,
    pub scenes: Vec<Scene>,
    pub background_music: AssetRef,
}

impl RenderRequest {
    /// Validate the wire payload and build the domain request.
    pub fn from_body(body: RenderRequestBody) -> Result<Self, RequestValidationError> {
        let input = body.input;

        // Match the original service's contract: both must be present.
        if input.scenes.is_empty() || input.background_music_url.is_none() {
            return Err(RequestValidationError::new(
                "Missing scenes or background_music_url",
            ));
        }

        input
            .validate()
            .map_err(|e| RequestValidationError(e.to_string()))?;

        let cover = input
            .video_cover
            .as_deref()
            .map(AssetRef::parse)
            .transpose()?;

        let scenes = input
            .scenes
            .iter()
            .map(|s| {
                Ok(Scene {
                    video: AssetRef::parse(&s.video_url)?,
                    audio: AssetRef::parse(&s.audio_url)?,
                })
            })
            .collect::<Result<Vec<_>, RequestValidationError>>()?;

        let background_music = AssetRef::parse(
            input
                .background_music_url
                .as_deref()
                .unwrap_or_default(),
        )?;

        Ok(Self {
            cover,
            scenes,
            background_music,
        })
    }

    /// Total number of remote assets this request will fetch.
    pub fn asset_count(&self) -> usize {
        self.scenes.len() * 2 + usize::from(self.cover.is_some()) + 1
    }
}
