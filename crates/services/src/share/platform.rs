use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a sharing primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlatformError {
    /// The user dismissed a native share surface.
    #[error("share dismissed by the user")]
    Cancelled,
    #[error("not supported on this client")]
    Unsupported,
    #[error("{0}")]
    Failed(String),
}

/// A binary attachment for a native share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl SharedFile {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for(&name);
        Self { name, mime, bytes }
    }
}

fn mime_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "image/png",
    }
}

/// What a native share surface is asked to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: Option<String>,
    pub url: Option<String>,
    pub files: Vec<SharedFile>,
}

/// Sharing primitives exposed by the current client.
///
/// Probes are cheap and synchronous; actions are async because they wait on
/// the user or the network.
#[async_trait]
pub trait SharePlatform: Send + Sync {
    /// Identifies the client, used to pick the URL field.
    fn user_agent(&self) -> &str;

    fn has_native_share(&self) -> bool;

    /// Whether the native share accepts files. Some clients fail the probe itself.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the probe cannot be answered.
    fn can_share_files(&self) -> Result<bool, PlatformError>;

    fn has_clipboard(&self) -> bool;

    /// Download the result image.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the image cannot be fetched.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, PlatformError>;

    /// Open the native share surface.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Cancelled` when the user dismisses it, other
    /// variants when it could not be shown.
    async fn share(&self, payload: &SharePayload) -> Result<(), PlatformError>;

    /// # Errors
    ///
    /// Returns `PlatformError` if the clipboard rejects the write.
    async fn write_clipboard(&self, text: &str) -> Result<(), PlatformError>;

    /// Show `text` in a selectable prompt so the user can copy it by hand.
    fn prompt_manual(&self, text: &str);
}
