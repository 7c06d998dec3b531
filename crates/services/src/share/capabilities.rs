use tracing::debug;

use super::platform::SharePlatform;

/// In-app browsers whose share sheets drop the structured `url` field.
const TEXT_ONLY_CLIENTS: &[&str] = &["KAKAOTALK", "Line/", "Instagram", "FBAN", "FBAV"];

/// Which payload field carries the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    Url,
    Text,
}

/// Best channel the client supports; the chain starts here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareTier {
    FileAndLink,
    LinkOnly,
    ClipboardOnly,
    ManualOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareCapabilities {
    pub tier: ShareTier,
    pub url_field: UrlField,
    /// Clipboard is tried after native sharing only when the client has one.
    pub clipboard: bool,
}

impl ShareCapabilities {
    /// Probe the client once.
    ///
    /// A client whose file-share probe fails is treated as having no usable
    /// native share surface at all.
    #[must_use]
    pub fn resolve(platform: &dyn SharePlatform) -> Self {
        let url_field = UrlField::for_user_agent(platform.user_agent());
        let clipboard = platform.has_clipboard();
        let without_native = if clipboard {
            ShareTier::ClipboardOnly
        } else {
            ShareTier::ManualOnly
        };

        let tier = if platform.has_native_share() {
            match platform.can_share_files() {
                Ok(true) => ShareTier::FileAndLink,
                Ok(false) => ShareTier::LinkOnly,
                Err(err) => {
                    debug!(error = %err, "file share probe failed");
                    without_native
                }
            }
        } else {
            without_native
        };

        debug!(?tier, ?url_field, clipboard, "resolved share capabilities");
        Self {
            tier,
            url_field,
            clipboard,
        }
    }
}

impl UrlField {
    #[must_use]
    pub fn for_user_agent(user_agent: &str) -> Self {
        if TEXT_ONLY_CLIENTS
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            UrlField::Text
        } else {
            UrlField::Url
        }
    }
}
