use std::sync::Arc;

use quiz_core::share::ShareArtifact;
use tracing::{debug, info};

use super::capabilities::{ShareCapabilities, ShareTier, UrlField};
use super::platform::{PlatformError, SharePayload, SharePlatform, SharedFile};

/// Where the negotiator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareState {
    Idle,
    Probing,
    Invoked,
    Aborted,
    Copied,
    PromptedManual,
}

/// Terminal result of a share request. Every variant leaves the user with
/// something actionable, or reflects their own choice to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// A native share surface was shown.
    Invoked,
    /// The user dismissed the native share surface.
    Aborted,
    /// The canonical URL is on the clipboard.
    Copied,
    /// The canonical URL was shown for manual copying.
    PromptedManual,
}

impl From<ShareOutcome> for ShareState {
    fn from(outcome: ShareOutcome) -> Self {
        match outcome {
            ShareOutcome::Invoked => ShareState::Invoked,
            ShareOutcome::Aborted => ShareState::Aborted,
            ShareOutcome::Copied => ShareState::Copied,
            ShareOutcome::PromptedManual => ShareState::PromptedManual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    FileAndLink,
    LinkOnly,
    Clipboard,
}

#[derive(Debug)]
enum StepOutcome {
    Done(ShareOutcome),
    Cancelled,
    FellThrough(PlatformError),
}

/// Runs the share fallback chain: file + link, link only, clipboard, manual prompt.
pub struct ShareNegotiator {
    platform: Arc<dyn SharePlatform>,
    capabilities: ShareCapabilities,
    state: ShareState,
}

impl ShareNegotiator {
    /// Resolve the client's capabilities once and keep them for every share.
    #[must_use]
    pub fn new(platform: Arc<dyn SharePlatform>) -> Self {
        let capabilities = ShareCapabilities::resolve(platform.as_ref());
        Self::with_capabilities(platform, capabilities)
    }

    #[must_use]
    pub fn with_capabilities(
        platform: Arc<dyn SharePlatform>,
        capabilities: ShareCapabilities,
    ) -> Self {
        Self {
            platform,
            capabilities,
            state: ShareState::Idle,
        }
    }

    #[must_use]
    pub fn capabilities(&self) -> ShareCapabilities {
        self.capabilities
    }

    #[must_use]
    pub fn state(&self) -> ShareState {
        self.state
    }

    /// Share `artifact` over the best channel that works.
    ///
    /// Never fails: if nothing else succeeds the link is shown for manual copying.
    pub async fn share(&mut self, artifact: &ShareArtifact) -> ShareOutcome {
        self.state = ShareState::Probing;

        for step in self.steps() {
            match self.run(step, artifact).await {
                StepOutcome::Done(outcome) => return self.finish(step, outcome),
                StepOutcome::Cancelled => return self.finish(step, ShareOutcome::Aborted),
                StepOutcome::FellThrough(err) => {
                    debug!(?step, error = %err, "share step unavailable, falling back");
                }
            }
        }

        self.platform.prompt_manual(&artifact.canonical_url);
        self.state = ShareState::PromptedManual;
        info!(outcome = ?ShareOutcome::PromptedManual, "share finished");
        ShareOutcome::PromptedManual
    }

    fn steps(&self) -> Vec<Step> {
        let mut steps = match self.capabilities.tier {
            ShareTier::FileAndLink => vec![Step::FileAndLink, Step::LinkOnly],
            ShareTier::LinkOnly => vec![Step::LinkOnly],
            ShareTier::ClipboardOnly | ShareTier::ManualOnly => Vec::new(),
        };
        if self.capabilities.clipboard && self.capabilities.tier != ShareTier::ManualOnly {
            steps.push(Step::Clipboard);
        }
        steps
    }

    fn finish(&mut self, step: Step, outcome: ShareOutcome) -> ShareOutcome {
        self.state = outcome.into();
        info!(?step, ?outcome, "share finished");
        outcome
    }

    async fn run(&self, step: Step, artifact: &ShareArtifact) -> StepOutcome {
        match step {
            Step::FileAndLink => {
                let bytes = match self.platform.fetch_image(&artifact.image_url).await {
                    Ok(bytes) if !bytes.is_empty() => bytes,
                    Ok(_) => {
                        return StepOutcome::FellThrough(PlatformError::Failed(
                            "empty image".into(),
                        ));
                    }
                    Err(err) => return StepOutcome::FellThrough(err),
                };
                let mut payload = self.link_payload(artifact);
                payload
                    .files
                    .push(SharedFile::new(artifact.image_file_name(), bytes));
                native(self.platform.share(&payload).await)
            }
            Step::LinkOnly => native(self.platform.share(&self.link_payload(artifact)).await),
            Step::Clipboard => {
                match self.platform.write_clipboard(&artifact.canonical_url).await {
                    Ok(()) => StepOutcome::Done(ShareOutcome::Copied),
                    Err(err) => StepOutcome::FellThrough(err),
                }
            }
        }
    }

    fn link_payload(&self, artifact: &ShareArtifact) -> SharePayload {
        let link = Some(artifact.canonical_url.clone());
        let (url, text) = match self.capabilities.url_field {
            UrlField::Url => (link, None),
            UrlField::Text => (None, link),
        };
        SharePayload {
            title: artifact.title.clone(),
            text,
            url,
            files: Vec::new(),
        }
    }
}

fn native(outcome: Result<(), PlatformError>) -> StepOutcome {
    match outcome {
        Ok(()) => StepOutcome::Done(ShareOutcome::Invoked),
        Err(PlatformError::Cancelled) => StepOutcome::Cancelled,
        Err(err) => StepOutcome::FellThrough(err),
    }
}
