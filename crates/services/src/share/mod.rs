//! Getting a result in front of another person with whatever the client offers.
//!
//! Capabilities are resolved once per client into a [`ShareCapabilities`]
//! descriptor; [`ShareNegotiator`] then walks the same fixed chain for every
//! client, reading only from that descriptor.

mod capabilities;
mod negotiator;
mod platform;

pub use capabilities::{ShareCapabilities, ShareTier, UrlField};
pub use negotiator::{ShareNegotiator, ShareOutcome, ShareState};
pub use platform::{PlatformError, SharePayload, SharePlatform, SharedFile};
