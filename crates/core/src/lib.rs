#![forbid(unsafe_code)]

pub mod hydrate;
pub mod model;
pub mod reducer;
pub mod share;
pub mod time;

pub use hydrate::{HydrateIssue, PersistedFields, SessionPatch};
pub use reducer::{Action, PersistOp, reduce};
pub use share::{ShareArtifact, ShareLink, ShareLinkError};
pub use time::Clock;
