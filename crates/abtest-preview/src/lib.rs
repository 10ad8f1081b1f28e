//! A/B Test Admin Preview
//!
//! Lets an admin view the site as a given persona and funnel stage, with
//! running tests pinned to chosen variants. State is explicit and passed in:
//!
//! - [`PreviewOverrides`]: the override values
//! - [`SessionStore`]: where they persist ([`MemoryStore`], [`FileStore`])
//! - [`PreviewSession`]: load on mount, persist on apply, clear on reset

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod overrides;
mod session;
mod store;

pub use error::PreviewError;
pub use overrides::PreviewOverrides;
pub use session::PreviewSession;
pub use store::{FileStore, MemoryStore, SessionStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
