//! Core type definitions
//!
//! Request, outcome, and session-state types shared across the crate.

pub mod outcome;
pub mod request;
pub mod state;

pub use outcome::{AuthzOutcome, AuthzPayload, CallbackParams};
pub use request::SessionRequest;
pub use state::{BrowserHeaders, CachedSessionState, CookieRecord};
