//! Session acquisition
//!
//! Everything that turns a [`SessionRequest`](crate::types::SessionRequest)
//! into an [`AuthzOutcome`](crate::types::AuthzOutcome): the flow
//! orchestrator and its supporting pieces (credential form handling,
//! challenge detection, identity extraction, session caching, diagnostics).

pub mod cache;
pub mod challenge;
pub mod diagnostics;
pub mod flow;
pub mod identity;
pub mod login;

pub use cache::SessionCache;
pub use challenge::{ChallengeMarkers, ensure_not_challenged};
pub use diagnostics::DiagnosticsSink;
pub use flow::SigninOrchestrator;
pub use identity::{Identity, IdentityExtractor};
pub use login::{Credentials, FormOutcome, LoginFormDriver};
