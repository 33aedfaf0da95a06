//! Outcome type definitions
//!
//! The terminal value of one sign-in attempt: success flag, payload, and an
//! optional browser-fingerprint snapshot.

use crate::types::{BrowserHeaders, CookieRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw OAuth callback query parameters (multi-valued)
pub type CallbackParams = HashMap<String, Vec<String>>;

/// Payload carried by an [`AuthzOutcome`].
///
/// Serialized untagged so the wire shape stays flat: a session object, a raw
/// query-parameter map, or an `{ "error": ... }` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthzPayload {
    /// Authenticated session: relying-party cookies plus the user identifier
    Session {
        /// Cookies scoped to the relying-party origin
        cookies: Vec<CookieRecord>,
        /// Opaque user identifier recovered from client-side storage
        api_user: String,
    },
    /// Flow-terminating failure
    Failure {
        /// Human-readable error descriptor
        error: String,
    },
    /// OAuth callback succeeded but no user identifier was recoverable;
    /// the raw query parameters are returned instead
    Callback {
        /// Query parameters from the callback URL
        #[serde(flatten)]
        params: CallbackParams,
    },
}

/// Terminal result of one sign-in attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthzOutcome {
    /// Whether the attempt established an authorization
    pub success: bool,

    /// Session data, callback parameters, or an error descriptor
    pub payload: AuthzPayload,

    /// Browser header snapshot, present only when an anti-bot challenge was
    /// observed during the attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<BrowserHeaders>,
}

impl AuthzOutcome {
    /// Successful attempt with a full session payload
    pub fn session(
        cookies: Vec<CookieRecord>,
        api_user: impl Into<String>,
        fingerprint: Option<BrowserHeaders>,
    ) -> Self {
        Self {
            success: true,
            payload: AuthzPayload::Session {
                cookies,
                api_user: api_user.into(),
            },
            fingerprint,
        }
    }

    /// Successful attempt where only the raw callback parameters are known
    pub fn callback(params: CallbackParams, fingerprint: Option<BrowserHeaders>) -> Self {
        Self {
            success: true,
            payload: AuthzPayload::Callback { params },
            fingerprint,
        }
    }

    /// Failed attempt. Failures never carry a fingerprint.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: AuthzPayload::Failure {
                error: error.into(),
            },
            fingerprint: None,
        }
    }

    /// Error descriptor, if this outcome is a failure
    pub fn error(&self) -> Option<&str> {
        match &self.payload {
            AuthzPayload::Failure { error } => Some(error),
            _ => None,
        }
    }

    /// User identifier, if this outcome carries a session payload
    pub fn api_user(&self) -> Option<&str> {
        match &self.payload {
            AuthzPayload::Session { api_user, .. } => Some(api_user),
            _ => None,
        }
    }

    /// Session cookies, if this outcome carries a session payload
    pub fn cookies(&self) -> Option<&[CookieRecord]> {
        match &self.payload {
            AuthzPayload::Session { cookies, .. } => Some(cookies),
            _ => None,
        }
    }

    /// Callback query parameters, if this outcome carries them
    pub fn callback_params(&self) -> Option<&CallbackParams> {
        match &self.payload {
            AuthzPayload::Callback { params } => Some(params),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_outcome() {
        let outcome = AuthzOutcome::session(vec![CookieRecord::new("_t", "v")], "42", None);
        assert!(outcome.success);
        assert_eq!(outcome.api_user(), Some("42"));
        assert_eq!(outcome.cookies().unwrap().len(), 1);
        assert!(outcome.fingerprint.is_none());
        assert!(outcome.error().is_none());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = AuthzOutcome::failure("Linux.do allow button not found");
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some("Linux.do allow button not found"));
        assert!(outcome.fingerprint.is_none());
    }

    #[test]
    fn test_session_payload_wire_shape() {
        let outcome = AuthzOutcome::session(vec![], "42", None);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["payload"]["api_user"], "42");
        assert!(json["payload"]["cookies"].is_array());
        assert!(json.get("fingerprint").is_none());
    }

    #[test]
    fn test_callback_payload_is_flat() {
        let mut params = CallbackParams::new();
        params.insert("code".to_string(), vec!["abc123".to_string()]);
        let outcome = AuthzOutcome::callback(params, None);

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["payload"]["code"][0], "abc123");
    }

    #[test]
    fn test_failure_roundtrip() {
        let outcome = AuthzOutcome::failure("no code in callback");
        let json = serde_json::to_string(&outcome).unwrap();
        let back: AuthzOutcome = serde_json::from_str(&json).unwrap();
        assert!(!back.success);
        assert_eq!(back.error(), Some("no code in callback"));
    }

    #[test]
    fn test_fingerprint_attached() {
        let mut headers = BrowserHeaders::new();
        headers.insert("user-agent".to_string(), "Mozilla/5.0".to_string());
        let outcome = AuthzOutcome::session(vec![], "1", Some(headers));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["fingerprint"]["user-agent"], "Mozilla/5.0");
    }
}
