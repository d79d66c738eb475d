//! Request context carrying the acting principal and its resolved roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current request.
///
/// Authentication happens upstream; the repository only needs to know
/// *who* is acting and which role names they hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Actor identifier recorded in the audit trail.
    pub actor: String,
    /// Role names resolved for the actor.
    pub roles: Vec<String>,
    /// IP address of the request origin, when known.
    pub ip_address: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new<I, S>(actor: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actor: actor.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            ip_address: None,
            request_time: Utc::now(),
        }
    }

    /// Attach the origin IP address.
    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Whether the actor holds `role` (case-insensitive).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles
            .iter()
            .any(|r| r.trim().eq_ignore_ascii_case(role.trim()))
    }
}
