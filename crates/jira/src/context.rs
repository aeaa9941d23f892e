use serde::{Deserialize, Serialize};

/// Who is acting and where, as known by the calling application.
///
/// Read-only from the tracker's point of view. Whether tickets should be
/// created at all in a given environment is the caller's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRequestContext {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl TicketRequestContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            environment: None,
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}
