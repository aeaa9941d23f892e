use thiserror::Error;
use ticketbridge_api::RemoteServiceError;
use ticketbridge_config::{Source, UnknownSource};

/// Failures detected while constructing a [`crate::TicketCreator`], before
/// any request is sent.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    UnknownSource(#[from] UnknownSource),

    #[error("No Jira instance configured for source '{0}'")]
    NotConfigured(Source),

    #[error("No password found for source '{tag}'. Set {env_var} or run `ticketbridge auth login --source {tag}`")]
    MissingCredentials { tag: Source, env_var: String },

    #[error("Unable to read stored credentials: {0}")]
    CredentialStore(String),

    #[error("Unable to build HTTP client: {0}")]
    Client(#[from] RemoteServiceError),
}
