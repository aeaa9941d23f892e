use std::time::Duration;

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::json;
use ticketbridge_api::retry::RetryConfig;
use ticketbridge_api::{ApiClient, ClientOptions, Result};
use ticketbridge_auth::{password_env_var, resolve_password, CredentialStore};
use ticketbridge_config::{InstanceConfig, Settings, Source};
use tracing::{debug, info};

use crate::context::TicketRequestContext;
use crate::data::{IssueKey, TicketData};
use crate::error::SetupError;
use crate::payload::build_create_payload;

/// Header Jira uses to attribute REST calls made by a service account to the
/// end user on whose behalf they are made.
pub const CONTEXT_USER_HEADER: &str = "contextUser";

/// Creates tickets in the Jira instance configured for one [`Source`].
///
/// Holds no state between calls: every operation is one request, and calling
/// [`TicketCreator::create_ticket`] twice with the same data creates two
/// tickets.
#[derive(Clone)]
pub struct TicketCreator {
    pub(crate) client: ApiClient,
    pub(crate) instance: InstanceConfig,
    source: Source,
    context: TicketRequestContext,
}

impl TicketCreator {
    /// Connect using the default credential store as the last password
    /// fallback.
    pub fn new(
        context: TicketRequestContext,
        source: Source,
        settings: &Settings,
    ) -> std::result::Result<Self, SetupError> {
        let store = CredentialStore::default_location();
        Self::with_credential_store(context, source, settings, store.as_ref())
    }

    /// Like [`TicketCreator::new`] for a source given as text; an unknown
    /// name is rejected before anything else happens.
    pub fn from_source_name(
        context: TicketRequestContext,
        source: &str,
        settings: &Settings,
    ) -> std::result::Result<Self, SetupError> {
        let source: Source = source.parse()?;
        Self::new(context, source, settings)
    }

    pub fn with_credential_store(
        context: TicketRequestContext,
        source: Source,
        settings: &Settings,
        store: Option<&CredentialStore>,
    ) -> std::result::Result<Self, SetupError> {
        let instance = settings
            .instance(source)
            .cloned()
            .ok_or(SetupError::NotConfigured(source))?;

        let password = resolve_password(source.as_str(), instance.password.as_deref(), store)
            .map_err(|e| SetupError::CredentialStore(format!("{e:#}")))?
            .ok_or_else(|| SetupError::MissingCredentials {
                tag: source,
                env_var: password_env_var(source.as_str()),
            })?;

        let mut options = ClientOptions {
            timeout: Duration::from_secs(instance.timeout_secs),
            verify_tls: instance.verify_tls,
            headers: Vec::new(),
        };
        if instance.context_user_header {
            options
                .headers
                .push((CONTEXT_USER_HEADER.to_string(), context.username.clone()));
        }

        let client = ApiClient::with_options(&instance.url, &options)?
            .with_basic_auth(instance.username.clone(), password);

        debug!(
            source = %source,
            url = %instance.url,
            user = %context.username,
            "Jira connection prepared"
        );

        Ok(Self {
            client,
            instance,
            source,
            context,
        })
    }

    /// Backoff policy for read operations. Writes are always sent once.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.client = self.client.with_retry_config(config);
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn context(&self) -> &TicketRequestContext {
        &self.context
    }

    /// Create one issue from `data` and return the key Jira assigned to it.
    pub async fn create_ticket(&self, data: &TicketData) -> Result<IssueKey> {
        #[derive(Deserialize)]
        struct CreateResponse {
            key: String,
        }

        let payload = build_create_payload(&self.instance, &self.context, data);
        debug!(source = %self.source, field_count = data.len(), "Creating ticket");

        let response: CreateResponse = self.client.post(&self.rest_path("issue"), &payload).await?;

        info!(
            key = %response.key,
            source = %self.source,
            environment = self.context.environment.as_deref().unwrap_or("unspecified"),
            "Ticket created"
        );
        Ok(IssueKey::new(response.key))
    }

    pub async fn add_comment(&self, issue_key: &str, comment: &str) -> Result<()> {
        let path = self.rest_path(&format!("issue/{}/comment", urlencoding::encode(issue_key)));
        let _: IgnoredAny = self
            .client
            .post(&path, &json!({ "body": comment }))
            .await?;

        info!(key = issue_key, "Comment added");
        Ok(())
    }

    /// Move an issue through the workflow transition with the given id.
    pub async fn change_transition(&self, issue_key: &str, transition_id: u64) -> Result<()> {
        let path = self.rest_path(&format!(
            "issue/{}/transitions",
            urlencoding::encode(issue_key)
        ));
        let body = json!({ "transition": { "id": transition_id.to_string() } });
        let _: IgnoredAny = self.client.post(&path, &body).await?;

        info!(key = issue_key, transition_id, "Issue transitioned");
        Ok(())
    }

    pub(crate) fn rest_path(&self, tail: &str) -> String {
        format!("{}/{}", self.instance.rest_prefix(), tail)
    }
}
