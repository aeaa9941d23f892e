use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ticketbridge_api::Result;
use tracing::debug;

use crate::creator::TicketCreator;

/// Page size of [`TicketCreator::search_issues`].
pub const SEARCH_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub key: String,
    pub summary: Option<String>,
    pub reporter: Option<Reporter>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reporter {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    key: String,
    #[serde(default)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
struct RawFields {
    summary: Option<String>,
    reporter: Option<RawUser>,
    status: Option<Named>,
    priority: Option<Named>,
    created: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    name: Option<String>,
    email_address: Option<String>,
    #[serde(default)]
    avatar_urls: HashMap<String, String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

impl From<RawIssue> for IssueSummary {
    fn from(raw: RawIssue) -> Self {
        let fields = raw.fields;
        IssueSummary {
            key: raw.key,
            summary: fields.summary,
            reporter: fields.reporter.map(|mut user| Reporter {
                username: user.name,
                email: user.email_address,
                avatar: user.avatar_urls.remove("48x48"),
                full_name: user.display_name,
            }),
            status: fields.status.and_then(|s| s.name),
            priority: fields.priority.and_then(|p| p.name),
            created: fields.created,
        }
    }
}

impl TicketCreator {
    /// One page of JQL results starting at `start_at`.
    pub async fn search_issues(
        &self,
        jql: &str,
        fields: &[&str],
        start_at: u32,
    ) -> Result<Vec<IssueSummary>> {
        let mut query = format!(
            "search?jql={}&startAt={}&maxResults={}",
            urlencoding::encode(jql),
            start_at,
            SEARCH_PAGE_SIZE
        );
        if !fields.is_empty() {
            query.push_str("&fields=");
            query.push_str(&urlencoding::encode(&fields.join(",")));
        }

        let response: SearchResponse = self.client.get(&self.rest_path(&query)).await?;
        debug!(jql, count = response.issues.len(), "Search returned");

        Ok(response.issues.into_iter().map(IssueSummary::from).collect())
    }
}
