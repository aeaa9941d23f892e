use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use ticketbridge_api::pagination::{PagedResponse, Paginator};
use ticketbridge_api::{ApiClient, RemoteServiceError, Result};
use tracing::{debug, info};

use crate::creator::TicketCreator;

const AGILE_PREFIX: &str = "rest/agile/1.0";
const SPRINT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Future,
    Closed,
}

impl SprintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintState::Active => "active",
            SprintState::Future => "future",
            SprintState::Closed => "closed",
        }
    }
}

impl fmt::Display for SprintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sprint state '{0}' (expected active, future or closed)")]
pub struct UnknownSprintState(pub String);

impl FromStr for SprintState {
    type Err = UnknownSprintState;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(SprintState::Active),
            "future" => Ok(SprintState::Future),
            "closed" => Ok(SprintState::Closed),
            _ => Err(UnknownSprintState(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    pub state: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSprint {
    id: u64,
    name: String,
    state: String,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

impl From<RawSprint> for Sprint {
    fn from(raw: RawSprint) -> Self {
        Sprint {
            id: raw.id,
            name: raw.name,
            state: raw.state,
            start_date: raw.start_date,
            end_date: raw.end_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBoard {
    id: u64,
}

struct SprintPages<'a> {
    client: &'a ApiClient,
    board_id: u64,
    state: SprintState,
}

#[async_trait]
impl<'a> Paginator<RawSprint> for SprintPages<'a> {
    async fn fetch_page(&self, start_at: u32, max_results: u32) -> Result<PagedResponse<RawSprint>> {
        let path = format!(
            "{AGILE_PREFIX}/board/{}/sprint?state={}&startAt={}&maxResults={}",
            self.board_id, self.state, start_at, max_results
        );
        self.client.get(&path).await
    }
}

impl TicketCreator {
    /// Add issues to a sprint in a single request.
    pub async fn add_issues_to_sprint<S: AsRef<str>>(
        &self,
        sprint_id: u64,
        issue_keys: &[S],
    ) -> Result<()> {
        let issues: Vec<&str> = issue_keys.iter().map(AsRef::as_ref).collect();
        let path = format!("{AGILE_PREFIX}/sprint/{sprint_id}/issue");

        let _: IgnoredAny = self
            .client
            .post(&path, &json!({ "issues": issues }))
            .await?;

        info!(sprint_id, count = issues.len(), "Issues added to sprint");
        Ok(())
    }

    /// Id of the first board attached to a project.
    pub async fn first_board(&self, project_key_or_id: &str) -> Result<u64> {
        let path = format!(
            "{AGILE_PREFIX}/board?projectKeyOrId={}&maxResults=1",
            urlencoding::encode(project_key_or_id)
        );
        let page: PagedResponse<RawBoard> = self.client.get(&path).await?;

        page.values
            .first()
            .map(|board| board.id)
            .ok_or_else(|| RemoteServiceError::NotFound {
                resource: format!("board for project {project_key_or_id}"),
            })
    }

    /// Every sprint of a board in the given state, across all pages.
    pub async fn sprints(&self, board_id: u64, state: SprintState) -> Result<Vec<Sprint>> {
        let pages = SprintPages {
            client: &self.client,
            board_id,
            state,
        };
        let sprints = pages.fetch_all(SPRINT_PAGE_SIZE).await?;
        debug!(board_id, state = %state, count = sprints.len(), "Fetched sprints");

        Ok(sprints.into_iter().map(Sprint::from).collect())
    }
}
