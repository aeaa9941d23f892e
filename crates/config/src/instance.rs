use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Connection and payload mapping for one Jira instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfig {
    pub url: String,
    pub username: String,
    /// Usually left out of the file and resolved from the environment or
    /// the credential store instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
    /// Send the acting user's name in a `contextUser` header.
    #[serde(default = "default_true")]
    pub context_user_header: bool,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub project: ProjectSelector,
    pub issue_type: IssueTypeSelector,
    #[serde(default = "default_summary_field")]
    pub summary_field: String,
    #[serde(default)]
    pub reporter_from_context: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldRule>,
    /// Ticket data keys that must never be forwarded as Jira fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

impl InstanceConfig {
    /// Minimal instance with defaults for everything but the connection and
    /// target project.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        project: ProjectSelector,
        issue_type: IssueTypeSelector,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: None,
            verify_tls: true,
            context_user_header: true,
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            project,
            issue_type,
            summary_field: default_summary_field(),
            reporter_from_context: false,
            fields: BTreeMap::new(),
            exclude: Vec::new(),
        }
    }

    /// Path prefix of the core REST API, e.g. `rest/api/2`.
    pub fn rest_prefix(&self) -> String {
        format!("rest/api/{}", self.api_version.trim_matches('/'))
    }
}

/// Which Jira project receives tickets from a source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProjectSelector {
    Id {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    },
    Key {
        key: String,
    },
    /// Project id taken from a field of the ticket data.
    Field {
        field: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum IssueTypeSelector {
    Id {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    },
    Name {
        name: String,
    },
}

/// How an extra Jira field is filled from ticket data.
///
/// Paths are dotted (`product.name`) and address nested objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldRule {
    Join {
        join: Vec<String>,
        #[serde(default = "default_separator")]
        separator: String,
    },
    Flag {
        flag: String,
        when_true: Value,
        when_false: Value,
    },
    From {
        from: String,
    },
    Const {
        value: Value,
    },
}

impl FieldRule {
    /// Ticket data paths read by this rule.
    pub fn sources(&self) -> Vec<&str> {
        match self {
            FieldRule::Join { join, .. } => join.iter().map(String::as_str).collect(),
            FieldRule::Flag { flag, .. } => vec![flag.as_str()],
            FieldRule::From { from } => vec![from.as_str()],
            FieldRule::Const { .. } => Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_version() -> String {
    "2".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_summary_field() -> String {
    "name".to_string()
}

fn default_separator() -> String {
    ", ".to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
