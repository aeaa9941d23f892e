mod instance;
mod source;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use instance::{FieldRule, InstanceConfig, IssueTypeSelector, ProjectSelector};
pub use source::{Source, UnknownSource};

/// Settings file: one Jira instance per [`Source`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub sources: BTreeMap<Source, InstanceConfig>,
}

impl Settings {
    /// Load settings from the provided path or the default settings file.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Settings::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using empty settings");
            return Ok(Settings::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read settings file at {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in settings file {}", path.display()))
    }

    /// Persist the settings to disk, creating parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Settings::default_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create settings directory {}", parent.display())
            })?;
        }

        let serialized = serde_yaml::to_string(self)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Unable to write settings file {}", path.display()))?;

        Ok(())
    }

    pub fn instance(&self, source: Source) -> Option<&InstanceConfig> {
        self.sources.get(&source)
    }

    /// Starting point written by `ticketbridge config init`.
    pub fn template() -> Self {
        let mut sources = BTreeMap::new();

        let mut a = InstanceConfig::new(
            "https://jira-a.example.com",
            "svc-ticketbridge",
            ProjectSelector::Field {
                field: "product_id".to_string(),
            },
            IssueTypeSelector::Id {
                id: "10001".to_string(),
            },
        );
        a.exclude = vec!["id".to_string()];
        sources.insert(Source::A, a);

        let mut b = InstanceConfig::new(
            "https://jira-b.example.com",
            "svc-ticketbridge",
            ProjectSelector::Id {
                id: "10407".to_string(),
            },
            IssueTypeSelector::Id {
                id: "16704".to_string(),
            },
        );
        b.reporter_from_context = true;
        b.fields.insert(
            "customfield_23249".to_string(),
            FieldRule::Join {
                join: vec!["as_a".into(), "i_want".into(), "so_that".into()],
                separator: ", ".to_string(),
            },
        );
        b.fields.insert(
            "customfield_23250".to_string(),
            FieldRule::From {
                from: "product.name".to_string(),
            },
        );
        b.fields.insert(
            "priority".to_string(),
            FieldRule::Flag {
                flag: "is_high_priority".to_string(),
                when_true: serde_json::json!({"id": "2"}),
                when_false: serde_json::json!({"id": "4"}),
            },
        );
        b.exclude = vec!["id".to_string()];
        sources.insert(Source::B, b);

        Settings { sources }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".ticketbridge");
        path.push("config.yaml");
        path
    }
}
