use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Subcommand;
use serde::Serialize;
use ticketbridge_config::{ProjectSelector, Settings};
use ticketbridge_output::OutputRenderer;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Write a starter settings file with one entry per source
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the configured sources
    Show,
    /// Print the settings file location
    Path,
}

pub fn handle(
    command: ConfigCommand,
    config_path: Option<&Path>,
    renderer: &OutputRenderer,
) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_path);

    match command {
        ConfigCommand::Init { force } => init(&path, force, renderer),
        ConfigCommand::Show => show(&path, renderer),
        ConfigCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init(path: &PathBuf, force: bool, renderer: &OutputRenderer) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Settings file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Settings::template().save(Some(path))?;
    tracing::info!(path = %path.display(), "Settings template written");
    renderer.success(&format!("Wrote {}", path.display()));
    Ok(())
}

fn show(path: &Path, renderer: &OutputRenderer) -> Result<()> {
    let settings = Settings::load(Some(path))?;

    if settings.sources.is_empty() {
        tracing::info!(path = %path.display(), "No sources configured");
        return Ok(());
    }

    #[derive(Serialize)]
    struct Row {
        source: String,
        url: String,
        username: String,
        project: String,
        password_in_file: bool,
    }

    let rows: Vec<Row> = settings
        .sources
        .iter()
        .map(|(source, instance)| Row {
            source: source.to_string(),
            url: instance.url.clone(),
            username: instance.username.clone(),
            project: match &instance.project {
                ProjectSelector::Id { id } => format!("id {id}"),
                ProjectSelector::Key { key } => format!("key {key}"),
                ProjectSelector::Field { field } => format!("from field {field}"),
            },
            password_in_file: instance.password.is_some(),
        })
        .collect();

    renderer.render(&rows)
}
