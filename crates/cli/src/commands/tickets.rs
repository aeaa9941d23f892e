use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use ticketbridge_jira::TicketCreator;
use ticketbridge_output::OutputRenderer;

use crate::fields;

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Ticket field as key=value; repeatable. Values are parsed as JSON when
    /// possible and dotted keys build nested objects (product.name=X)
    #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// JSON file with a ticket data object; --field values override it
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

pub async fn create(creator: &TicketCreator, args: CreateArgs, renderer: &OutputRenderer) -> Result<()> {
    let data = fields::ticket_data(args.data_file.as_deref(), &args.fields)?;

    let key = creator
        .create_ticket(&data)
        .await
        .with_context(|| format!("Failed to create ticket in source '{}'", creator.source()))?;

    #[derive(Serialize)]
    struct Created<'a> {
        key: &'a str,
        source: String,
    }

    renderer.render(&Created {
        key: key.as_str(),
        source: creator.source().to_string(),
    })
}

pub async fn comment(
    creator: &TicketCreator,
    key: &str,
    body: &str,
    renderer: &OutputRenderer,
) -> Result<()> {
    creator
        .add_comment(key, body)
        .await
        .with_context(|| format!("Failed to comment on {key}"))?;

    renderer.success(&format!("Comment added to {key}"));
    Ok(())
}

pub async fn transition(
    creator: &TicketCreator,
    key: &str,
    transition_id: u64,
    renderer: &OutputRenderer,
) -> Result<()> {
    creator
        .change_transition(key, transition_id)
        .await
        .with_context(|| format!("Failed to apply transition {transition_id} to {key}"))?;

    renderer.success(&format!("{key} moved through transition {transition_id}"));
    Ok(())
}
