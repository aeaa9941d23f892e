use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use ticketbridge_jira::TicketCreator;
use ticketbridge_output::{OutputFormat, OutputRenderer};

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// JQL query
    pub jql: String,

    /// Fields to fetch (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "summary,reporter,status,priority,created")]
    pub fields: Vec<String>,

    /// Index of the first result (pages hold 10 issues)
    #[arg(long, default_value_t = 0)]
    pub start_at: u32,
}

pub async fn search(creator: &TicketCreator, args: SearchArgs, renderer: &OutputRenderer) -> Result<()> {
    let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    let issues = creator
        .search_issues(&args.jql, &fields, args.start_at)
        .await
        .context("Failed to execute search")?;

    if issues.is_empty() {
        tracing::info!("No issues matched the provided JQL.");
        return Ok(());
    }

    if renderer.format() != OutputFormat::Table {
        return renderer.render(&issues);
    }

    #[derive(Serialize)]
    struct Row<'a> {
        key: &'a str,
        summary: &'a str,
        status: &'a str,
        priority: &'a str,
        reporter: &'a str,
        created: &'a str,
    }

    let rows: Vec<Row<'_>> = issues
        .iter()
        .map(|issue| Row {
            key: issue.key.as_str(),
            summary: issue.summary.as_deref().unwrap_or(""),
            status: issue.status.as_deref().unwrap_or(""),
            priority: issue.priority.as_deref().unwrap_or(""),
            reporter: issue
                .reporter
                .as_ref()
                .and_then(|r| r.full_name.as_deref().or(r.username.as_deref()))
                .unwrap_or(""),
            created: issue.created.as_deref().unwrap_or(""),
        })
        .collect();

    renderer.render(&rows)
}
