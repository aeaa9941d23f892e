use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use ticketbridge_jira::{SprintState, TicketCreator};
use ticketbridge_output::OutputRenderer;

#[derive(Subcommand, Debug, Clone)]
pub enum SprintCommand {
    /// Add issues to a sprint
    Add {
        /// Sprint id
        sprint_id: u64,
        /// Issue keys (e.g. PROJ-1 PROJ-2)
        #[arg(required = true)]
        issues: Vec<String>,
    },
    /// List sprints of a board
    List {
        /// Board id
        board_id: u64,
        /// Sprint state: active, future or closed
        #[arg(long, default_value = "active")]
        state: SprintState,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BoardCommand {
    /// Show the first board of a project
    First {
        /// Project key or id
        project: String,
    },
}

pub async fn handle_sprint(
    creator: &TicketCreator,
    command: SprintCommand,
    renderer: &OutputRenderer,
) -> Result<()> {
    match command {
        SprintCommand::Add { sprint_id, issues } => {
            creator
                .add_issues_to_sprint(sprint_id, issues.as_slice())
                .await
                .with_context(|| format!("Failed to add issues to sprint {sprint_id}"))?;
            renderer.success(&format!("Added {} issue(s) to sprint {sprint_id}", issues.len()));
            Ok(())
        }
        SprintCommand::List { board_id, state } => {
            let sprints = creator
                .sprints(board_id, state)
                .await
                .with_context(|| format!("Failed to list {state} sprints of board {board_id}"))?;

            if sprints.is_empty() {
                tracing::info!(board_id, state = %state, "No sprints found");
                return Ok(());
            }
            renderer.render(&sprints)
        }
    }
}

pub async fn handle_board(
    creator: &TicketCreator,
    command: BoardCommand,
    renderer: &OutputRenderer,
) -> Result<()> {
    match command {
        BoardCommand::First { project } => {
            let board_id = creator
                .first_board(&project)
                .await
                .with_context(|| format!("Failed to find a board for project {project}"))?;

            #[derive(Serialize)]
            struct Board<'a> {
                id: u64,
                project: &'a str,
            }

            renderer.render(&Board {
                id: board_id,
                project: &project,
            })
        }
    }
}
