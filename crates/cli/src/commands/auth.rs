use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use ticketbridge_auth::CredentialStore;
use ticketbridge_config::Source;
use ticketbridge_output::OutputRenderer;

#[derive(Subcommand, Debug, Clone)]
pub enum AuthCommand {
    /// Store the Jira password for the selected source
    Login(LoginArgs),
    /// Remove the stored password for the selected source
    Logout,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Password to store (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

pub fn handle(
    command: AuthCommand,
    source: Option<Source>,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    let source = source.ok_or_else(|| anyhow!("--source is required for auth commands"))?;

    match command {
        AuthCommand::Login(args) => login(args, source, store, renderer),
        AuthCommand::Logout => {
            store
                .delete_secret(source.as_str())
                .context("Failed to remove stored password")?;
            tracing::info!(source = %source, "Stored password removed");
            renderer.success(&format!("Removed stored password for source '{source}'"));
            Ok(())
        }
    }
}

fn login(
    args: LoginArgs,
    source: Source,
    store: &CredentialStore,
    renderer: &OutputRenderer,
) -> Result<()> {
    let password = match args.password {
        Some(password) if !password.trim().is_empty() => password,
        _ => rpassword::prompt_password(format!("Jira password for source '{source}': "))
            .context("Failed to read password from prompt")?,
    };
    if password.trim().is_empty() {
        return Err(anyhow!("Password cannot be empty"));
    }

    store
        .set_secret(source.as_str(), &password)
        .context("Failed to store password")?;

    tracing::info!(
        source = %source,
        path = %store.path().display(),
        "Password stored"
    );
    renderer.success(&format!("Password stored for source '{source}'"));
    Ok(())
}
