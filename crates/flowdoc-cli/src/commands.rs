//! Subcommand handlers.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flowdoc_core::models::{DocumentStats, DocumentSummary, ListPage, UploadFile, UploadMetadata};
use flowdoc_core::{ApiClient, Config, Session};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::Command;
use crate::render;

pub struct App {
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
}

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => login(app, username).await,
        Command::Logout => {
            app.session.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => {
            println!("{}", render::session_status(app.session.data().as_ref()));
            Ok(())
        }
        Command::Upload { path } => upload(app, &path).await,
        Command::List { page, limit, json } => {
            let api = app.session.authorize(&app.api)?;
            let payload = api.list_documents(ListPage::new(page, limit)).await?;
            if json {
                print_json(&payload)?;
            } else {
                print!("{}", render::document_table(&DocumentSummary::from_payload(&payload)));
            }
            Ok(())
        }
        Command::Show { id } => {
            let api = app.session.authorize(&app.api)?;
            print_json(&api.document_details(&id).await?)
        }
        Command::Share { id, config } => {
            let share_config = parse_share_config(&config)?;
            let api = app.session.authorize(&app.api)?;
            let confirmation = api.share_document(&id, &share_config).await?;
            println!("Shared document {}.", id);
            print_json(&confirmation)
        }
        Command::Dashboard { limit, stats_limit } => dashboard(app, limit, stats_limit).await,
    }
}

async fn login(app: &mut App, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| app.config.last_username.clone()) {
        Some(name) => name,
        None => prompt("Username: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", username))
        .context("Failed to read password")?;

    app.session.login(&app.api, &username, &password).await?;

    app.config.last_username = Some(username.clone());
    if let Err(e) = app.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}.", username);
    Ok(())
}

async fn upload(app: &App, path: &Path) -> Result<()> {
    let file = UploadFile::from_path(path)?;
    if !file.is_accepted_type() {
        anyhow::bail!(
            "{} is not a PDF or image ({})",
            file.file_name,
            file.content_type
        );
    }

    let api = app.session.authorize(&app.api)?;
    let metadata = UploadMetadata::for_file(&file);
    info!(file_name = %metadata.file_name, "Uploading");

    let payload = api.upload_document(file, &metadata).await?;
    println!("Document uploaded successfully!");
    print_json(&payload)
}

async fn dashboard(app: &App, limit: u32, stats_limit: u32) -> Result<()> {
    let api = app.session.authorize(&app.api)?;

    let (recent, sample) = tokio::try_join!(
        api.list_documents(ListPage::new(1, limit)),
        api.list_documents(ListPage::new(1, stats_limit)),
    )?;

    let stats = DocumentStats::from_documents(&DocumentSummary::from_payload(&sample));
    println!("Statistics");
    println!("----------");
    print!("{}", render::statistics(&stats));
    println!();
    println!("Recent Documents");
    println!("----------------");
    print!("{}", render::document_table(&DocumentSummary::from_payload(&recent)));
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("No username given");
    }
    Ok(value)
}

/// The share configuration is opaque to the client: any JSON value is
/// forwarded to the backend as-is.
fn parse_share_config(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("--config must be valid JSON")
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_share_config_accepts_any_json() {
        assert_eq!(parse_share_config(r#"{"public": true}"#).unwrap(), json!({"public": true}));
        assert_eq!(parse_share_config(r#"["bob@example.com"]"#).unwrap(), json!(["bob@example.com"]));
        assert_eq!(parse_share_config("\"link\"").unwrap(), json!("link"));
    }

    #[test]
    fn test_share_config_rejects_invalid_json() {
        let err = parse_share_config("{oops").unwrap_err();
        assert!(err.to_string().contains("valid JSON"));
    }
}
