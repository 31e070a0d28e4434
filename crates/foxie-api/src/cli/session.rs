//! Session management CLI commands: list, show, delete.
//!
//! Provides session browsing with rich tables, a transcript view,
//! and deletion with confirmation prompt.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use foxie_types::chat::{ChatSession, MessageRole};

use crate::state::AppState;

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionCommand {
    /// List a user's sessions, most recently updated first.
    #[command(alias = "ls")]
    List {
        /// Owning user id.
        user: String,

        /// Show at most this many sessions (the sidebar uses 10).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a session transcript.
    Show {
        /// Owning user id.
        user: String,

        /// Session id.
        id: String,
    },

    /// Delete a session.
    #[command(alias = "rm")]
    Delete {
        /// Owning user id.
        user: String,

        /// Session id.
        id: String,

        /// Skip confirmation prompt and ignore already-deleted sessions.
        #[arg(long)]
        force: bool,
    },
}

/// Handle a session subcommand.
pub async fn handle_session_command(
    cmd: SessionCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        SessionCommand::List { user, limit } => list_sessions(state, &user, limit, json).await,
        SessionCommand::Show { user, id } => show_session(state, &user, &id, json).await,
        SessionCommand::Delete { user, id, force } => {
            delete_session(state, &user, &id, force, json).await
        }
    }
}

/// List a user's sessions, most recently updated first.
///
/// # Examples
///
/// ```bash
/// foxie sessions list student-1
/// foxie sessions list student-1 --limit 10 --json
/// ```
pub async fn list_sessions(
    state: &AppState,
    user_id: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let sessions = state.chat_service.list_sessions(user_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions found for '{}'.",
            style("i").blue().bold(),
            style(user_id).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
    ]);

    for session in &sessions {
        let name_cell = if session.is_first_ever_session {
            Cell::new(truncate(&session.name, 40)).fg(Color::Yellow)
        } else {
            Cell::new(truncate(&session.name, 40)).fg(Color::Cyan)
        };

        table.add_row(vec![
            Cell::new(&session.id).fg(Color::DarkGrey),
            name_cell,
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            Cell::new(session.messages.len().to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!("  Sessions for '{}'", style(user_id).cyan().bold());
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a session transcript.
///
/// # Examples
///
/// ```bash
/// foxie sessions show student-1 <session-id>
/// ```
pub async fn show_session(
    state: &AppState,
    user_id: &str,
    session_id: &str,
    json: bool,
) -> Result<()> {
    let session = state.chat_service.get_session(user_id, session_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    print_transcript(&session);
    Ok(())
}

fn print_transcript(session: &ChatSession) {
    println!();
    println!("  {}", style(&session.name).cyan().bold());
    println!(
        "  {}",
        style(format!(
            "created {} / updated {}",
            session.created_at.format("%Y-%m-%d %H:%M UTC"),
            session.updated_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .dim()
    );
    println!();

    if session.messages.is_empty() {
        println!("  {}", style("(no messages)").dim());
        println!();
        return;
    }

    for (index, message) in session.messages.iter().enumerate() {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Assistant").magenta().bold(),
        };
        println!("  {} {label}", style(format!("[{index}]")).dim());
        for line in message.content.lines() {
            println!("    {line}");
        }
        println!();
    }
}

/// Delete a session with confirmation.
///
/// `--force` skips the prompt and succeeds even when the session is
/// already gone.
///
/// # Examples
///
/// ```bash
/// foxie sessions delete student-1 <session-id>
/// foxie sessions delete student-1 <session-id> --force
/// ```
pub async fn delete_session(
    state: &AppState,
    user_id: &str,
    session_id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    if force {
        state.chat_service.purge_session(user_id, session_id).await?;
    } else {
        let session = state.chat_service.get_session(user_id, session_id).await?;

        if !json {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Delete session '{}' ({} messages)?",
                    style(&session.name).red().bold(),
                    session.messages.len()
                ))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("  Cancelled.");
                return Ok(());
            }
        }

        state.chat_service.delete_session(user_id, session_id).await?;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "deleted": true, "sessionId": session_id })
        );
    } else {
        println!("  {} Session '{}' deleted.", style("x").red().bold(), session_id);
    }

    Ok(())
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
