//! Note CLI subcommands: list and attachment sync.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Note subcommands.
#[derive(Subcommand)]
pub enum NotesCommand {
    /// List a user's notes, newest first.
    #[command(alias = "ls")]
    List {
        /// Owning user id.
        user: String,
    },

    /// Remove notes whose uploaded file no longer exists.
    Sync {
        /// Owning user id.
        user: String,
    },
}

/// Handle a notes subcommand.
pub async fn handle_notes_command(cmd: NotesCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        NotesCommand::List { user } => list_notes(state, &user, json).await,
        NotesCommand::Sync { user } => sync_notes(state, &user, json).await,
    }
}

async fn list_notes(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let notes = state.note_service.list_notes(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!();
        println!(
            "  {} No notes found for '{}'.",
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
        Cell::new("File").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Public ID").fg(Color::White),
        Cell::new("Added").fg(Color::White),
    ]);

    for note in &notes {
        table.add_row(vec![
            Cell::new(&note.file_name).fg(Color::Cyan),
            Cell::new(note.effective_resource_type()).fg(Color::DarkGrey),
            Cell::new(&note.public_id).fg(Color::White),
            Cell::new(note.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

async fn sync_notes(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let report = state.note_service.sync_attachments(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} synced, {} removed",
        style("✓").green().bold(),
        style(report.synced).bold(),
        style(report.removed).bold()
    );
    for item in &report.errors {
        println!(
            "  {} note {}: {}",
            style("✗").red().bold(),
            style(&item.note_id).cyan(),
            item.error
        );
    }
    println!();

    Ok(())
}
