//! Line-oriented operator shell over a [`Session`].

use crate::command::{Command, HELP};
use crate::render::{render_notifications, render_rows};
use idscan_client::RecordBackend;
use idscan_session::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// Stop the shell
    Quit,
}

/// Run one command. Returns the text to show the operator.
///
/// Failures are reported in the returned text; none of them ends the shell.
pub async fn execute<B>(session: &Session<B>, command: Command) -> (Flow, String)
where
    B: RecordBackend + ?Sized,
{
    debug!(?command, "executing command");
    let output = match command {
        Command::Select(path) => match session.select_path(&path) {
            Ok(()) => format!("selected {}", path.display()),
            Err(e) => format!("{} not selected: {e}", path.display()),
        },
        Command::Upload => match session.upload().await {
            Ok(record) => format!("uploaded as {}", record.id),
            Err(e) => format!("upload failed: {e}"),
        },
        Command::Toggle => match session.toggle_search().await {
            Ok(true) => format!("search shown, {} record(s) loaded", session.store().len()),
            Ok(false) => "search hidden".to_string(),
            Err(e) => format!("search shown, load failed: {e}"),
        },
        Command::Term(term) => {
            session.set_search_term(term);
            format!("query is '{}'", session.search_term())
        }
        Command::Key(key) => match session.search_key_pressed(&key) {
            Some(kept) => format!("{kept} record(s) match"),
            None => String::new(),
        },
        Command::Search => format!("{} record(s) match", session.search()),
        Command::Edit(id) => {
            session.begin_edit(&id);
            format!("editing {id}")
        }
        Command::Set { id, field, value } => {
            if session.edit_field(&id, field, &value) {
                format!("{id}: {field} set")
            } else {
                format!("{id} is not being edited")
            }
        }
        Command::Save(id) => match session.save(&id).await {
            Ok(()) => format!("{id} saved"),
            Err(e) => format!("{id} not saved: {e}"),
        },
        Command::Delete(id) => match session.delete(&id).await {
            Ok(true) => format!("{id} deleted"),
            Ok(false) => format!("{id} is not held"),
            Err(e) => format!("{id} not deleted: {e}"),
        },
        Command::Dismiss(kind) => {
            if session.dismiss(kind) {
                format!("{kind} dismissed")
            } else {
                format!("no {kind} notification")
            }
        }
        Command::List => render_rows(&session.rows()),
        Command::Help => HELP.to_string(),
        Command::Quit => return (Flow::Quit, String::new()),
    };
    (Flow::Continue, output)
}

/// Read commands from `input` until end of input or `quit`, writing results
/// and visible notifications to `output`.
pub async fn run<B, R, W>(session: &Session<B>, input: R, mut output: W) -> std::io::Result<()>
where
    B: RecordBackend + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            output.write_all(b"> ").await?;
            output.flush().await?;
            continue;
        }

        let (flow, text) = match line.parse::<Command>() {
            Ok(command) => execute(session, command).await,
            Err(e) => (Flow::Continue, e.to_string()),
        };
        if flow == Flow::Quit {
            break;
        }

        let mut text = text;
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&render_notifications(&session.notifications().active()));
        text.push_str("> ");
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}
