//! Operator command parsing.

use idscan_core::{RecordField, RecordId};
use idscan_session::NotificationKind;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Usage summary printed by `help`.
pub const HELP: &str = "\
commands:
  select <path>             choose an image to upload
  upload                    upload the selected image
  toggle                    show or hide search (showing reloads records)
  term <text>               set the search query
  key <name>                press a key in the query input (Enter searches)
  search                    filter the held records by the query
  edit <id>                 put a record into edit mode
  set <id> <field> <value>  change a field of a record in edit mode
  save <id>                 send a record's values to the backend
  delete <id>               delete a record
  dismiss <kind>            clear a notification
  list                      show records and notifications
  help                      show this text
  quit                      exit";

/// Errors from parsing an operator command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// Line names no known command
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    /// Command is missing an argument
    #[error("usage: {0}")]
    Usage(&'static str),

    /// Argument could not be parsed
    #[error("{0}")]
    InvalidArgument(String),
}

/// One operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose an image file
    Select(PathBuf),
    /// Upload the chosen image
    Upload,
    /// Show or hide the search panel
    Toggle,
    /// Set the search query
    Term(String),
    /// Key press in the query input
    Key(String),
    /// Commit the search
    Search,
    /// Enter edit mode
    Edit(RecordId),
    /// Change one field
    Set {
        /// Record to change
        id: RecordId,
        /// Field to change
        field: RecordField,
        /// New value, may contain spaces
        value: String,
    },
    /// Save a record
    Save(RecordId),
    /// Delete a record
    Delete(RecordId),
    /// Dismiss a notification
    Dismiss(NotificationKind),
    /// Print the current state
    List,
    /// Print usage
    Help,
    /// Exit the shell
    Quit,
}

fn required<'a>(arg: Option<&'a str>, usage: &'static str) -> Result<&'a str, CommandError> {
    arg.map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(CommandError::Usage(usage))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim_start())),
            None => (line, None),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "select" => Self::Select(PathBuf::from(required(rest, "select <path>")?)),
            "upload" => Self::Upload,
            "toggle" => Self::Toggle,
            // An empty query is meaningful: it matches every record
            "term" => Self::Term(rest.unwrap_or_default().to_string()),
            "key" => Self::Key(required(rest, "key <name>")?.to_string()),
            "search" => Self::Search,
            "edit" => Self::Edit(required(rest, "edit <id>")?.into()),
            "set" => {
                const USAGE: &str = "set <id> <field> <value>";
                let mut parts = required(rest, USAGE)?.splitn(3, char::is_whitespace);
                let id = required(parts.next(), USAGE)?;
                let field = required(parts.next(), USAGE)?
                    .parse()
                    .map_err(|e: idscan_core::IdScanError| {
                        CommandError::InvalidArgument(e.to_string())
                    })?;
                Self::Set {
                    id: id.into(),
                    field,
                    value: parts.next().unwrap_or_default().to_string(),
                }
            }
            "save" => Self::Save(required(rest, "save <id>")?.into()),
            "delete" => Self::Delete(required(rest, "delete <id>")?.into()),
            "dismiss" => Self::Dismiss(
                required(rest, "dismiss <kind>")?
                    .parse()
                    .map_err(CommandError::InvalidArgument)?,
            ),
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
