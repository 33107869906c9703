//! Plain-text rendering of the session state.

use idscan_core::RecordField;
use idscan_session::{EditState, Notification, NotificationKind, RecordRow};
use std::fmt::Write;

/// Marker for rows whose identification number has the wrong length.
const INVALID_MARKER: &str = "!";

fn notification_label(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "ok",
        NotificationKind::Error => "error",
        NotificationKind::ValidationError => "invalid",
        NotificationKind::DeletionConfirmed => "deleted",
    }
}

/// Render one record as a block of labelled fields.
#[must_use]
pub fn render_row(row: &RecordRow) -> String {
    let marker = if row.properly_extracted {
        " "
    } else {
        INVALID_MARKER
    };
    let mode = match row.edit_state {
        EditState::Viewing => "",
        EditState::Editing => " [editing]",
    };

    let mut out = format!("{marker} {}{mode}\n", row.record.id);
    for field in RecordField::ALL {
        let _ = writeln!(
            out,
            "    {:<22} {}",
            format!("{}:", field.display_name()),
            row.record.field(field)
        );
    }
    out
}

/// Render the held collection. Rows flagged with `!` were not extracted
/// properly.
#[must_use]
pub fn render_rows(rows: &[RecordRow]) -> String {
    if rows.is_empty() {
        return "no records\n".to_string();
    }
    let invalid = rows.iter().filter(|r| !r.properly_extracted).count();
    let mut out = format!("{} record(s), {invalid} flagged\n", rows.len());
    for row in rows {
        out.push_str(&render_row(row));
    }
    out
}

/// Render the visible notifications, one per line.
#[must_use]
pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|n| format!("[{}] {}\n", notification_label(n.kind), n.message))
        .collect()
}
