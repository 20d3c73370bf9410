//! Theme and color definitions for rich output.

use crate::sync::SyncStatus;
use rich_rust::r#box::ROUNDED;
use rich_rust::prelude::*;

fn colored(name: &str) -> Style {
    Color::parse(name).map_or_else(|_| Style::new(), |color| Style::new().color(color))
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub info: Style,
    pub dimmed: Style,
    pub accent: Style,
    pub muted: Style,
    pub emphasis: Style,

    pub project_id: Style,
    pub project_name: Style,
    pub version: Style,
    pub file_path: Style,
    pub command: Style,

    pub status_current: Style,
    pub status_behind: Style,
    pub status_ahead: Style,
    pub status_conflict: Style,
    pub status_invalid: Style,
    pub status_no_schema: Style,

    pub table_header: Style,
    pub table_border: Style,
    pub panel_title: Style,
    pub panel_border: Style,

    pub box_style: &'static BoxChars,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: colored("green").bold(),
            error: colored("red").bold(),
            warning: colored("yellow").bold(),
            info: colored("blue"),
            dimmed: Style::new().dim(),
            accent: colored("cyan"),
            muted: colored("bright_black"),
            emphasis: Style::new().bold(),

            project_id: colored("cyan").bold(),
            project_name: Style::new().bold(),
            version: colored("magenta"),
            file_path: colored("blue").italic(),
            command: colored("cyan"),

            status_current: colored("green").bold(),
            status_behind: colored("yellow").bold(),
            status_ahead: colored("blue").bold(),
            status_conflict: colored("red").bold(),
            status_invalid: colored("red"),
            status_no_schema: colored("bright_black"),

            table_header: Style::new().bold(),
            table_border: colored("bright_black"),
            panel_title: Style::new().bold(),
            panel_border: colored("bright_black"),

            box_style: &ROUNDED,
        }
    }
}

impl Theme {
    #[must_use]
    pub fn status_style(&self, status: SyncStatus) -> Style {
        match status {
            SyncStatus::Current => self.status_current.clone(),
            SyncStatus::Behind => self.status_behind.clone(),
            SyncStatus::Ahead => self.status_ahead.clone(),
            SyncStatus::Conflict => self.status_conflict.clone(),
            SyncStatus::Invalid => self.status_invalid.clone(),
            SyncStatus::NoSchema => self.status_no_schema.clone(),
        }
    }

    /// Panel border matching how urgent a status is.
    #[must_use]
    pub fn status_border(&self, status: SyncStatus) -> Style {
        match status {
            SyncStatus::Current => self.success.clone(),
            SyncStatus::Conflict | SyncStatus::Invalid => self.error.clone(),
            SyncStatus::Behind | SyncStatus::Ahead => self.warning.clone(),
            SyncStatus::NoSchema => self.panel_border.clone(),
        }
    }
}
