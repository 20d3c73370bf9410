use crate::output::{OutputContext, Theme};
use crate::sync::Analysis;
use rich_rust::prelude::*;

/// Renders a schema analysis: versions, findings, errors, next steps.
pub struct StatusPanel<'a> {
    analysis: &'a Analysis,
    theme: &'a Theme,
}

impl<'a> StatusPanel<'a> {
    #[must_use]
    pub const fn new(analysis: &'a Analysis, theme: &'a Theme) -> Self {
        Self { analysis, theme }
    }

    pub fn print(&self, ctx: &OutputContext) {
        if ctx.is_rich() {
            ctx.render(&self.build(ctx.width()));
        } else {
            for line in self.plain_lines() {
                ctx.print(&line);
            }
        }
    }

    #[must_use]
    pub fn build(&self, width: usize) -> Panel {
        let analysis = self.analysis;
        let mut content = Text::new("");

        if let Some(ref project_id) = analysis.project_id {
            content.append_styled("Project:  ", self.theme.dimmed.clone());
            content.append_styled(&format!("{project_id}\n"), self.theme.project_id.clone());
        }
        if let Some(ref local) = analysis.local {
            content.append_styled("File:     ", self.theme.dimmed.clone());
            content.append_styled(
                &format!("{}\n", local.file_path.display()),
                self.theme.file_path.clone(),
            );
        }
        if let Some(comparison) = analysis.comparison {
            content.append_styled("Local:    ", self.theme.dimmed.clone());
            content.append_styled(
                &format!("v{}\n", comparison.local_version),
                self.theme.version.clone(),
            );
            content.append_styled("Remote:   ", self.theme.dimmed.clone());
            content.append_styled(
                &format!("v{}", comparison.remote_version),
                self.theme.version.clone(),
            );
            if !analysis.remote_exists {
                content.append_styled(" (no schema published yet)", self.theme.muted.clone());
            }
            content.append("\n");
        }
        content.append_styled("Status:   ", self.theme.dimmed.clone());
        content.append_styled(
            &format!("{}\n", analysis.status),
            self.theme.status_style(analysis.status),
        );

        if !analysis.messages.is_empty() {
            content.append("\n");
            for message in &analysis.messages {
                content.append(&format!("{message}\n"));
            }
        }

        if !analysis.errors.is_empty() {
            content.append_styled("\nErrors:\n", self.theme.error.clone());
            for issue in &analysis.errors {
                content.append_styled("  • ", self.theme.error.clone());
                content.append(&issue.message);
                if !issue.path.is_empty() {
                    content.append_styled(&format!("  {}", issue.path), self.theme.muted.clone());
                }
                content.append("\n");
            }
        }

        let actions = analysis.suggested_actions();
        if !actions.is_empty() {
            content.append_styled("\nNext:\n", self.theme.emphasis.clone());
            for action in actions {
                content.append_styled("  → ", self.theme.dimmed.clone());
                content.append_styled(&format!("{action}\n"), self.theme.command.clone());
            }
        }

        Panel::from_rich_text(&content, width)
            .title(Text::styled("Schema status", self.theme.panel_title.clone()))
            .box_style(self.theme.box_style)
            .border_style(self.theme.status_border(analysis.status))
    }

    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        let analysis = self.analysis;
        let mut lines = Vec::new();
        if let Some(ref project_id) = analysis.project_id {
            lines.push(format!("Project: {project_id}"));
        }
        if let Some(ref local) = analysis.local {
            lines.push(format!("File: {}", local.file_path.display()));
        }
        if let Some(comparison) = analysis.comparison {
            lines.push(format!("Local version: {}", comparison.local_version));
            lines.push(format!("Remote version: {}", comparison.remote_version));
        }
        lines.push(format!("Status: {}", analysis.status));
        lines.extend(analysis.messages.iter().cloned());
        if !analysis.errors.is_empty() {
            lines.push("Errors:".to_string());
            lines.extend(analysis.errors.iter().map(|issue| format!("  - {issue}")));
        }
        let actions = analysis.suggested_actions();
        if !actions.is_empty() {
            lines.push("Next:".to_string());
            lines.extend(actions.iter().map(|action| format!("  -> {action}")));
        }
        lines
    }
}
