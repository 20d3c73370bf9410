use crate::model::Project;
use crate::output::Theme;
use rich_rust::prelude::*;
use rich_rust::renderables::Cell;

/// Renders the account's projects as a table.
pub struct ProjectTable<'a> {
    projects: &'a [Project],
    theme: &'a Theme,
    title: Option<String>,
}

impl<'a> ProjectTable<'a> {
    #[must_use]
    pub const fn new(projects: &'a [Project], theme: &'a Theme) -> Self {
        Self {
            projects,
            theme,
            title: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn build(&self) -> Table {
        let mut table = Table::new()
            .box_style(self.theme.box_style)
            .border_style(self.theme.table_border.clone())
            .header_style(self.theme.table_header.clone());

        if let Some(ref title) = self.title {
            table = table.title(Text::new(title));
        }

        table = table
            .with_column(Column::new("ID").min_width(36))
            .with_column(Column::new("Name").min_width(12).max_width(40))
            .with_column(Column::new("Team").max_width(24));

        for project in self.projects {
            table.add_row(Row::new(vec![
                Cell::new(Text::new(&project.id)).style(self.theme.project_id.clone()),
                Cell::new(Text::new(&project.name)).style(self.theme.project_name.clone()),
                Cell::new(Text::new(project.team_name.clone().unwrap_or_default()))
                    .style(self.theme.muted.clone()),
            ]));
        }

        table
    }

    /// Tab-separated lines for plain output.
    #[must_use]
    pub fn plain_lines(&self) -> Vec<String> {
        self.projects
            .iter()
            .map(|project| match &project.team_name {
                Some(team) => format!("{}\t{}\t{team}", project.id, project.name),
                None => format!("{}\t{}", project.id, project.name),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str, team: Option<&str>) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            slug: None,
            owner: None,
            website: None,
            team_id: None,
            team_name: team.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn plain_lines_include_team_when_present() {
        let projects = vec![project("p1", "Todos", None), project("p2", "Notes", Some("acme"))];
        let theme = Theme::default();
        let lines = ProjectTable::new(&projects, &theme).plain_lines();
        assert_eq!(lines, vec!["p1\tTodos", "p2\tNotes\tacme"]);
    }
}
