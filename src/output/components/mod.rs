mod project_table;
mod status_panel;

pub use project_table::ProjectTable;
pub use status_panel::StatusPanel;
