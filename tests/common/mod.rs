#![allow(dead_code)]

pub mod cli;
pub mod mock_api;

pub use cli::{BasicRun, Workspace, schema_json};
pub use mock_api::MockApi;
