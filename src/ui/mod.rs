//! Interactive terminal interface: login form and task list

pub mod app;
pub mod editor;
pub mod view;

pub use app::{run, AppState};
