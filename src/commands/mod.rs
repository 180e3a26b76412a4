//! HTTP handlers, one module per route group.

pub mod ai;
pub mod files;
pub mod history;
pub mod rules;
pub mod system;
pub mod templates;
pub mod watcher;
