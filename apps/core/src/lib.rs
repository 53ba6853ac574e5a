pub mod commands;
pub mod config;
pub mod host;
pub mod keyboard;
pub mod logging;
pub mod model;
pub mod normalizer;
pub mod overlay_state;
pub mod picker;
pub mod placement;
pub mod query_engine;
pub mod runtime;
pub mod search;
pub mod settings;
pub mod terminal_ui;
pub mod vault_index;
pub mod workspace;
