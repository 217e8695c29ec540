pub mod api;
pub mod brain;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod idle;
pub mod models;
pub mod repl;
pub mod router;
pub mod ui;
