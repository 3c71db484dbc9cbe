pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod followup;
pub mod host;
pub mod include;
pub mod pack;
pub mod process;
pub mod sync;
pub mod terminal;
