pub mod cli;
pub mod load_config;
pub mod supabase;

pub use cli::{run, Cli, Commands};
