//! Command implementations for dropdir-cli

pub mod drop;
pub mod folders;
pub mod init;

pub use drop::{DropOptions, run_drop};
pub use folders::{run_forget, run_recent, run_store};
pub use init::run_init;
