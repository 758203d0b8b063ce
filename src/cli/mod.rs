pub mod args;
pub mod exit;

pub use args::{Cli, ClientArgs, Command, ServeArgs};
pub use exit::Outcome;
