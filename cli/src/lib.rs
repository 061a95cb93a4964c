pub mod commands;
pub mod context;
pub mod links;
pub mod logging;
pub mod players;
pub mod repl;
pub mod replay;
pub mod sounds;

pub use context::CliContext;
pub use repl::readline;
