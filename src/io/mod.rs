/// Command-line arguments and the simulation runner
pub mod cli;
/// Constants, defaults and engine configuration
pub mod configuration;
/// Error types and context management
pub mod error;
/// Structured logging setup
pub mod logging;
/// Generation progress display
pub mod progress;
/// Named initial patterns
pub mod seeds;
