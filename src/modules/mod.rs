// Declare all modules
pub mod credentials;
pub mod email;
pub mod error;
pub mod utils;
pub mod watcher;

// No re-exports here as they're handled in lib.rs
