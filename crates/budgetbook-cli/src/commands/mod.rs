//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `budget` - Saved budget inspection
//! - `core` - Init command and shared utilities (open_db)
//! - `orgs` - Gift recipient organisation commands
//! - `serve` - Web server command
//! - `statement` - Bank statement summaries

pub mod budget;
pub mod core;
pub mod orgs;
pub mod serve;
pub mod statement;

// Re-export command functions for main.rs
pub use budget::*;
pub use core::*;
pub use orgs::*;
pub use serve::*;
pub use statement::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
