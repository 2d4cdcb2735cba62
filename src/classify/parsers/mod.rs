/// Parsers Module
///
/// Contains instruction parsers for the programs a payment transaction touches.
/// Each parser scans a decoded instruction list and extracts the data it knows about.
pub mod memo;
pub mod system;
pub mod token;

// Re-export commonly used parsers
pub use memo::parse_memo;
pub use system::parse_system_transfer;
pub use token::parse_token_transfer;
