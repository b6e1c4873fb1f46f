//! Terminal styling for kado CLI output.
//!
//! Colour is applied only when the terminal supports it; every helper falls
//! back to plain text so piped output stays clean.

pub mod styles;
pub mod terminal;
