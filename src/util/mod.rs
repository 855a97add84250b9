//! Utility functions shared by the view layer and the link opener.
//!
//! - **Text**: terminal-safe sanitising, Unicode-aware width and truncation
//! - **URLs**: validation of partner links before handing them to the OS
//!
//! # Examples
//!
//! ```
//! use retroflix::util::{display_width, strip_control_chars, truncate_to_width};
//!
//! assert_eq!(display_width("Hello"), 5);
//! assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
//! assert_eq!(strip_control_chars("\x1b[31mRed\x1b[0m"), "Red");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_link, UrlValidationError};

/// Maximum search term length accepted from the search bar.
pub const MAX_SEARCH_TERM_LENGTH: usize = 256;
