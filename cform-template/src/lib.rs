//! # cform-template
//!
//! Reads a directory of template fragments and deep-merges them into one
//! template document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use cform_template::{merge_fragments, DirectoryReader};
//!
//! fn merge(dir: &Path) {
//!     if let Ok(reader) = DirectoryReader::new(dir) {
//!         if let Ok(yaml) = merge_fragments(reader) {
//!             print!("{yaml}");
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod merge;
pub mod output;
pub mod reader;

pub use error::TemplateError;
pub use merge::{
    merge, merge_fragments, parse, serialize, validate, verify_round_trip, TemplateDocument,
};
pub use output::{ensure_writable, generated_banner, write_generated};
pub use reader::{DirectoryReader, Fragment};
