//! Output formatting
//!
//! - `json`: the combined dataset document written to disk
//! - `text`: console summary

pub mod json;
pub mod text;
