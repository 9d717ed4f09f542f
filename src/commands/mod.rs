//! # CLI Command Implementations
//!
//! One module per subcommand. Each defines an `Args` struct derived with
//! `clap` and an `execute` function that resolves inputs and calls into the
//! `splunk_app_merger` library.

pub mod check;
pub mod completions;
pub mod merge;
