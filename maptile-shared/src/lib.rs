//! maptile shared code
//!
//! Error taxonomy and constants used by the `maptile` library, the CLI and
//! the test utilities.

pub mod constants;
pub mod errors;

pub use errors::{MaptileError, MaptileResult};
