//! Convenient re-exports for common usage.
//!
//! This prelude includes the most commonly used types and traits for tracing.
//!
//! ## Usage
//!
//! ```rust
//! use firsttrace::prelude::*;
//!
//! fn inner() -> Result<(), Traced> {
//!     Err(traced("not found"))
//! }
//!
//! fn outer() -> Result<(), Traced> {
//!     inner().wrap("looking up user")?;
//!     Ok(())
//! }
//! # assert!(outer().is_err());
//! ```

pub use crate::Traced;
pub use crate::traced;
pub use crate::{ErrorTraceExt, ResultStartTraceExt, ResultTraceExt};
