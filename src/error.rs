//! Errors raised by this crate itself, as opposed to the errors it wraps.

/// Failures of the construction contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A dynamically-typed value was none of the recognized input kinds.
    #[error(
        "unsupported input kind `{type_name}`: expected Traced, WithStack, a message string or an error"
    )]
    InvalidInput {
        /// Name of the rejected type.
        type_name: &'static str,
    },
}
