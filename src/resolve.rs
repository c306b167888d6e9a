//! Trace resolution: find the trace a new wrapper should carry.
//!
//! Resolution prefers reuse. It walks the cause chain for a trace (or frames it
//! can convert) and only captures the current stack when the chain has none.
//! That is what makes the first capture site the one that sticks.

use crate::cause::Cause;
use crate::trace::Trace;

/// Longest cause chain the resolver will walk before giving up on reuse.
///
/// Owned chains cannot loop, but a hand-written `source()` can. Past this depth
/// the walk ends as if nothing were found and a fresh trace is captured.
pub const MAX_CAUSE_DEPTH: usize = 256;

/// Resolve the trace for `input`, capturing the current stack if the chain
/// holds none.
///
/// ```rust
/// use firsttrace::{Cause, Trace, Traced, resolve};
///
/// let inner = Traced::new("timeout");
/// let trace = resolve(Cause::Traced(&inner));
/// assert!(Trace::ptr_eq(&trace, inner.trace()));
/// ```
pub fn resolve(input: Cause<'_>) -> Trace {
    resolve_in_chain(input).unwrap_or_else(capture)
}

/// Resolve the trace for `input` without capturing.
///
/// Returns `None` when no link in the chain, and not `input` itself, can
/// provide a trace.
pub fn resolve_in_chain(input: Cause<'_>) -> Option<Trace> {
    if let Cause::Traced(traced) = input {
        return Some(traced.trace().clone());
    }
    if let Some(trace) = walk(input) {
        return Some(trace);
    }
    match input {
        Cause::Stacked(stacked) if !stacked.stack_trace().is_empty() => {
            tracing::trace!(
                frames = stacked.stack_trace().len(),
                "using frames of the error itself"
            );
            Some(Trace::from_frames(stacked.stack_trace()))
        }
        _ => None,
    }
}

/// Walk the links below `input`, stopping at the first one that has a trace
/// or frames. Stack-capable links with no frames are walked past.
fn walk(input: Cause<'_>) -> Option<Trace> {
    let mut link = input.next();
    let mut depth = 1;
    while let Some(cause) = link {
        match cause {
            Cause::Traced(traced) => {
                tracing::trace!(depth, "reusing trace from cause chain");
                return Some(traced.trace().clone());
            }
            Cause::Stacked(stacked) if !stacked.stack_trace().is_empty() => {
                tracing::trace!(
                    depth,
                    frames = stacked.stack_trace().len(),
                    "converting frames from cause chain"
                );
                return Some(Trace::from_frames(stacked.stack_trace()));
            }
            Cause::Stacked(_) | Cause::Plain(_) => {}
        }
        if depth >= MAX_CAUSE_DEPTH {
            tracing::warn!(
                max_depth = MAX_CAUSE_DEPTH,
                "cause chain exceeds depth limit, not reusing a trace"
            );
            return None;
        }
        link = cause.next();
        depth += 1;
    }
    None
}

/// Capture the current stack, logging that resolution missed.
pub(crate) fn capture() -> Trace {
    tracing::debug!("no trace in cause chain, capturing stack");
    Trace::capture()
}
