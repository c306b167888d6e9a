//! Trace storage and frame descriptors.
//!
//! This module provides [`Trace`], the immutable opaque snapshot attached to every
//! [`Traced`](crate::Traced), and [`Frame`], the structured descriptor exposed by
//! stack-capable errors. Both upstream representations are normalized into one
//! textual layout when a `Trace` is built.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// First line of every non-empty trace.
pub const TRACE_HEADER: &str = "stack backtrace:";

// ============================================================================
// FrameVec - configurable storage for captured frames
// ============================================================================
//
// When the smallvec feature is enabled, frames start in inline storage and
// spill to the heap once the inline capacity is exceeded.

/// Stack-first frame storage with 16 inline slots using smallvec.
#[cfg(feature = "smallvec-frames")]
pub type FrameVec = smallvec::SmallVec<[Frame; 16]>;

/// Heap-allocated frame storage (default, no smallvec feature).
#[cfg(not(feature = "smallvec-frames"))]
pub type FrameVec = Vec<Frame>;

// ============================================================================
// Frame - one structured stack frame
// ============================================================================

/// A structured stack frame: a symbol plus an optional source position.
///
/// This is the shape stack-capable errors hand over through
/// [`StackTracer::stack_trace`](crate::StackTracer::stack_trace).
///
/// ```rust
/// use firsttrace::Frame;
///
/// let frame = Frame::new("app::db::query").at("src/db.rs", 42, Some(9));
/// assert_eq!(frame.to_string(), "app::db::query\n             at src/db.rs:42:9");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Frame {
    symbol: Option<String>,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
}

impl Frame {
    /// Create a frame for the given symbol, without a source position.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    /// Attach a source position to this frame.
    pub fn at(mut self, file: impl Into<String>, line: u32, column: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = column;
        self
    }

    /// Build a frame from a `#[track_caller]` location. The symbol is unknown.
    pub fn from_location(loc: &core::panic::Location<'_>) -> Self {
        Self {
            symbol: None,
            file: Some(loc.file().to_owned()),
            line: Some(loc.line()),
            column: Some(loc.column()),
        }
    }

    /// The demangled symbol name, if it was resolved.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// The source file, if known.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The source line, if known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The source column, if known.
    pub fn column(&self) -> Option<u32> {
        self.column
    }
}

impl fmt::Display for Frame {
    /// Renders `symbol`, then an indented `at file:line:col` continuation line
    /// when a position is known.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol.as_deref().unwrap_or("<unknown>"))?;
        if let Some(file) = &self.file {
            write!(f, "\n             at {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
                if let Some(col) = self.column {
                    write!(f, ":{}", col)?;
                }
            }
        }
        Ok(())
    }
}

/// Convert a resolved `backtrace::Backtrace` into frame descriptors.
///
/// Inlined frames carry several symbols; each symbol becomes its own `Frame`.
/// Frames belonging to this crate's own call path are skipped.
pub(crate) fn frames_from_backtrace(bt: &backtrace::Backtrace) -> FrameVec {
    let frames = bt.frames();
    frames[caller_start(frames)..]
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|sym| Frame {
            symbol: sym.name().map(|name| name.to_string()),
            file: sym.filename().map(|p| p.display().to_string()),
            line: sym.lineno(),
            column: sym.colno(),
        })
        .collect()
}

// ============================================================================
// Frame trimming - drop the crate's own frames from the top of a capture
// ============================================================================

/// Modules whose functions sit between a caller and the stack read.
const INTERNAL_MODULES: &[&str] = &[
    "firsttrace::cause::",
    "firsttrace::error::",
    "firsttrace::ext::",
    "firsttrace::input::",
    "firsttrace::message::",
    "firsttrace::resolve::",
    "firsttrace::stack::",
    "firsttrace::trace::",
    "firsttrace::traced::",
];

/// Standard library and unwinder paths that may surround internal frames.
const GLUE_PREFIXES: &[&str] = &["core::", "alloc::", "std::", "backtrace::"];

/// Whether a demangled symbol belongs to this crate's capture path.
///
/// Trait impls print as `<Type as path::Trait>::method`, so both sides of the
/// `as` are checked.
pub(crate) fn is_internal_symbol(name: &str) -> bool {
    let name = name.trim_start_matches('<');
    INTERNAL_MODULES.iter().any(|m| name.starts_with(m))
        || INTERNAL_MODULES.iter().any(|m| name.contains(&format!(" as {}", m)))
}

/// Whether a demangled symbol is glue: `Option` combinators, conversion shims
/// and the unwinder's own entry points.
pub(crate) fn is_glue_symbol(name: &str) -> bool {
    let name = name.trim_start_matches('<');
    GLUE_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Index of the first frame past this crate's own call path.
///
/// Walks from the top while frames are internal or glue, and cuts after the
/// last internal one. A frame with any symbol from outside (or none at all)
/// stops the walk, so inlined caller code is never dropped.
fn caller_start(frames: &[backtrace::BacktraceFrame]) -> usize {
    let mut cut = 0;
    for (i, frame) in frames.iter().enumerate() {
        let names: Vec<String> = frame
            .symbols()
            .iter()
            .filter_map(|sym| sym.name().map(|name| format!("{:#}", name)))
            .collect();
        if names.is_empty() {
            break;
        }
        if names.iter().all(|n| is_internal_symbol(n) || is_glue_symbol(n)) {
            if names.iter().any(|n| is_internal_symbol(n)) {
                cut = i + 1;
            }
        } else {
            break;
        }
    }
    cut
}

// ============================================================================
// TraceSource - the two upstream representations
// ============================================================================

/// Where trace text comes from before normalization.
pub(crate) enum TraceSource<'a> {
    /// A platform dump, stored verbatim (header added if missing).
    Raw(Cow<'a, str>),
    /// Structured frames, rendered by the per-frame formatter.
    Frames(&'a [Frame]),
}

impl TraceSource<'_> {
    fn normalize(self) -> String {
        match self {
            TraceSource::Raw(text) if text.is_empty() => String::new(),
            TraceSource::Raw(text) if text.starts_with(TRACE_HEADER) => text.into_owned(),
            TraceSource::Raw(text) => {
                let mut out = String::with_capacity(TRACE_HEADER.len() + 1 + text.len());
                out.push_str(TRACE_HEADER);
                out.push('\n');
                out.push_str(&text);
                out
            }
            TraceSource::Frames(frames) => {
                use fmt::Write;
                let mut out = String::from(TRACE_HEADER);
                out.push('\n');
                for (i, frame) in frames.iter().enumerate() {
                    // Writing into a String cannot fail.
                    let _ = writeln!(out, "{:>4}: {}", i, frame);
                }
                out
            }
        }
    }
}

// ============================================================================
// Trace - immutable shared snapshot
// ============================================================================

/// An immutable, opaque call-stack snapshot.
///
/// Cloning a `Trace` shares the same allocation, which is how a wrapper
/// carries its inner error's trace without copying or recapturing it.
/// Equality compares bytes; use [`Trace::ptr_eq`] to check that two handles
/// are the very same snapshot.
///
/// ```rust
/// use firsttrace::{Frame, Trace};
///
/// let trace = Trace::from_frames(&[Frame::new("main")]);
/// let shared = trace.clone();
/// assert!(Trace::ptr_eq(&trace, &shared));
/// assert!(trace.as_str().starts_with("stack backtrace:"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trace(Arc<str>);

impl Trace {
    /// An empty trace. Passed as an override, it means "no override".
    pub fn empty() -> Self {
        Self(Arc::from(""))
    }

    /// Capture the current call stack.
    ///
    /// This is the only place the crate reads the stack. It is synchronous and
    /// always returns whatever frames the platform could unwind. Frame `0` is
    /// the caller's own frame; the crate's construction path is cut off.
    #[inline(never)]
    pub fn capture() -> Self {
        let bt = backtrace::Backtrace::new();
        let frames = bt.frames();
        let bt = backtrace::Backtrace::from(frames[caller_start(frames)..].to_vec());
        Self::from_source(TraceSource::Raw(Cow::Owned(format!("{:?}", bt))))
    }

    /// Wrap an existing textual dump. The header line is prepended if missing.
    pub fn from_raw(text: impl Into<String>) -> Self {
        Self::from_source(TraceSource::Raw(Cow::Owned(text.into())))
    }

    /// Render structured frames into the trace layout.
    pub fn from_frames(frames: &[Frame]) -> Self {
        Self::from_source(TraceSource::Frames(frames))
    }

    pub(crate) fn from_source(source: TraceSource<'_>) -> Self {
        Self(Arc::from(source.normalize()))
    }

    /// The trace as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// The trace as text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this trace holds no data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether two handles share one snapshot.
    #[inline]
    pub fn ptr_eq(a: &Trace, b: &Trace) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Trace").field(&self.len()).finish()
    }
}

impl AsRef<[u8]> for Trace {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
