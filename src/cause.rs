//! A typed view over one link of a cause chain.
//!
//! [`Cause`] tells the resolver what a link can offer: its own trace, a set of
//! structured frames, or nothing but (maybe) a further source.

use std::error::Error;
use std::fmt;

use crate::stack::{StackTracer, WithStack};
use crate::trace::Trace;
use crate::traced::Traced;

/// One link in a cause chain, classified by capability.
///
/// ```rust
/// use firsttrace::{Cause, Traced};
///
/// let err = Traced::new("disk full").wrap("saving document");
/// let kinds: Vec<_> = err.chain().map(|c| c.is_traced()).collect();
/// // outer Traced, the context node, the inner Traced, the base message
/// assert_eq!(kinds, vec![true, false, true, false]);
/// ```
#[derive(Clone, Copy)]
pub enum Cause<'a> {
    /// A [`Traced`] error carrying its own trace.
    Traced(&'a Traced),
    /// An error exposing structured frames.
    Stacked(&'a (dyn StackTracer + 'static)),
    /// Any other error. It may still have a source to follow.
    Plain(&'a (dyn Error + 'static)),
}

impl<'a> Cause<'a> {
    /// Classify an error by downcasting to the known trace-bearing types.
    ///
    /// [`Traced`] and [`WithStack`] are recognized here. Custom
    /// [`StackTracer`] types are only seen when another stack-capable link
    /// hands them out through [`StackTracer::next_cause`].
    pub fn of(err: &'a (dyn Error + 'static)) -> Self {
        if let Some(traced) = err.downcast_ref::<Traced>() {
            return Cause::Traced(traced);
        }
        if let Some(stacked) = err.downcast_ref::<WithStack>() {
            return Cause::Stacked(stacked);
        }
        Cause::Plain(err)
    }

    /// The next link down the chain, if any.
    pub fn next(&self) -> Option<Cause<'a>> {
        match *self {
            Cause::Traced(traced) => Some(traced.cause_link()),
            Cause::Stacked(stacked) => stacked.next_cause(),
            Cause::Plain(err) => err.source().map(Cause::of),
        }
    }

    /// The underlying error.
    pub fn as_error(&self) -> &'a (dyn Error + 'static) {
        match *self {
            Cause::Traced(traced) => traced,
            Cause::Stacked(stacked) => stacked,
            Cause::Plain(err) => err,
        }
    }

    /// The trace stored on this link, for [`Cause::Traced`] only.
    pub fn trace(&self) -> Option<&'a Trace> {
        match *self {
            Cause::Traced(traced) => Some(traced.trace()),
            _ => None,
        }
    }

    /// Whether this link is a [`Traced`] error.
    #[inline]
    pub fn is_traced(&self) -> bool {
        matches!(self, Cause::Traced(_))
    }

    /// Whether this link exposes structured frames.
    #[inline]
    pub fn is_stacked(&self) -> bool {
        matches!(self, Cause::Stacked(_))
    }

    /// Iterate from this link to the end of the chain.
    pub fn iter(self) -> Chain<'a> {
        Chain { next: Some(self) }
    }
}

impl fmt::Display for Cause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_error(), f)
    }
}

impl fmt::Debug for Cause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Cause::Traced(_) => "Traced",
            Cause::Stacked(_) => "Stacked",
            Cause::Plain(_) => "Plain",
        };
        f.debug_tuple(kind)
            .field(&format_args!("{}", self.as_error()))
            .finish()
    }
}

/// Iterator over the links of a cause chain, outermost first.
///
/// The iterator follows the chain as given and does not bound its length; the
/// resolver applies [`MAX_CAUSE_DEPTH`](crate::MAX_CAUSE_DEPTH) on its own walk.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    next: Option<Cause<'a>>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = Cause<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next();
        Some(current)
    }
}
