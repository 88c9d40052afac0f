//! Stack growth for the recursive parser and evaluator
//!
//! Nesting in scripts is bounded (parser nesting limit, `max_call_depth`),
//! but debug builds and small host thread stacks can still run out before
//! those limits are reached. Recursion points run through `guarded`, which
//! switches to a heap-allocated stack segment when the current one is low.

const RED_ZONE: usize = 128 * 1024;
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
pub(crate) fn guarded<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
