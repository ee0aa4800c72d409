//! # buf - long-indexed byte access over memory-mapped files
//!
//! Random access to a potentially large region of a file, addressed with
//! `u64` offsets. All multi-byte reads are little-endian.
//!
//! Three pieces:
//!
//! - [`BufAccess`] — the one-method trait every access strategy implements:
//!   `get(ix) -> u8`.
//! - [`Buf`] — composes little-endian primitives, byte-range copies, and
//!   LSB-first bit tests on top of any [`BufAccess`].
//! - [`BufMapper`] — owns the mapping strategy for a file region. Regions
//!   shorter than 2 GiB get a single eager mapping; longer regions are split
//!   into fixed-size *banks* (default 1 GiB), each mapped lazily on first
//!   access through a create-once slot so concurrent readers never map the
//!   same bank twice.
//!
//! The layer is strictly read-only; nothing writes through it. The [`util`]
//! module carries the small binary helpers (8-byte alignment padding, UTF-8
//! length counting) shared with serialization code.

mod access;
mod mapper;
pub mod util;

pub use access::{Buf, BufAccess};
pub use mapper::BufMapper;

#[cfg(test)]
mod tests;
