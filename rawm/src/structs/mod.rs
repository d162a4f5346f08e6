//! Data structures of the RAWM recording layout.
//!
//! The footer and its raw descriptor are read from disk; the block headers
//! are synthesized for consumers that expect a block-structured stream.

pub mod footer;
pub mod headers;
pub mod raw_info;
pub mod xref;
