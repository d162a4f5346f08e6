//! Utility functions and supporting infrastructure.
//!
//! Provides the little-endian layout reader and writer, the multi-file stream
//! set and the error types.

pub mod bitstream_io;
pub mod byteorder;
pub mod errors;
pub mod file_set;
