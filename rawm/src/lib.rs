#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! ### Container Layout
//!
//! - **Frames**: `frameSize` bytes each, packed from offset 0 of the first
//!   file. A frame may begin in one file and end in the next.
//! - **Footer**: the last 192 bytes of the last file. Magic `RAWM`, frame
//!   geometry, frame rate and the camera's sensor description.
//!
//! All multi-byte fields are little-endian.
//!
//! ### Block Stream
//!
//! | Tag    | When                 | Payload        |
//! |--------|----------------------|----------------|
//! | `MLVI` | once, during open    | none           |
//! | `RAWI` | once, during open    | none           |
//! | `VIDF` | once per frame read  | the raw frame  |
//!
//! Headers are synthesized from the footer; a recording never stores them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rawm::process::read::{NullHandler, RawReader};
//! use rawm::utils::file_set::FileSet;
//!
//! let files = FileSet::open_paths(&["M01-1234.RAW", "M01-1234.R00"])?;
//! let mut reader = RawReader::open(files, NullHandler)?;
//!
//! println!("{} frames at {:.3} fps", reader.block_count(), reader.footer().fps());
//!
//! for frame in reader.frames() {
//!     let frame = frame?;
//!     println!("frame {} @ {} ns", frame.index, frame.timestamp_ns);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Opening and reading recordings.
///
/// 1. **Footer** ([`process::locate`]): Finds and validates the footer.
///
/// 2. **Index** ([`process::index`]): Maps frame numbers to file positions.
///
/// 3. **Reading** ([`process::read`]): Reads frames and dispatches blocks.
pub mod process;

/// Data structures of the container and the synthesized blocks.
///
/// - **Footer** ([`structs::footer`]): On-disk trailer
/// - **Sensor Description** ([`structs::raw_info`]): Embedded raw_info record
/// - **Block Headers** ([`structs::headers`]): `MLVI`, `RAWI` and `VIDF`
/// - **Block Index** ([`structs::xref`]): Per-frame descriptors
pub mod structs;

/// Supporting infrastructure.
///
/// - **Layout Reader** ([`utils::bitstream_io`]): Little-endian field decoding
/// - **Serialization** ([`utils::byteorder`]): Little-endian field encoding
/// - **Error Handling** ([`utils::errors`]): Error types
/// - **File Sets** ([`utils::file_set`]): Ordered multi-file access
pub mod utils;
