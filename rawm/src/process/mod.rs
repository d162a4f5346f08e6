/// Footer discovery.
///
/// Provides [`locate_footer`](locate::locate_footer), which reads and
/// validates the fixed-size footer at the end of the last file.
pub mod locate;

/// Block index construction.
///
/// Provides [`build_index`](index::build_index), which maps logical frame
/// numbers to (file, offset, timestamp) across all files of a recording.
pub mod index;

/// Frame reading and block dispatch.
///
/// Provides the [`RawReader`](read::RawReader) and the
/// [`BlockHandler`](read::BlockHandler) interface it pushes blocks through.
pub mod read;

#[cfg(test)]
pub(crate) mod fixtures;
