use std::fmt;
use std::io::{Read, Seek};

use anyhow::Result;
use log::{Level, debug, trace};

use crate::log_or_err;
use crate::process::index::build_index;
use crate::process::locate::locate_footer;
use crate::structs::footer::{FOOTER_SIZE, Footer};
use crate::structs::headers::{
    BlockHeader, BlockTag, FileHeader, RawInfoHeader, VideoFrameHeader,
};
use crate::structs::xref::BlockIndex;
use crate::utils::errors::{BoundsError, FormatError, RawError, SizeError};
use crate::utils::file_set::FileSet;

/// One block pushed to a [`BlockHandler`].
///
/// `payload` borrows the reader's frame buffer and is only valid for the
/// duration of the handler call. Metadata blocks carry a zero-length payload;
/// frame blocks carry the whole frame at offset 0.
#[derive(Debug)]
pub struct Block<'a> {
    pub header: BlockHeader,
    pub payload: &'a [u8],
    pub payload_offset: usize,
    pub payload_length: usize,
}

impl<'a> Block<'a> {
    pub fn tag(&self) -> BlockTag {
        self.header.tag()
    }

    /// The payload bytes of this block.
    pub fn data(&self) -> &'a [u8] {
        &self.payload[self.payload_offset..self.payload_offset + self.payload_length]
    }
}

/// Receives every block the reader produces.
pub trait BlockHandler {
    fn handle_block(&mut self, block: &Block<'_>) -> Result<()>;
}

/// Handler that drops every block, for pull-style use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandler;

impl BlockHandler for NullHandler {
    fn handle_block(&mut self, _block: &Block<'_>) -> Result<()> {
        Ok(())
    }
}

/// Adapts a closure into a [`BlockHandler`].
pub struct FnHandler<F>(F);

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

impl<F> BlockHandler for FnHandler<F>
where
    F: FnMut(&Block<'_>) -> Result<()>,
{
    fn handle_block(&mut self, block: &Block<'_>) -> Result<()> {
        (self.0)(block)
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: FnMut(&Block<'_>) -> Result<()>,
{
    FnHandler(f)
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Diagnostics at or above this level fail the open instead of being
    /// logged.
    pub fail_level: Level,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_level: Level::Error,
        }
    }
}

/// An owned copy of one frame, produced by [`RawReader::frames`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub timestamp_ns: u64,
    pub data: Vec<u8>,
}

/// Reader for a RAWM recording split across one or more files.
///
/// Opening reads the footer, builds the block index and dispatches the
/// synthesized `MLVI` and `RAWI` blocks to the handler. Afterwards every
/// [`read_block`](Self::read_block) reads one frame into a single reused
/// buffer and dispatches it as a `VIDF` block.
///
/// # Example
///
/// ```rust,no_run
/// use rawm::process::read::{RawReader, handler_fn};
/// use rawm::utils::file_set::FileSet;
///
/// let files = FileSet::open_paths(&["M01-1234.RAW", "M01-1234.R00"])?;
/// let mut reader = RawReader::open(
///     files,
///     handler_fn(|block| {
///         println!("{} with {} payload bytes", block.tag(), block.data().len());
///         Ok(())
///     }),
/// )?;
///
/// while reader.read_next()? {}
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct RawReader<S, H> {
    /// `None` once the reader has been closed.
    files: Option<FileSet<S>>,
    footer: Footer,
    file_header: FileHeader,
    raw_info: RawInfoHeader,
    index: BlockIndex,
    frame_buffer: Vec<u8>,
    handler: H,
    current_block: usize,
}

impl<S, H> RawReader<S, H>
where
    S: Read + Seek,
    H: BlockHandler,
{
    pub fn open(files: FileSet<S>, handler: H) -> Result<Self, RawError> {
        Self::open_with_config(files, handler, &ReaderConfig::default())
    }

    /// Opens a recording, taking ownership of its streams.
    ///
    /// On failure the streams are dropped and no reader is produced.
    pub fn open_with_config(
        mut files: FileSet<S>,
        handler: H,
        config: &ReaderConfig,
    ) -> Result<Self, RawError> {
        let located = locate_footer(&mut files)?;
        let footer = located.footer;

        let index = build_index(
            files.lengths(),
            FOOTER_SIZE as u64,
            located.frame_size as u64,
            footer.source_fps_x1000 as u32,
        );

        if (index.len() as i64) < footer.frame_count as i64 {
            log_or_err!(
                config,
                Level::Warn,
                RawError::from(FormatError::FrameCountMismatch {
                    declared: footer.frame_count,
                    indexed: index.len(),
                })
            );
        } else if index.len() as i64 != footer.frame_count as i64 {
            debug!(
                "Footer declares {} frames, indexed {}",
                footer.frame_count,
                index.len()
            );
        }

        let file_header = FileHeader::synthesize(&footer, files.len(), index.len());

        let mut reader = Self {
            files: Some(files),
            footer,
            file_header,
            raw_info: located.raw_info,
            index,
            frame_buffer: vec![0; located.frame_size],
            handler,
            current_block: 0,
        };

        reader.dispatch(BlockHeader::FileHeader(reader.file_header.clone()), 0)?;
        reader.dispatch(BlockHeader::RawInfo(reader.raw_info.clone()), 0)?;

        Ok(reader)
    }

    fn dispatch(&mut self, header: BlockHeader, payload_length: usize) -> Result<(), RawError> {
        let block = Block {
            header,
            payload: &self.frame_buffer,
            payload_offset: 0,
            payload_length,
        };
        trace!("dispatching {} ({payload_length} bytes)", block.tag());

        self.handler
            .handle_block(&block)
            .map_err(RawError::Handler)
    }

    /// Reads frame `index` into the frame buffer and returns it.
    ///
    /// The returned slice is overwritten by the next read. The handler is not
    /// called.
    pub fn read_frame(&mut self, index: usize) -> Result<&[u8], RawError> {
        let Some(files) = self.files.as_mut() else {
            return Err(BoundsError::NotReady.into());
        };
        let Some(&descriptor) = self.index.get(index) else {
            return Err(BoundsError::OutOfRange {
                index,
                len: self.index.len(),
            }
            .into());
        };

        let frame_size = self.frame_buffer.len();
        let mut file = descriptor.file_index;
        let mut offset = descriptor.byte_offset;
        let mut filled = 0;

        loop {
            let available = files.length(file).unwrap_or(0).saturating_sub(offset);
            let expected = (frame_size - filled).min(available as usize);

            let read = files.read_at(file, offset, &mut self.frame_buffer[filled..])?;
            if read < expected {
                return Err(SizeError::ShortRead {
                    index,
                    file,
                    read,
                    expected,
                }
                .into());
            }
            filled += read;

            if filled >= frame_size {
                break;
            }

            // the rest of the frame is at the start of the next file;
            // an index built by build_index never runs past the last one
            file += 1;
            offset = 0;
            if file >= files.len() {
                return Err(SizeError::MissingContinuation {
                    index,
                    files: files.len(),
                    missing: frame_size - filled,
                }
                .into());
            }
            trace!("block {index} continues in file {file}");
        }

        Ok(&self.frame_buffer)
    }

    /// Reads block `index` and dispatches it to the handler as a video frame.
    pub fn read_block(&mut self, index: usize) -> Result<(), RawError> {
        self.read_frame(index)?;

        let frame_size = self.frame_buffer.len();
        let header = VideoFrameHeader::for_block(index, &self.index[index], frame_size);
        self.dispatch(BlockHeader::VideoFrame(header), frame_size)
    }

    /// Reads the block at the cursor and advances it.
    ///
    /// Returns `Ok(false)` once the cursor is past the last block.
    pub fn read_next(&mut self) -> Result<bool, RawError> {
        if !self.is_ready() {
            return Err(BoundsError::NotReady.into());
        }
        if self.current_block >= self.index.len() {
            return Ok(false);
        }

        self.read_block(self.current_block)?;
        self.current_block += 1;
        Ok(true)
    }

    /// Owned copies of every frame from the start, without involving the
    /// handler.
    pub fn frames(&mut self) -> Frames<'_, S, H> {
        Frames {
            reader: self,
            next: 0,
        }
    }
}

impl<S, H> RawReader<S, H> {
    pub fn is_ready(&self) -> bool {
        self.files.is_some()
    }

    /// Releases the underlying streams. Later reads fail with
    /// [`BoundsError::NotReady`].
    pub fn close(&mut self) {
        if self.files.take().is_some() {
            debug!("Closed recording");
        }
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    pub fn file_header(&self) -> &FileHeader {
        &self.file_header
    }

    pub fn raw_info(&self) -> &RawInfoHeader {
        &self.raw_info
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    pub fn frame_size(&self) -> usize {
        self.frame_buffer.len()
    }

    pub fn block_count(&self) -> usize {
        self.index.len()
    }

    pub fn current_block(&self) -> usize {
        self.current_block
    }

    /// Moves the cursor. Range is checked on the next read.
    pub fn set_current_block(&mut self, block: usize) {
        self.current_block = block;
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

/// Iterator over owned frame copies. See [`RawReader::frames`].
pub struct Frames<'r, S, H> {
    reader: &'r mut RawReader<S, H>,
    next: usize,
}

impl<S, H> Iterator for Frames<'_, S, H>
where
    S: Read + Seek,
    H: BlockHandler,
{
    type Item = Result<Frame, RawError>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        let timestamp_ns = self.reader.index.get(index)?.timestamp_ns;
        self.next += 1;

        Some(self.reader.read_frame(index).map(|data| Frame {
            index,
            timestamp_ns,
            data: data.to_vec(),
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.reader.index.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}
