use std::io;

#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

/// Footer or layout problems detected while opening a recording.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("No files were supplied for the recording")]
    EmptyFileSet,

    #[error("Footer truncated: only {read} of {expected} bytes available")]
    Truncated { read: u64, expected: usize },

    #[error("Invalid footer magic. Read \"{}\", expected \"RAWM\"", .0.escape_ascii())]
    InvalidMagic([u8; 4]),

    #[error("Invalid {expected} block type. Read \"{}\"", .read.escape_ascii())]
    InvalidBlockType {
        expected: &'static str,
        read: [u8; 4],
    },

    #[error("frameSize must be positive. Read {0}")]
    InvalidFrameSize(i32),

    #[error("sourceFpsx1000 must be positive. Read {0}")]
    InvalidFrameRate(i32),

    #[error("Footer declares {declared} frames but only {indexed} were found")]
    FrameCountMismatch { declared: i32, indexed: usize },

    #[error("Malformed layout: {0}")]
    Layout(#[from] io::Error),
}

/// A frame could not be read in full.
#[derive(thiserror::Error, Debug)]
pub enum SizeError {
    #[error("Frame {index}: file {file} supplied {read} of {expected} bytes")]
    ShortRead {
        index: usize,
        file: usize,
        read: usize,
        expected: usize,
    },

    #[error("Frame {index} continues past the last file ({files} files, {missing} bytes missing)")]
    MissingContinuation {
        index: usize,
        files: usize,
        missing: usize,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum BoundsError {
    #[error("Block {index} is out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("Reader is not ready")]
    NotReady,
}

#[derive(thiserror::Error, Debug)]
pub enum RawError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Size(#[from] SizeError),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Block handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}
