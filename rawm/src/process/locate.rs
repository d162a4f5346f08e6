use std::io::{Read, Seek};

use log::debug;

use crate::structs::footer::{FOOTER_SIZE, Footer};
use crate::structs::headers::RawInfoHeader;
use crate::utils::errors::{FormatError, RawError};
use crate::utils::file_set::FileSet;

/// Footer of a recording together with what is derived from it.
#[derive(Debug, Clone)]
pub struct LocatedFooter {
    pub footer: Footer,
    /// Bytes per frame block.
    pub frame_size: usize,
    pub raw_info: RawInfoHeader,
}

/// Reads and validates the footer at the end of the last file.
///
/// The last stream is positioned back at its start afterwards.
pub fn locate_footer<S>(files: &mut FileSet<S>) -> Result<LocatedFooter, RawError>
where
    S: Read + Seek,
{
    let Some(last) = files.len().checked_sub(1) else {
        return Err(FormatError::EmptyFileSet.into());
    };
    let last_len = files.length(last).unwrap_or(0);

    if last_len < FOOTER_SIZE as u64 {
        return Err(FormatError::Truncated {
            read: last_len,
            expected: FOOTER_SIZE,
        }
        .into());
    }

    let mut buf = [0u8; FOOTER_SIZE];
    let read = files.read_at(last, last_len - FOOTER_SIZE as u64, &mut buf)?;
    files.rewind(last)?;

    if read != FOOTER_SIZE {
        return Err(FormatError::Truncated {
            read: read as u64,
            expected: FOOTER_SIZE,
        }
        .into());
    }

    let footer = Footer::from_bytes(&buf)?;
    footer.validate()?;

    debug!(
        "Footer: {}x{}, {} bytes/frame, {} frames declared, {:.3} fps",
        footer.x_res,
        footer.y_res,
        footer.frame_size,
        footer.frame_count,
        footer.fps()
    );

    Ok(LocatedFooter {
        frame_size: footer.frame_bytes(),
        raw_info: RawInfoHeader::from_footer(&footer),
        footer,
    })
}
