use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rawm::utils::file_set::FileSet;

/// Highest continuation chunk a camera writes (`.R99`).
const MAX_CONTINUATIONS: usize = 100;

/// `RAW` or `Rnn`, in either case.
fn is_chunk_extension(extension: &str) -> bool {
    if extension.eq_ignore_ascii_case("raw") {
        return true;
    }

    extension
        .strip_prefix(['R', 'r'])
        .is_some_and(|digits| digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Lists every chunk of the recording `input` belongs to, in order.
///
/// `input` may name any member of the set. The set starts at `NAME.RAW` and
/// continues with `NAME.R00`, `NAME.R01`, ... until the first chunk that does
/// not exist. Extensions keep the case used by `input`.
pub fn chunk_paths(input: &Path) -> Result<Vec<PathBuf>> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    if !is_chunk_extension(extension) {
        bail!(
            "{} is not a RAW recording chunk (expected .RAW or .R00-.R99)",
            input.display()
        );
    }

    let lowercase = extension.chars().all(|c| !c.is_ascii_uppercase());
    let with_extension = |ext: String| {
        if lowercase {
            input.with_extension(ext.to_ascii_lowercase())
        } else {
            input.with_extension(ext)
        }
    };

    let first = with_extension("RAW".to_string());
    if !first.is_file() {
        bail!("First chunk {} not found", first.display());
    }

    let mut paths = vec![first];
    for n in 0..MAX_CONTINUATIONS {
        let next = with_extension(format!("R{n:02}"));
        if !next.is_file() {
            break;
        }
        paths.push(next);
    }

    log::debug!("Found {} chunk(s) for {}", paths.len(), input.display());
    Ok(paths)
}

/// Opens every chunk of the recording `input` belongs to.
pub fn open_recording(input: &Path) -> Result<(Vec<PathBuf>, FileSet<File>)> {
    let paths = chunk_paths(input)?;
    let files = FileSet::open_paths(&paths)
        .with_context(|| format!("Failed to open recording {}", input.display()))?;
    Ok((paths, files))
}
