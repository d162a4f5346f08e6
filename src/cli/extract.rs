use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use indicatif::{MultiProgress, ProgressBar};
use rawm::process::read::{Block, BlockHandler, RawReader, ReaderConfig};
use rawm::structs::headers::{BlockHeader, MetadataBlock};

use super::command::{Cli, ExtractArgs};
use super::progress::create_progress_bar;
use crate::input::open_recording;

/// Writes each dispatched block to its own file under `output_path`.
struct FrameWriter {
    output_path: PathBuf,
    write_headers: bool,
    frames_written: usize,
    bytes_written: u64,
    pb: Option<ProgressBar>,
}

impl FrameWriter {
    fn new(output_path: &Path, write_headers: bool) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
            write_headers,
            frames_written: 0,
            bytes_written: 0,
            pb: None,
        }
    }

    fn write_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.output_path.join(name);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(data)?;
        writer.flush()?;

        self.bytes_written += data.len() as u64;
        log::trace!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    fn write_header(&mut self, name: &str, header: &dyn MetadataBlock) -> Result<()> {
        if self.write_headers {
            self.write_file(name, &header.block_bytes())?;
        }
        Ok(())
    }
}

impl BlockHandler for FrameWriter {
    fn handle_block(&mut self, block: &Block<'_>) -> Result<()> {
        let BlockHeader::VideoFrame(header) = &block.header else {
            let name = format!("header.{}", block.tag().to_string().to_ascii_lowercase());
            return self.write_header(&name, block.header.as_metadata_block());
        };

        let name = format!("frame_{:06}.raw", header.frame_number);
        self.write_file(&name, block.data())?;
        self.frames_written += 1;
        if let Some(ref pb) = self.pb {
            pb.inc(1);
        }
        Ok(())
    }
}

/// Frame range `[first, first + count)` clipped to `total` blocks.
fn frame_range(first: usize, count: Option<usize>, total: usize) -> Result<(usize, usize)> {
    if first >= total {
        bail!("First frame {first} is out of range ({total} frames)");
    }
    let end = match count {
        Some(count) => first.saturating_add(count).min(total),
        None => total,
    };
    Ok((first, end))
}

pub fn cmd_extract(args: &ExtractArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    fs::create_dir_all(&args.output_path).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_path.display()
        )
    })?;

    let (_, files) = open_recording(&args.input)?;
    let config = ReaderConfig {
        fail_level: cli.fail_level(),
    };
    let handler = FrameWriter::new(&args.output_path, args.headers);
    let mut reader = RawReader::open_with_config(files, handler, &config)?;

    let (first, end) = frame_range(args.first, args.count, reader.block_count())?;
    log::info!(
        "Extracting frames {first}..{end} to {}",
        args.output_path.display()
    );

    if let Some(multi) = multi {
        reader.handler_mut().pb = Some(create_progress_bar(multi, (end - first) as u64)?);
    }

    reader.set_current_block(first);
    while reader.current_block() < end && reader.read_next()? {}
    reader.close();

    let writer = reader.into_handler();
    if let Some(pb) = writer.pb {
        pb.finish_and_clear();
    }
    log::info!(
        "Wrote {} frames ({} bytes)",
        writer.frames_written,
        writer.bytes_written
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawm::structs::footer::{FOOTER_MAGIC, Footer};
    use rawm::structs::headers::FILE_HEADER_SIZE;
    use rawm::utils::file_set::FileSet;
    use std::io::Cursor;

    #[test]
    fn range_is_clipped() {
        assert_eq!(frame_range(0, None, 10).unwrap(), (0, 10));
        assert_eq!(frame_range(4, Some(3), 10).unwrap(), (4, 7));
        assert_eq!(frame_range(8, Some(5), 10).unwrap(), (8, 10));
        assert!(frame_range(10, None, 10).is_err());
    }

    #[test]
    fn writes_frames_and_headers() {
        let footer = Footer {
            magic: FOOTER_MAGIC,
            x_res: 64,
            y_res: 32,
            frame_size: 100,
            frame_count: 4,
            frame_skip: 1,
            source_fps_x1000: 25_000,
            reserved3: 0,
            reserved4: 0,
            raw_info: Default::default(),
        };
        let first: Vec<u8> = (0..250u32).map(|i| i as u8).collect();
        let mut last: Vec<u8> = (250..400u32).map(|i| i as u8).collect();
        last.extend_from_slice(&footer.to_bytes());
        let files = FileSet::new(vec![Cursor::new(first), Cursor::new(last)]).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let handler = FrameWriter::new(dir.path(), true);
        let mut reader = RawReader::open_with_config(files, handler, &ReaderConfig::default())
            .unwrap();

        reader.set_current_block(2);
        while reader.read_next().unwrap() {}
        let writer = reader.into_handler();

        assert_eq!(writer.frames_written, 2);
        assert!(!dir.path().join("frame_000001.raw").exists());

        let straddling = fs::read(dir.path().join("frame_000002.raw")).unwrap();
        let expected: Vec<u8> = (200..300u32).map(|i| i as u8).collect();
        assert_eq!(straddling, expected);

        let mlvi = fs::read(dir.path().join("header.mlvi")).unwrap();
        assert_eq!(mlvi.len(), FILE_HEADER_SIZE);
        assert_eq!(&mlvi[..4], b"MLVI");
        assert_eq!(&fs::read(dir.path().join("header.rawi")).unwrap()[..4], b"RAWI");
    }
}
