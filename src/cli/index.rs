use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rawm::process::read::{NullHandler, RawReader, ReaderConfig};
use serde::Serialize;

use super::command::{Cli, IndexArgs};
use crate::input::open_recording;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexDocument {
    width: i16,
    height: i16,
    frame_size: usize,
    fps_x1000: i32,
    frames_declared: i32,
    files: Vec<FileEntry>,
    blocks: Vec<BlockEntry>,
}

#[derive(Debug, Serialize)]
struct FileEntry {
    path: String,
    length: u64,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockEntry {
    block: usize,
    file: usize,
    offset: u64,
    timestamp_ns: u64,
}

fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> PathBuf {
    match base_path.extension() {
        Some(ext) if ext == expected_ext => base_path.to_path_buf(),
        Some(_) => {
            let mut name = base_path.as_os_str().to_owned();
            name.push(".");
            name.push(expected_ext);
            PathBuf::from(name)
        }
        None => base_path.with_extension(expected_ext),
    }
}

fn build_document<S: Read + Seek>(
    paths: &[PathBuf],
    lengths: &[u64],
    reader: &RawReader<S, NullHandler>,
) -> IndexDocument {
    let footer = reader.footer();

    IndexDocument {
        width: footer.x_res,
        height: footer.y_res,
        frame_size: reader.frame_size(),
        fps_x1000: footer.source_fps_x1000,
        frames_declared: footer.frame_count,
        files: paths
            .iter()
            .zip(lengths)
            .map(|(path, &length)| FileEntry {
                path: path.display().to_string(),
                length,
            })
            .collect(),
        blocks: reader
            .index()
            .iter()
            .enumerate()
            .map(|(block, entry)| BlockEntry {
                block,
                file: entry.file_index,
                offset: entry.byte_offset,
                timestamp_ns: entry.timestamp_ns,
            })
            .collect(),
    }
}

pub fn cmd_index(args: &IndexArgs, cli: &Cli) -> Result<()> {
    let (paths, files) = open_recording(&args.input)?;
    let lengths = files.lengths().to_vec();
    let config = ReaderConfig {
        fail_level: cli.fail_level(),
    };
    let reader = RawReader::open_with_config(files, NullHandler, &config)?;

    let document = build_document(&paths, &lengths, &reader);
    let yaml = serde_yaml_ng::to_string(&document)?;

    match &args.output {
        Some(output) => {
            let path = create_path_with_extension(output, "yaml");
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(yaml.as_bytes())?;
            writer.flush()?;
            log::info!(
                "Wrote {} blocks to {}",
                document.blocks.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(yaml.as_bytes())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawm::structs::footer::{FOOTER_MAGIC, Footer};
    use rawm::utils::file_set::FileSet;
    use std::io::Cursor;

    fn footer() -> Footer {
        Footer {
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
        }
    }

    #[test]
    fn document_lists_every_block() {
        let mut last = vec![0u8; 150];
        last.extend_from_slice(&footer().to_bytes());
        let files = FileSet::new(vec![Cursor::new(vec![0u8; 250]), Cursor::new(last)]).unwrap();
        let lengths = files.lengths().to_vec();
        let reader = RawReader::open(files, NullHandler).unwrap();
        let paths = [PathBuf::from("A.RAW"), PathBuf::from("A.R00")];

        let document = build_document(&paths, &lengths, &reader);

        assert_eq!(document.files.len(), 2);
        assert_eq!(document.files[1].length, 342);
        assert_eq!(document.blocks.len(), 4);
        assert_eq!(
            document.blocks[3],
            BlockEntry {
                block: 3,
                file: 1,
                offset: 50,
                timestamp_ns: 120_000_000,
            }
        );

        let yaml = serde_yaml_ng::to_string(&document).unwrap();
        assert!(yaml.contains("fpsX1000: 25000"));
        assert!(yaml.contains("timestampNs: 120000000"));
    }

    #[test]
    fn output_extension() {
        assert_eq!(
            create_path_with_extension(Path::new("out"), "yaml"),
            PathBuf::from("out.yaml")
        );
        assert_eq!(
            create_path_with_extension(Path::new("out.yaml"), "yaml"),
            PathBuf::from("out.yaml")
        );
        assert_eq!(
            create_path_with_extension(Path::new("clip.v1"), "yaml"),
            PathBuf::from("clip.v1.yaml")
        );
    }
}
