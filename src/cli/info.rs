use std::fs::File;
use std::path::PathBuf;

use anyhow::Result;
use rawm::process::read::{NullHandler, RawReader, ReaderConfig};
use rawm::structs::raw_info::RawInfo;

use super::command::{Cli, InfoArgs};
use crate::input::open_recording;
use crate::timestamp::{ns_str, time_str};

pub fn cmd_info(args: &InfoArgs, cli: &Cli) -> Result<()> {
    log::info!("Analyzing RAW recording: {}", args.input.display());

    let (paths, files) = open_recording(&args.input)?;
    let lengths = files.lengths().to_vec();
    let config = ReaderConfig {
        fail_level: cli.fail_level(),
    };
    let reader = RawReader::open_with_config(files, NullHandler, &config)?;

    println!();
    println!("RAW Recording Information");
    println!("=========================");
    println!();

    display_files(&paths, &lengths);
    display_video_info(&reader);
    display_sensor_info(&reader.raw_info().raw_info);

    Ok(())
}

fn display_files(paths: &[PathBuf], lengths: &[u64]) {
    println!("Files");
    for (path, length) in paths.iter().zip(lengths) {
        println!("  {:<26}{length} bytes", path.display().to_string());
    }
    println!();
}

fn display_video_info(reader: &RawReader<File, NullHandler>) {
    let footer = reader.footer();
    let indexed = reader.block_count();

    println!("Video Information");
    println!("  Resolution                {}x{}", footer.x_res, footer.y_res);
    println!("  Frame size                {} bytes", reader.frame_size());
    println!("  Frame rate                {:.3} fps", footer.fps());
    println!("  Frame skip                {}", footer.frame_skip);
    println!("  Frames declared           {}", footer.frame_count);
    println!("  Frames indexed            {indexed}");

    let duration = indexed as f64 / footer.fps();
    println!("  Duration                  {}", time_str(duration));
    if let Some(last) = reader.index().as_slice().last() {
        println!("  Last frame at             {}", ns_str(last.timestamp_ns));
    }
    println!();
}

fn display_sensor_info(info: &RawInfo) {
    println!("Sensor Information");
    println!("  Buffer                    {}x{}", info.width, info.height);
    println!("  Pitch                     {} bytes", info.pitch);
    println!("  Bits per pixel            {}", info.bits_per_pixel);
    println!("  Black level               {}", info.black_level);
    println!("  White level               {}", info.white_level);

    let area = &info.active_area;
    println!(
        "  Active area               {}x{} at ({}, {})",
        area.width(),
        area.height(),
        area.x1,
        area.y1
    );
    println!("  CFA pattern               {:08X}", info.cfa_pattern);
    println!("  Dynamic range             {:.2} EV", info.dynamic_range as f64 / 100.0);

    let matrix = info
        .color_matrix()
        .iter()
        .map(|&(num, den)| {
            if den == 0 {
                "0".to_string()
            } else {
                format!("{:.4}", num as f64 / den as f64)
            }
        })
        .collect::<Vec<_>>();
    for (row, values) in matrix.chunks(3).enumerate() {
        let label = if row == 0 { "Color matrix" } else { "" };
        println!("  {label:<26}{}", values.join("  "));
    }
    println!();
}
