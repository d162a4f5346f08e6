use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub fn create_progress_bar(multi: &MultiProgress, total_frames: u64) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new(total_frames));
    pb.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} frames ({percent}%)\n{msg} | elapsed: {elapsed_precise} | ETA: {eta_precise}",
    )?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("extracting");
    Ok(pb)
}
