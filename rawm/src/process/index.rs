use log::{debug, trace, warn};

use crate::structs::xref::{BlockDescriptor, BlockIndex};

const NANOS_PER_SECOND_X1000: u128 = 1_000_000_000_000;

/// Presentation time of frame `n` at `fps_x1000 / 1000` frames per second.
///
/// Integer arithmetic, so the result is exact whenever `10^12` is divisible
/// by `fps_x1000` and never decreases as `n` grows.
pub fn frame_timestamp_ns(n: u64, fps_x1000: u32) -> u64 {
    if fps_x1000 == 0 {
        return 0;
    }
    (n as u128 * NANOS_PER_SECOND_X1000 / fps_x1000 as u128) as u64
}

/// Walks fixed-size frames across the files of a recording.
///
/// `lengths` are the physical file lengths; the last `footer_size` bytes of
/// the last file are the footer and never belong to a frame. Frames are laid
/// out back to back starting at file 0 offset 0 and may cross file
/// boundaries. A trailing remainder shorter than `frame_size` is not indexed.
pub fn build_index(
    lengths: &[u64],
    footer_size: u64,
    frame_size: u64,
    fps_x1000: u32,
) -> BlockIndex {
    let Some(last) = lengths.len().checked_sub(1) else {
        return BlockIndex::default();
    };
    if frame_size == 0 {
        return BlockIndex::default();
    }

    let payload = lengths.iter().sum::<u64>().saturating_sub(footer_size);

    let mut entries = Vec::with_capacity((payload / frame_size) as usize);
    let mut file_index = 0;
    let mut offset = 0u64;
    let mut consumed = 0u64;
    let mut n = 0u64;

    loop {
        // A frame ending exactly on a boundary puts the next one at offset 0
        // of the following file.
        while file_index < last && offset >= lengths[file_index] {
            offset -= lengths[file_index];
            file_index += 1;
        }

        if payload - consumed < frame_size {
            break;
        }

        let entry = BlockDescriptor {
            file_index,
            byte_offset: offset,
            timestamp_ns: frame_timestamp_ns(n, fps_x1000),
        };
        trace!("block {n}: {entry:?}");
        entries.push(entry);

        offset += frame_size;
        consumed += frame_size;
        n += 1;
    }

    let trailing = payload - consumed;
    if trailing > 0 {
        warn!("Ignoring {trailing} trailing bytes before the footer");
    }

    debug!(
        "Indexed {} blocks across {} files",
        entries.len(),
        lengths.len()
    );

    BlockIndex::from_ordered(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER: u64 = 192;

    fn starts(index: &BlockIndex) -> Vec<(usize, u64)> {
        index
            .iter()
            .map(|entry| (entry.file_index, entry.byte_offset))
            .collect()
    }

    #[test]
    fn frame_straddling_two_files() {
        let index = build_index(&[250, 150 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(starts(&index), vec![(0, 0), (0, 100), (0, 200), (1, 50)]);
    }

    #[test]
    fn frame_ending_on_file_boundary() {
        let index = build_index(&[200, 200 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(starts(&index), vec![(0, 0), (0, 100), (1, 0), (1, 100)]);
    }

    #[test]
    fn count_accounts_for_every_payload_byte() {
        let lengths = [1000, 730, 470 + FOOTER];
        let index = build_index(&lengths, FOOTER, 100, 25_000);

        assert_eq!(
            index.len() as u64 * 100 + FOOTER,
            lengths.iter().sum::<u64>()
        );
    }

    #[test]
    fn partial_frame_before_footer_is_dropped() {
        let index = build_index(&[250, 120 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(starts(&index), vec![(0, 0), (0, 100), (0, 200)]);
    }

    #[test]
    fn frame_spanning_a_short_middle_file() {
        let index = build_index(&[150, 30, 120 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(starts(&index), vec![(0, 0), (0, 100), (2, 20)]);
    }

    #[test]
    fn empty_files_are_skipped() {
        let index = build_index(&[100, 0, 100 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(starts(&index), vec![(0, 0), (2, 0)]);
    }

    #[test]
    fn too_small_for_one_frame() {
        let index = build_index(&[50 + FOOTER], FOOTER, 100, 25_000);
        assert!(index.is_empty());

        assert!(build_index(&[], FOOTER, 100, 25_000).is_empty());
    }

    #[test]
    fn timestamps_advance_by_frame_duration() {
        let index = build_index(&[1000 + FOOTER], FOOTER, 100, 25_000);

        assert_eq!(index.len(), 10);
        for pair in index.as_slice().windows(2) {
            assert_eq!(pair[1].timestamp_ns - pair[0].timestamp_ns, 40_000_000);
        }
    }

    #[test]
    fn timestamps_never_decrease_at_fractional_rates() {
        let index = build_index(&[100_000 + FOOTER], FOOTER, 100, 23_976);

        assert_eq!(index[1].timestamp_ns, 41_708_375);
        assert!(
            index
                .as_slice()
                .windows(2)
                .all(|w| w[0].timestamp_ns <= w[1].timestamp_ns)
        );
    }
}
