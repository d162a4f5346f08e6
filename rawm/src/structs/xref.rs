//! Block index entries.

use std::ops::Index;

/// Physical location of one frame.
///
/// Only the start is recorded. A frame that runs past the end of
/// `file_index` continues at offset 0 of the following file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub file_index: usize,
    pub byte_offset: u64,
    pub timestamp_ns: u64,
}

/// Ordered block descriptors; position is the logical frame number.
///
/// Timestamps never decrease along the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockIndex {
    entries: Vec<BlockDescriptor>,
}

impl BlockIndex {
    pub(crate) fn from_ordered(entries: Vec<BlockDescriptor>) -> Self {
        debug_assert!(
            entries
                .windows(2)
                .all(|w| w[0].timestamp_ns <= w[1].timestamp_ns)
        );
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BlockDescriptor> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockDescriptor> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[BlockDescriptor] {
        &self.entries
    }

    /// First block at or after `timestamp_ns`, if any.
    pub fn position_at(&self, timestamp_ns: u64) -> Option<usize> {
        let pos = self
            .entries
            .partition_point(|entry| entry.timestamp_ns < timestamp_ns);
        (pos < self.entries.len()).then_some(pos)
    }
}

impl Index<usize> for BlockIndex {
    type Output = BlockDescriptor;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a BlockIndex {
    type Item = &'a BlockDescriptor;
    type IntoIter = std::slice::Iter<'a, BlockDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[test]
fn position_at_finds_first_block_not_before_timestamp() {
    let index = BlockIndex::from_ordered(
        (0..4)
            .map(|n| BlockDescriptor {
                file_index: 0,
                byte_offset: n * 100,
                timestamp_ns: n * 40_000_000,
            })
            .collect(),
    );

    assert_eq!(index.position_at(0), Some(0));
    assert_eq!(index.position_at(40_000_000), Some(1));
    assert_eq!(index.position_at(40_000_001), Some(2));
    assert_eq!(index.position_at(120_000_000), Some(3));
    assert_eq!(index.position_at(120_000_001), None);
}
