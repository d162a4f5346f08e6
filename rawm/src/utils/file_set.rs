use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use log::trace;

/// The physical files of one recording, in order.
///
/// Lengths are measured once when the set is created. The set only needs
/// random-access reads, so any `Read + Seek` stream works, which lets tests
/// use in-memory cursors.
#[derive(Debug)]
pub struct FileSet<S> {
    streams: Vec<S>,
    lengths: Vec<u64>,
}

impl<S> FileSet<S>
where
    S: Read + Seek,
{
    /// Takes ownership of `streams` and records their lengths.
    ///
    /// Each stream is left positioned at its start.
    pub fn new(mut streams: Vec<S>) -> io::Result<Self> {
        let mut lengths = Vec::with_capacity(streams.len());
        for stream in streams.iter_mut() {
            let len = stream.seek(SeekFrom::End(0))?;
            stream.rewind()?;
            lengths.push(len);
        }

        Ok(Self { streams, lengths })
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    pub fn length(&self, file: usize) -> Option<u64> {
        self.lengths.get(file).copied()
    }

    pub fn total_len(&self) -> u64 {
        self.lengths.iter().sum()
    }

    /// Seeks `file` to `offset` and reads until `buf` is full or the file
    /// ends. Returns the number of bytes read.
    pub fn read_at(&mut self, file: usize, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let stream = self.streams.get_mut(file).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file {file} is not part of the set"),
            )
        })?;

        stream.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match stream.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        trace!("read {filled} bytes from file {file} at offset {offset}");

        Ok(filled)
    }

    /// Positions `file` back at its start.
    pub fn rewind(&mut self, file: usize) -> io::Result<()> {
        match self.streams.get_mut(file) {
            Some(stream) => stream.rewind(),
            None => Ok(()),
        }
    }
}

impl FileSet<File> {
    /// Opens every path in order.
    pub fn open_paths<P: AsRef<Path>>(paths: &[P]) -> io::Result<Self> {
        let files = paths
            .iter()
            .map(|path| File::open(path))
            .collect::<io::Result<Vec<_>>>()?;

        Self::new(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn set_of(lengths: &[usize]) -> FileSet<Cursor<Vec<u8>>> {
        let streams = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| Cursor::new(vec![i as u8; len]))
            .collect();
        FileSet::new(streams).unwrap()
    }

    #[test]
    fn measures_lengths() {
        let set = set_of(&[10, 0, 7]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.lengths(), &[10, 0, 7]);
        assert_eq!(set.length(2), Some(7));
        assert_eq!(set.length(3), None);
        assert_eq!(set.total_len(), 17);
    }

    #[test]
    fn read_at_stops_at_end_of_file() {
        let mut set = set_of(&[10, 4]);
        let mut buf = [0xAAu8; 6];

        assert_eq!(set.read_at(0, 7, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[0, 0, 0]);

        assert_eq!(set.read_at(1, 0, &mut buf[3..]).unwrap(), 3);
        assert_eq!(&buf, &[0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn read_at_unknown_file_fails() {
        let mut set = set_of(&[1]);
        let mut buf = [0u8; 1];

        let err = set.read_at(1, 0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
