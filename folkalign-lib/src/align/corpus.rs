use std::path::Path;

use anyhow::{ensure, Context, Result};
use derive_getters::Getters;
use fgoxide::io::Io;
use itertools::Itertools;

/// 64 KB read buffer for corpus files.
pub const BUFFER_SIZE: usize = 64 * (1 << 10);

/// The reference sequences to search, each paired with the identifier at the same position.
#[derive(Clone, Debug, Default, Getters)]
pub struct Corpus {
    sequences: Vec<Vec<u8>>,
    ids: Vec<String>,
}

impl Corpus {
    /// Builds a corpus from parallel lists of sequences and identifiers, which must have the
    /// same length.
    pub fn new(sequences: Vec<Vec<u8>>, ids: Vec<String>) -> Result<Self> {
        ensure!(
            sequences.len() == ids.len(),
            "Found {} reference sequences but {} identifiers; they must correspond line by line",
            sequences.len(),
            ids.len()
        );
        Ok(Self { sequences, ids })
    }

    /// Reads a corpus from a file with one sequence per line and a file with one identifier per
    /// line.  Either file may be GZIP compressed.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(sequences: &P, ids: &Q) -> Result<Self> {
        let io = Io::new(5, BUFFER_SIZE);
        let sequences: Vec<Vec<u8>> = io
            .read_lines(sequences)
            .with_context(|| {
                format!(
                    "Error reading reference sequences: {}",
                    sequences.as_ref().display()
                )
            })?
            .into_iter()
            .map(String::into_bytes)
            .collect_vec();
        let ids = io.read_lines(ids).with_context(|| {
            format!(
                "Error reading reference identifiers: {}",
                ids.as_ref().display()
            )
        })?;
        Self::new(sequences, ids)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The sequence and identifier at the given position.
    pub fn get(&self, index: usize) -> Option<(&[u8], &str)> {
        self.sequences
            .get(index)
            .map(|sequence| (sequence.as_slice(), self.ids[index].as_str()))
    }

    /// Iterates over `(index, sequence, identifier)` in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[u8], &str)> + '_ {
        self.sequences
            .iter()
            .zip_eq(self.ids.iter())
            .enumerate()
            .map(|(index, (sequence, id))| (index, sequence.as_slice(), id.as_str()))
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Write;

    use itertools::Itertools;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::Corpus;

    #[rstest]
    fn test_mismatched_lengths_fail_fast() {
        let err = Corpus::new(vec![b"ab".to_vec(), b"cd".to_vec()], vec!["one".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("2 reference sequences but 1 identifiers"));
    }

    #[rstest]
    fn test_iter_pairs_sequences_with_ids() {
        let corpus = Corpus::new(
            vec![b"ab".to_vec(), b"".to_vec(), b"xyz".to_vec()],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        )
        .unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(
            corpus.iter().collect_vec(),
            vec![
                (0, &b"ab"[..], "a"),
                (1, &b""[..], "b"),
                (2, &b"xyz"[..], "c")
            ]
        );
        assert_eq!(corpus.get(2), Some((&b"xyz"[..], "c")));
        assert_eq!(corpus.get(3), None);
    }

    #[rstest]
    fn test_from_files_trims_line_endings() {
        let dir = TempDir::new().unwrap();
        let sequences = dir.path().join("chromatic_text.txt");
        let ids = dir.path().join("melodic_line_ids.txt");
        write!(std::fs::File::create(&sequences).unwrap(), "abc\nde\n").unwrap();
        write!(std::fs::File::create(&ids).unwrap(), "tune-1\ntune-2\n").unwrap();

        let corpus = Corpus::from_files(&sequences, &ids).unwrap();
        assert_eq!(corpus.sequences(), &vec![b"abc".to_vec(), b"de".to_vec()]);
        assert_eq!(corpus.ids(), &vec!["tune-1".to_string(), "tune-2".to_string()]);
    }

    #[rstest]
    fn test_from_files_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(Corpus::from_files(&path, &path).is_err());
    }
}
