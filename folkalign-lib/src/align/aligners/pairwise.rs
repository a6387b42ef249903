use anyhow::Result;
use flume::Receiver;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::align::{
    aligners::{global::GlobalAligner, run_workers},
    corpus::Corpus,
    cost_model::CostModel,
};

/// The global alignment distance between two references of a corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDistance {
    /// The identifier of the earlier reference in the corpus.
    pub first_id: String,
    /// The identifier of the later reference in the corpus.
    pub second_id: String,
    pub distance: f32,
}

/// Computes the distance between every pair of references in a corpus.
///
/// Each unordered pair is aligned once, with the earlier reference first.  Rows of the
/// upper-triangular distance matrix are handed out to worker threads when more than one thread
/// is used, and gathered back in row order, so the output does not depend on the number of
/// threads.
pub struct PairwiseAligner<'a> {
    cost_model: &'a CostModel,
    global: GlobalAligner<'a>,
    threads: usize,
}

impl<'a> PairwiseAligner<'a> {
    pub(crate) fn new(
        cost_model: &'a CostModel,
        global: GlobalAligner<'a>,
        threads: usize,
    ) -> Self {
        Self {
            cost_model,
            global,
            threads,
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the distance of every pair `(i, j)` with `i < j`, ordered by `i` then `j`.
    pub fn distances(&mut self, corpus: &Corpus) -> Result<Vec<PairwiseDistance>> {
        let n = corpus.len();
        debug!(
            "Computing {} pairwise distances between {} references using {} thread(s)",
            n * n.saturating_sub(1) / 2,
            n,
            self.threads
        );
        if self.threads <= 1 || n < 3 {
            Ok((0..n)
                .flat_map(|i| distances_from(&mut self.global, corpus, i))
                .collect_vec())
        } else {
            self.distances_parallel(corpus)
        }
    }

    fn distances_parallel(&self, corpus: &Corpus) -> Result<Vec<PairwiseDistance>> {
        let cost_model = self.cost_model;
        let rows = run_workers(self.threads, 0..corpus.len(), |row_rx: Receiver<usize>| {
            let mut global = GlobalAligner::new(cost_model)?;
            Ok(row_rx
                .iter()
                .map(|i| (i, distances_from(&mut global, corpus, i)))
                .collect_vec())
        })?;
        Ok(rows
            .into_iter()
            .sorted_by_key(|(i, _)| *i)
            .flat_map(|(_, row)| row)
            .collect_vec())
    }
}

/// The distances from reference `i` to every later reference.
fn distances_from(
    global: &mut GlobalAligner<'_>,
    corpus: &Corpus,
    i: usize,
) -> Vec<PairwiseDistance> {
    let sequences = corpus.sequences();
    let ids = corpus.ids();
    ((i + 1)..corpus.len())
        .map(|j| PairwiseDistance {
            first_id: ids[i].clone(),
            second_id: ids[j].clone(),
            distance: global.distance(&sequences[i], &sequences[j]),
        })
        .collect_vec()
}

#[cfg(test)]
pub mod tests {
    use itertools::Itertools;
    use rstest::rstest;

    use super::PairwiseDistance;
    use crate::align::{
        aligners::{constants::CostKind, Builder},
        corpus::Corpus,
        cost_model::CostModel,
    };

    /// A distance model over `a..=e` where symbols are one unit apart.
    fn model() -> CostModel {
        let values = (b'a'..=b'e')
            .enumerate()
            .map(|(i, symbol)| (i as f64, symbol))
            .collect::<Vec<_>>();
        CostModel::from_symbol_values(&values, CostKind::Distance)
    }

    fn corpus(sequences: &[&str]) -> Corpus {
        Corpus::new(
            sequences.iter().map(|s| s.as_bytes().to_vec()).collect_vec(),
            (0..sequences.len()).map(|i| format!("line-{i}")).collect_vec(),
        )
        .unwrap()
    }

    fn distance(first: usize, second: usize, distance: f32) -> PairwiseDistance {
        PairwiseDistance {
            first_id: format!("line-{first}"),
            second_id: format!("line-{second}"),
            distance,
        }
    }

    #[rstest]
    fn test_every_pair_once_in_order() {
        let model = model();
        let corpus = corpus(&["abc", "abd", "", "abc"]);
        let mut aligner = Builder::default().build_pairwise_aligner(&model).unwrap();
        assert_eq!(
            aligner.distances(&corpus).unwrap(),
            vec![
                distance(0, 1, 1.0),
                distance(0, 2, 3.0),
                distance(0, 3, 0.0),
                distance(1, 2, 3.0),
                distance(1, 3, 1.0),
                distance(2, 3, 3.0),
            ]
        );
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    #[case(0)]
    fn test_parallel_matches_sequential(#[case] threads: usize) {
        let model = model();
        let sequences = (0..60)
            .map(|i| {
                (0..(i * 5) % 13)
                    .map(|j| (b'a' + ((i + j * 2) % 6) as u8) as char)
                    .collect::<String>()
            })
            .collect_vec();
        let corpus = corpus(&sequences.iter().map(String::as_str).collect_vec());

        let mut sequential = Builder::default()
            .threads(1)
            .build_pairwise_aligner(&model)
            .unwrap();
        let expected = sequential.distances(&corpus).unwrap();
        assert_eq!(expected.len(), 60 * 59 / 2);

        let mut parallel = Builder::default()
            .threads(threads)
            .build_pairwise_aligner(&model)
            .unwrap();
        assert_eq!(parallel.distances(&corpus).unwrap(), expected);
    }

    #[rstest]
    #[case(&[])]
    #[case(&["abc"])]
    fn test_fewer_than_two_references(#[case] sequences: &[&str]) {
        let model = model();
        let mut aligner = Builder::default()
            .threads(4)
            .build_pairwise_aligner(&model)
            .unwrap();
        assert!(aligner.distances(&corpus(sequences)).unwrap().is_empty());
    }

    #[rstest]
    fn test_rejects_similarity_model() {
        let model = CostModel::new(CostKind::Similarity);
        assert!(Builder::default().build_pairwise_aligner(&model).is_err());
    }
}
