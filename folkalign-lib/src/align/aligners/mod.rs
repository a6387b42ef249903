pub mod constants;
pub mod global;
pub mod local;
pub mod pairwise;

use std::ops::Range;

use anyhow::{ensure, Result};
use derive_builder::Builder;
use flume::Receiver;
use itertools::Itertools;
use log::debug;

use crate::{
    align::{
        aligners::{
            constants::{DEFAULT_TOP_K, REFERENCES_PER_CHUNK, WORK_CHANNEL_NUM_CHUNKS},
            global::GlobalAligner,
            local::LocalAligner,
            pairwise::PairwiseAligner,
        },
        alignment::AlignmentResult,
        corpus::Corpus,
        cost_model::CostModel,
        top_k::TopKSelector,
    },
    util::NUM_CPU,
};

#[derive(Copy, Clone, Debug, Builder)]
#[builder(name = "Builder", build_fn(name = "build_options"))]
pub struct Options {
    #[builder(default = "DEFAULT_TOP_K")]
    top_k: usize,
    /// Zero uses every available CPU.
    #[builder(default = "1")]
    threads: usize,
}

impl Options {
    fn num_threads(&self) -> usize {
        if self.threads == 0 {
            *NUM_CPU
        } else {
            self.threads
        }
    }
}

impl Builder {
    /// Builds the aligners used to search a corpus with the given similarity model.
    pub fn build_aligners<'a>(&self, cost_model: &'a CostModel) -> Result<Aligners<'a>> {
        let opts = self.build_options()?;
        ensure!(opts.top_k > 0, "top_k must be greater than zero");
        Ok(Aligners {
            cost_model,
            local: LocalAligner::new(cost_model)?,
            top_k: opts.top_k,
            threads: opts.num_threads(),
        })
    }

    /// Builds the aligner used to compute the distance between every pair of references with the
    /// given distance model.  Only the number of threads applies.
    pub fn build_pairwise_aligner<'a>(
        &self,
        cost_model: &'a CostModel,
    ) -> Result<PairwiseAligner<'a>> {
        let opts = self.build_options()?;
        Ok(PairwiseAligner::new(
            cost_model,
            GlobalAligner::new(cost_model)?,
            opts.num_threads(),
        ))
    }
}

/// Searches a corpus of references for the best local alignments of a query.
pub struct Aligners<'a> {
    cost_model: &'a CostModel,
    local: LocalAligner<'a>,
    top_k: usize,
    threads: usize,
}

impl<'a> Aligners<'a> {
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Aligns the query against every reference in the corpus and returns the best results in
    /// descending order of score.  References whose best alignment does not score above zero are
    /// never reported, and equal scores are reported in corpus order.  The results do not depend
    /// on the number of threads.
    pub fn search(&mut self, query: &[u8], corpus: &Corpus) -> Result<Vec<AlignmentResult>> {
        debug!(
            "Searching {} references with a query of length {} using {} thread(s)",
            corpus.len(),
            query.len(),
            self.threads
        );
        if self.threads <= 1 || corpus.len() <= REFERENCES_PER_CHUNK {
            Ok(self.search_sequential(query, corpus))
        } else {
            self.search_parallel(query, corpus)
        }
    }

    fn search_sequential(&mut self, query: &[u8], corpus: &Corpus) -> Vec<AlignmentResult> {
        let mut selector = TopKSelector::new(self.top_k);
        for (index, reference, id) in corpus.iter() {
            if let Some(hit) = self.local.align(query, reference) {
                selector.offer(hit.into_result(id, index));
            }
        }
        selector.into_results()
    }

    /// Each worker keeps its own best `top_k`, which must contain every one of its references
    /// that belongs in the overall best `top_k`.  Re-offering the candidates in corpus order
    /// gives the same ties as the sequential scan.
    fn search_parallel(&self, query: &[u8], corpus: &Corpus) -> Result<Vec<AlignmentResult>> {
        let cost_model = self.cost_model;
        let top_k = self.top_k;
        let chunks = (0..corpus.len())
            .step_by(REFERENCES_PER_CHUNK)
            .map(|start| start..(start + REFERENCES_PER_CHUNK).min(corpus.len()));

        let candidates = run_workers(self.threads, chunks, |chunk_rx: Receiver<Range<usize>>| {
            let mut local = LocalAligner::new(cost_model)?;
            let mut selector = TopKSelector::new(top_k);
            for chunk in chunk_rx.iter() {
                for index in chunk {
                    if let Some((reference, id)) = corpus.get(index) {
                        if let Some(hit) = local.align(query, reference) {
                            selector.offer(hit.into_result(id, index));
                        }
                    }
                }
            }
            Ok(selector.into_results())
        })?;

        let mut selector = TopKSelector::new(self.top_k);
        for candidate in candidates
            .into_iter()
            .sorted_by_key(|candidate| candidate.reference_index)
        {
            selector.offer(candidate);
        }
        Ok(selector.into_results())
    }
}

/// Sends each unit of work over a bounded channel to `threads` scoped workers and collects what
/// they return, in no particular order.  A worker that fails or panics fails the whole run.
pub(crate) fn run_workers<T, R, F>(
    threads: usize,
    work: impl Iterator<Item = T>,
    worker: F,
) -> Result<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(Receiver<T>) -> Result<Vec<R>> + Sync,
{
    let (work_tx, work_rx) = flume::bounded::<T>(WORK_CHANNEL_NUM_CHUNKS * threads);
    std::thread::scope(|scope| {
        let worker = &worker;
        let handles = (0..threads)
            .map(|_| {
                let work_rx = work_rx.clone();
                scope.spawn(move || worker(work_rx))
            })
            .collect_vec();
        drop(work_rx);

        for item in work {
            // fails only once every worker has exited, and their errors surface on join
            if work_tx.send(item).is_err() {
                break;
            }
        }
        drop(work_tx);

        let mut results = Vec::new();
        for handle in handles {
            match handle.join() {
                Ok(result) => results.extend(result?),
                Err(e) => std::panic::resume_unwind(e),
            }
        }
        Ok(results)
    })
}

#[cfg(test)]
pub mod tests {
    use itertools::Itertools;
    use rstest::rstest;

    use super::{constants::CostKind, Builder};
    use crate::align::{corpus::Corpus, cost_model::CostModel};

    /// A similarity model over `a..=e` where symbols are one unit apart.
    fn model() -> CostModel {
        let values = (b'a'..=b'e')
            .enumerate()
            .map(|(i, symbol)| (i as f64, symbol))
            .collect::<Vec<_>>();
        CostModel::from_symbol_values(&values, CostKind::Similarity)
    }

    /// A corpus with many repeated references (and so many tied scores), including symbols that
    /// are not in the model and some empty references.
    fn corpus(num_references: usize) -> Corpus {
        let sequences = (0..num_references)
            .map(|i| {
                let len = (i * 7) % 23;
                (0..len)
                    .map(|j| b'a' + ((i % 11 + j * 3) % 7) as u8)
                    .collect_vec()
            })
            .collect_vec();
        let ids = (0..num_references).map(|i| format!("tune-{i}")).collect_vec();
        Corpus::new(sequences, ids).unwrap()
    }

    #[rstest]
    fn test_search_small_corpus() {
        let model = model();
        let corpus = Corpus::new(
            vec![
                b"eeee".to_vec(),
                b"xxabcxx".to_vec(),
                b"ab".to_vec(),
                b"abcab".to_vec(),
            ],
            vec![
                "none".to_string(),
                "exact".to_string(),
                "partial".to_string(),
                "also-exact".to_string(),
            ],
        )
        .unwrap();
        let mut aligners = Builder::default()
            .top_k(2)
            .build_aligners(&model)
            .unwrap();
        let results = aligners.search(b"abc", &corpus).unwrap();
        assert_eq!(
            results
                .iter()
                .map(|r| (r.reference_id.as_str(), r.score, r.origin, r.end))
                .collect_vec(),
            vec![
                ("exact", 3.0, (2, 0), (4, 2)),
                ("also-exact", 3.0, (0, 0), (2, 2)),
            ]
        );
        assert_eq!(results[0].reference_index, 1);
        assert_eq!(results[1].reference_index, 3);
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(8)]
    #[case(0)]
    fn test_parallel_matches_sequential(#[case] threads: usize) {
        let model = model();
        let corpus = corpus(1000);
        let query = b"adgcfb";

        let mut sequential = Builder::default().threads(1).build_aligners(&model).unwrap();
        let expected = sequential.search(query, &corpus).unwrap();
        assert_eq!(expected.len(), 5);

        let mut parallel = Builder::default()
            .threads(threads)
            .build_aligners(&model)
            .unwrap();
        assert_eq!(parallel.search(query, &corpus).unwrap(), expected);
    }

    #[rstest]
    fn test_results_are_sorted_and_positive() {
        let model = model();
        let corpus = corpus(300);
        let mut aligners = Builder::default()
            .top_k(20)
            .threads(4)
            .build_aligners(&model)
            .unwrap();
        let results = aligners.search(b"cab", &corpus).unwrap();
        assert!(!results.is_empty() && results.len() <= 20);
        assert!(results.iter().all(|r| r.score > 0.0));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].reference_index < pair[1].reference_index);
            }
        }
    }

    #[rstest]
    fn test_search_empty_corpus_and_query() {
        let model = model();
        let mut aligners = Builder::default().build_aligners(&model).unwrap();
        assert!(aligners.search(b"abc", &Corpus::default()).unwrap().is_empty());
        assert!(aligners.search(b"", &corpus(10)).unwrap().is_empty());
    }

    #[rstest]
    fn test_zero_threads_uses_all_cpus() {
        let model = model();
        let aligners = Builder::default().threads(0).build_aligners(&model).unwrap();
        assert!(aligners.threads() >= 1);
        assert_eq!(aligners.top_k(), 5);
    }

    #[rstest]
    fn test_build_aligners_errors() {
        let model = model();
        assert!(Builder::default().top_k(0).build_aligners(&model).is_err());
        let distance = CostModel::new(CostKind::Distance);
        assert!(Builder::default().build_aligners(&distance).is_err());
    }
}
