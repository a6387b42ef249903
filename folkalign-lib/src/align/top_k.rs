use super::{aligners::constants::DEFAULT_TOP_K, alignment::AlignmentResult};

/// Keeps the `k` best-scoring alignments seen so far, in descending order of score.
///
/// Results with equal scores keep the order in which they were offered: a later result never
/// displaces an earlier one with the same score.
#[derive(Debug, Clone)]
pub struct TopKSelector {
    k: usize,
    results: Vec<AlignmentResult>,
}

impl Default for TopKSelector {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl TopKSelector {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            results: Vec::with_capacity(k + 1),
        }
    }

    /// Offers a result to the selector.  Returns true if it was kept.
    pub fn offer(&mut self, result: AlignmentResult) -> bool {
        // NB: place the new result after every result with an equal (or better) score
        let index = self
            .results
            .partition_point(|current| current.score >= result.score);
        if self.results.len() < self.k || index < self.results.len() {
            self.results.insert(index, result);
            self.results.truncate(self.k);
            true
        } else {
            false
        }
    }

    /// The lowest score kept so far, if the selector is full.  A new result must score strictly
    /// above this to be kept.
    pub fn min_score(&self) -> Option<f32> {
        if self.results.len() < self.k {
            None
        } else {
            self.results.last().map(|result| result.score)
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[AlignmentResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<AlignmentResult> {
        self.results
    }
}
