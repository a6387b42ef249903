use std::iter::repeat;

use anyhow::{ensure, Result};

use crate::align::{aligners::constants::CostKind, cost_model::CostModel};

/// Computes the global alignment distance between two whole sequences.
///
/// The full `(m + 1) x (n + 1)` matrix is never stored; only the previous and current columns
/// (each of length `n + 1`) are kept, so the buffers are reused across calls.  Aligning a
/// prefix against nothing costs one gap per symbol:
///
/// ```ignore
/// D(i, j) = min(D(i-1, j-1) + cost(a[i], b[j]),
///               D(i-1, j)   + gap,
///               D(i, j-1)   + gap)
/// ```
pub struct GlobalAligner<'a> {
    cost_model: &'a CostModel,
    prev: Vec<f32>,
    curr: Vec<f32>,
}

impl<'a> GlobalAligner<'a> {
    /// Creates a new aligner.  The cost model must be a distance model.
    pub fn new(cost_model: &'a CostModel) -> Result<Self> {
        ensure!(
            cost_model.kind() == CostKind::Distance,
            "Global alignment requires a {} cost model, found a {} cost model",
            CostKind::Distance,
            cost_model.kind()
        );
        Ok(Self {
            cost_model,
            prev: Vec::new(),
            curr: Vec::new(),
        })
    }

    fn init_columns(&mut self, n: usize) {
        let gap = self.cost_model.gap_cost();
        self.prev.clear();
        self.prev.extend((0..=n).map(|j| j as f32 * gap));
        self.curr.clear();
        self.curr.extend(repeat(0.0).take(n + 1));
    }

    /// The distance between `a` and `b`; zero only if the two can be aligned at no cost.
    pub fn distance(&mut self, a: &[u8], b: &[u8]) -> f32 {
        let n = b.len();
        let gap = self.cost_model.gap_cost();
        self.init_columns(n);

        for (i, a_symbol) in a.iter().enumerate() {
            self.curr[0] = (i + 1) as f32 * gap;
            for (j, b_symbol) in b.iter().enumerate() {
                let substitution = self.prev[j] + self.cost_model.score(*a_symbol, *b_symbol);
                let deletion = self.prev[j + 1] + gap;
                let insertion = self.curr[j] + gap;
                self.curr[j + 1] = substitution.min(deletion).min(insertion);
            }
            std::mem::swap(&mut self.prev, &mut self.curr);
        }

        // after the final swap the last column computed is in `prev`
        self.prev[n]
    }
}
