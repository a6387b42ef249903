use std::iter::repeat;

use anyhow::{ensure, Result};

use crate::align::{
    aligners::constants::CostKind, alignment::AlignmentResult, cell::Cell, cost_model::CostModel,
};

/// The best-scoring local alignment of a query against a single reference.
///
/// Positions are zero-based and inclusive, given as `(reference, query)` pairs.
#[derive(Default, Debug, PartialEq, Clone, Copy)]
pub struct LocalHit {
    pub score: f32,
    pub origin: (usize, usize),
    pub end: (usize, usize),
}

impl LocalHit {
    /// Attaches the reference identity to this hit.
    pub fn into_result(self, reference_id: &str, reference_index: usize) -> AlignmentResult {
        AlignmentResult {
            score: self.score,
            origin: self.origin,
            end: self.end,
            reference_id: reference_id.to_string(),
            reference_index,
        }
    }
}

/// Aligns a query against a substring of a reference, maximizing similarity.
///
/// Leading reference symbols are skipped for free: column zero scores zero on every reference
/// row.  Query symbols that are not aligned to the reference cost one gap each, so the first row
/// is initialized to the cumulative gap penalty.  For reference symbol `r` and query symbol `q`:
///
/// ```ignore
/// diagonal  = diag.score  + score(r, q)
/// insertion = left.score  - gap   // query symbol against a gap
/// deletion  = above.score - gap   // reference symbol against a gap
/// ```
///
/// The maximum of the three wins, preferring the diagonal, then the insertion, then the
/// deletion when scores are equal, and the winning cell inherits its predecessor's origin.  The
/// best cell anywhere in the matrix is reported, keeping the first one found (reference-major,
/// query-minor order) when several share the maximum score.
///
/// A single column of `query.len() + 1` cells is kept and overwritten for every reference.
pub struct LocalAligner<'a> {
    cost_model: &'a CostModel,
    column: Vec<Cell>,
}

impl<'a> LocalAligner<'a> {
    /// Creates a new aligner.  The cost model must be a similarity model.
    pub fn new(cost_model: &'a CostModel) -> Result<Self> {
        ensure!(
            cost_model.kind() == CostKind::Similarity,
            "Local alignment requires a {} cost model, found a {} cost model",
            CostKind::Similarity,
            cost_model.kind()
        );
        Ok(Self {
            cost_model,
            column: Vec::new(),
        })
    }

    fn init_column(&mut self, n: usize) {
        let gap = self.cost_model.gap_cost();
        self.column.clear();
        self.column.extend(repeat(Cell::default()).take(n + 1));
        for (j, cell) in self.column.iter_mut().enumerate().skip(1) {
            cell.score = -(j as f32) * gap;
        }
    }

    /// Aligns the query against the reference, returning the best alignment if it scores above
    /// zero.
    pub fn align(&mut self, query: &[u8], reference: &[u8]) -> Option<LocalHit> {
        let gap = -self.cost_model.gap_cost();
        self.init_column(query.len());

        let mut best = LocalHit::default();
        for (i, r) in reference.iter().enumerate() {
            // the previous row's column zero, where an alignment starting at `i` begins
            let mut diag = self.column[0];
            self.column[0] = Cell::new(0.0, i + 1, 0);
            for (j, q) in query.iter().enumerate() {
                let left = self.column[j];
                let above = self.column[j + 1];
                let cell = best_predecessor(
                    diag,
                    diag.score + self.cost_model.score(*r, *q),
                    left,
                    left.score + gap,
                    above,
                    above.score + gap,
                );
                self.column[j + 1] = cell;
                diag = above;

                if cell.score > best.score {
                    best = LocalHit {
                        score: cell.score,
                        origin: cell.origin(),
                        end: (i, j),
                    };
                }
            }
        }

        (best.score > 0.0).then_some(best)
    }
}

/// Picks the winning move for a cell, preferring the diagonal, then the insertion, then the
/// deletion on equal scores.
#[inline(always)]
fn best_predecessor(
    diag: Cell,
    diagonal: f32,
    left: Cell,
    insertion: f32,
    above: Cell,
    deletion: f32,
) -> Cell {
    if diagonal >= insertion && diagonal >= deletion {
        diag.extend(diagonal)
    } else if insertion >= deletion {
        left.extend(insertion)
    } else {
        above.extend(deletion)
    }
}
