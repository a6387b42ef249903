/// A single cell of the local alignment matrix.
///
/// Besides the running score, each cell carries the position in the reference and in the query
/// where the best-scoring alignment through this cell began.  The origin is inherited from
/// whichever predecessor produced the winning score, so the start of the best alignment is known
/// at the end of the scan without a traceback matrix.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct Cell {
    /// The best alignment score ending at this cell.
    pub score: f32,
    /// The zero-based reference position where that alignment starts.
    pub reference_origin: usize,
    /// The zero-based query position where that alignment starts.
    pub query_origin: usize,
}

impl Cell {
    pub fn new(score: f32, reference_origin: usize, query_origin: usize) -> Self {
        Self {
            score,
            reference_origin,
            query_origin,
        }
    }

    /// Returns a cell with the given score and this cell's origin.
    #[inline(always)]
    pub fn extend(self, score: f32) -> Self {
        Self { score, ..self }
    }

    pub fn origin(&self) -> (usize, usize) {
        (self.reference_origin, self.query_origin)
    }
}
