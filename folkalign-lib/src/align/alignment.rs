use std::fmt;

/// The best local alignment of a query against one reference of the corpus.
///
/// Positions are zero-based and inclusive, given as `(reference, query)` pairs.
#[derive(Debug, PartialEq, Clone)]
pub struct AlignmentResult {
    /// The alignment score (larger is better).
    pub score: f32,

    /// Where the alignment starts in the reference and the query.
    pub origin: (usize, usize),

    /// Where the alignment ends in the reference and the query.
    pub end: (usize, usize),

    /// The identifier of the reference.
    pub reference_id: String,

    /// The position of the reference in the corpus.
    pub reference_index: usize,
}

impl AlignmentResult {
    /// The number of reference symbols spanned by the alignment.
    pub fn reference_len(&self) -> usize {
        self.end.0 + 1 - self.origin.0
    }

    /// The number of query symbols spanned by the alignment.
    pub fn query_len(&self) -> usize {
        self.end.1 + 1 - self.origin.1
    }
}

impl fmt::Display for AlignmentResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} score={} reference={}-{} query={}-{}",
            self.reference_id, self.score, self.origin.0, self.end.0, self.origin.1, self.end.1
        )
    }
}
