pub mod aligners;
pub mod alignment;
mod binary_io;
pub mod cell;
pub mod corpus;
pub mod cost_model;
pub mod top_k;

pub use aligners::{
    constants::{CostKind, FeatureFamily},
    global::GlobalAligner,
    local::LocalAligner,
    pairwise::{PairwiseAligner, PairwiseDistance},
    Aligners, Builder,
};
pub use alignment::AlignmentResult;
pub use corpus::Corpus;
pub use cost_model::CostModel;
pub use top_k::TopKSelector;
