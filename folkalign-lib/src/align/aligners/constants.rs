use anyhow::{anyhow, Error};
use std::{fmt::Display, str::FromStr};

/// The number of best-scoring references kept by a search.
pub const DEFAULT_TOP_K: usize = 5;

/// The cost of inserting or deleting a single symbol, the same for every feature family.
pub const DEFAULT_GAP_COST: f32 = 1.0;

/// The number of references handed to a worker at a time when searching with multiple threads.
pub const REFERENCES_PER_CHUNK: usize = 64;

/// The number of chunks allowed in the work channel, per thread.
pub const WORK_CHANNEL_NUM_CHUNKS: usize = 4;

/// The polarity of the values stored in a [`CostModel`](crate::align::CostModel).
///
/// Global alignment minimizes a distance, so identical symbols cost `0` and mismatches cost more.
/// Local alignment maximizes a similarity, so identical symbols score positively and mismatches
/// negatively.  The two kinds of table are not interchangeable.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum CostKind {
    /// Smaller is better; used by the global aligner.
    #[default]
    Distance,
    /// Larger is better; used by the local aligner.
    Similarity,
}

impl CostKind {
    /// The value of aligning a symbol against itself.
    pub fn match_value(self) -> f32 {
        match self {
            Self::Distance => 0.0,
            Self::Similarity => 1.0,
        }
    }

    /// The sign applied to the difference between two symbol values on a mismatch.
    pub fn mismatch_sign(self) -> f32 {
        match self {
            Self::Distance => 1.0,
            Self::Similarity => -1.0,
        }
    }

    /// The value used for any symbol pair missing from the table.
    pub fn default_generic_mismatch(self) -> f32 {
        self.generic_mismatch_for_gap(DEFAULT_GAP_COST)
    }

    /// A missing symbol pair is penalized as much as a single gap.
    pub fn generic_mismatch_for_gap(self, gap_cost: f32) -> f32 {
        self.mismatch_sign() * gap_cost
    }

    /// The conventional directory, below the cost-map root, holding the tables of this kind.
    pub fn cost_map_dir_name(self) -> &'static str {
        match self {
            Self::Distance => "global_alignment",
            Self::Similarity => "approximate_alignment",
        }
    }
}

impl Display for CostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

impl FromStr for CostKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" | "global" => Ok(CostKind::Distance),
            "similarity" | "local" => Ok(CostKind::Similarity),
            _ => Err(anyhow!("Invalid cost kind: {}", s)),
        }
    }
}

/// The musical feature encoded by the symbols of a sequence.  Each family has its own alphabet
/// and cost tables, but all share the same alignment algorithms.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub enum FeatureFamily {
    /// Intervals in semitones.
    #[default]
    Chromatic,
    /// Intervals in scale degrees.
    Diatonic,
    /// Note duration ratios.
    Rhythmic,
}

impl FeatureFamily {
    /// The conventional file name of the cost table for this family.
    pub fn cost_map_file_name(self) -> String {
        format!("{self}_cost_map.bin")
    }

    pub fn gap_cost(self) -> f32 {
        match self {
            Self::Chromatic | Self::Diatonic | Self::Rhythmic => DEFAULT_GAP_COST,
        }
    }
}

impl Display for FeatureFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chromatic => write!(f, "chromatic"),
            Self::Diatonic => write!(f, "diatonic"),
            Self::Rhythmic => write!(f, "rhythmic"),
        }
    }
}

impl FromStr for FeatureFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromatic" | "c" => Ok(FeatureFamily::Chromatic),
            "diatonic" | "d" => Ok(FeatureFamily::Diatonic),
            "rhythmic" | "rhythm" | "r" => Ok(FeatureFamily::Rhythmic),
            _ => Err(anyhow!("Invalid feature family: {}", s)),
        }
    }
}
