use super::{command::Command, cost_map_args::CostMapArgs};
use anyhow::Result;
use clap::Parser;
use folkalign::{
    align::{CostKind, GlobalAligner},
    util::version::built_info,
};
use log::info;

/// Computes the global alignment distance between two encoded sequences.
///
/// Both sequences are aligned end to end, and the minimal total cost is printed to standard
/// output.  The cost table must hold distance values: identical symbols cost zero and
/// mismatches cost more.
#[derive(Parser, Debug, Clone)]
#[clap(version = built_info::VERSION.as_str(), term_width=0)]
pub struct Distance {
    /// The first encoded sequence.
    #[clap(long, short = 'a', display_order = 1)]
    first: String,

    /// The second encoded sequence.
    #[clap(long, short = 'b', display_order = 2)]
    second: String,

    #[command(flatten)]
    cost_map: CostMapArgs,
}

impl Distance {
    /// Computes the distance between the two sequences.
    pub fn distance(&self) -> Result<f32> {
        let cost_model = self.cost_map.load(CostKind::Distance)?;
        let mut aligner = GlobalAligner::new(&cost_model)?;
        Ok(aligner.distance(self.first.as_bytes(), self.second.as_bytes()))
    }

    /// Executes the distance command
    pub fn execute(&self) -> anyhow::Result<()> {
        let distance = self.distance()?;
        info!(
            "Distance between sequences of length {} and {}: {}",
            self.first.len(),
            self.second.len(),
            distance
        );
        println!("{distance}");
        Ok(())
    }
}

impl Command for Distance {
    fn execute(&self) -> Result<()> {
        Distance::execute(self)
    }
}
