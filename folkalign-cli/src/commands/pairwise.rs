use super::{command::Command, cost_map_args::CostMapArgs};
use anyhow::Result;
use clap::Parser;
use fgoxide::io::DelimFile;
use folkalign::{
    align::{Builder, Corpus, CostKind},
    util::version::built_info,
};
use log::info;
use std::path::PathBuf;

/// Computes the global alignment distance between every pair of melodies in a corpus.
///
/// Each unordered pair of references is aligned end to end once, and written to the output TSV
/// with the columns `first_id`, `second_id` and `distance`, where the first reference precedes
/// the second in the corpus.  Rows are ordered by the position of the first reference, then of
/// the second, regardless of the number of threads.
///
/// The corpus is given as two text files with one entry per line: the encoded reference
/// sequences, and the identifier of each.  Either may be GZIP compressed.
///
/// The cost table must hold distance values: identical symbols cost zero and mismatches cost
/// more.
#[derive(Parser, Debug, Clone)]
#[clap(version = built_info::VERSION.as_str(), term_width=0)]
pub struct Pairwise {
    /// The path to the reference sequences, one per line.
    #[clap(long, short = 'r', display_order = 1)]
    references: PathBuf,

    /// The path to the reference identifiers, one per line.
    #[clap(long, short = 'i', display_order = 2)]
    ids: PathBuf,

    /// The path to the output TSV.
    #[clap(long, short = 'o', display_order = 3)]
    output: PathBuf,

    /// The number of threads to use, or zero to use every CPU.
    #[clap(long, short = 't', default_value = "1", display_order = 4)]
    threads: usize,

    #[command(flatten)]
    cost_map: CostMapArgs,
}

impl Pairwise {
    /// Executes the pairwise command
    pub fn execute(&self) -> anyhow::Result<()> {
        info!("Starting pairwise distances...");
        let cost_model = self.cost_map.load(CostKind::Distance)?;

        info!("Reading references from {}", self.references.display());
        info!("Reading reference identifiers from {}", self.ids.display());
        let corpus = Corpus::from_files(&self.references, &self.ids)?;
        info!("Read {} references", corpus.len());

        let mut aligner = Builder::default()
            .threads(self.threads)
            .build_pairwise_aligner(&cost_model)?;
        let distances = aligner.distances(&corpus)?;
        let count = distances.len();
        DelimFile::default().write_tsv(&self.output, distances)?;
        info!("Wrote {} distances to {}", count, self.output.display());
        Ok(())
    }
}

impl Command for Pairwise {
    fn execute(&self) -> Result<()> {
        Pairwise::execute(self)
    }
}
