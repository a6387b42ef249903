use super::{command::Command, cost_map_args::CostMapArgs};
use anyhow::{ensure, Result};
use clap::Parser;
use fgoxide::io::DelimFile;
use folkalign::{
    align::{AlignmentResult, Builder, Corpus, CostKind},
    util::version::built_info,
};
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the search report.  Positions are zero-based and inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub rank: usize,
    pub reference_id: String,
    pub score: f32,
    pub reference_start: usize,
    pub query_start: usize,
    pub reference_end: usize,
    pub query_end: usize,
}

impl ReportRecord {
    fn new(rank: usize, result: &AlignmentResult) -> Self {
        Self {
            rank,
            reference_id: result.reference_id.clone(),
            score: result.score,
            reference_start: result.origin.0,
            query_start: result.origin.1,
            reference_end: result.end.0,
            query_end: result.end.1,
        }
    }
}

/// Finds the melodies in a corpus that best match a query fragment.
///
/// The query is aligned against every reference in the corpus, allowing it to match anywhere
/// within the reference.  Symbols of the query that are not aligned cost one gap each.  The
/// best-scoring references are written to the output TSV in descending order of score; ties
/// are reported in corpus order.  References whose best alignment does not score above zero are
/// never reported.
///
/// The corpus is given as two text files with one entry per line: the encoded reference
/// sequences, and the identifier of each.  The two files must have the same number of lines.
/// Either may be GZIP compressed.
///
/// The cost table must hold similarity values: identical symbols score positively and
/// mismatches negatively.
#[derive(Parser, Debug, Clone)]
#[clap(version = built_info::VERSION.as_str(), term_width=0)]
pub struct Search {
    /// The encoded query fragment.
    #[clap(long, short = 'q', display_order = 1)]
    query: String,

    /// The path to the reference sequences, one per line.
    #[clap(long, short = 'r', display_order = 2)]
    references: PathBuf,

    /// The path to the reference identifiers, one per line.
    #[clap(long, short = 'i', display_order = 3)]
    ids: PathBuf,

    /// The path to the output TSV.
    #[clap(long, short = 'o', display_order = 4)]
    output: PathBuf,

    /// The number of best-scoring references to report.
    #[clap(long, short = 'k', default_value = "5", display_order = 5)]
    top_k: usize,

    /// The number of threads to use, or zero to use every CPU.
    #[clap(long, short = 't', default_value = "1", display_order = 6)]
    threads: usize,

    #[command(flatten)]
    cost_map: CostMapArgs,
}

impl Search {
    /// Executes the search command
    pub fn execute(&self) -> anyhow::Result<()> {
        ensure!(!self.query.is_empty(), "--query must not be empty");
        info!("Starting search...");
        let cost_model = self.cost_map.load(CostKind::Similarity)?;

        info!("Reading references from {}", self.references.display());
        info!("Reading reference identifiers from {}", self.ids.display());
        let corpus = Corpus::from_files(&self.references, &self.ids)?;
        info!("Read {} references", corpus.len());

        let mut aligners = Builder::default()
            .top_k(self.top_k)
            .threads(self.threads)
            .build_aligners(&cost_model)?;
        let results = aligners.search(self.query.as_bytes(), &corpus)?;
        for (rank, result) in results.iter().enumerate() {
            info!(
                "#{}: {} ({} query symbols aligned)",
                rank + 1,
                result,
                result.query_len()
            );
        }
        if results.is_empty() {
            info!("No reference aligned with a positive score");
        }

        let records = results
            .iter()
            .enumerate()
            .map(|(rank, result)| ReportRecord::new(rank + 1, result))
            .collect_vec();
        DelimFile::default().write_tsv(&self.output, records)?;
        info!("Wrote {} results to {}", results.len(), self.output.display());
        Ok(())
    }
}

impl Command for Search {
    fn execute(&self) -> Result<()> {
        Search::execute(self)
    }
}
