use super::command::{Command, ValueEnum};
use anyhow::{ensure, Context, Result};
use clap::{
    builder::{PossibleValuesParser, TypedValueParser as _},
    Parser,
};
use fgoxide::io::DelimFile;
use folkalign::{
    align::{cost_model::parse_symbol_value, CostKind, CostModel},
    util::version::built_info,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::PathBuf};

/// One row of the symbol value table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolValue {
    /// The numeric value, either a decimal or a fraction such as `3/2`.
    pub value: String,
    /// The single character that encodes the value.
    pub symbol: String,
}

/// Builds a binary cost table from the numeric values of an alphabet.
///
/// The input is a TSV with the columns `value` and `symbol`, where each symbol is a single
/// character that encodes a numeric value: an interval in semitones or scale degrees, or a
/// duration ratio.  Values may be decimals (`-2`, `0.5`) or fractions (`3/2`).
///
/// For a distance table, identical symbols cost zero and two different symbols cost the absolute
/// difference of their values.  For a similarity table, identical symbols score one and two
/// different symbols score the negated absolute difference.
#[derive(Parser, Debug, Clone)]
#[clap(version = built_info::VERSION.as_str(), term_width=0)]
pub struct BuildCostMap {
    /// The path to the symbol value TSV.
    #[clap(long, short = 'i', display_order = 1)]
    input: PathBuf,

    /// The path to the output binary cost table.
    #[clap(long, short = 'o', display_order = 2)]
    output: PathBuf,

    /// The kind of table to build:
    /// - distance: for global alignment (smaller is better)
    /// - similarity: for local alignment (larger is better)
    #[clap(
        long,
        short = 'k',
        value_parser = PossibleValuesParser::new(CostKind::possible_values())
            .map(|s| s.parse::<CostKind>().unwrap()),
        default_value_t = CostKind::Similarity,
        ignore_case = true,
        display_order = 3,
        verbatim_doc_comment
    )]
    kind: CostKind,
}

impl BuildCostMap {
    /// Parses the symbol values, failing on a malformed value or a duplicate symbol.
    fn parse_values(rows: &[SymbolValue]) -> Result<Vec<(f64, u8)>> {
        let values = rows
            .iter()
            .map(|row| -> Result<(f64, u8)> {
                let symbol = row.symbol.as_bytes();
                ensure!(
                    symbol.len() == 1,
                    "Symbols must be a single character, found: '{}'",
                    row.symbol
                );
                let value = parse_symbol_value(&row.value)
                    .with_context(|| format!("Invalid value for symbol '{}'", row.symbol))?;
                Ok((value, symbol[0]))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut seen = HashSet::new();
        for (_, symbol) in &values {
            ensure!(seen.insert(*symbol), "Duplicate symbol: '{}'", *symbol as char);
        }
        Ok(values)
    }

    /// Executes the build-cost-map command
    pub fn execute(&self) -> anyhow::Result<()> {
        info!("Reading symbol values from {}", self.input.display());
        let rows: Vec<SymbolValue> = DelimFile::default().read_tsv(&self.input)?;
        let values = Self::parse_values(&rows)?;
        ensure!(!values.is_empty(), "No symbol values found in {}", self.input.display());

        let model = CostModel::from_symbol_values(&values, self.kind);
        model.write(&self.output)?;
        info!(
            "Wrote a {} cost map with {} symbols ({} pairs) to {}",
            self.kind,
            values.len(),
            model.len(),
            self.output.display()
        );
        Ok(())
    }
}

impl Command for BuildCostMap {
    fn execute(&self) -> Result<()> {
        BuildCostMap::execute(self)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use fgoxide::io::DelimFile;
    use folkalign::align::{CostKind, CostModel};
    use rstest::rstest;
    use tempfile::TempDir;

    use super::{BuildCostMap, SymbolValue};

    fn row(value: &str, symbol: &str) -> SymbolValue {
        SymbolValue {
            value: value.to_string(),
            symbol: symbol.to_string(),
        }
    }

    /// Check that the argument parser works
    #[test]
    fn test_parse() {
        let cmd = BuildCostMap::parse_from(["build-cost-map", "-i", ".", "-o", ".", "-k", "Distance"]);
        assert_eq!(cmd.kind, CostKind::Distance);
    }

    #[test]
    fn test_build_cost_map() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("rhythmic_values.tsv");
        let output = dir.path().join("rhythmic_cost_map.bin");
        DelimFile::default()
            .write_tsv(&input, vec![row("1/2", "h"), row("1", "q"), row("2", "w")])
            .unwrap();

        BuildCostMap::parse_from([
            "build-cost-map",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-k",
            "distance",
        ])
        .execute()
        .unwrap();

        let model = CostModel::read(&output, CostKind::Distance).unwrap();
        assert_eq!(model.len(), 9);
        assert_eq!(model.score(b'h', b'h'), 0.0);
        assert_eq!(model.score(b'h', b'w'), 1.5);
        assert_eq!(model.score(b'w', b'q'), 1.0);
    }

    #[rstest]
    #[case(vec![row("1", "ab")])]
    #[case(vec![row("1", "")])]
    #[case(vec![row("x", "a")])]
    #[case(vec![row("1", "a"), row("2", "a")])]
    fn test_parse_values_invalid(#[case] rows: Vec<SymbolValue>) {
        assert!(BuildCostMap::parse_values(&rows).is_err());
    }
}
