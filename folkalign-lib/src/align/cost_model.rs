use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{ensure, Context, Result};
use itertools::Itertools;

use super::{
    aligners::constants::{CostKind, DEFAULT_GAP_COST},
    binary_io::{BinaryRead, BinaryWrite},
};

/// Substitution costs between pairs of symbols, with a fallback for pairs that are not in the
/// table and a cost for inserting or deleting a single symbol.
///
/// The values in the table have the polarity given by [`CostKind`]: a distance table is used by
/// the [`GlobalAligner`](crate::align::GlobalAligner) and a similarity table by the
/// [`LocalAligner`](crate::align::LocalAligner).  The gap cost is always stored as a
/// non-negative cost; each aligner applies it with the sign its objective requires.
#[derive(Clone, Debug, PartialEq)]
pub struct CostModel {
    table: HashMap<u8, HashMap<u8, f32>>,
    kind: CostKind,
    generic_mismatch: f32,
    gap_cost: f32,
}

impl CostModel {
    /// Creates an empty model of the given kind, with the default generic mismatch and gap cost.
    pub fn new(kind: CostKind) -> Self {
        Self {
            table: HashMap::new(),
            kind,
            generic_mismatch: kind.default_generic_mismatch(),
            gap_cost: DEFAULT_GAP_COST,
        }
    }

    /// Builds a model over an alphabet whose symbols each encode a numeric value (e.g. an
    /// interval in semitones, or a duration ratio).  Identical symbols get the kind's match
    /// value, while two different symbols are scored by the absolute difference of their values
    /// (negated for similarity models).
    ///
    /// # Arguments
    ///
    /// * `values` - pairs of the numeric value and the symbol that encodes it
    /// * `kind` - the polarity of the model to build
    pub fn from_symbol_values(values: &[(f64, u8)], kind: CostKind) -> Self {
        let mut model = Self::new(kind);
        for (i, (value_i, symbol_i)) in values.iter().enumerate() {
            for (j, (value_j, symbol_j)) in values.iter().enumerate() {
                let cost = if i == j {
                    kind.match_value()
                } else {
                    kind.mismatch_sign() * (value_i - value_j).abs() as f32
                };
                model.insert(*symbol_i, *symbol_j, cost);
            }
        }
        model
    }

    /// Reads a model from the binary layout written by [`CostModel::write`].
    ///
    /// The kind is not stored in the file, so the caller must say how the values are to be
    /// interpreted.  A missing or malformed file is an error.
    pub fn read<P: AsRef<Path>>(path: &P, kind: CostKind) -> Result<Self> {
        let path: &Path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open cost map: {}", path.display()))?;
        Self::from_reader(&mut BufReader::new(file), kind)
            .with_context(|| format!("Error reading cost map: {}", path.display()))
    }

    /// Reads a model from any source of the binary layout.
    pub fn from_reader<R: Read>(reader: &mut R, kind: CostKind) -> Result<Self> {
        let mut model = Self::new(kind);
        let outer_count = reader.read_u32()?;
        for _ in 0..outer_count {
            let first = reader.read_symbol()?;
            let inner_count = reader.read_u32()?;
            // An outer key may have no pairs, but it is still kept so writing it back is lossless
            let row = model.table.entry(first).or_default();
            for _ in 0..inner_count {
                let second = reader.read_symbol()?;
                let cost = reader.read_f32()?;
                row.insert(second, cost);
            }
        }
        Ok(model)
    }

    /// Writes the model to the given path.  Symbols are written in ascending order, so the same
    /// model always produces the same bytes.
    pub fn write<P: AsRef<Path>>(&self, path: &P) -> Result<()> {
        let path: &Path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Cannot create cost map: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)
            .and_then(|()| writer.flush().map_err(anyhow::Error::from))
            .with_context(|| format!("Error writing cost map: {}", path.display()))
    }

    pub fn to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32(u32::try_from(self.table.len())?)?;
        for (first, row) in self.table.iter().sorted_by_key(|(symbol, _)| **symbol) {
            writer.write_symbol(*first)?;
            writer.write_u32(u32::try_from(row.len())?)?;
            for (second, cost) in row.iter().sorted_by_key(|(symbol, _)| **symbol) {
                writer.write_symbol(*second)?;
                writer.write_f32(*cost)?;
            }
        }
        Ok(())
    }

    /// Sets the cost used for any pair missing from the table.
    pub fn with_generic_mismatch(mut self, generic_mismatch: f32) -> Self {
        self.generic_mismatch = generic_mismatch;
        self
    }

    /// Sets the cost of inserting or deleting a single symbol.
    pub fn with_gap_cost(mut self, gap_cost: f32) -> Self {
        assert!(gap_cost >= 0.0, "gap_cost can't be negative");
        self.gap_cost = gap_cost;
        self
    }

    pub fn insert(&mut self, first: u8, second: u8, cost: f32) {
        self.table.entry(first).or_default().insert(second, cost);
    }

    /// The cost of aligning `first` against `second`, or the generic mismatch if the pair is not
    /// in the table.
    #[inline(always)]
    pub fn score(&self, first: u8, second: u8) -> f32 {
        self.get(first, second).unwrap_or(self.generic_mismatch)
    }

    /// The cost stored in the table for the pair, if any.
    pub fn get(&self, first: u8, second: u8) -> Option<f32> {
        self.table
            .get(&first)
            .and_then(|row| row.get(&second))
            .copied()
    }

    pub fn kind(&self) -> CostKind {
        self.kind
    }

    pub fn generic_mismatch(&self) -> f32 {
        self.generic_mismatch
    }

    pub fn gap_cost(&self) -> f32 {
        self.gap_cost
    }

    /// The number of symbol pairs in the table.
    pub fn len(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over every stored pair as `(first, second, cost)`.
    pub fn pairs(&self) -> impl Iterator<Item = (u8, u8, f32)> + '_ {
        self.table.iter().flat_map(|(first, row)| {
            row.iter()
                .map(move |(second, cost)| (*first, *second, *cost))
        })
    }
}

/// Parses the numeric value of a symbol, either a decimal (`-2`, `0.5`) or a fraction (`3/2`).
pub fn parse_symbol_value(value: &str) -> Result<f64> {
    let value = value.trim();
    if let Some((numerator, denominator)) = value.split_once('/') {
        let numerator: f64 = numerator
            .trim()
            .parse()
            .with_context(|| format!("Invalid numerator in value: {value}"))?;
        let denominator: f64 = denominator
            .trim()
            .parse()
            .with_context(|| format!("Invalid denominator in value: {value}"))?;
        ensure!(denominator != 0.0, "Zero denominator in value: {value}");
        Ok(numerator / denominator)
    } else {
        value
            .parse()
            .with_context(|| format!("Invalid value: {value}"))
    }
}
