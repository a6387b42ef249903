use super::command::ValueEnum;
use anyhow::{ensure, Result};
use clap::{
    builder::{PossibleValuesParser, TypedValueParser as _},
    Args,
};
use folkalign::align::{CostKind, CostModel, FeatureFamily};
use log::info;
use std::path::PathBuf;

/// Options for locating and tuning the cost table shared by the alignment commands.
#[derive(Args, Debug, Clone)]
pub struct CostMapArgs {
    /// The feature family encoded by the sequences.
    #[clap(
        long,
        short = 'F',
        value_parser = PossibleValuesParser::new(FeatureFamily::possible_values())
            .map(|s| s.parse::<FeatureFamily>().unwrap()),
        default_value_t = FeatureFamily::Chromatic,
        ignore_case = true,
        display_order = 20
    )]
    family: FeatureFamily,

    /// The path to the binary cost table.  Defaults to
    /// `<cost-map-dir>/global_alignment/<family>_cost_map.bin` for distance tables and
    /// `<cost-map-dir>/approximate_alignment/<family>_cost_map.bin` for similarity tables.
    #[clap(long, short = 'c', display_order = 21)]
    cost_map: Option<PathBuf>,

    /// The root directory of the cost tables, with one sub-directory per kind of table.
    #[clap(long, default_value = "indexes", display_order = 22)]
    cost_map_dir: PathBuf,

    /// The cost of inserting or deleting one symbol (must not be negative).  Defaults to the
    /// gap cost of the feature family.
    #[clap(long, short = 'g', allow_hyphen_values = true, display_order = 23)]
    gap_cost: Option<f32>,

    /// The cost used for symbol pairs missing from the table.  Defaults to one gap, with the sign
    /// of a mismatch.
    #[clap(long, allow_hyphen_values = true, display_order = 24)]
    generic_mismatch: Option<f32>,
}

impl CostMapArgs {
    pub fn cost_map_path(&self, kind: CostKind) -> PathBuf {
        self.cost_map.clone().unwrap_or_else(|| {
            self.cost_map_dir
                .join(kind.cost_map_dir_name())
                .join(self.family.cost_map_file_name())
        })
    }

    /// Reads the cost table, interpreting its values as the given kind.
    pub fn load(&self, kind: CostKind) -> Result<CostModel> {
        let gap_cost = self.gap_cost.unwrap_or_else(|| self.family.gap_cost());
        ensure!(gap_cost >= 0.0, "--gap-cost must not be negative: {}", gap_cost);
        let generic_mismatch = self
            .generic_mismatch
            .unwrap_or_else(|| kind.generic_mismatch_for_gap(gap_cost));

        let path = self.cost_map_path(kind);
        info!("Reading {} cost map from {}", kind, path.display());
        let model = CostModel::read(&path, kind)?
            .with_gap_cost(gap_cost)
            .with_generic_mismatch(generic_mismatch);
        info!(
            "Read {} symbol pairs (gap cost: {}, generic mismatch: {})",
            model.len(),
            model.gap_cost(),
            model.generic_mismatch()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use folkalign::align::{CostKind, CostModel};
    use rstest::rstest;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use super::CostMapArgs;

    #[derive(Parser, Debug)]
    struct Wrapper {
        #[command(flatten)]
        args: CostMapArgs,
    }

    #[test]
    fn test_default_path_uses_family_and_kind() {
        let wrapper = Wrapper::parse_from(["test", "--cost-map-dir", "maps", "-F", "rhythmic"]);
        assert_eq!(
            wrapper.args.cost_map_path(CostKind::Distance),
            PathBuf::from("maps/global_alignment/rhythmic_cost_map.bin")
        );
        assert_eq!(
            wrapper.args.cost_map_path(CostKind::Similarity),
            PathBuf::from("maps/approximate_alignment/rhythmic_cost_map.bin")
        );
        let wrapper = Wrapper::parse_from(["test", "-c", "mine.bin"]);
        assert_eq!(
            wrapper.args.cost_map_path(CostKind::Similarity),
            PathBuf::from("mine.bin")
        );
    }

    #[rstest]
    #[case(&["-g", "2.5", "--generic-mismatch", "-4"], 2.5, -4.0)]
    #[case(&["-g", "2.5"], 2.5, -2.5)]
    #[case(&[], 1.0, -1.0)]
    #[case(&["--generic-mismatch", "-0.5"], 1.0, -0.5)]
    fn test_load_applies_overrides(
        #[case] extra: &[&str],
        #[case] gap_cost: f32,
        #[case] generic_mismatch: f32,
    ) {
        let dir = TempDir::new().unwrap();
        let sub_dir = dir.path().join("approximate_alignment");
        std::fs::create_dir(&sub_dir).unwrap();
        CostModel::from_symbol_values(&[(0.0, b'a'), (2.0, b'b')], CostKind::Similarity)
            .write(&sub_dir.join("diatonic_cost_map.bin"))
            .unwrap();

        let mut args = vec![
            "test",
            "--cost-map-dir",
            dir.path().to_str().unwrap(),
            "-F",
            "diatonic",
        ];
        args.extend_from_slice(extra);
        let wrapper = Wrapper::parse_from(args);
        let model = wrapper.args.load(CostKind::Similarity).unwrap();
        assert_eq!(model.len(), 4);
        assert_eq!(model.gap_cost(), gap_cost);
        assert_eq!(model.generic_mismatch(), generic_mismatch);
        assert_eq!(model.score(b'a', b'b'), -2.0);
        assert_eq!(model.score(b'a', b'z'), generic_mismatch);
    }

    #[test]
    fn test_load_distance_ties_generic_mismatch_to_gap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.bin");
        CostModel::new(CostKind::Distance).write(&path).unwrap();
        let wrapper = Wrapper::parse_from(["test", "-c", path.to_str().unwrap(), "-g", "3"]);
        let model = wrapper.args.load(CostKind::Distance).unwrap();
        assert_eq!(model.generic_mismatch(), 3.0);
    }

    #[test]
    fn test_load_rejects_negative_gap_cost() {
        let wrapper = Wrapper::parse_from(["test", "-g", "-1"]);
        assert!(wrapper.args.load(CostKind::Distance).is_err());
    }
}
