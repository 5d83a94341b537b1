// ScoreCalculator: the cleaning and scoring pipeline over loaded game logs.
//
// Linear pipeline: load -> include/exclude adjustments -> type coercion ->
// missing-value fill -> stat-line decomposition -> fantasy-point scoring.
// The later steps can be re-run individually; decomposition must precede
// scoring.

use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{Config, ScoringWeights, SharedWeights};
use crate::frame::{Column, Frame, FrameError};
use crate::loader;
use crate::statline;
use crate::vars::VarPolicy;

/// Columns whose absent cells `replace_missing` fills with zero.
const IMPUTED_COLUMNS: &[&str] = &[
    "Starter",
    "Points",
    "Rebounds",
    "Assists",
    "Steals",
    "Blocks",
    "Turnovers",
];

pub struct ScoreCalculator {
    train: Frame,
    valid: Option<Frame>,
    policy: VarPolicy,
    shared: SharedWeights,
    /// Instance-local weight override; when unset the shared handle applies.
    local: Option<ScoringWeights>,
}

impl ScoreCalculator {
    /// Build a calculator over already-loaded frames, with the rotoguru
    /// variable policy seeded.
    pub fn new(train: Frame, valid: Option<Frame>, shared: SharedWeights) -> Self {
        Self {
            train,
            valid,
            policy: VarPolicy::rotoguru(),
            shared,
            local: None,
        }
    }

    /// Load game logs for a date window and build a calculator over them.
    pub fn load(
        data_dir: &Path,
        game_date: NaiveDate,
        training_days: u32,
        validation: bool,
        shared: SharedWeights,
    ) -> Result<Self, FrameError> {
        let logs = loader::load_game_logs(data_dir, game_date, training_days, validation)?;
        Ok(Self::new(logs.train, logs.valid, shared))
    }

    /// Load game logs using the `[data]` section of a [`Config`].
    pub fn from_config(config: &Config, shared: SharedWeights) -> Result<Self, FrameError> {
        Self::load(
            &config.data.data_dir,
            config.data.resolved_date(),
            config.data.training_days,
            config.data.validation,
            shared,
        )
    }

    // -- Accessors ----------------------------------------------------------

    pub fn train(&self) -> &Frame {
        &self.train
    }

    pub fn valid(&self) -> Option<&Frame> {
        self.valid.as_ref()
    }

    /// Every frame this calculator manages: training first, then the
    /// validation frame when present.
    pub fn frames(&self) -> Vec<&Frame> {
        let mut frames = vec![&self.train];
        if let Some(valid) = self.valid.as_ref() {
            frames.push(valid);
        }
        frames
    }

    pub fn frames_mut(&mut self) -> Vec<&mut Frame> {
        let mut frames = vec![&mut self.train];
        if let Some(valid) = self.valid.as_mut() {
            frames.push(valid);
        }
        frames
    }

    /// Name of the target column the pipeline produces.
    pub fn response(&self) -> &'static str {
        "Fan Points"
    }

    pub fn policy(&self) -> &VarPolicy {
        &self.policy
    }

    // -- Weights ------------------------------------------------------------

    /// Override the scoring weights for this calculator only.
    pub fn set_point_vals(&mut self, weights: ScoringWeights) {
        self.local = Some(weights);
    }

    /// Update the shared weight set: every calculator holding a clone of
    /// the same handle (and without a local override) observes the change.
    pub fn set_point_vals_global(&self, weights: ScoringWeights) {
        self.shared.set(weights);
    }

    /// The weights scoring currently uses.
    pub fn point_vals(&self) -> ScoringWeights {
        self.local.unwrap_or_else(|| self.shared.get())
    }

    // -- Variable policy ----------------------------------------------------

    pub fn include_vars(&mut self, names: &[&str], strict: bool) {
        self.policy.include(names, strict);
    }

    pub fn exclude_vars(&mut self, names: &[&str], strict: bool) {
        self.policy.exclude(names, strict);
    }

    /// Column names currently marked for modeling.
    pub fn included_vars(&self) -> Vec<String> {
        self.policy.included()
    }

    // -- Pipeline steps ------------------------------------------------------

    /// Coerce every column of every frame to categorical or numeric per the
    /// variable policy. Safe to re-run; already-typed columns are left alone.
    pub fn prep_vars(&mut self) {
        let policy = self.policy.clone();
        for frame in self.frames_mut() {
            let names: Vec<String> = frame.column_names().to_vec();
            for name in names {
                frame.coerce(&name, policy.get(&name).is_categorical);
            }
        }
    }

    /// Fill absent cells with zero in the starter flag and the six counting
    /// stats. Frames missing one of those columns skip it. Idempotent.
    pub fn replace_missing(&mut self) {
        for frame in self.frames_mut() {
            for name in IMPUTED_COLUMNS {
                if !frame.fill_missing_zero(name) {
                    debug!(column = *name, "imputation skipped, column absent");
                }
            }
        }
    }

    /// Decompose the `Stat line` column into the six numeric stat columns.
    /// The stat-line column itself stays categorical.
    pub fn split_stats(&mut self) -> Result<(), FrameError> {
        for frame in self.frames_mut() {
            let lines = frame.require("Stat line")?.text_cells();
            for &(column, abbr) in statline::STAT_COLUMNS {
                frame.set_column(column, statline::derive_column(&lines, abbr));
            }
            frame.coerce("Stat line", true);
        }
        Ok(())
    }

    /// Compute `Fan Points` for every row of every frame with the currently
    /// active weights, overwriting any existing column. A row with an absent
    /// stat cell gets an absent score.
    pub fn score_data(&mut self) -> Result<(), FrameError> {
        let weights = self.point_vals();
        let response = self.response();
        for frame in self.frames_mut() {
            let assists = frame.require("Assists")?.numeric_cells();
            let blocks = frame.require("Blocks")?.numeric_cells();
            let points = frame.require("Points")?.numeric_cells();
            let rebounds = frame.require("Rebounds")?.numeric_cells();
            let steals = frame.require("Steals")?.numeric_cells();
            let turnovers = frame.require("Turnovers")?.numeric_cells();

            let scores: Vec<Option<f64>> = (0..frame.n_rows())
                .map(|i| {
                    match (
                        assists[i],
                        blocks[i],
                        points[i],
                        rebounds[i],
                        steals[i],
                        turnovers[i],
                    ) {
                        (Some(a), Some(b), Some(p), Some(r), Some(s), Some(t)) => {
                            Some(weights.fan_points(a, b, p, r, s, t))
                        }
                        _ => None,
                    }
                })
                .collect();
            frame.set_column(response, Column::Numeric(scores));
        }
        Ok(())
    }

    /// Run the full pipeline in its required order.
    pub fn prepare(&mut self) -> Result<(), FrameError> {
        self.prep_vars();
        self.replace_missing();
        self.split_stats()?;
        self.score_data()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_LOG: &str = "\
Date,GID,Pos,Name,Starter,FD Pts,FD Salary,Team,H/A,Oppt,Team Score,Oppt Score,Minutes,Stat line
20260309,1,PG,Jrue Holiday,1,20.8,7500,bos,H,nyk,112,104,34,10pt 4rb 2as 1st 1bl 3to
20260309,2,C,Backup Big,,,3500,nyk,A,bos,104,112,12,4pt 6rb
20260309,3,SF,DNP Guy,,,3000,nyk,A,bos,104,112,,";

    fn calculator() -> ScoreCalculator {
        let train = Frame::from_reader(GAME_LOG.as_bytes()).unwrap();
        ScoreCalculator::new(train, None, SharedWeights::default())
    }

    fn fan_points(calc: &ScoreCalculator) -> Vec<Option<f64>> {
        calc.train().require("Fan Points").unwrap().numeric_cells()
    }

    // -- Full pipeline --

    #[test]
    fn prepare_scores_with_default_weights() {
        let mut calc = calculator();
        calc.prepare().unwrap();

        // 1.5*2 + 3*1 + 1*10 + 1.2*4 + 3*1 - 1*3 = 20.8
        let scores = fan_points(&calc);
        assert!((scores[0].unwrap() - 20.8).abs() < 1e-9);
        // 4pt 6rb: 4 + 1.2*6 = 11.2
        assert!((scores[1].unwrap() - 11.2).abs() < 1e-9);
        // Absent stat line decomposes to all zeros.
        assert!((scores[2].unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn prepare_keeps_stat_line_categorical() {
        let mut calc = calculator();
        calc.prepare().unwrap();
        assert!(calc.train().require("Stat line").unwrap().is_categorical());
        assert!(!calc.train().require("Points").unwrap().is_categorical());
        assert!(!calc.train().require("FD Salary").unwrap().is_categorical());
    }

    #[test]
    fn replace_missing_fills_starter_flag() {
        let mut calc = calculator();
        calc.prep_vars();
        calc.replace_missing();
        let starter = calc.train().require("Starter").unwrap();
        assert_eq!(
            starter.text_cells(),
            vec![Some("1".into()), Some("0".into()), Some("0".into())]
        );
    }

    #[test]
    fn replace_missing_is_idempotent() {
        let mut calc = calculator();
        calc.prep_vars();
        calc.replace_missing();
        let once = calc.train().clone();
        calc.replace_missing();
        assert_eq!(*calc.train(), once);
    }

    #[test]
    fn replace_missing_leaves_other_columns_alone() {
        let mut calc = calculator();
        calc.prep_vars();
        calc.replace_missing();
        // FD Pts and Minutes had absent cells; they are not imputed.
        let fd_pts = calc.train().require("FD Pts").unwrap().numeric_cells();
        assert_eq!(fd_pts[1], None);
        let minutes = calc.train().require("Minutes").unwrap().numeric_cells();
        assert_eq!(minutes[2], None);
    }

    // -- Rescoring --

    #[test]
    fn rescoring_overwrites_with_new_weights() {
        let mut calc = calculator();
        calc.prepare().unwrap();
        calc.set_point_vals(ScoringWeights {
            ppa: 0.0,
            ppb: 0.0,
            ppp: 1.0,
            ppr: 0.0,
            pps: 0.0,
            ppt: 0.0,
        });
        calc.score_data().unwrap();
        let scores = fan_points(&calc);
        assert!((scores[0].unwrap() - 10.0).abs() < 1e-9);
        assert!((scores[1].unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn scoring_without_split_is_an_error() {
        let mut calc = calculator();
        calc.prep_vars();
        let err = calc.score_data().unwrap_err();
        assert!(matches!(err, FrameError::UnknownColumn(_)));
    }

    // -- Weight scoping --

    #[test]
    fn shared_weights_reach_every_calculator() {
        let shared = SharedWeights::new(ScoringWeights::default());
        let a = ScoreCalculator::new(
            Frame::from_reader(GAME_LOG.as_bytes()).unwrap(),
            None,
            shared.clone(),
        );
        let b = ScoreCalculator::new(
            Frame::from_reader(GAME_LOG.as_bytes()).unwrap(),
            None,
            shared.clone(),
        );

        a.set_point_vals_global(ScoringWeights {
            ppt: -2.0,
            ..ScoringWeights::default()
        });

        assert!((a.point_vals().ppt - -2.0).abs() < f64::EPSILON);
        assert!((b.point_vals().ppt - -2.0).abs() < f64::EPSILON);

        // New calculators built from the same handle see it too.
        let c = ScoreCalculator::new(
            Frame::from_reader(GAME_LOG.as_bytes()).unwrap(),
            None,
            shared,
        );
        assert!((c.point_vals().ppt - -2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn local_override_shadows_the_shared_handle() {
        let shared = SharedWeights::new(ScoringWeights::default());
        let mut a = ScoreCalculator::new(
            Frame::from_reader(GAME_LOG.as_bytes()).unwrap(),
            None,
            shared.clone(),
        );
        let b = ScoreCalculator::new(
            Frame::from_reader(GAME_LOG.as_bytes()).unwrap(),
            None,
            shared,
        );

        a.set_point_vals(ScoringWeights {
            pps: 4.0,
            ..ScoringWeights::default()
        });

        assert!((a.point_vals().pps - 4.0).abs() < f64::EPSILON);
        assert!((b.point_vals().pps - 3.0).abs() < f64::EPSILON);
    }

    // -- Variable policy passthrough --

    #[test]
    fn include_exclude_reach_the_policy() {
        let mut calc = calculator();
        calc.include_vars(&["Minutes"], false);
        assert!(calc.included_vars().contains(&"Minutes".to_string()));
        calc.exclude_vars(&["Minutes"], false);
        assert!(!calc.included_vars().contains(&"Minutes".to_string()));
    }

    #[test]
    fn prep_vars_respects_policy_changes() {
        let mut calc = calculator();
        // Treat Minutes as categorical instead of numeric.
        calc.policy.spec_mut("Minutes").is_categorical = true;
        calc.prep_vars();
        assert!(calc.train().require("Minutes").unwrap().is_categorical());
    }

    #[test]
    fn response_is_fan_points() {
        assert_eq!(calculator().response(), "Fan Points");
    }

    // -- Validation frame --

    #[test]
    fn both_frames_are_processed() {
        let train = Frame::from_reader(GAME_LOG.as_bytes()).unwrap();
        let valid = Frame::from_reader(GAME_LOG.as_bytes()).unwrap();
        let mut calc = ScoreCalculator::new(train, Some(valid), SharedWeights::default());
        calc.prepare().unwrap();
        for frame in calc.frames() {
            let scores = frame.require("Fan Points").unwrap().numeric_cells();
            assert!((scores[0].unwrap() - 20.8).abs() < 1e-9);
        }
        assert_eq!(calc.frames().len(), 2);
    }
}
