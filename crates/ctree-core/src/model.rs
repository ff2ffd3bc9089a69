//! Orchestration: drive the partial-product builder once, then the
//! configured reduction policy to termination, owning the full stage history
//! and the global cell list.

use crate::cell::{CellKind, CompressorCell};
use crate::config::{Algorithm, Config};
use crate::dadda;
use crate::error::{Error, Result};
use crate::heap::BitHeap;
use crate::partial;
use crate::reduce;
use crate::trace::{NullObserver, StageObserver, TraceEvent};
use serde::Serialize;

/// Safety ceiling for the FA-only loop. A configuration still reducible at
/// this point surfaces as a `NonConvergence` error, never as a truncated
/// stage list.
const STAGE_LIMIT: usize = 50;

type StageFn = fn(&BitHeap, usize, usize, &mut dyn StageObserver) -> (BitHeap, Vec<CompressorCell>);

/// The complete reduction of one multiplier configuration.
///
/// `stages[0]` is the initial partial-product heap; `stages[k + 1]` is the
/// snapshot produced by reduction stage `k`. Past stages are never mutated;
/// the emitter re-reads any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionModel {
    config: Config,
    stages: Vec<BitHeap>,
    cells: Vec<CompressorCell>,
    targets: Vec<usize>,
}

impl ReductionModel {
    pub fn build(config: Config) -> Result<ReductionModel> {
        ReductionModel::build_with_observer(config, &mut NullObserver)
    }

    pub fn build_with_observer(
        config: Config,
        observer: &mut dyn StageObserver,
    ) -> Result<ReductionModel> {
        config.validate()?;
        let initial = partial::build_initial(&config)?;
        let mut model = ReductionModel {
            config,
            stages: vec![initial],
            cells: Vec::new(),
            targets: Vec::new(),
        };
        match model.config.algorithm {
            Algorithm::Dadda => model.run_targets(reduce::dadda_stage, observer),
            Algorithm::Bickerstaff => model.run_targets(reduce::bickerstaff_stage, observer),
            Algorithm::FaOnly => model.run_fa_only(STAGE_LIMIT, observer)?,
        }
        Ok(model)
    }

    /// Dadda and Bickerstaff both run one stage per entry of the reversed
    /// height sequence below the initial maximum.
    fn run_targets(&mut self, stage_fn: StageFn, observer: &mut dyn StageObserver) {
        self.targets = dadda::targets(self.stages[0].max_height());
        let targets = self.targets.clone();
        for (stage, target) in targets.into_iter().enumerate() {
            let (next, cells) = {
                let current = self.stages.last().unwrap();
                observer.on_event(&TraceEvent::StageBegin {
                    stage,
                    target: Some(target),
                    max_height: current.max_height(),
                });
                stage_fn(current, stage, target, observer)
            };
            observer.on_event(&TraceEvent::StageEnd { stage, heap: &next });
            self.cells.extend(cells);
            self.stages.push(next);
        }
    }

    fn run_fa_only(&mut self, limit: usize, observer: &mut dyn StageObserver) -> Result<()> {
        let mut stage = 0;
        while self.stages.last().unwrap().any_reducible() {
            if stage >= limit {
                return Err(Error::NonConvergence { limit });
            }
            let (next, cells) = {
                let current = self.stages.last().unwrap();
                observer.on_event(&TraceEvent::StageBegin {
                    stage,
                    target: None,
                    max_height: current.max_height(),
                });
                reduce::fa_only_stage(current, stage, observer)
            };
            observer.on_event(&TraceEvent::StageEnd { stage, heap: &next });
            self.cells.extend(cells);
            self.stages.push(next);
            stage += 1;
        }
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full stage history, initial heap first.
    pub fn stages(&self) -> &[BitHeap] {
        &self.stages
    }

    /// Number of reduction stages (one less than the history length).
    pub fn num_stages(&self) -> usize {
        self.stages.len() - 1
    }

    pub fn final_stage(&self) -> &BitHeap {
        self.stages.last().unwrap()
    }

    /// All cells in placement order, tagged with their producing stage.
    pub fn cells(&self) -> &[CompressorCell] {
        &self.cells
    }

    pub fn full_adders(&self) -> impl Iterator<Item = &CompressorCell> {
        self.cells.iter().filter(|c| c.kind == CellKind::FullAdder)
    }

    pub fn half_adders(&self) -> impl Iterator<Item = &CompressorCell> {
        self.cells.iter().filter(|c| c.kind == CellKind::HalfAdder)
    }

    /// Per-stage target heights; empty for FA-only.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            config: self.config.clone(),
            num_pp: self.config.num_pp(),
            product_width: self.config.product_width(),
            num_stages: self.num_stages(),
            full_adders: self.full_adders().count(),
            half_adders: self.half_adders().count(),
            final_max_height: self.final_stage().max_height(),
            targets: self.targets.clone(),
        }
    }
}

/// Machine-readable build report.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub config: Config,
    pub num_pp: usize,
    pub product_width: usize,
    pub num_stages: usize,
    pub full_adders: usize,
    pub half_adders: usize,
    pub final_max_height: usize,
    pub targets: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Encoding;

    fn all_configs(width: usize) -> Vec<Config> {
        let mut configs = Vec::new();
        for algorithm in [Algorithm::Dadda, Algorithm::Bickerstaff, Algorithm::FaOnly] {
            configs.push(Config::new(width, Encoding::Binary, algorithm).with_unsigned(true));
            configs.push(Config::new(width, Encoding::Binary, algorithm));
            configs.push(Config::new(width, Encoding::Booth, algorithm));
        }
        configs
    }

    #[test]
    fn test_bit_accounting_per_stage() {
        for config in all_configs(8) {
            let model = ReductionModel::build(config).unwrap();
            for stage in 0..model.num_stages() {
                let fa_count = model.full_adders().filter(|c| c.stage == stage).count();
                assert_eq!(
                    model.stages()[stage + 1].total_bits(),
                    model.stages()[stage].total_bits() - fa_count,
                );
            }
        }
    }

    #[test]
    fn test_terminal_heights() {
        for config in all_configs(8) {
            let algorithm = config.algorithm;
            let model = ReductionModel::build(config).unwrap();
            let last = model.final_stage();
            let top = last.width() - 1;
            for col in 0..top {
                match algorithm {
                    Algorithm::Dadda | Algorithm::Bickerstaff => assert!(last.height(col) <= 2),
                    Algorithm::FaOnly => assert!(last.height(col) < 3),
                }
            }
        }
    }

    #[test]
    fn test_dadda_stage_count_matches_sequence() {
        let config = Config::new(8, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let model = ReductionModel::build(config).unwrap();
        // Initial max height 8: targets 6, 4, 3, 2.
        assert_eq!(model.targets(), &[6, 4, 3, 2]);
        assert_eq!(model.num_stages(), 4);
    }

    #[test]
    fn test_deterministic_rebuild() {
        let config = Config::new(8, Encoding::Booth, Algorithm::Bickerstaff);
        let first = ReductionModel::build(config.clone()).unwrap();
        let second = ReductionModel::build(config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsigned_booth_never_builds() {
        let config = Config::new(8, Encoding::Booth, Algorithm::Dadda).with_unsigned(true);
        assert_eq!(ReductionModel::build(config), Err(Error::UnsignedBooth));
    }

    #[test]
    fn test_fa_only_non_convergence_is_an_error() {
        let config = Config::new(4, Encoding::Binary, Algorithm::FaOnly).with_unsigned(true);
        let initial = partial::build_initial(&config).unwrap();
        let mut model = ReductionModel {
            config,
            stages: vec![initial],
            cells: Vec::new(),
            targets: Vec::new(),
        };
        // Height 4 needs more than one FA-only pass; a one-stage ceiling
        // must surface as a hard failure, not a short stage list.
        let result = model.run_fa_only(1, &mut NullObserver);
        assert_eq!(result, Err(Error::NonConvergence { limit: 1 }));
    }

    #[test]
    fn test_stage_tags_are_consecutive() {
        let config = Config::new(8, Encoding::Booth, Algorithm::Dadda);
        let model = ReductionModel::build(config).unwrap();
        for cell in model.cells() {
            assert!(cell.stage < model.num_stages());
        }
        // Every reduction stage places at least one cell for this shape.
        for stage in 0..model.num_stages() {
            assert!(model.cells().iter().any(|c| c.stage == stage));
        }
    }

    #[test]
    fn test_literals_keep_their_identity() {
        let config = Config::new(8, Encoding::Binary, Algorithm::Dadda);
        let model = ReductionModel::build(config).unwrap();
        // Every literal in a later stage is either consumed by some cell or
        // present verbatim; no stage invents or renames one.
        for window in model.stages().windows(2) {
            let consumed: usize = window[1]
                .consumed()
                .iter()
                .map(|r| {
                    (r.start..r.start + r.kind.arity())
                        .filter(|&i| window[0].column(r.column).bits()[i].is_literal_one())
                        .count()
                })
                .sum();
            let before: usize = count_literals(&window[0]);
            let after: usize = count_literals(&window[1]);
            assert_eq!(after, before - consumed);
        }
    }

    fn count_literals(heap: &BitHeap) -> usize {
        heap.columns()
            .iter()
            .flat_map(|col| col.bits())
            .filter(|bit| bit.is_literal_one())
            .count()
    }
}
