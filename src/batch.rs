//! # Batch Orchestrator
//!
//! Runs one chart batch end to end.
//!
//! ## Flow:
//! 1. `plan()`: pick the frames of the mode and compute the axis bound once
//! 2. `render()`: draw every frame against that bound, in period order
//! 3. `run()`: plan + render, then assemble the animation if the mode wants one
//!
//! ## Axis bound per mode:
//! - `TopN`: table maximum x headroom
//! - `ClosestToEntity`: maximum of the reference row x headroom
//! - `ClosestRandom`: the picked cell x headroom
//!
//! Any error aborts the batch; frames already written stay on disk.

use crate::animation::AnimationAssembler;
use crate::axis::{compute_bound, AxisBound};
use crate::config::Config;
use crate::dataset::ObservationTable;
use crate::error::PopError;
use crate::json_output::JsonMessage;
use crate::mode::ChartMode;
use crate::progress::ProgressManager;
use crate::ranking::{closest_to, top_n};
use crate::render::{ChartRenderer, Frame, Palette};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Frames of one batch and the bound they share
#[derive(Debug, Clone)]
pub struct BatchPlan {
    pub mode: ChartMode,
    pub bound: AxisBound,
    pub frames: Vec<Frame>,
}

/// Outcome of a finished batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub mode: ChartMode,
    pub bound: AxisBound,
    pub frames: Vec<PathBuf>,
    pub animation: Option<PathBuf>,
    pub duration: Duration,
}

/// Compute the frames and the axis bound of `mode`
pub fn plan<R: Rng + ?Sized>(
    table: &ObservationTable,
    mode: &ChartMode,
    config: &Config,
    rng: &mut R,
) -> Result<BatchPlan, PopError> {
    let n = config.selection_size;

    let (raw_max, frames) = match mode {
        ChartMode::TopN => {
            let raw_max = table
                .max_value()
                .ok_or_else(|| PopError::Validation("table has no values".to_string()))?;
            let frames = table
                .slices()
                .map(|slice| top_n(&slice, n).map(|selection| Frame::new(selection, None)))
                .collect::<Result<Vec<_>, _>>()?;
            (raw_max, frames)
        }
        ChartMode::ClosestToEntity(reference) => {
            let raw_max = table
                .row_max(reference)?
                .ok_or_else(|| PopError::MissingKey(format!("{} has no values", reference)))?;
            let frames = table
                .slices()
                .map(|slice| {
                    closest_to(&slice, reference, n)
                        .map(|selection| Frame::new(selection, Some(reference.clone())))
                })
                .collect::<Result<Vec<_>, _>>()?;
            (raw_max, frames)
        }
        ChartMode::ClosestRandom => {
            let period = table
                .periods()
                .choose(rng)
                .ok_or_else(|| PopError::Validation("table has no periods".to_string()))?;
            let slice = table
                .slice(period)
                .ok_or_else(|| PopError::MissingKey(period.clone()))?;
            let picked = slice
                .observations
                .choose(rng)
                .ok_or_else(|| PopError::Validation(format!("{} has no values", period)))?
                .clone();
            debug!("Random pick: {} in {}", picked.entity, period);

            let selection = closest_to(&slice, &picked.entity, n)?;
            (picked.value, vec![Frame::new(selection, Some(picked.entity))])
        }
    };

    let bound = compute_bound(raw_max * config.headroom)?;
    debug!("Axis bound for {}: {}", mode, bound.value());

    Ok(BatchPlan {
        mode: mode.clone(),
        bound,
        frames,
    })
}

/// A chart batch over one loaded table
pub struct ChartBatch<'a> {
    table: &'a ObservationTable,
    config: &'a Config,
}

impl<'a> ChartBatch<'a> {
    pub fn new(table: &'a ObservationTable, config: &'a Config) -> Self {
        Self { table, config }
    }

    /// Plan `mode` with the configured seed, or entropy
    pub fn plan(&self, mode: &ChartMode) -> Result<BatchPlan, PopError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        plan(self.table, mode, self.config, &mut rng)
    }

    /// Draw every frame of `plan`, returning the written files in order
    pub fn render(&self, plan: &BatchPlan) -> Result<Vec<PathBuf>> {
        let renderer = ChartRenderer::new(self.config, Palette::for_entities(self.table.entities()));
        let dir = self.config.frames_dir(plan.mode.batch_id());
        let progress = ProgressManager::new(plan.frames.len() as u64, self.config.json_output);

        let mut written = Vec::with_capacity(plan.frames.len());
        for frame in &plan.frames {
            let path = renderer.render(frame, plan.bound, &plan.mode, &dir)?;
            if self.config.json_output {
                JsonMessage::Frame {
                    period: frame.period().to_string(),
                    path: path.clone(),
                    entities: frame.selection.entity_names(),
                }
                .emit();
            }
            progress.update(frame.period());
            written.push(path);
        }

        progress.finish(&format!("{} frames in {}", written.len(), dir.display()));
        Ok(written)
    }

    /// Plan, render and (if the mode wants it) assemble the animation
    pub async fn run(&self, mode: &ChartMode) -> Result<BatchReport> {
        let start_time = Instant::now();
        let plan = self.plan(mode)?;
        info!(
            "📊 {}: {} frames, axis bound {}",
            mode,
            plan.frames.len(),
            plan.bound.value()
        );

        if self.config.json_output {
            JsonMessage::Start {
                mode: mode.clone(),
                total_frames: plan.frames.len(),
                axis_bound: plan.bound,
            }
            .emit();
        }

        let frames = self.render(&plan)?;

        let animation = if mode.assembles_animation() {
            let output = self.config.animation_path(mode.batch_id());
            let path = AnimationAssembler::new(self.config.animation_delay)
                .assemble(&frames, &output)
                .await?;
            if self.config.json_output {
                JsonMessage::Animation {
                    path: path.clone(),
                    frames: frames.len(),
                }
                .emit();
            }
            Some(path)
        } else {
            None
        };

        let duration = start_time.elapsed();
        if self.config.json_output {
            JsonMessage::Complete {
                frames_rendered: frames.len(),
                duration_seconds: duration.as_secs_f64(),
            }
            .emit();
        }
        info!("✅ {} done in {:.1}s", mode, duration.as_secs_f64());

        Ok(BatchReport {
            mode: plan.mode,
            bound: plan.bound,
            frames,
            animation,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ObservationTable {
        ObservationTable::new(
            vec!["2000".to_string(), "2001".to_string()],
            vec![
                ("A".to_string(), vec![Some(10.0e6), Some(11.0e6)]),
                ("B".to_string(), vec![Some(12.0e6), Some(12.5e6)]),
                ("C".to_string(), vec![Some(50.0e6), Some(52.0e6)]),
                ("D".to_string(), vec![Some(11.0e6), None]),
                ("E".to_string(), vec![Some(9.0e6), Some(9.5e6)]),
            ],
        )
        .unwrap()
    }

    fn config(selection_size: usize) -> Config {
        Config {
            selection_size,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_n_plan_covers_every_period() {
        let table = table();
        let config = config(3);
        let plan = ChartBatch::new(&table, &config).plan(&ChartMode::TopN).unwrap();

        assert_eq!(plan.frames.len(), 2);
        assert_eq!(plan.frames[0].period(), "2000");
        assert_eq!(plan.frames[0].selection.entity_names(), vec!["C", "B", "D"]);
        assert_eq!(plan.frames[1].selection.entity_names(), vec!["C", "B", "A"]);
        assert!(plan.frames.iter().all(|f| f.highlight.is_none()));
        assert_eq!(plan.bound, compute_bound(52.0e6 * config.headroom).unwrap());
        assert!(plan.bound.value() >= 67_600_000.0);
    }

    #[test]
    fn test_closest_plan_uses_reference_row() {
        let table = table();
        let mode = ChartMode::ClosestToEntity("B".to_string());
        let config = config(3);
        let plan = ChartBatch::new(&table, &config).plan(&mode).unwrap();

        assert_eq!(plan.frames[0].selection.entity_names(), vec!["B", "D", "A"]);
        assert_eq!(plan.frames[0].highlight.as_deref(), Some("B"));
        assert!(plan.frames.iter().all(|f| f.selection.contains("B")));
        assert!(plan.bound.value() >= 12.5e6 * config.headroom);
    }

    #[test]
    fn test_closest_plan_unknown_entity() {
        let table = table();
        let mode = ChartMode::ClosestToEntity("Z".to_string());
        let err = ChartBatch::new(&table, &config(3)).plan(&mode).unwrap_err();
        assert!(matches!(err, PopError::MissingKey(_)));
    }

    #[test]
    fn test_closest_plan_reference_absent_in_a_period() {
        let table = table();
        let mode = ChartMode::ClosestToEntity("D".to_string());
        let err = ChartBatch::new(&table, &config(3)).plan(&mode).unwrap_err();
        assert!(matches!(err, PopError::MissingKey(_)));
    }

    #[test]
    fn test_random_plan_is_one_centred_frame() {
        let table = table();
        let config = config(5);
        let plan = ChartBatch::new(&table, &config).plan(&ChartMode::ClosestRandom).unwrap();

        assert_eq!(plan.frames.len(), 1);
        let frame = &plan.frames[0];
        let centre = frame.highlight.clone().unwrap();
        assert!(frame.selection.contains(&centre));

        let value = table.value(&centre, frame.period()).unwrap();
        assert_eq!(plan.bound, compute_bound(value * config.headroom).unwrap());
    }

    #[test]
    fn test_random_plan_is_reproducible_with_seed() {
        let table = table();
        let config = config(2);
        let first = ChartBatch::new(&table, &config).plan(&ChartMode::ClosestRandom).unwrap();
        let second = ChartBatch::new(&table, &config).plan(&ChartMode::ClosestRandom).unwrap();
        assert_eq!(first.frames, second.frames);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let table = ObservationTable::new(vec![], Vec::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = plan(&table, &ChartMode::TopN, &config(5), &mut rng).unwrap_err();
        assert!(matches!(err, PopError::Validation(_)));
        let err = plan(&table, &ChartMode::ClosestRandom, &config(5), &mut rng).unwrap_err();
        assert!(matches!(err, PopError::Validation(_)));
    }
}
