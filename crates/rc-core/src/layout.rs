//! Top-level generation: configuration in, finished layout out.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::arrange::{Arrangement, PlacedRect};
use crate::consts::DEFAULT_SEED;
use crate::error::GenError;
use crate::geom::{Rect, Tpr};
use crate::picker::{NodeConfig, Picker, Plan};
use crate::queue::{BuildQueue, Id, QueueConfig, QueueStats};
use crate::rng::GameRng;

/// Everything one generation run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed string; equal seeds give equal layouts
    pub seed: String,
    /// Randomize exit order. Off means every room tries exits in clockwise
    /// order from north.
    pub shuffle: bool,
    /// Transfer point the first slot is entered through
    pub start: Tpr,
    /// Every rectangle must lie inside this area
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    pub chain: NodeConfig,
    pub queue: QueueConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_string(),
            shuffle: true,
            start: Tpr::default(),
            bounds: None,
            chain: NodeConfig::default(),
            queue: QueueConfig::default(),
        }
    }
}

/// Generate one arrangement for `config`
pub fn generate(config: &GeneratorConfig) -> Result<Layout, GenError> {
    let plan = Plan::from_config(&config.chain)?;
    debug!(nodes = plan.len(), seed = %config.seed, "chain plan validated");

    let picker = Rc::new(Picker::new(plan, config.shuffle, config.bounds));
    let rng = GameRng::from_seed_str(&config.seed);
    let mut queue = BuildQueue::with_config(rng, config.queue.clone());
    let records = queue.begin(picker.root(config.start));
    let stats = queue.stats();

    match records {
        Some(records) => {
            info!(
                seed = %config.seed,
                slots = records.len(),
                steps = stats.steps,
                "arrangement generated"
            );
            Ok(Layout {
                seed: config.seed.clone(),
                records,
                stats,
            })
        }
        None if stats.step_limit_hit => {
            warn!(seed = %config.seed, steps = stats.steps, "generation hit the step limit");
            Err(GenError::StepLimit {
                seed: config.seed.clone(),
                steps: stats.steps,
            })
        }
        None => {
            warn!(seed = %config.seed, steps = stats.steps, "no arrangement exists");
            Err(GenError::NoArrangement {
                seed: config.seed.clone(),
            })
        }
    }
}

/// A finished arrangement: one merged record per slot id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub seed: String,
    pub records: BTreeMap<Id, Arrangement>,
    pub stats: QueueStats,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Id) -> Option<&Arrangement> {
        self.records.get(&id)
    }

    /// Every placed rectangle, by ascending id then placement order
    pub fn rects(&self) -> impl Iterator<Item = (Id, &PlacedRect)> {
        self.records
            .iter()
            .flat_map(|(id, record)| record.rects.iter().map(move |placed| (*id, placed)))
    }

    /// Room rectangle of each slot that has one
    pub fn rooms(&self) -> impl Iterator<Item = (Id, Rect)> + '_ {
        self.records
            .iter()
            .filter_map(|(id, record)| record.room().map(|room| (*id, room)))
    }

    /// Smallest rectangle covering every placed rectangle
    pub fn bounds(&self) -> Option<Rect> {
        self.rects()
            .map(|(_, placed)| placed.rect)
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Pairs of distinct ids whose rectangles overlap. Empty for any layout
    /// [`generate`] returns.
    pub fn overlapping_pairs(&self) -> Vec<(Id, Id)> {
        let records: Vec<(&Id, &Arrangement)> = self.records.iter().collect();
        let mut pairs = Vec::new();
        for (i, (a, first)) in records.iter().enumerate() {
            for (b, second) in &records[i + 1..] {
                if first.overlaps(second) {
                    pairs.push((**a, **b));
                }
            }
        }
        pairs
    }

    /// Character map of the layout: rooms drawn with their id in base 36,
    /// tunnels as `#`, empty cells as `.`
    pub fn render_ascii(&self) -> String {
        crate::ascii::render(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Dir, Size};
    use crate::queue::ChopConfig;

    fn config(chain: NodeConfig) -> GeneratorConfig {
        GeneratorConfig {
            seed: "layout".to_string(),
            chain,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_default_config_generates() {
        let layout = generate(&GeneratorConfig::default()).unwrap();
        assert_eq!(layout.len(), 8);
        assert!(layout.overlapping_pairs().is_empty());
        assert_eq!(layout.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let err = generate(&config(NodeConfig::simple(Size::new(2, 2), 0))).unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn test_step_limit() {
        let mut config = config(NodeConfig::simple(Size::new(2, 2), 50));
        config.queue.max_steps = Some(10);
        let err = generate(&config).unwrap_err();
        assert!(matches!(err, GenError::StepLimit { steps: 10, .. }));
    }

    #[test]
    fn test_chopped_run_matches() {
        // one exit per room, so every frame below the top is settled
        let mut plain = config(NodeConfig::simple(Size::new(2, 2), 40).toward(Dir::North));
        plain.shuffle = false;
        let mut chopped = plain.clone();
        chopped.queue.chop = Some(ChopConfig {
            window: 16,
            batch: 4,
            keep: 4,
            ..ChopConfig::default()
        });
        let a = generate(&plain).unwrap();
        let b = generate(&chopped).unwrap();
        assert!(b.stats.chops > 0);
        assert_eq!(a.stats.chops, 0);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_bounds_and_rooms() {
        let mut config = config(NodeConfig::simple(Size::new(2, 2), 3).toward(Dir::North));
        config.shuffle = false;
        let layout = generate(&config).unwrap();
        assert_eq!(layout.bounds(), Some(Rect::new(-1, -6, 2, 6)));
        assert_eq!(layout.rooms().count(), 3);
        assert_eq!(layout.get(2).unwrap().exits.len(), 0);
    }

    #[test]
    fn test_overlapping_pairs_detects() {
        let mut layout = generate(&config(NodeConfig::simple(Size::new(2, 2), 2))).unwrap();
        let first = layout.records[&0].clone();
        layout.records.insert(5, first);
        assert_eq!(layout.overlapping_pairs(), vec![(0, 5)]);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: GeneratorConfig = serde_json::from_str(r#"{ "seed": "x" }"#).unwrap();
        assert_eq!(config.seed, "x");
        assert!(config.shuffle);
        assert_eq!(config.chain, NodeConfig::default());
    }
}
