// Statistical core: aggregation, feature engineering, scaling and scoring
pub mod aggregator;
pub mod feature_engine;
pub mod index_composer;
pub mod normalizer;
pub mod pipeline;

// Re-export commonly used types
pub use aggregator::{AggregationOutput, RegionAggregator};
pub use feature_engine::{FeatureEngine, WindowPolicy};
pub use index_composer::{CompositeWeights, IndexComposer, ScoreInputs};
pub use normalizer::{MetricBounds, NormalizationBounds, min_max_scale};
pub use pipeline::{
    PipelineConfig, RegionOutcome, RegionScores, SkipCounts, run_regions, score_region,
    score_summaries,
};
