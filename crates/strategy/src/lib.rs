//! Regime-aware composite signal engine.
//!
//! Candles flow leaves-first through the pipeline: indicators, then the
//! regime classifier, then each enabled strategy evaluator, then the regime
//! weight tuner, and finally the weighted-vote aggregator. Everything below
//! [`registry`] is synchronous and pure: identical inputs give identical output.

pub mod composite;
pub mod config;
pub mod indicators;
pub mod params;
pub mod regime;
pub mod registry;
pub mod strategies;
pub mod tuning;

pub use composite::{
    evaluate_composite, CompositeAnalysisResult, StrategyConfigItem, StrategyInsight,
};
pub use config::{StrategyFileConfig, ValidationError};
pub use params::StrategyParameters;
pub use regime::{classify_regime, classify_regime_with, MarketRegime, RegimeTuning, RegimeType};
pub use registry::{CandleHistory, StrategyRegistry};
pub use strategies::{
    evaluate_strategy, evaluate_strategy_detailed, AssetCandles, StrategyOutcome, StrategyType,
};
pub use tuning::{adjust_weight, WeightAdjustment};
