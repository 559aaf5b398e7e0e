use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use common::config::DEFAULT_HISTORY_LIMIT;
use common::{Candle, Position};

use crate::composite::{evaluate_composite, CompositeAnalysisResult, StrategyConfigItem};
use crate::config::StrategyFileConfig;
use crate::params::StrategyParameters;
use crate::strategies::AssetCandles;

/// Per-asset rolling window of candles, oldest first.
#[derive(Debug, Clone)]
pub struct CandleHistory {
    candles: AssetCandles,
    limit: usize,
}

impl Default for CandleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl CandleHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            candles: AssetCandles::new(),
            limit: limit.max(1),
        }
    }

    /// Append or update a candle. A candle carrying the same timestamp as the
    /// newest stored one replaces it; an older one is dropped.
    /// Returns false when the candle was dropped.
    pub fn push(&mut self, candle: Candle) -> bool {
        let history = self.candles.entry(candle.asset.clone()).or_default();
        let newest = history.last().map(|c| c.timestamp);
        match newest {
            Some(ts) if candle.timestamp < ts => return false,
            Some(ts) if candle.timestamp == ts => {
                if let Some(slot) = history.last_mut() {
                    *slot = candle;
                }
            }
            _ => history.push(candle),
        }
        if history.len() > self.limit {
            let excess = history.len() - self.limit;
            history.drain(..excess);
        }
        true
    }

    pub fn get(&self, asset: &str) -> &[Candle] {
        self.candles.get(asset).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn all(&self) -> &AssetCandles {
        &self.candles
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Holds the active strategy mix and rolling candle history, and runs the
/// composite evaluation for every candle that arrives.
pub struct StrategyRegistry {
    strategies: Vec<StrategyConfigItem>,
    params: StrategyParameters,
    history: CandleHistory,
}

impl StrategyRegistry {
    pub fn from_config(file_cfg: &StrategyFileConfig, history_limit: usize) -> Self {
        for item in file_cfg.enabled() {
            info!(strategy = %item.strategy_type, weight = item.weight, "Registered strategy");
        }
        Self {
            strategies: file_cfg.strategies.clone(),
            params: file_cfg.params.clone(),
            history: CandleHistory::new(history_limit),
        }
    }

    pub fn history(&self) -> &CandleHistory {
        &self.history
    }

    /// Record one candle and evaluate the composite for its asset.
    /// Returns `None` when the candle is older than the stored history.
    pub fn process(
        &mut self,
        candle: Candle,
        open_positions: &[Position],
    ) -> Option<CompositeAnalysisResult> {
        let asset = candle.asset.clone();
        if !self.history.push(candle) {
            warn!(asset = %asset, "Out-of-order candle ignored");
            return None;
        }

        let result = evaluate_composite(
            &self.strategies,
            self.history.get(&asset),
            open_positions,
            self.history.all(),
            &self.params,
        );

        if result.signal.is_actionable() {
            info!(
                asset = %result.asset,
                signal = %result.signal,
                score = result.score,
                regime = %result.regime.regime,
                "Composite signal"
            );
        } else {
            debug!(asset = %result.asset, score = result.score, "Composite neutral");
        }
        Some(result)
    }

    /// Run the dispatch loop.
    /// Reads candles from `candle_rx`, pushes composite results to `result_tx`.
    /// Every accepted candle yields exactly one result; a full channel holds
    /// back the sender.
    /// Positions are copied out of the shared lock before each evaluation.
    pub async fn run(
        mut self,
        mut candle_rx: mpsc::Receiver<Candle>,
        result_tx: mpsc::Sender<CompositeAnalysisResult>,
        open_positions: Arc<RwLock<Vec<Position>>>,
    ) {
        info!("StrategyRegistry running");
        while let Some(candle) = candle_rx.recv().await {
            let snapshot: Vec<Position> = open_positions.read().await.clone();
            let Some(result) = self.process(candle, &snapshot) else {
                continue;
            };
            if result_tx.send(result).await.is_err() {
                warn!("Result channel closed, stopping strategy registry");
                return;
            }
        }
        info!("Candle channel closed");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use common::{PositionSide, PositionStatus, Signal};

    use super::*;
    use crate::strategies::StrategyType;

    fn candle(asset: &str, minute: i64, close: f64) -> Candle {
        Candle {
            asset: asset.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minute),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10.0,
            is_closed: true,
        }
    }

    fn martingale_only() -> StrategyFileConfig {
        StrategyFileConfig {
            params: StrategyParameters::default(),
            strategies: vec![StrategyConfigItem::new(StrategyType::Martingale, 5.0)],
        }
    }

    #[test]
    fn history_evicts_oldest_beyond_limit() {
        let mut history = CandleHistory::new(3);
        for i in 0..5 {
            assert!(history.push(candle("ETHUSDT", i, 100.0 + i as f64)));
        }
        let kept: Vec<f64> = history.get("ETHUSDT").iter().map(|c| c.close).collect();
        assert_eq!(kept, vec![102.0, 103.0, 104.0]);
    }

    #[test]
    fn history_replaces_forming_candle() {
        let mut history = CandleHistory::default();
        let mut forming = candle("ETHUSDT", 0, 100.0);
        forming.is_closed = false;
        history.push(forming);
        history.push(candle("ETHUSDT", 0, 101.0));
        let stored = history.get("ETHUSDT");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].close, 101.0);
        assert!(stored[0].is_closed);
    }

    #[test]
    fn history_drops_out_of_order_candles() {
        let mut history = CandleHistory::default();
        history.push(candle("ETHUSDT", 5, 100.0));
        assert!(!history.push(candle("ETHUSDT", 4, 99.0)));
        assert_eq!(history.get("ETHUSDT").len(), 1);
        assert!(history.get("SOLUSDT").is_empty());
    }

    #[test]
    fn process_evaluates_per_asset() {
        let mut registry = StrategyRegistry::from_config(&martingale_only(), 400);
        let positions = [Position {
            id: "p1".into(),
            asset: "ETHUSDT".into(),
            side: PositionSide::Long,
            entry_price: 100.0,
            quantity: 1.0,
            status: PositionStatus::Open,
            opened_at: Utc::now(),
        }];

        registry.process(candle("ETHUSDT", 0, 100.0), &positions);
        let result = registry.process(candle("ETHUSDT", 1, 95.0), &positions).unwrap();
        assert_eq!(result.asset, "ETHUSDT");
        assert_eq!(result.insights[0].signal, Signal::Buy);
        assert_eq!(result.signal, Signal::Buy);

        // Same positions, different asset: no lots, too short for RSI entry.
        let other = registry.process(candle("SOLUSDT", 1, 20.0), &positions).unwrap();
        assert_eq!(other.signal, Signal::Neutral);
    }

    #[tokio::test]
    async fn run_forwards_results_and_stops_on_close() {
        let registry = StrategyRegistry::from_config(&martingale_only(), 400);
        let (candle_tx, candle_rx) = mpsc::channel(16);
        let (result_tx, mut result_rx) = mpsc::channel(16);
        let positions = Arc::new(RwLock::new(Vec::new()));

        let handle = tokio::spawn(registry.run(candle_rx, result_tx, positions));

        candle_tx.send(candle("ETHUSDT", 0, 100.0)).await.unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), result_rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(result.asset, "ETHUSDT");
        assert_eq!(result.signal, Signal::Neutral);

        drop(candle_tx);
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("registry did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn run_evaluates_every_candle_when_feed_outpaces_registry() {
        const CANDLES: usize = 500;
        let registry = StrategyRegistry::from_config(&martingale_only(), 400);
        let (candle_tx, candle_rx) = mpsc::channel(4);
        let (result_tx, mut result_rx) = mpsc::channel(4);
        let positions = Arc::new(RwLock::new(Vec::new()));

        let handle = tokio::spawn(registry.run(candle_rx, result_tx, positions));
        let feed = tokio::spawn(async move {
            for i in 0..CANDLES {
                let close = 100.0 + (i % 7) as f64;
                candle_tx.send(candle("ETHUSDT", i as i64, close)).await.unwrap();
            }
        });

        let mut received = 0;
        while let Some(result) = result_rx.recv().await {
            assert_eq!(result.asset, "ETHUSDT");
            received += 1;
        }
        assert_eq!(received, CANDLES);
        feed.await.unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn history_is_capped_by_configured_limit() {
        let mut registry = StrategyRegistry::from_config(&martingale_only(), 5);
        for i in 0..8 {
            registry.process(candle("ETHUSDT", i, 100.0), &[]);
        }
        assert_eq!(registry.history().get("ETHUSDT").len(), 5);
        assert_eq!(registry.history().limit(), 5);
    }
}
