use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::{Candle, Config, Error, Position, Result};
use strategy::{CompositeAnalysisResult, StrategyFileConfig, StrategyRegistry};

/// Buffer between the stdin reader and the registry.
const CANDLE_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    // Logs go to stderr so stdout carries only result lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().unwrap_or_else(|e| panic!("Invalid configuration: {e}"));
    let strategy_file = StrategyFileConfig::load(&cfg.strategy_config_path)
        .unwrap_or_else(|e| panic!("Failed to load strategy config: {e}"));
    info!(
        path = %cfg.strategy_config_path,
        enabled = strategy_file.enabled().count(),
        "Signal engine starting"
    );

    // ── Shared state ──────────────────────────────────────────────────────────
    // Loaded once at startup; the registry reads a fresh snapshot per candle.
    let positions = load_positions(cfg.positions_path.as_deref())
        .unwrap_or_else(|e| panic!("Failed to load open positions: {e}"));
    info!(count = positions.len(), "Open positions loaded");
    let open_positions: Arc<RwLock<Vec<Position>>> = Arc::new(RwLock::new(positions));

    // ── Channels ──────────────────────────────────────────────────────────────
    let (candle_tx, candle_rx) = mpsc::channel::<Candle>(CANDLE_CHANNEL_CAPACITY);
    let (result_tx, mut result_rx) =
        mpsc::channel::<CompositeAnalysisResult>(cfg.result_channel_capacity);

    // ── Strategy registry ─────────────────────────────────────────────────────
    let registry = StrategyRegistry::from_config(&strategy_file, cfg.history_limit);
    info!(history_limit = registry.history().limit(), "Strategy registry ready");
    let registry_task = tokio::spawn(registry.run(candle_rx, result_tx, open_positions));

    // ── Candle feed (newline-delimited JSON on stdin) ─────────────────────────
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_candle(&line) {
                        Ok(candle) => {
                            if candle_tx.send(candle).await.is_err() {
                                warn!("Strategy registry gone, stopping candle feed");
                                return;
                            }
                        }
                        Err(e) => warn!(error = %e, "Skipping malformed candle line"),
                    }
                }
                Ok(None) => {
                    info!("Candle feed reached end of input");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read candle feed");
                    return;
                }
            }
        }
    });

    // ── Result sink (newline-delimited JSON on stdout) ────────────────────────
    let mut stdout = tokio::io::stdout();
    while let Some(result) = result_rx.recv().await {
        let line = match encode_result(&result) {
            Ok(line) => line,
            Err(e) => {
                warn!(asset = %result.asset, error = %e, "Failed to serialize result");
                continue;
            }
        };
        if let Err(e) = write_line(&mut stdout, &line).await {
            warn!(error = %e, "Failed to write result, exiting");
            break;
        }
    }

    let _ = registry_task.await;
    info!("Signal engine stopped");
}

fn parse_candle(line: &str) -> Result<Candle> {
    let candle: Candle = serde_json::from_str(line)?;
    if candle.asset.trim().is_empty() {
        return Err(Error::Other("candle has an empty asset".to_string()));
    }
    Ok(candle)
}

/// Open lots for the position-aware strategies, as a JSON array of positions.
/// No path means no open lots.
fn load_positions(path: Option<&str>) -> Result<Vec<Position>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn encode_result(result: &CompositeAnalysisResult) -> Result<String> {
    let mut line = serde_json::to_string(result)?;
    line.push('\n');
    Ok(line)
}

async fn write_line(stdout: &mut tokio::io::Stdout, line: &str) -> Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_candle_line() {
        let line = r#"{"asset":"ETHUSDT","timestamp":"2024-01-01T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":10.0}"#;
        let candle = parse_candle(line).unwrap();
        assert_eq!(candle.asset, "ETHUSDT");
        assert_eq!(candle.close, 1.5);
        assert!(candle.is_closed, "missing is_closed means a closed candle");
    }

    #[test]
    fn positions_default_to_none_without_a_path() {
        assert!(load_positions(None).unwrap().is_empty());
        assert!(matches!(
            load_positions(Some("/definitely/not/here.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn rejects_malformed_and_blank_asset_lines() {
        assert!(matches!(parse_candle("not json"), Err(Error::Json(_))));
        let blank = r#"{"asset":" ","timestamp":"2024-01-01T00:00:00Z","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1.0}"#;
        assert!(matches!(parse_candle(blank), Err(Error::Other(_))));
    }
}
