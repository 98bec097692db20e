use chrono::{DateTime, Duration, Utc};
use rangescalp::application::error_handler::ErrorHandler;
use rangescalp::application::exit::{ExitManager, ExitMonitor, ExitMonitorDeps, PersistenceStore};
use rangescalp::application::mtf::TrendMemory;
use rangescalp::application::orchestrator::{Orchestrator, OrchestratorDeps};
use rangescalp::application::scorer::SessionPointsTable;
use rangescalp::domain::config::{load_exit_config, load_main_config, load_rr_config};
use rangescalp::domain::trading::{Candle, Timeframe};
use rangescalp::infrastructure::{MockBroker, MockCandleSource, MockOrderFlow};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SYMBOL: &str = "EURUSD";

fn seed_candles(count: i64, start_price: Decimal) -> Vec<Candle> {
    let base = DateTime::<Utc>::UNIX_EPOCH;
    (0..count)
        .map(|i| {
            let t = base + Duration::minutes(5 * i);
            let drift = Decimal::from(i % 5) * dec!(0.0001);
            let close = start_price + drift;
            Candle::new(t, close - dec!(0.0001), close + dec!(0.0005), close - dec!(0.0005), close, dec!(120)).unwrap()
        })
        .collect()
}

fn default_session_table() -> SessionPointsTable {
    let mut table = HashMap::new();
    for strategy in ["vwap_reversion", "bollinger_fade", "pdh_pdl_rejection", "rsi_bounce", "liquidity_sweep"] {
        let mut sessions = HashMap::new();
        for session in ["asian", "london", "ny", "late_ny"] {
            sessions.insert(session.to_string(), dec!(10));
        }
        table.insert(strategy.to_string(), sessions);
    }
    table
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let now = Utc::now();

    let candle_source = Arc::new(MockCandleSource::new());
    candle_source.seed(SYMBOL, Timeframe::H4, seed_candles(80, dec!(1.10))).await;
    candle_source.seed(SYMBOL, Timeframe::H1, seed_candles(200, dec!(1.10))).await;
    candle_source.seed(SYMBOL, Timeframe::M30, seed_candles(200, dec!(1.10))).await;
    candle_source.seed(SYMBOL, Timeframe::M15, seed_candles(200, dec!(1.10))).await;
    candle_source.seed(SYMBOL, Timeframe::M5, seed_candles(200, dec!(1.10))).await;

    let broker = Arc::new(MockBroker::new());
    let order_flow = Arc::new(MockOrderFlow::new());
    order_flow.set_pressure(SYMBOL, dec!(0.2)).await;
    let error_handler = Arc::new(ErrorHandler::new());

    let main_config = load_main_config(include_str!("../../config/main_config.sample.json"), now)?;
    let rr_config = load_rr_config(include_str!("../../config/rr_config.sample.json"))?;
    let exit_config = load_exit_config(include_str!("../../config/exit_config.sample.json"))?;

    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            candle_source: candle_source.clone(),
            broker: broker.clone(),
            order_flow: order_flow.clone(),
            trend_memory: Arc::new(TrendMemory::new()),
            error_handler: error_handler.clone(),
        },
        main_config,
        rr_config,
        default_session_table(),
    );

    let result = orchestrator.analyse(SYMBOL, None, true, now).await;
    info!(
        range_detected = result.range_detected,
        warnings = ?result.warnings,
        top_strategy = ?result.top_strategy.map(|s| s.signal.strategy_id),
        "analysis pass complete"
    );

    let store = PersistenceStore::new(PathBuf::from("/tmp/rangescalp_trades.json"));
    let manager = Arc::new(ExitManager::load(store, broker.as_ref(), now).await?);
    let monitor = ExitMonitor::new(
        ExitMonitorDeps {
            manager: manager.clone(),
            candle_source: candle_source.clone(),
            broker: broker.clone(),
            order_flow: order_flow.clone(),
            error_handler: error_handler.clone(),
        },
        StdDuration::from_secs(60),
        exit_config,
    );
    monitor.tick(now).await;

    Ok(())
}
