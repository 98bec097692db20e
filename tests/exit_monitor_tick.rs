use chrono::{DateTime, Duration, Utc};
use rangescalp::application::error_handler::ErrorHandler;
use rangescalp::application::exit::{ExitManager, ExitMonitor, ExitMonitorDeps, PersistenceStore};
use rangescalp::domain::broker::Position;
use rangescalp::domain::config::ExitConfig;
use rangescalp::domain::range::{CriticalGapZones, ExpansionState, RangeKind, RangeStructure, TouchCount};
use rangescalp::domain::trade::ActiveTrade;
use rangescalp::domain::trading::{Candle, OrderSide, Timeframe};
use rangescalp::infrastructure::{MockBroker, MockCandleSource, MockOrderFlow};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

const SYMBOL: &str = "EURUSD";
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_store_path() -> PathBuf {
    let n = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("rangescalp_exit_monitor_test_{}_{n}.json", std::process::id()))
}

fn flat_range() -> RangeStructure {
    RangeStructure {
        kind: RangeKind::Dynamic,
        high: dec!(1.1050),
        low: dec!(1.0950),
        mid: dec!(1.1000),
        width_atr: dec!(2),
        gaps: CriticalGapZones::new(dec!(1.1050), dec!(1.0950)),
        touch_count: TouchCount::default(),
        validated: true,
        nested: HashMap::new(),
        expansion_state: ExpansionState::Stable,
        invalidation_flags: vec![],
    }
}

fn flat_candles(count: i64, now: DateTime<Utc>) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let t = now - Duration::minutes(5 * (count - i));
            Candle::new(t, dec!(1.0999), dec!(1.1002), dec!(1.0998), dec!(1.1000), dec!(100)).unwrap()
        })
        .collect()
}

async fn build_monitor(
    now: DateTime<Utc>,
    store_path: PathBuf,
    trade: ActiveTrade,
) -> (ExitMonitor, Arc<ExitManager>, Arc<MockBroker>) {
    let candle_source = Arc::new(MockCandleSource::new());
    candle_source.seed(SYMBOL, Timeframe::M5, flat_candles(200, now)).await;
    candle_source.seed(SYMBOL, Timeframe::M15, flat_candles(200, now)).await;

    let broker = Arc::new(MockBroker::new());
    broker
        .seed_position(Position {
            ticket: trade.ticket,
            symbol: trade.symbol.clone(),
            volume: dec!(0.01),
            price_open: trade.entry,
            sl: trade.sl,
            tp: trade.tp,
        })
        .await;

    let order_flow = Arc::new(MockOrderFlow::new());

    let store = PersistenceStore::new(store_path);
    let manager = Arc::new(ExitManager::load(store, broker.as_ref(), now).await.expect("fresh store loads cleanly"));
    manager.register(trade, now).await.expect("register persists cleanly");

    let monitor = ExitMonitor::new(
        ExitMonitorDeps {
            manager: manager.clone(),
            candle_source,
            broker: broker.clone(),
            order_flow,
            error_handler: Arc::new(ErrorHandler::new()),
        },
        StdDuration::from_secs(60),
        ExitConfig::default(),
    );

    (monitor, manager, broker)
}

#[tokio::test]
async fn stagnant_flat_trade_is_exited_and_unregistered_after_an_hour() {
    let now = Utc::now();
    let path = temp_store_path();
    let trade = ActiveTrade {
        ticket: 42,
        symbol: SYMBOL.to_string(),
        strategy_id: "vwap_reversion".to_string(),
        direction: OrderSide::Buy,
        range_snapshot: flat_range(),
        entry: dec!(1.1000),
        sl: dec!(1.0950),
        tp: dec!(1.1150),
        entry_time: now - Duration::minutes(90),
        breakeven_moved: false,
        last_range_check: None,
        last_state_change: now - Duration::minutes(90),
    };

    let (monitor, manager, broker) = build_monitor(now, path.clone(), trade).await;

    monitor.tick(now).await;

    assert!(manager.trade(42).await.is_none(), "a stagnant trade should be unregistered once exited");
    assert!(broker.position_get(42).await.is_none(), "the mock broker should have closed the position");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn a_trade_at_breakeven_profit_stays_registered_with_sl_moved() {
    let now = Utc::now();
    let path = temp_store_path();
    let trade = ActiveTrade {
        ticket: 7,
        symbol: SYMBOL.to_string(),
        strategy_id: "vwap_reversion".to_string(),
        direction: OrderSide::Buy,
        range_snapshot: flat_range(),
        entry: dec!(1.0950),
        sl: dec!(1.0900),
        tp: dec!(1.1150),
        entry_time: now - Duration::minutes(5),
        breakeven_moved: false,
        last_range_check: None,
        last_state_change: now - Duration::minutes(5),
    };

    // Candles close right at entry + 0.5R so the ladder's breakeven-move rule
    // fires ahead of stagnation/BOS rules (profit_r = 0.5, time_in_trade < 30).
    let candle_source = Arc::new(MockCandleSource::new());
    let closes: Vec<Candle> = (0..200)
        .map(|i| {
            let t = now - Duration::minutes(5 * (200 - i));
            Candle::new(t, dec!(1.0999), dec!(1.1002), dec!(1.0998), dec!(1.1000), dec!(100)).unwrap()
        })
        .collect();
    candle_source.seed(SYMBOL, Timeframe::M5, closes).await;
    candle_source.seed(SYMBOL, Timeframe::M15, flat_candles(200, now)).await;

    let broker = Arc::new(MockBroker::new());
    broker
        .seed_position(Position { ticket: trade.ticket, symbol: trade.symbol.clone(), volume: dec!(0.01), price_open: trade.entry, sl: trade.sl, tp: trade.tp })
        .await;
    let order_flow = Arc::new(MockOrderFlow::new());

    let store = PersistenceStore::new(path.clone());
    let manager = Arc::new(ExitManager::load(store, broker.as_ref(), now).await.expect("fresh store loads cleanly"));
    manager.register(trade, now).await.expect("register persists cleanly");

    let monitor = ExitMonitor::new(
        ExitMonitorDeps { manager: manager.clone(), candle_source, broker: broker.clone(), order_flow, error_handler: Arc::new(ErrorHandler::new()) },
        StdDuration::from_secs(60),
        ExitConfig::default(),
    );

    monitor.tick(now).await;

    let updated = manager.trade(7).await.expect("a breakeven move should keep the trade registered, not unregister it");
    assert!(updated.breakeven_moved);
    assert!(updated.sl > dec!(1.0900), "sl should have moved up from the original stop");

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn a_trade_with_no_matching_broker_position_is_dropped_as_orphaned() {
    let now = Utc::now();
    let path = temp_store_path();
    let trade = ActiveTrade {
        ticket: 99,
        symbol: SYMBOL.to_string(),
        strategy_id: "rsi_bounce".to_string(),
        direction: OrderSide::Sell,
        range_snapshot: flat_range(),
        entry: dec!(1.1000),
        sl: dec!(1.1050),
        tp: dec!(1.0900),
        entry_time: now - Duration::minutes(10),
        breakeven_moved: false,
        last_range_check: None,
        last_state_change: now - Duration::minutes(10),
    };

    let candle_source = Arc::new(MockCandleSource::new());
    candle_source.seed(SYMBOL, Timeframe::M5, flat_candles(200, now)).await;
    candle_source.seed(SYMBOL, Timeframe::M15, flat_candles(200, now)).await;

    // No position seeded on the broker this time: it has already been closed
    // manually or by another process, out from under the exit manager.
    let broker = Arc::new(MockBroker::new());
    let order_flow = Arc::new(MockOrderFlow::new());

    let store = PersistenceStore::new(path.clone());
    let manager = Arc::new(ExitManager::load(store, broker.as_ref(), now).await.expect("fresh store loads cleanly"));
    manager.register(trade, now).await.expect("register persists cleanly");

    let monitor = ExitMonitor::new(
        ExitMonitorDeps {
            manager: manager.clone(),
            candle_source,
            broker: broker.clone(),
            order_flow,
            error_handler: Arc::new(ErrorHandler::new()),
        },
        StdDuration::from_secs(60),
        ExitConfig::default(),
    );

    monitor.tick(now).await;

    assert!(manager.trade(99).await.is_none(), "an orphaned trade should be unregistered, not retried forever");

    let _ = std::fs::remove_file(&path);
}
