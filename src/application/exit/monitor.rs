use super::ladder::{check_exit, LadderContext};
use super::manager::ExitManager;
use crate::application::error_handler::ErrorHandler;
use crate::domain::broker::BrokerGateway;
use crate::domain::candle_source::CandleSource;
use crate::domain::config::ExitConfig;
use crate::domain::indicators::{atr, bollinger, vwap_momentum_atr_per_bar};
use crate::domain::indicators::atr::DEFAULT_ATR_PERIOD;
use crate::domain::indicators::bollinger::DEFAULT_BB_PERIOD;
use crate::domain::order_flow::OrderFlowSource;
use crate::domain::range::{check_invalidation, cvd_divergence_strength};
use crate::domain::structure::{detect_bos_choch, detect_swings, label_swings};
use crate::domain::trade::ExitAction;
use crate::domain::trading::{OrderSide, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{error, warn};

pub const DEFAULT_POLL_PERIOD: StdDuration = StdDuration::from_secs(5 * 60);
const DEFAULT_MIN_STOP_DISTANCE: Decimal = rust_decimal_macros::dec!(0.0005);
const VWAP_MOMENTUM_WINDOW_BARS: usize = 20;

/// Everything the Exit Monitor needs to run a tick, gathered here so the
/// periodic loop stays a thin driver over ports it doesn't own.
pub struct ExitMonitorDeps {
    pub manager: Arc<ExitManager>,
    pub candle_source: Arc<dyn CandleSource>,
    pub broker: Arc<dyn BrokerGateway>,
    pub order_flow: Arc<dyn OrderFlowSource>,
    pub error_handler: Arc<ErrorHandler>,
}

/// Cooperative periodic worker (C10): on every tick, re-evaluates every
/// registered trade against the exit ladder and dispatches whatever it
/// recommends. Every fallible step is caught and classified through the error
/// handler; nothing here aborts the loop.
pub struct ExitMonitor {
    deps: ExitMonitorDeps,
    poll_period: StdDuration,
    exit_config: ExitConfig,
}

impl ExitMonitor {
    pub fn new(deps: ExitMonitorDeps, poll_period: StdDuration, exit_config: ExitConfig) -> Self {
        Self { deps, poll_period, exit_config }
    }

    pub async fn run_forever(&self) {
        let mut ticker = tokio::time::interval(self.poll_period);
        loop {
            ticker.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    /// Runs a single pass over every active ticket. Public for tests and for
    /// callers that drive their own scheduling loop.
    pub async fn tick(&self, now: DateTime<Utc>) {
        for ticket in self.deps.manager.active_tickets().await {
            if let Err(reason) = self.tick_one(ticket, now).await {
                let (_, disabled) = self.deps.error_handler.record(&reason, std::time::Instant::now());
                if disabled {
                    error!(ticket, reason, "order dispatch auto-disabled after repeated critical errors");
                } else {
                    warn!(ticket, reason, "exit monitor tick failed for this ticket");
                }
            }
        }
    }

    async fn tick_one(&self, ticket: u64, now: DateTime<Utc>) -> Result<(), &'static str> {
        let Some(trade) = self.deps.manager.trade(ticket).await else {
            return Ok(());
        };

        let Some(position) = self.deps.broker.position_get(ticket).await else {
            self.deps.manager.unregister(ticket, now).await.map_err(|_| "state_save_failed")?;
            return Err("orphaned_trades");
        };
        let _ = position;

        let m5 = self.deps.candle_source.window(&trade.symbol, Timeframe::M5, 200).await;
        let Some(current_candle) = m5.last() else {
            return Err("monitoring_error");
        };
        let current_price = current_candle.close;

        let atr_5m = atr(&m5, DEFAULT_ATR_PERIOD);
        let effective_atr = atr_5m.max(trade.risk_per_unit() * rust_decimal_macros::dec!(0.1));
        let min_stop_distance = DEFAULT_MIN_STOP_DISTANCE;

        let vwap_momentum = vwap_momentum_atr_per_bar(&m5, atr_5m, VWAP_MOMENTUM_WINDOW_BARS.min(m5.len().max(2)));
        let bb_now = bollinger(&m5, DEFAULT_BB_PERIOD, 2.0).width();
        let bb_earlier = if m5.len() > DEFAULT_BB_PERIOD { bollinger(&m5[..m5.len() - DEFAULT_BB_PERIOD], DEFAULT_BB_PERIOD, 2.0).width() } else { bb_now };

        let m15 = self.deps.candle_source.window(&trade.symbol, Timeframe::M15, 200).await;
        let m15_bos_confirmed = {
            let swings = detect_swings(&m15);
            let labeled = label_swings(&swings);
            let atr_15m = atr(&m15, DEFAULT_ATR_PERIOD);
            let bos = detect_bos_choch(&labeled, current_price, m15.len().saturating_sub(1), atr_15m);
            match trade.direction {
                OrderSide::Buy => bos.bearish_bos || bos.bearish_choch,
                OrderSide::Sell => bos.bullish_bos || bos.bullish_choch,
            }
        };

        let (_, invalidation_flags) = check_invalidation(&trade.range_snapshot, &m5, vwap_momentum, bb_now, bb_earlier, m15_bos_confirmed);

        let cvd_strength = cvd_divergence_strength(&m5);

        let tape_pressure_against = match self.deps.order_flow.tape_pressure(&trade.symbol).await {
            Some(pressure) => match trade.direction {
                OrderSide::Buy => (-pressure).max(Decimal::ZERO),
                OrderSide::Sell => pressure.max(Decimal::ZERO),
            },
            None => Decimal::ZERO,
        };

        let time_in_trade_min = now.signed_duration_since(trade.entry_time).num_minutes();
        let tp_reached = match trade.direction {
            OrderSide::Buy => current_price >= trade.tp,
            OrderSide::Sell => current_price <= trade.tp,
        };

        let ctx = LadderContext {
            time_in_trade_min,
            invalidation_flags,
            m15_bos_confirmed,
            cvd_divergence_strength: cvd_strength,
            tape_pressure_against_position: tape_pressure_against,
            tp_reached,
            effective_atr,
            min_stop_distance,
        };

        if let Some(signal) = check_exit(&trade, current_price, &ctx, &self.exit_config) {
            let dispatched = self.deps.manager.execute(ticket, &signal, current_price, self.deps.broker.as_ref()).await;
            if !dispatched {
                return Err("exit_order_fails");
            }

            if signal.action == ExitAction::MoveSlToBreakeven {
                let be_price = signal.breakeven_price.unwrap_or(trade.sl);
                self.deps
                    .manager
                    .update_state(ticket, now, |t| {
                        t.sl = be_price;
                        t.breakeven_moved = true;
                    })
                    .await
                    .map_err(|_| "state_save_failed")?;
            } else {
                self.deps
                    .manager
                    .unregister(ticket, now)
                    .await
                    .map_err(|_| "state_save_failed")?;
            }
        }

        Ok(())
    }
}
