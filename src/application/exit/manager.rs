use super::breakeven::compute_breakeven;
use super::ladder::{check_exit, LadderContext};
use super::persistence::PersistenceStore;
use super::reentry::can_reenter;
use crate::domain::broker::{BrokerGateway, OrderRequest, TradeAction};
use crate::domain::config::ExitConfig;
use crate::domain::errors::ExitManagerError;
use crate::domain::trade::{ActiveTrade, ExitAction, ExitSignal};
use crate::domain::trading::OrderSide;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Slippage tolerance widens over successive retries of a rejected exit
/// order, capped at 0.15% of the reference price (§7 recovery policy).
const EXIT_RETRY_SLIPPAGE_PCT: [Decimal; 3] = [dec!(0.0005), dec!(0.001), dec!(0.0015)];
const DEFAULT_DEVIATION_POINTS: u32 = 20;

fn deviation_points_for(reference_price: Decimal, point: Option<Decimal>, slippage_pct: Decimal) -> u32 {
    let Some(point) = point.filter(|p| *p > Decimal::ZERO) else {
        return DEFAULT_DEVIATION_POINTS;
    };
    ((reference_price * slippage_pct) / point).to_u32().unwrap_or(DEFAULT_DEVIATION_POINTS).max(1)
}

/// Owns the map of open trades this engine is tracking exits for. The only
/// constructor is `load`, which performs the startup-ordering invariant: state
/// must be read and cross-checked against the broker before any caller can
/// observe `active_tickets()`.
pub struct ExitManager {
    trades: RwLock<HashMap<u64, ActiveTrade>>,
    store: PersistenceStore,
    save_lock: tokio::sync::Mutex<()>,
}

impl ExitManager {
    /// Loads persisted trades, drops any ticket the broker no longer reports
    /// open, and re-saves the cleaned state before returning.
    pub async fn load(store: PersistenceStore, broker: &dyn BrokerGateway, now: DateTime<Utc>) -> Result<Self, ExitManagerError> {
        let mut trades = store.load()?;
        let open: std::collections::HashSet<u64> = broker.positions_get().await.into_iter().map(|p| p.ticket).collect();
        let before = trades.len();
        trades.retain(|ticket, _| open.contains(ticket));
        if trades.len() != before {
            warn!(dropped = before - trades.len(), "dropped orphaned trades not found in broker positions");
        }

        let manager = Self { trades: RwLock::new(trades), store, save_lock: tokio::sync::Mutex::new(()) };
        manager.force_save(now).await?;
        Ok(manager)
    }

    async fn force_save(&self, now: DateTime<Utc>) -> Result<(), ExitManagerError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.trades.read().await.clone();
        self.store.save(&snapshot, now)
    }

    pub async fn register(&self, trade: ActiveTrade, now: DateTime<Utc>) -> Result<(), ExitManagerError> {
        let ticket = trade.ticket;
        self.trades.write().await.insert(ticket, trade);
        info!(ticket, "registered active trade");
        self.force_save(now).await
    }

    pub async fn update_state(&self, ticket: u64, now: DateTime<Utc>, patch: impl FnOnce(&mut ActiveTrade)) -> Result<(), ExitManagerError> {
        {
            let mut trades = self.trades.write().await;
            let trade = trades.get_mut(&ticket).ok_or(ExitManagerError::UnknownTicket { ticket })?;
            patch(trade);
            trade.last_state_change = now;
        }
        self.force_save(now).await
    }

    pub async fn unregister(&self, ticket: u64, now: DateTime<Utc>) -> Result<(), ExitManagerError> {
        self.trades.write().await.remove(&ticket);
        info!(ticket, "unregistered active trade");
        self.force_save(now).await
    }

    pub async fn active_tickets(&self) -> Vec<u64> {
        self.trades.read().await.keys().copied().collect()
    }

    pub async fn trade(&self, ticket: u64) -> Option<ActiveTrade> {
        self.trades.read().await.get(&ticket).cloned()
    }

    pub fn check_exit(&self, trade: &ActiveTrade, current_price: Decimal, ctx: &LadderContext, exit_config: &ExitConfig) -> Option<ExitSignal> {
        check_exit(trade, current_price, ctx, exit_config)
    }

    pub fn compute_breakeven(
        &self,
        entry: Decimal,
        direction: OrderSide,
        current_price: Decimal,
        effective_atr: Decimal,
        min_stop_distance: Decimal,
        offset_atr_mult: Decimal,
    ) -> Option<Decimal> {
        compute_breakeven(entry, direction, current_price, effective_atr, min_stop_distance, offset_atr_mult)
    }

    pub fn can_reenter(&self, reason_tag: &str, minutes_since_exit: i64, cooldown_min: i64) -> bool {
        can_reenter(reason_tag, minutes_since_exit, cooldown_min)
    }

    /// Dispatches the exit order to the broker, retrying a rejected `Deal`
    /// order up to 3 times with progressively wider slippage tolerance.
    /// Returns `false` (never errors) if every attempt is rejected or the
    /// manager has no record of `ticket` — the caller logs/classifies via
    /// the error handler.
    pub async fn execute(&self, ticket: u64, signal: &ExitSignal, current_price: Decimal, broker: &dyn BrokerGateway) -> bool {
        let Some(trade) = self.trade(ticket).await else {
            warn!(ticket, "execute called for an unregistered ticket");
            return false;
        };

        if !matches!(signal.action, ExitAction::ExitNow | ExitAction::ExitAtProfit | ExitAction::ExitEarly) {
            let request = OrderRequest {
                action: TradeAction::SlTp,
                ticket,
                symbol: trade.symbol.clone(),
                volume: None,
                sl: Some(signal.breakeven_price.unwrap_or(trade.entry)),
                tp: Some(trade.tp),
                deviation_points: 0,
            };
            let result = broker.order_send(request).await;
            if result.is_success() {
                info!(ticket, reason = %signal.reason_tag, "exit order dispatched");
            } else {
                warn!(ticket, reason = %signal.reason_tag, comment = %result.comment, "exit order rejected");
            }
            return result.is_success();
        }

        let point = broker.symbol_info(&trade.symbol).await.map(|info| info.point);
        for (attempt, slippage_pct) in EXIT_RETRY_SLIPPAGE_PCT.iter().enumerate() {
            let request = OrderRequest {
                action: TradeAction::Deal,
                ticket,
                symbol: trade.symbol.clone(),
                volume: None,
                sl: None,
                tp: None,
                deviation_points: deviation_points_for(current_price, point, *slippage_pct),
            };
            let result = broker.order_send(request).await;
            if result.is_success() {
                info!(ticket, reason = %signal.reason_tag, attempt, "exit order dispatched");
                return true;
            }
            warn!(ticket, reason = %signal.reason_tag, comment = %result.comment, attempt, "exit order rejected, widening slippage");
        }
        false
    }
}

pub type SharedExitManager = Arc<ExitManager>;
