use crate::domain::range::RangeStructure;
use crate::domain::trading::OrderSide;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A durable, broker-ticket-keyed record of an open trade, owned exclusively by
/// the Exit Manager and mutated only through its locked accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTrade {
    pub ticket: u64,
    pub symbol: String,
    pub strategy_id: String,
    pub direction: OrderSide,
    /// Value copy taken at registration time; later range mutations upstream
    /// never alias this.
    pub range_snapshot: RangeStructure,
    pub entry: Decimal,
    pub sl: Decimal,
    pub tp: Decimal,
    pub entry_time: DateTime<Utc>,
    pub breakeven_moved: bool,
    pub last_range_check: Option<DateTime<Utc>>,
    pub last_state_change: DateTime<Utc>,
}

impl ActiveTrade {
    /// `R`, the price risk per unit position, fixed at entry.
    pub fn risk_per_unit(&self) -> Decimal {
        (self.entry - self.sl).abs()
    }

    /// Signed profit in units of `R` at `current_price`.
    pub fn profit_r(&self, current_price: Decimal) -> Decimal {
        let risk = self.risk_per_unit();
        if risk == Decimal::ZERO {
            return Decimal::ZERO;
        }
        let signed = match self.direction {
            OrderSide::Buy => current_price - self.entry,
            OrderSide::Sell => self.entry - current_price,
        };
        signed / risk
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExitPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitAction {
    ExitNow,
    ExitAtProfit,
    MoveSlToBreakeven,
    ExitEarly,
}

/// An early-exit recommendation from the Exit Manager's priority ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitSignal {
    pub priority: ExitPriority,
    pub reason_tag: String,
    pub action: ExitAction,
    pub min_profit_r: Option<Decimal>,
    pub exit_at_profit_r: Option<Decimal>,
    /// The computed SL price for `ExitAction::MoveSlToBreakeven`; unused by
    /// every other action.
    pub breakeven_price: Option<Decimal>,
    pub message: String,
}

impl ExitSignal {
    pub fn new(
        priority: ExitPriority,
        reason_tag: impl Into<String>,
        action: ExitAction,
        message: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            reason_tag: reason_tag.into(),
            action,
            min_profit_r: None,
            exit_at_profit_r: None,
            breakeven_price: None,
            message: message.into(),
        }
    }

    pub fn with_min_profit_r(mut self, r: Decimal) -> Self {
        self.min_profit_r = Some(r);
        self
    }

    pub fn with_exit_at_profit_r(mut self, r: Decimal) -> Self {
        self.exit_at_profit_r = Some(r);
        self
    }

    pub fn with_breakeven_price(mut self, price: Decimal) -> Self {
        self.breakeven_price = Some(price);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_critical_above_low() {
        assert!(ExitPriority::Critical > ExitPriority::High);
        assert!(ExitPriority::High > ExitPriority::Medium);
        assert!(ExitPriority::Medium > ExitPriority::Low);
    }
}
