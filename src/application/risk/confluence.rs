use crate::domain::config::main_config::ConfluenceWeights;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Raw observations the weighted 3-confluence score is built from.
#[derive(Debug, Clone, Copy)]
pub struct ConfluenceInputs {
    pub total_touches: usize,
    pub distance_from_vwap_atr: Decimal,
    pub in_critical_gap: bool,
    pub at_pdh_pdl: bool,
    pub rsi_extreme: bool,
    pub rejection_wick: bool,
    pub tape_pressure_present: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfluenceBreakdown {
    pub structure_pts: Decimal,
    pub location_pts: Decimal,
    pub confirmation_pts: Decimal,
    pub total: Decimal,
    pub passed: bool,
    pub missing: Vec<&'static str>,
}

/// Weighted 3-confluence score (0-100). Structure/location/confirmation each
/// contribute a fraction of their configured weight; `total >= threshold`
/// passes the gate.
pub fn score_confluence(inputs: &ConfluenceInputs, weights: &ConfluenceWeights, threshold: Decimal) -> ConfluenceBreakdown {
    let mut missing = Vec::new();

    let structure_pts = if inputs.total_touches >= 3 {
        weights.structure
    } else if inputs.total_touches == 2 {
        weights.structure * dec!(0.7)
    } else {
        missing.push("structure");
        Decimal::ZERO
    };

    let location_pts = if inputs.distance_from_vwap_atr >= dec!(0.75) || inputs.in_critical_gap || inputs.at_pdh_pdl {
        weights.location
    } else if inputs.distance_from_vwap_atr >= dec!(0.375) {
        weights.location * dec!(0.6)
    } else {
        missing.push("location");
        Decimal::ZERO
    };

    let confirmation_pts = if inputs.rsi_extreme || inputs.rejection_wick || inputs.tape_pressure_present {
        weights.confirmation
    } else {
        missing.push("confirmation");
        Decimal::ZERO
    };

    let total = structure_pts + location_pts + confirmation_pts;
    ConfluenceBreakdown {
        structure_pts,
        location_pts,
        confirmation_pts,
        total,
        passed: total >= threshold,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> ConfluenceWeights {
        ConfluenceWeights { structure: dec!(40), location: dec!(35), confirmation: dec!(25) }
    }

    #[test]
    fn full_marks_pass_the_gate() {
        let inputs = ConfluenceInputs {
            total_touches: 3,
            distance_from_vwap_atr: dec!(1),
            in_critical_gap: false,
            at_pdh_pdl: false,
            rsi_extreme: true,
            rejection_wick: false,
            tape_pressure_present: false,
        };
        let breakdown = score_confluence(&inputs, &weights(), dec!(80));
        assert_eq!(breakdown.total, dec!(100));
        assert!(breakdown.passed);
        assert!(breakdown.missing.is_empty());
    }

    #[test]
    fn removing_a_confirmation_signal_never_increases_the_score() {
        let weights = weights();
        let with_confirmation = ConfluenceInputs {
            total_touches: 3,
            distance_from_vwap_atr: dec!(1),
            in_critical_gap: false,
            at_pdh_pdl: false,
            rsi_extreme: true,
            rejection_wick: true,
            tape_pressure_present: false,
        };
        let mut without_rsi = with_confirmation;
        without_rsi.rsi_extreme = false;

        let before = score_confluence(&with_confirmation, &weights, dec!(80)).total;
        let after = score_confluence(&without_rsi, &weights, dec!(80)).total;
        assert!(after <= before);
    }

    #[test]
    fn two_touches_scores_partial_structure() {
        let inputs = ConfluenceInputs {
            total_touches: 2,
            distance_from_vwap_atr: dec!(0),
            in_critical_gap: false,
            at_pdh_pdl: false,
            rsi_extreme: false,
            rejection_wick: false,
            tape_pressure_present: false,
        };
        let breakdown = score_confluence(&inputs, &weights(), dec!(80));
        assert_eq!(breakdown.structure_pts, dec!(28));
        assert!(!breakdown.passed);
    }
}
