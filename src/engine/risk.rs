//! Aggregate risk score.

use crate::domain::{LeverageLoops, StackSelection};

use super::leverage::risk_multiplier;
use super::{Formula, COMPOSITION_PENALTY, MAX_RISK};

/// Amplification applied to the aggregated score.
///
/// Leverage dominates; otherwise combining two or more risk-bearing
/// protocols costs a flat [`COMPOSITION_PENALTY`].
pub fn stacking_multiplier(loops: LeverageLoops, risk_bearing_layers: usize) -> f64 {
    if loops.is_leveraged() {
        risk_multiplier(loops.get())
    } else if risk_bearing_layers > 1 {
        COMPOSITION_PENALTY
    } else {
        1.0
    }
}

/// Total strategy risk in `[0, MAX_RISK]`.
///
/// Only selected protocols with a nonzero score take part. `Formula::Live`
/// averages them, `Formula::Gallery` takes the maximum.
pub fn total_risk(selection: &StackSelection, loops: LeverageLoops, formula: Formula) -> f64 {
    let scores: Vec<f64> = selection
        .selected()
        .filter(|(_, protocol)| protocol.is_risk_bearing())
        .map(|(_, protocol)| protocol.risk_score)
        .collect();

    if scores.is_empty() {
        return 0.0;
    }

    let aggregate = match formula {
        Formula::Live => scores.iter().sum::<f64>() / scores.len() as f64,
        Formula::Gallery => scores.iter().copied().fold(f64::MIN, f64::max),
    };

    (aggregate * stacking_multiplier(loops, scores.len())).clamp(0.0, MAX_RISK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Layer, LayerSelection, Protocol, ProtocolId};

    const EPS: f64 = 1e-9;

    fn protocol(id: &str, layer: Layer, risk: f64) -> Protocol {
        Protocol {
            id: ProtocolId::from(id),
            name: id.to_string(),
            category: "Test".to_string(),
            layer,
            base_apy: 1.0,
            risk_score: risk,
            description: String::new(),
            feed: None,
        }
    }

    #[test]
    fn test_empty_selection_is_zero() {
        for formula in [Formula::Live, Formula::Gallery] {
            assert_eq!(total_risk(&StackSelection::new(), LeverageLoops::one(), formula), 0.0);
            assert_eq!(total_risk(&StackSelection::new(), LeverageLoops::clamped(5), formula), 0.0);
        }
    }

    #[test]
    fn test_zero_scores_are_excluded() {
        let selection = StackSelection::new()
            .with_protocol(protocol("usdc", Layer::Base, 0.0))
            .with_protocol(protocol("noop", Layer::Optimize, 0.0));
        for formula in [Formula::Live, Formula::Gallery] {
            let risk = total_risk(&selection, LeverageLoops::clamped(3), formula);
            assert_eq!(risk, 0.0);
            assert!(!risk.is_nan());
        }
    }

    #[test]
    fn test_zero_score_does_not_dilute_average() {
        let selection = StackSelection::new()
            .with_protocol(protocol("usdc", Layer::Base, 0.0))
            .with_protocol(protocol("aave", Layer::Engine, 4.0));
        assert_eq!(total_risk(&selection, LeverageLoops::one(), Formula::Live), 4.0);
    }

    #[test]
    fn test_single_layer_unscaled() {
        let selection = StackSelection::new().with_protocol(protocol("eth", Layer::Base, 2.0));
        assert_eq!(total_risk(&selection, LeverageLoops::one(), Formula::Live), 2.0);
        assert_eq!(total_risk(&selection, LeverageLoops::one(), Formula::Gallery), 2.0);
    }

    #[test]
    fn test_live_average_with_composition_penalty() {
        let selection = StackSelection::new()
            .with_protocol(protocol("eth", Layer::Base, 2.0))
            .with_protocol(protocol("etherfi", Layer::Engine, 4.0))
            .with(Layer::Income, LayerSelection::Skipped);
        let risk = total_risk(&selection, LeverageLoops::one(), Formula::Live);
        assert!((risk - 3.0 * 1.2).abs() < EPS);
    }

    #[test]
    fn test_gallery_max_with_composition_penalty() {
        let selection = StackSelection::new()
            .with_protocol(protocol("eth", Layer::Base, 2.0))
            .with_protocol(protocol("etherfi", Layer::Engine, 4.0));
        let risk = total_risk(&selection, LeverageLoops::one(), Formula::Gallery);
        assert!((risk - 4.0 * 1.2).abs() < EPS);
    }

    #[test]
    fn test_leverage_multiplier_replaces_penalty() {
        let selection = StackSelection::new()
            .with_protocol(protocol("eth", Layer::Base, 2.0))
            .with_protocol(protocol("etherfi", Layer::Engine, 4.0));
        let risk = total_risk(&selection, LeverageLoops::clamped(2), Formula::Live);
        assert!((risk - 3.0 * 1.8).abs() < EPS);
    }

    #[test]
    fn test_clamped_to_ten() {
        let selection = Layer::ALL
            .into_iter()
            .fold(StackSelection::new(), |acc, layer| {
                acc.with_protocol(protocol(layer.as_str(), layer, 10.0))
            });
        for formula in [Formula::Live, Formula::Gallery] {
            assert_eq!(total_risk(&selection, LeverageLoops::clamped(5), formula), 10.0);
            assert_eq!(total_risk(&selection, LeverageLoops::one(), formula), 10.0);
        }
    }

    #[test]
    fn test_stacking_multiplier() {
        assert_eq!(stacking_multiplier(LeverageLoops::one(), 0), 1.0);
        assert_eq!(stacking_multiplier(LeverageLoops::one(), 1), 1.0);
        assert_eq!(stacking_multiplier(LeverageLoops::one(), 2), 1.2);
        assert_eq!(stacking_multiplier(LeverageLoops::clamped(5), 1), 3.0);
    }
}
