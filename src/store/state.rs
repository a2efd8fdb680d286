//! Immutable selection snapshots and the reducer that advances them.

use crate::domain::{Layer, LayerSelection, LeverageLoops, Protocol, StackSelection, Strategy};
use serde::Serialize;

/// Everything the builder remembers about one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selection: StackSelection,
    pub leverage_loops: LeverageLoops,
    /// Hide protocol branding in summaries.
    pub whitelabel: bool,
}

/// A state transition requested by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select { layer: Layer, protocol: Protocol },
    Skip(Layer),
    Clear(Layer),
    /// Raw loop count; clamped into range when applied.
    SetLeverageLoops(i64),
    SetWhitelabel(bool),
    /// Replace the stack and loops with a gallery strategy's.
    LoadStrategy(Box<Strategy>),
    /// Back to an empty stack at 1x. The whitelabel mode survives.
    Reset,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next snapshot. Any combination of filled and empty
    /// layers is accepted; step ordering is the caller's concern.
    pub fn apply(&self, action: Action) -> SelectionState {
        let mut next = self.clone();
        match action {
            Action::Select { layer, protocol } => {
                next.selection.set(layer, LayerSelection::Selected(protocol));
            }
            Action::Skip(layer) => next.selection.set(layer, LayerSelection::Skipped),
            Action::Clear(layer) => next.selection.set(layer, LayerSelection::Empty),
            Action::SetLeverageLoops(raw) => next.leverage_loops = LeverageLoops::clamped(raw),
            Action::SetWhitelabel(enabled) => next.whitelabel = enabled,
            Action::LoadStrategy(strategy) => {
                next.selection = strategy.selection;
                next.leverage_loops = strategy.leverage_loops;
            }
            Action::Reset => {
                next = SelectionState {
                    whitelabel: self.whitelabel,
                    ..SelectionState::default()
                };
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProtocolId;

    fn protocol(id: &str, layer: Layer) -> Protocol {
        Protocol {
            id: ProtocolId::from(id),
            name: id.to_string(),
            category: "Test".to_string(),
            layer,
            base_apy: 2.0,
            risk_score: 2.0,
            description: String::new(),
            feed: None,
        }
    }

    #[test]
    fn test_apply_leaves_previous_snapshot_untouched() {
        let before = SelectionState::new();
        let after = before.apply(Action::Select {
            layer: Layer::Base,
            protocol: protocol("eth", Layer::Base),
        });
        assert!(before.selection.is_empty());
        assert_eq!(after.selection.protocol(Layer::Base).unwrap().id.as_str(), "eth");
    }

    #[test]
    fn test_skip_and_clear() {
        let state = SelectionState::new()
            .apply(Action::Skip(Layer::Credit))
            .apply(Action::Skip(Layer::Income));
        assert!(state.selection.credit.is_skipped());

        let state = state.apply(Action::Clear(Layer::Credit));
        assert_eq!(state.selection.credit, LayerSelection::Empty);
        assert!(state.selection.income.is_skipped());
    }

    #[test]
    fn test_leverage_loops_clamped() {
        let state = SelectionState::new().apply(Action::SetLeverageLoops(12));
        assert_eq!(state.leverage_loops.get(), 5);
        let state = state.apply(Action::SetLeverageLoops(-1));
        assert_eq!(state.leverage_loops.get(), 1);
    }

    #[test]
    fn test_load_strategy_replaces_stack_and_loops() {
        let strategy = Strategy {
            id: "s".to_string(),
            name: "S".to_string(),
            description: String::new(),
            tags: vec![],
            selection: StackSelection::new()
                .with_protocol(protocol("eth", Layer::Base))
                .with(Layer::Engine, LayerSelection::Skipped),
            leverage_loops: LeverageLoops::clamped(3),
            total_apy: 0.0,
            total_risk: 0.0,
        };

        let state = SelectionState::new()
            .apply(Action::SetWhitelabel(true))
            .apply(Action::Select {
                layer: Layer::Optimize,
                protocol: protocol("yearn", Layer::Optimize),
            })
            .apply(Action::LoadStrategy(Box::new(strategy.clone())));

        assert_eq!(state.selection, strategy.selection);
        assert_eq!(state.leverage_loops.get(), 3);
        assert!(state.whitelabel);
    }

    #[test]
    fn test_reset_keeps_whitelabel() {
        let state = SelectionState::new()
            .apply(Action::SetWhitelabel(true))
            .apply(Action::SetLeverageLoops(4))
            .apply(Action::Skip(Layer::Engine))
            .apply(Action::Reset);

        assert!(state.selection.is_empty());
        assert_eq!(state.leverage_loops, LeverageLoops::one());
        assert!(state.whitelabel);
    }
}
