use crate::catalog::{Catalog, ProtocolOption};
use crate::domain::{Layer, Protocol, RateBook};
use crate::engine::{
    stack_metrics, total_apy, total_risk, ApyResolver, Formula, LeveragedPosition, StackMetrics,
};
use std::sync::Arc;
use tokio::sync::watch;

use super::state::{Action, SelectionState};

/// Holds the current [`SelectionState`] for one session.
///
/// Mutations are read-modify-write through the reducer; subscribers are
/// notified on every dispatch. Calculations always use [`Formula::Live`].
#[derive(Debug)]
pub struct SelectionStore {
    catalog: Arc<Catalog>,
    state: watch::Sender<SelectionState>,
}

impl SelectionStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let (state, _) = watch::channel(SelectionState::new());
        Self { catalog, state }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Apply `action` and return the resulting snapshot. Last write wins.
    pub fn dispatch(&self, action: Action) -> SelectionState {
        let mut applied = None;
        self.state.send_modify(|state| {
            *state = state.apply(action);
            applied = Some(state.clone());
        });
        applied.unwrap_or_else(|| self.snapshot())
    }

    fn resolver<'a>(&'a self, rates: &'a RateBook) -> ApyResolver<'a> {
        ApyResolver::new()
            .with_rules(self.catalog.rules())
            .with_rates(rates)
    }

    pub fn total_apy(&self, rates: &RateBook) -> f64 {
        let state = self.state.borrow();
        total_apy(
            &state.selection,
            state.leverage_loops,
            &self.resolver(rates),
            Formula::Live,
        )
    }

    pub fn total_risk(&self) -> f64 {
        let state = self.state.borrow();
        total_risk(&state.selection, state.leverage_loops, Formula::Live)
    }

    /// The looped position, when a credit protocol is selected.
    pub fn leveraged_position(&self, rates: &RateBook) -> Option<LeveragedPosition> {
        self.metrics(rates).leverage
    }

    pub fn metrics(&self, rates: &RateBook) -> StackMetrics {
        let state = self.state.borrow();
        stack_metrics(
            &state.selection,
            state.leverage_loops,
            &self.resolver(rates),
            Formula::Live,
        )
    }

    pub fn is_compatible(&self, protocol: &Protocol, layer: Layer) -> bool {
        let state = self.state.borrow();
        self.catalog
            .rules()
            .is_compatible(protocol, layer, &state.selection)
    }

    pub fn options(&self, layer: Layer) -> Vec<ProtocolOption> {
        let state = self.state.borrow();
        self.catalog.compatible_options(layer, &state.selection)
    }
}
