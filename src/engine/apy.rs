//! Strategy APY.

use crate::domain::{Layer, LayerSelection, LeverageLoops, RateBook, StackSelection};
use serde::Serialize;

use super::compatibility::CompatibilityRules;
use super::leverage::leveraged_apy;
use super::{Formula, DEFAULT_LTV};

/// Where a layer's APY figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApySource {
    /// Live rate feed.
    Live,
    /// Pairing override from the upstream protocol's compatibility rule.
    Override,
    /// Static catalog number.
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedApy {
    pub value: f64,
    pub source: ApySource,
}

/// Resolves the APY of a selected layer.
///
/// Precedence: live rate, then compatibility override, then catalog
/// `base_apy`. Risk scores are never resolved through here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApyResolver<'a> {
    rules: Option<&'a CompatibilityRules>,
    rates: Option<&'a RateBook>,
}

impl<'a> ApyResolver<'a> {
    /// Catalog numbers only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: &'a CompatibilityRules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_rates(mut self, rates: &'a RateBook) -> Self {
        self.rates = Some(rates);
        self
    }

    /// Resolved APY for `layer`, or `None` when nothing is selected there.
    pub fn resolve(&self, selection: &StackSelection, layer: Layer) -> Option<ResolvedApy> {
        let LayerSelection::Selected(protocol) = selection.get(layer) else {
            return None;
        };

        if let Some(rate) = self.rates.and_then(|book| book.get(&protocol.id)) {
            return Some(ResolvedApy {
                value: rate.current_apy,
                source: ApySource::Live,
            });
        }

        if let Some(value) = self
            .rules
            .and_then(|rules| rules.apy_override(protocol, layer, selection))
        {
            return Some(ResolvedApy {
                value,
                source: ApySource::Override,
            });
        }

        Some(ResolvedApy {
            value: protocol.base_apy,
            source: ApySource::Catalog,
        })
    }

    /// APY contributed by `layer`; zero when empty or skipped.
    pub fn layer_apy(&self, selection: &StackSelection, layer: Layer) -> f64 {
        self.resolve(selection, layer).map_or(0.0, |r| r.value)
    }
}

/// Yield earned on deposited capital: base, engine and income.
///
/// Credit and optimizer are excluded; they are applied around the
/// leverage loop by [`total_apy`].
pub fn core_yield(selection: &StackSelection, apy: &ApyResolver<'_>, formula: Formula) -> f64 {
    let base = apy.layer_apy(selection, Layer::Base);
    let engine = apy.layer_apy(selection, Layer::Engine);
    let income = apy.layer_apy(selection, Layer::Income);

    match formula {
        Formula::Live => base + engine + income,
        // A fixed-income wrapper substitutes for the engine's floating yield.
        Formula::Gallery if income != 0.0 => base + income,
        Formula::Gallery => base + engine,
    }
}

/// Total strategy APY.
///
/// With an active credit layer and more than one loop, the core yield is
/// levered at [`DEFAULT_LTV`] against `|credit apy|`. Otherwise credit is
/// added flatly at 1x. The optimizer is added once, outside the loop.
pub fn total_apy(
    selection: &StackSelection,
    loops: LeverageLoops,
    apy: &ApyResolver<'_>,
    formula: Formula,
) -> f64 {
    let core = core_yield(selection, apy, formula);
    let optimizer = apy.layer_apy(selection, Layer::Optimize);
    let credit = apy.resolve(selection, Layer::Credit);

    match credit {
        Some(credit) if loops.is_leveraged() => {
            let borrow_cost = credit.value.abs();
            leveraged_apy(core, borrow_cost, DEFAULT_LTV, loops.get()).effective_apy + optimizer
        }
        Some(credit) => core + optimizer + credit.value,
        None => core + optimizer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LiveRate, Protocol, ProtocolId};
    use crate::engine::compatibility::CompatibilityRule;
    use chrono::Utc;

    const EPS: f64 = 1e-9;

    fn protocol(id: &str, layer: Layer, apy: f64) -> Protocol {
        Protocol {
            id: ProtocolId::from(id),
            name: id.to_string(),
            category: "Test".to_string(),
            layer,
            base_apy: apy,
            risk_score: 3.0,
            description: String::new(),
            feed: None,
        }
    }

    fn full_stack() -> StackSelection {
        StackSelection::new()
            .with_protocol(protocol("usdc", Layer::Base, 0.0))
            .with_protocol(protocol("susde", Layer::Engine, 9.0))
            .with_protocol(protocol("pt", Layer::Income, 12.0))
            .with_protocol(protocol("morpho", Layer::Credit, -5.0))
            .with_protocol(protocol("yearn", Layer::Optimize, 1.0))
    }

    #[test]
    fn test_empty_selection_is_zero() {
        let apy = ApyResolver::new();
        for formula in [Formula::Live, Formula::Gallery] {
            assert_eq!(total_apy(&StackSelection::new(), LeverageLoops::one(), &apy, formula), 0.0);
        }
    }

    #[test]
    fn test_additive_at_one_loop() {
        let selection = StackSelection::new()
            .with_protocol(protocol("eth", Layer::Base, 0.0))
            .with_protocol(protocol("aave", Layer::Engine, 4.2));
        let total = total_apy(&selection, LeverageLoops::one(), &ApyResolver::new(), Formula::Live);
        assert_eq!(total, 4.2);
    }

    #[test]
    fn test_live_formula_stacks_income_on_engine() {
        let selection = full_stack().with(Layer::Credit, LayerSelection::Skipped);
        let total = total_apy(&selection, LeverageLoops::one(), &ApyResolver::new(), Formula::Live);
        assert!((total - (0.0 + 9.0 + 12.0 + 1.0)).abs() < EPS);
    }

    #[test]
    fn test_gallery_formula_income_replaces_engine() {
        let selection = full_stack().with(Layer::Credit, LayerSelection::Skipped);
        let total = total_apy(&selection, LeverageLoops::one(), &ApyResolver::new(), Formula::Gallery);
        assert!((total - (0.0 + 12.0 + 1.0)).abs() < EPS);
    }

    #[test]
    fn test_gallery_formula_zero_income_keeps_engine() {
        let selection = full_stack()
            .with_protocol(protocol("pt", Layer::Income, 0.0))
            .with(Layer::Credit, LayerSelection::Skipped);
        let core = core_yield(&selection, &ApyResolver::new(), Formula::Gallery);
        assert!((core - 9.0).abs() < EPS);

        let skipped = full_stack().with(Layer::Income, LayerSelection::Skipped);
        let core = core_yield(&skipped, &ApyResolver::new(), Formula::Gallery);
        assert!((core - 9.0).abs() < EPS);
    }

    #[test]
    fn test_skipped_engine_contributes_nothing() {
        let selection = StackSelection::new()
            .with_protocol(protocol("wsteth", Layer::Base, 3.1))
            .with(Layer::Engine, LayerSelection::Skipped);
        for formula in [Formula::Live, Formula::Gallery] {
            let total = total_apy(&selection, LeverageLoops::one(), &ApyResolver::new(), formula);
            assert!((total - 3.1).abs() < EPS);
        }
    }

    #[test]
    fn test_credit_flat_at_one_loop() {
        let total = total_apy(&full_stack(), LeverageLoops::one(), &ApyResolver::new(), Formula::Live);
        assert!((total - (21.0 + 1.0 - 5.0)).abs() < EPS);
    }

    #[test]
    fn test_leveraged_credit() {
        let loops = LeverageLoops::clamped(2);
        let total = total_apy(&full_stack(), loops, &ApyResolver::new(), Formula::Live);
        // core 21 levered 1.75x, 0.75 borrowed at 5, optimizer outside the loop
        let expected = 21.0 * 1.75 - 5.0 * 0.75 + 1.0;
        assert!((total - expected).abs() < EPS);
    }

    #[test]
    fn test_loops_ignored_without_credit() {
        let selection = full_stack().with(Layer::Credit, LayerSelection::Skipped);
        let one = total_apy(&selection, LeverageLoops::one(), &ApyResolver::new(), Formula::Live);
        let five = total_apy(&selection, LeverageLoops::clamped(5), &ApyResolver::new(), Formula::Live);
        assert_eq!(one, five);
    }

    #[test]
    fn test_positive_credit_apy_is_treated_as_cost_when_levered() {
        let selection = full_stack().with_protocol(protocol("morpho", Layer::Credit, 5.0));
        let negative = total_apy(&full_stack(), LeverageLoops::clamped(3), &ApyResolver::new(), Formula::Live);
        let positive = total_apy(&selection, LeverageLoops::clamped(3), &ApyResolver::new(), Formula::Live);
        assert!((negative - positive).abs() < EPS);
    }

    #[test]
    fn test_resolution_precedence() {
        let selection = full_stack();
        let rules = CompatibilityRules::new()
            .with_rule("susde", CompatibilityRule::new(["pt"]).with_override("pt", 18.5));
        let rates = RateBook::new(Utc::now()).with_rate(
            "susde",
            LiveRate {
                current_apy: 7.0,
                avg_apy_7d: None,
                avg_apy_30d: None,
                tvl_usd: 0.0,
                is_live: true,
            },
        );
        let apy = ApyResolver::new().with_rules(&rules).with_rates(&rates);

        let engine = apy.resolve(&selection, Layer::Engine).unwrap();
        assert_eq!(engine.source, ApySource::Live);
        assert_eq!(engine.value, 7.0);

        let income = apy.resolve(&selection, Layer::Income).unwrap();
        assert_eq!(income.source, ApySource::Override);
        assert_eq!(income.value, 18.5);

        let base = apy.resolve(&selection, Layer::Base).unwrap();
        assert_eq!(base.source, ApySource::Catalog);

        assert!(apy.resolve(&StackSelection::new(), Layer::Base).is_none());
    }
}
