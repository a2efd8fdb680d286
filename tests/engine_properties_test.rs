use std::sync::Arc;
use yieldstack::catalog::StackRefs;
use yieldstack::engine::{
    leveraged_apy, stack_metrics, total_apy, total_risk, ApyResolver, ApySource,
    CompatibilityRule, CompatibilityRules, Formula,
};
use yieldstack::{
    Action, Catalog, Layer, LayerSelection, LeverageLoops, LiveRate, Protocol, ProtocolId,
    RateBook, SelectionStore, StackSelection,
};

const EPS: f64 = 1e-9;

fn protocol(id: &str, layer: Layer, apy: f64, risk: f64) -> Protocol {
    Protocol {
        id: ProtocolId::from(id),
        name: id.to_string(),
        category: "Test".to_string(),
        layer,
        base_apy: apy,
        risk_score: risk,
        description: String::new(),
        feed: None,
    }
}

fn loops(n: i64) -> LeverageLoops {
    LeverageLoops::clamped(n)
}

#[test]
fn test_no_selection_baseline() {
    let empty = StackSelection::new();
    for formula in [Formula::Live, Formula::Gallery] {
        assert_eq!(total_apy(&empty, loops(1), &ApyResolver::new(), formula), 0.0);
        assert_eq!(total_risk(&empty, loops(1), formula), 0.0);
    }
}

#[test]
fn test_additivity_at_one_loop() {
    let selection = StackSelection::new()
        .with_protocol(protocol("usdc", Layer::Base, 0.0, 1.0))
        .with_protocol(protocol("aave", Layer::Engine, 4.2, 2.0));
    let apy = total_apy(&selection, loops(1), &ApyResolver::new(), Formula::Live);
    assert!((apy - 4.2).abs() < EPS);

    let selection = selection
        .with_protocol(protocol("pt", Layer::Income, 7.0, 4.0))
        .with_protocol(protocol("yearn", Layer::Optimize, 0.8, 3.0));
    let apy = total_apy(&selection, loops(1), &ApyResolver::new(), Formula::Live);
    assert!((apy - 12.0).abs() < EPS);
}

#[test]
fn test_leverage_identity_at_one_loop() {
    for (y, b, ltv) in [(10.0, 8.0, 0.75), (0.0, 3.0, 0.5), (-2.5, 0.0, 0.9)] {
        let position = leveraged_apy(y, b, ltv, 1);
        assert_eq!(position.effective_apy, y);
        assert_eq!(position.total_exposure, 1.0);
        assert!((position.risk_multiplier - 1.0).abs() < EPS);
    }
}

#[test]
fn test_leverage_geometric_series() {
    let position = leveraged_apy(10.0, 8.0, 0.75, 2);
    assert!((position.total_exposure - 1.75).abs() < EPS);
    assert!((position.effective_apy - 11.5).abs() < EPS);
    assert!((position.risk_multiplier - 1.8).abs() < EPS);
}

#[test]
fn test_leverage_cap() {
    assert_eq!(leveraged_apy(5.0, 4.0, 0.75, 5).risk_multiplier, 3.0);
}

#[test]
fn test_zero_risk_protocols_are_ignored() {
    let selection = StackSelection::new()
        .with_protocol(protocol("usdc", Layer::Base, 0.0, 0.0))
        .with_protocol(protocol("safe", Layer::Engine, 3.0, 0.0))
        .with(Layer::Credit, LayerSelection::Skipped);
    for formula in [Formula::Live, Formula::Gallery] {
        let risk = total_risk(&selection, loops(4), formula);
        assert_eq!(risk, 0.0);
        assert!(!risk.is_nan());
    }
}

#[test]
fn test_risk_clamped() {
    let selection = Layer::ALL
        .into_iter()
        .fold(StackSelection::new(), |s, layer| {
            s.with_protocol(protocol(layer.as_str(), layer, 1.0, 10.0))
        });
    for formula in [Formula::Live, Formula::Gallery] {
        for n in 1..=5 {
            let risk = total_risk(&selection, loops(n), formula);
            assert!((0.0..=10.0).contains(&risk));
        }
        assert_eq!(total_risk(&selection, loops(5), formula), 10.0);
    }
}

#[test]
fn test_compatibility_default_open() {
    let rules = CompatibilityRules::new()
        .with_rule("eth", CompatibilityRule::new(["lido"]));
    let anything = protocol("anything", Layer::Engine, 1.0, 1.0);

    let unruled = StackSelection::new().with_protocol(protocol("btc", Layer::Base, 0.0, 3.0));
    assert!(yieldstack::is_compatible(&anything, Layer::Engine, &unruled, &rules));

    let base_candidate = protocol("usdt", Layer::Base, 0.0, 2.0);
    let ruled = StackSelection::new().with_protocol(protocol("eth", Layer::Base, 0.0, 2.0));
    assert!(yieldstack::is_compatible(&base_candidate, Layer::Base, &ruled, &rules));
}

#[test]
fn test_compatibility_enforced() {
    let rules = CompatibilityRules::new()
        .with_rule("up", CompatibilityRule::new(["x", "y"]));
    let selection = StackSelection::new().with_protocol(protocol("up", Layer::Engine, 3.0, 2.0));

    for (id, expected) in [("x", true), ("y", true), ("z", false)] {
        let candidate = protocol(id, Layer::Income, 5.0, 3.0);
        assert_eq!(
            yieldstack::is_compatible(&candidate, Layer::Income, &selection, &rules),
            expected,
            "candidate {}",
            id
        );
    }
}

#[test]
fn test_loaded_strategy_reports_live_formula() {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let strategy = catalog.strategy("susde-pt-loop").unwrap().clone();

    // Precomputed with the gallery formula.
    assert!((strategy.total_apy - 37.28125).abs() < EPS);
    assert_eq!(strategy.total_risk, 10.0);

    let store = SelectionStore::new(catalog.clone());
    store.dispatch(Action::LoadStrategy(Box::new(strategy.clone())));

    let rates = RateBook::empty();
    let apy = store.total_apy(&rates);
    let risk = store.total_risk();

    // Live formula: 0 + 9.5 + 18.5 levered over 3 loops, minus 4.8 on the
    // borrowed share, plus 0.8 from the optimizer.
    assert!((apy - 59.25).abs() < EPS);
    assert!((risk - 8.84).abs() < EPS);

    let resolver = ApyResolver::new().with_rules(catalog.rules());
    let live = total_apy(&strategy.selection, strategy.leverage_loops, &resolver, Formula::Live);
    let gallery = total_apy(&strategy.selection, strategy.leverage_loops, &resolver, Formula::Gallery);
    assert!((apy - live).abs() < EPS);
    assert!((apy - gallery).abs() > 1.0);
    assert!((risk - total_risk(&strategy.selection, strategy.leverage_loops, Formula::Live)).abs() < EPS);
}

#[test]
fn test_live_rates_change_apy_only() {
    let catalog = Catalog::builtin().unwrap();
    let selection = catalog
        .resolve_stack(&StackRefs {
            base: Some("eth".to_string()),
            engine: Some("lido".to_string()),
            income: Some("skip".to_string()),
            ..StackRefs::default()
        })
        .unwrap();

    let rates = RateBook::new(chrono::Utc::now()).with_rate(
        "lido",
        LiveRate {
            current_apy: 2.6,
            avg_apy_7d: Some(2.9),
            avg_apy_30d: None,
            tvl_usd: 1_000_000.0,
            is_live: true,
        },
    );
    let static_metrics = stack_metrics(&selection, loops(1), &ApyResolver::new(), Formula::Live);
    let live_metrics = stack_metrics(
        &selection,
        loops(1),
        &ApyResolver::new().with_rates(&rates),
        Formula::Live,
    );

    assert!((static_metrics.total_apy - 3.1).abs() < EPS);
    assert!((live_metrics.total_apy - 2.6).abs() < EPS);
    assert_eq!(static_metrics.total_risk, live_metrics.total_risk);
    assert_eq!(live_metrics.layers[1].source, ApySource::Live);
}

#[test]
fn test_override_needs_its_upstream() {
    let catalog = Catalog::builtin().unwrap();
    let resolver = ApyResolver::new().with_rules(catalog.rules());

    let with_susde = catalog
        .resolve_stack(&StackRefs {
            base: Some("usdc".to_string()),
            engine: Some("ethena-susde".to_string()),
            income: Some("pendle-pt".to_string()),
            ..StackRefs::default()
        })
        .unwrap();
    let resolved = resolver.resolve(&with_susde, Layer::Income).unwrap();
    assert_eq!(resolved.source, ApySource::Override);
    assert!((resolved.value - 18.5).abs() < EPS);

    let with_lido = catalog
        .resolve_stack(&StackRefs {
            base: Some("eth".to_string()),
            engine: Some("lido".to_string()),
            income: Some("pendle-pt".to_string()),
            ..StackRefs::default()
        })
        .unwrap();
    let resolved = resolver.resolve(&with_lido, Layer::Income).unwrap();
    assert_eq!(resolved.source, ApySource::Catalog);
    assert!((resolved.value - 12.0).abs() < EPS);
}
