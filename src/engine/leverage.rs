//! Looped leverage model.

use serde::Serialize;

use super::RISK_MULTIPLIER_CAP;

/// Outcome of recursively depositing, borrowing at `ltv`, and redepositing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeveragedPosition {
    pub effective_apy: f64,
    /// Total capital earning the core yield per unit of starting capital.
    pub total_exposure: f64,
    pub risk_multiplier: f64,
}

impl LeveragedPosition {
    /// Capital borrowed beyond the initial unit.
    pub fn borrowed(&self) -> f64 {
        self.total_exposure - 1.0
    }
}

/// Compute a looped position.
///
/// `total_exposure` is the geometric series `sum(ltv^i, i = 0..loops)`; the
/// borrowed part `total_exposure - 1` pays `borrow_cost` at a single flat
/// rate. `loops` is not range checked here; callers clamp it first.
pub fn leveraged_apy(core_yield: f64, borrow_cost: f64, ltv: f64, loops: u32) -> LeveragedPosition {
    let mut total_exposure = 0.0;
    let mut term = 1.0;
    for _ in 0..loops {
        total_exposure += term;
        term *= ltv;
    }

    LeveragedPosition {
        effective_apy: core_yield * total_exposure - borrow_cost * (total_exposure - 1.0),
        total_exposure,
        risk_multiplier: risk_multiplier(loops),
    }
}

/// `min(loops * 0.8 + 0.2, 3)`; exactly 1.0 at one loop.
pub fn risk_multiplier(loops: u32) -> f64 {
    (loops as f64 * 0.8 + 0.2).min(RISK_MULTIPLIER_CAP)
}
