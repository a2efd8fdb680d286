//! Simulated deployment receipts.

use crate::domain::{LayerSelection, LeverageLoops, StackSelection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Receipt for a simulated "deploy" of a stack. Nothing is sent on-chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReceipt {
    /// Pseudo transaction hash, `0x` followed by 64 hex chars.
    pub tx_hash: String,
    pub stack_fingerprint: String,
    pub deployed_at: DateTime<Utc>,
    pub leverage_loops: LeverageLoops,
    pub total_apy: f64,
    pub total_risk: f64,
}

impl DeployReceipt {
    pub fn new(
        selection: &StackSelection,
        leverage_loops: LeverageLoops,
        total_apy: f64,
        total_risk: f64,
        deployed_at: DateTime<Utc>,
    ) -> Self {
        let stack_fingerprint = stack_fingerprint(selection, leverage_loops);

        let mut hasher = Sha256::new();
        hasher.update(stack_fingerprint.as_bytes());
        hasher.update(deployed_at.timestamp_millis().to_le_bytes());
        let tx_hash = format!("0x{}", hex::encode(hasher.finalize()));

        Self {
            tx_hash,
            stack_fingerprint,
            deployed_at,
            leverage_loops,
            total_apy,
            total_risk,
        }
    }
}

/// Stable key for a stack composition: same choices and loops, same key.
pub fn stack_fingerprint(selection: &StackSelection, leverage_loops: LeverageLoops) -> String {
    fn hash_var(hasher: &mut Sha256, data: &str) {
        hasher.update((data.len() as u32).to_le_bytes());
        hasher.update(data.as_bytes());
    }

    let mut hasher = Sha256::new();
    for (layer, slot) in selection.iter() {
        hash_var(&mut hasher, layer.as_str());
        match slot {
            LayerSelection::Empty => hash_var(&mut hasher, "-"),
            LayerSelection::Skipped => hash_var(&mut hasher, "~"),
            LayerSelection::Selected(protocol) => hash_var(&mut hasher, protocol.id.as_str()),
        }
    }
    hasher.update(leverage_loops.get().to_le_bytes());

    let hash = hasher.finalize();
    format!("stack:{}", hex::encode(&hash[..16]))
}
