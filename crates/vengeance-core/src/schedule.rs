use serde::{Deserialize, Serialize};

use crate::entity::PursuerId;

/// A deferred pursuer respawn, tagged with the capture it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingRespawn {
    pub pursuer: PursuerId,
    pub generation: u32,
    /// Session clock time (ms) at which it fires.
    pub fire_at_ms: f64,
}

/// Respawn timers driven by the session clock rather than wall time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RespawnQueue {
    pending: Vec<PendingRespawn>,
}

impl RespawnQueue {
    pub fn schedule(&mut self, pursuer: PursuerId, generation: u32, fire_at_ms: f64) {
        // One live timer per pursuer; a newer capture supersedes an older one.
        self.pending.retain(|r| r.pursuer != pursuer);
        self.pending.push(PendingRespawn {
            pursuer,
            generation,
            fire_at_ms,
        });
    }

    /// Remove and return every respawn due at `now_ms`, in firing order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<PendingRespawn> {
        let mut due: Vec<PendingRespawn> = Vec::new();
        self.pending.retain(|r| {
            if r.fire_at_ms <= now_ms {
                due.push(*r);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.fire_at_ms.total_cmp(&b.fire_at_ms).then(a.pursuer.cmp(&b.pursuer)));
        due
    }

    pub fn is_pending(&self, pursuer: PursuerId) -> bool {
        self.pending.iter().any(|r| r.pursuer == pursuer)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
