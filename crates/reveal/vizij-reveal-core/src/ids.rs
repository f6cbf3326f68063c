//! Engine-owned identifiers.
//!
//! Handles (`ElementHandle`) belong to the host; ids are what the engine hands back. A
//! target that is detached and re-attached under the same handle gets a new `TargetId`,
//! and so does a target tree restarted by a replay.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TargetId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VariantId(pub u32);

/// Opaque element key owned by the view layer (DOM id, node path, ...).
pub type ElementHandle = String;

/// One counter per id kind; never reset during an engine's lifetime.
#[derive(Default, Debug)]
pub struct IdAllocator {
    targets: u32,
    subscriptions: u32,
    variants: u32,
}

fn bump(counter: &mut u32) -> u32 {
    let n = *counter;
    *counter = n.wrapping_add(1);
    n
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_target(&mut self) -> TargetId {
        TargetId(bump(&mut self.targets))
    }

    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        SubscriptionId(bump(&mut self.subscriptions))
    }

    pub fn alloc_variant(&mut self) -> VariantId {
        VariantId(bump(&mut self.variants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_count_independently() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.alloc_target(), TargetId(0));
        assert_eq!(ids.alloc_target(), TargetId(1));
        assert_eq!(ids.alloc_subscription(), SubscriptionId(0));
        assert_eq!(ids.alloc_variant(), VariantId(0));
        assert_eq!(ids.alloc_target(), TargetId(2));
        assert_eq!(ids.alloc_subscription(), SubscriptionId(1));
    }
}
