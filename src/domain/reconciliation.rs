//! Guest-to-registered reconciliation planning.
//!
//! When a guest identity authenticates as (or registers) a real account, its
//! links and click history are consolidated onto that account. This module
//! contains the pure decision logic: given the guest's links and the target's
//! links, produce the list of actions to execute. The transactional execution
//! lives in [`crate::infrastructure::persistence::PgIdentityRepository`].

use crate::domain::entities::Link;
use std::collections::HashMap;

/// One step of a reconciliation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// The target has no link for this destination: reassign ownership of the
    /// guest's link (and the denormalized owner on its clicks).
    Transfer { link_id: i64 },
    /// The target already has a link for the same destination: rewrite the
    /// guest link's clicks onto the target's link, then delete the guest link.
    Merge { from_link_id: i64, into_link_id: i64 },
}

/// Summary of an executed reconciliation, for logging and assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub links_transferred: u64,
    pub links_merged: u64,
    pub clicks_rewritten: u64,
}

/// Plans the consolidation of `guest_links` into an account owning
/// `target_links`.
///
/// Links are matched by normalized destination URL. Matching is exact: the
/// destinations were normalized at submission time, so equal destinations have
/// equal strings. Order of the returned actions follows `guest_links`.
pub fn plan(guest_links: &[Link], target_links: &[Link]) -> Vec<ReconcileAction> {
    let by_destination: HashMap<&str, i64> = target_links
        .iter()
        .map(|l| (l.original_url.as_str(), l.id))
        .collect();

    guest_links
        .iter()
        .map(|guest_link| match by_destination.get(guest_link.original_url.as_str()) {
            Some(&into_link_id) => ReconcileAction::Merge {
                from_link_id: guest_link.id,
                into_link_id,
            },
            None => ReconcileAction::Transfer {
                link_id: guest_link.id,
            },
        })
        .collect()
}
