// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The exchange-demo-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Proposal persistence with a pending-item index.
//!
//! The store keeps every proposal ever created (resolved ones are the
//! audit trail) plus a secondary index of items committed to unresolved
//! proposals. The index is the named conflict query behind the
//! no-double-commitment invariant: an item may appear in it at most once.
//! Callers serialize the check-then-insert and resolve paths; the engine's
//! critical section does exactly that.

use crate::base::{ItemId, ProposalId, UserId};
use crate::proposal::Proposal;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Durable set of exchange proposals plus the pending-conflict index.
#[derive(Debug, Default)]
pub struct ExchangeStore {
    /// Every proposal ever created, indexed by id. Never pruned.
    proposals: DashMap<ProposalId, Proposal>,

    /// Items referenced by an unresolved proposal, in either role.
    pending: DashMap<ItemId, ProposalId>,

    /// Source of monotonically increasing proposal ids.
    next_id: AtomicU64,
}

impl ExchangeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            proposals: DashMap::new(),
            pending: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Conflict query: is the item committed to an unresolved proposal?
    pub fn has_pending(&self, item: ItemId) -> bool {
        self.pending.contains_key(&item)
    }

    /// Persists a new pending proposal and reserves both items.
    ///
    /// The caller must have run [`ExchangeStore::has_pending`] for both
    /// items inside the same critical section as this insert.
    pub fn insert(
        &self,
        sender: UserId,
        receiver: UserId,
        sender_item: ItemId,
        receiver_item: ItemId,
    ) -> Proposal {
        let id = ProposalId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let proposal = Proposal {
            id,
            sender,
            receiver,
            sender_item,
            receiver_item,
            answered: false,
            accepted: false,
        };

        let prior_a = self.pending.insert(sender_item, id);
        let prior_b = self.pending.insert(receiver_item, id);
        debug_assert!(
            prior_a.is_none() && prior_b.is_none(),
            "invariant violated: item reserved by two pending proposals"
        );

        self.proposals.insert(id, proposal.clone());
        proposal
    }

    /// Returns a snapshot of a proposal by id.
    pub fn get(&self, id: ProposalId) -> Option<Proposal> {
        self.proposals.get(&id).map(|entry| entry.clone())
    }

    /// Flips a proposal to answered and releases its item reservations.
    ///
    /// Returns the updated proposal, or `None` if the id is unknown.
    pub fn mark_resolved(&self, id: ProposalId, accepted: bool) -> Option<Proposal> {
        let updated = {
            let mut entry = self.proposals.get_mut(&id)?;
            debug_assert!(!entry.answered, "proposal resolved twice");
            entry.answered = true;
            entry.accepted = accepted;
            entry.clone()
        };

        // Release only reservations still held by this proposal.
        self.pending
            .remove_if(&updated.sender_item, |_, holder| *holder == id);
        self.pending
            .remove_if(&updated.receiver_item, |_, holder| *holder == id);

        Some(updated)
    }

    /// Unresolved proposals addressed to the user, in creation order.
    pub fn pending_received(&self, user: UserId) -> Vec<Proposal> {
        let mut open: Vec<Proposal> = self
            .proposals
            .iter()
            .filter(|entry| entry.is_pending() && entry.receiver == user)
            .map(|entry| entry.clone())
            .collect();
        open.sort_by_key(|proposal| proposal.id);
        open
    }

    /// Total number of proposals ever created.
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
