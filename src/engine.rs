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

//! Exchange negotiation engine.
//!
//! The [`ExchangeEngine`] is the central component that creates trade
//! proposals and executes the accept/refuse transition, including the
//! ownership swap. It owns the [`ExchangeStore`] and talks to the item
//! catalog, the user directory, and the notification sink through the
//! handles passed at construction.
//!
//! # Operations
//!
//! - **Propose**: validate a sender's offer against the catalog and the
//!   pending-conflict index, then persist a new pending proposal.
//! - **Resolve**: the receiver's one-time accept or refuse; accepting
//!   swaps ownership of both items atomically.
//! - **List pending**: unresolved proposals addressed to a user, enriched
//!   for display.
//!
//! # Invariants
//!
//! - An item is referenced by at most one unresolved proposal, in either
//!   role.
//! - A proposal is answered exactly once; the transition is irreversible.
//! - Acceptance swaps both items or neither; a half-applied swap is
//!   rolled back before the error is surfaced.
//! - Notifications are emitted after the resolution has committed and are
//!   never part of the atomic unit.
//!
//! # Concurrency
//!
//! Requests run concurrently against shared state. The conflict check plus
//! insert, and the ownership re-validation plus swap, are critical
//! sections serialized by an internal commit lock; preconditions are
//! evaluated inside it. Lock acquisition is bounded so a stuck backend
//! surfaces as a retryable [`ExchangeError::Storage`] instead of a hang.

use crate::base::{ProposalId, UserId};
use crate::catalog::{Item, ItemCatalog};
use crate::directory::UserDirectory;
use crate::notify::NotificationSink;
use crate::proposal::{Decision, PendingExchange, Proposal};
use crate::store::ExchangeStore;
use crate::{ExchangeError, ItemId};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Exchange negotiation engine.
pub struct ExchangeEngine {
    catalog: Arc<dyn ItemCatalog>,
    directory: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
    store: ExchangeStore,
    /// Serializes conflict-check-then-insert and validate-then-swap.
    commit: Mutex<()>,
}

impl ExchangeEngine {
    /// Upper bound on waiting for the commit lock.
    const COMMIT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates an engine with an empty proposal store.
    pub fn new(
        catalog: Arc<dyn ItemCatalog>,
        directory: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            catalog,
            directory,
            sink,
            store: ExchangeStore::new(),
            commit: Mutex::new(()),
        }
    }

    /// Creates a proposal offering `sender_item` for `receiver_item`.
    ///
    /// The receiver is derived as the current owner of the requested item.
    /// No notification is sent at creation; the receiver discovers the
    /// offer through their pending listing.
    ///
    /// # Errors
    ///
    /// Checked in order, each leaving all state unchanged:
    ///
    /// - [`ExchangeError::ItemNotFound`] - either item does not exist.
    /// - [`ExchangeError::SelfTrade`] - sender owns the requested item.
    /// - [`ExchangeError::ItemNotPublic`] - either item is not public.
    /// - [`ExchangeError::NotOwner`] - offered item not owned by sender.
    /// - [`ExchangeError::ItemAlreadyPending`] - either item is committed
    ///   to an unresolved proposal.
    pub fn propose(
        &self,
        sender: UserId,
        sender_item: ItemId,
        receiver_item: ItemId,
    ) -> Result<Proposal, ExchangeError> {
        let _guard = self.lock_commit()?;

        let requested = self
            .catalog
            .get(receiver_item)?
            .ok_or(ExchangeError::ItemNotFound)?;
        let receiver = requested.owner;
        if receiver == sender {
            return Err(ExchangeError::SelfTrade);
        }

        let offered = self
            .catalog
            .get(sender_item)?
            .ok_or(ExchangeError::ItemNotFound)?;
        if !offered.is_public || !requested.is_public {
            return Err(ExchangeError::ItemNotPublic);
        }
        if offered.owner != sender {
            return Err(ExchangeError::NotOwner);
        }

        if self.store.has_pending(sender_item) || self.store.has_pending(receiver_item) {
            return Err(ExchangeError::ItemAlreadyPending);
        }

        let proposal = self
            .store
            .insert(sender, receiver, sender_item, receiver_item);
        tracing::debug!(
            proposal = proposal.id.0,
            sender = sender.0,
            receiver = receiver.0,
            "proposal created"
        );
        Ok(proposal)
    }

    /// Applies the receiver's decision to a pending proposal.
    ///
    /// Accepting re-validates that both items are still owned as recorded,
    /// then swaps ownership; refusing changes no ownership. Either way the
    /// proposal becomes answered and the sender is notified.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::ProposalNotFound`] - unknown proposal id.
    /// - [`ExchangeError::AlreadyResolved`] - proposal was already
    ///   answered; repeated calls never mutate ownership again.
    /// - [`ExchangeError::NotAuthorized`] - acting user is not the
    ///   receiver.
    /// - [`ExchangeError::OwnershipChanged`] - on accept, an item moved
    ///   (or vanished) since the proposal was created.
    pub fn resolve(
        &self,
        id: ProposalId,
        acting: UserId,
        decision: Decision,
    ) -> Result<Proposal, ExchangeError> {
        let guard = self.lock_commit()?;

        let proposal = self.store.get(id).ok_or(ExchangeError::ProposalNotFound)?;
        if proposal.answered {
            return Err(ExchangeError::AlreadyResolved);
        }
        if proposal.receiver != acting {
            return Err(ExchangeError::NotAuthorized);
        }

        let accepted = decision == Decision::Accept;
        if accepted {
            self.swap(&proposal)?;
        }
        let updated = self
            .store
            .mark_resolved(id, accepted)
            .ok_or(ExchangeError::ProposalNotFound)?;
        drop(guard);

        tracing::info!(proposal = id.0, accepted, "proposal resolved");
        let message = if accepted {
            "exchange accepted"
        } else {
            "exchange refused"
        };
        self.sink.notify(updated.sender, message);
        Ok(updated)
    }

    /// Unresolved proposals addressed to `user`, enriched for display.
    ///
    /// Lazy and restartable: each call re-reads the store; item snapshots
    /// and counterparty names are looked up during iteration. Proposals
    /// whose items have vanished from the catalog are skipped. Ordered by
    /// creation, oldest first. Read-only.
    pub fn pending_for(&self, user: UserId) -> impl Iterator<Item = PendingExchange> + '_ {
        self.store
            .pending_received(user)
            .into_iter()
            .filter_map(move |proposal| {
                let offered = self.item(proposal.sender_item)?;
                let requested = self.item(proposal.receiver_item)?;
                let counterparty = self
                    .directory
                    .display_name(proposal.sender)
                    .unwrap_or_else(|| proposal.sender.to_string());
                Some(PendingExchange {
                    proposal,
                    counterparty,
                    offered,
                    requested,
                })
            })
    }

    /// Returns a snapshot of a proposal by id, resolved or not.
    pub fn proposal(&self, id: ProposalId) -> Option<Proposal> {
        self.store.get(id)
    }

    /// Total number of proposals ever created.
    pub fn proposal_count(&self) -> usize {
        self.store.len()
    }

    fn lock_commit(&self) -> Result<parking_lot::MutexGuard<'_, ()>, ExchangeError> {
        self.commit
            .try_lock_for(Self::COMMIT_TIMEOUT)
            .ok_or_else(|| ExchangeError::Storage("timed out waiting for exchange store".into()))
    }

    fn item(&self, id: ItemId) -> Option<Item> {
        self.catalog.get(id).ok().flatten()
    }

    /// Swaps ownership of both items, all or nothing.
    ///
    /// Runs inside the commit lock. Ownership is re-checked against the
    /// proposal's recorded owners first; if the second transfer fails the
    /// first is undone before the error is returned.
    fn swap(&self, proposal: &Proposal) -> Result<(), ExchangeError> {
        let offered = self
            .catalog
            .get(proposal.sender_item)?
            .ok_or(ExchangeError::OwnershipChanged)?;
        let requested = self
            .catalog
            .get(proposal.receiver_item)?
            .ok_or(ExchangeError::OwnershipChanged)?;
        if offered.owner != proposal.sender || requested.owner != proposal.receiver {
            return Err(ExchangeError::OwnershipChanged);
        }

        self.catalog
            .transfer(proposal.sender_item, proposal.receiver)?;
        if let Err(err) = self
            .catalog
            .transfer(proposal.receiver_item, proposal.sender)
        {
            tracing::warn!(proposal = proposal.id.0, "undoing half-applied swap");
            self.catalog
                .transfer(proposal.sender_item, proposal.sender)?;
            return Err(err);
        }
        Ok(())
    }
}
