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

//! Exchange proposal model.
//!
//! Proposals follow a single irreversible transition:
//! - pending (`answered = false`) → accepted (`answered, accepted`)
//! - pending (`answered = false`) → refused (`answered, !accepted`)
//!
//! Resolved proposals are retained as an audit trail; `accepted` is only
//! meaningful once `answered` is set.

use crate::base::{ItemId, ProposalId, UserId};
use crate::catalog::Item;
use serde::{Deserialize, Serialize};

/// One user's offer to trade one of their items for another user's item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    /// User who made the offer.
    pub sender: UserId,
    /// Owner of the requested item at creation time.
    pub receiver: UserId,
    /// Item offered by the sender.
    pub sender_item: ItemId,
    /// Item requested from the receiver.
    pub receiver_item: ItemId,
    pub answered: bool,
    pub accepted: bool,
}

impl Proposal {
    pub fn is_pending(&self) -> bool {
        !self.answered
    }

    /// True if the item appears in either role of this proposal.
    pub fn references(&self, item: ItemId) -> bool {
        self.sender_item == item || self.receiver_item == item
    }
}

/// The receiver's one-time decision on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Refuse,
}

/// A pending proposal enriched for display to its receiver.
///
/// `offered` is the sender's item (what the receiver would get),
/// `requested` is the receiver's own item (what they would give up).
#[derive(Debug, Clone, Serialize)]
pub struct PendingExchange {
    pub proposal: Proposal,
    /// Display name of the sender, or their numeric id when unknown.
    pub counterparty: String,
    pub offered: Item,
    pub requested: Item,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal() -> Proposal {
        Proposal {
            id: ProposalId(1),
            sender: UserId(1),
            receiver: UserId(2),
            sender_item: ItemId(10),
            receiver_item: ItemId(20),
            answered: false,
            accepted: false,
        }
    }

    #[test]
    fn new_proposal_is_pending() {
        assert!(proposal().is_pending());
    }

    #[test]
    fn references_both_roles() {
        let p = proposal();
        assert!(p.references(ItemId(10)));
        assert!(p.references(ItemId(20)));
        assert!(!p.references(ItemId(30)));
    }
}
