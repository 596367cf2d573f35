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

//! Property-based tests for the exchange engine.
//!
//! These tests verify invariants that should hold for any sequence of
//! propose and resolve calls over any assignment of items to users.

use exchange_demo_rs::{
    Decision, ExchangeEngine, ExchangeError, Item, ItemCatalog, ItemId, LogSink, MemoryCatalog,
    MemoryDirectory, ProposalId, UserId,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const NUM_USERS: u32 = 4;
const NUM_ITEMS: u64 = 8;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// Generate an owner and visibility flag for each of the NUM_ITEMS items.
fn arb_world() -> impl Strategy<Value = Vec<(u32, bool)>> {
    prop::collection::vec((1..=NUM_USERS, any::<bool>()), NUM_ITEMS as usize)
}

/// Generate propose calls: (sender, offered item, requested item).
fn arb_proposals() -> impl Strategy<Value = Vec<(u32, u64, u64)>> {
    prop::collection::vec((1..=NUM_USERS, 1..=NUM_ITEMS, 1..=NUM_ITEMS), 0..30)
}

/// Generate resolve calls: (proposal id, acting user, decision).
fn arb_resolutions() -> impl Strategy<Value = Vec<(u64, u32, bool)>> {
    prop::collection::vec((1..=30u64, 1..=NUM_USERS, any::<bool>()), 0..30)
}

fn build(world: &[(u32, bool)]) -> (Arc<MemoryCatalog>, ExchangeEngine) {
    let catalog = Arc::new(MemoryCatalog::new());
    for (i, (owner, public)) in world.iter().enumerate() {
        let id = ItemId(i as u64 + 1);
        let mut item = Item::new(id, UserId(*owner), format!("item-{}", id));
        item.is_public = *public;
        catalog.add(item);
    }
    let engine = ExchangeEngine::new(
        catalog.clone(),
        Arc::new(MemoryDirectory::new()),
        Arc::new(LogSink::new()),
    );
    (catalog, engine)
}

fn owners(catalog: &MemoryCatalog) -> Vec<(ItemId, UserId)> {
    catalog
        .snapshot()
        .into_iter()
        .map(|item| (item.id, item.owner))
        .collect()
}

/// Asserts that no item is referenced by two unresolved proposals.
fn assert_no_double_commitment(engine: &ExchangeEngine) {
    let mut reserved = HashSet::new();
    for id in 1..=engine.proposal_count() as u64 {
        let proposal = engine.proposal(ProposalId(id)).expect("audit trail gap");
        if proposal.is_pending() {
            assert!(reserved.insert(proposal.sender_item));
            assert!(reserved.insert(proposal.receiver_item));
        }
    }
}

// =============================================================================
// Proposal Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// No sequence of propose calls can double-commit an item.
    #[test]
    fn proposing_preserves_no_double_commitment(
        world in arb_world(),
        proposals in arb_proposals(),
    ) {
        let (_catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }

        assert_no_double_commitment(&engine);
    }

    /// Propose alone never changes any item's owner, whether it succeeds
    /// or fails.
    #[test]
    fn proposing_never_moves_ownership(
        world in arb_world(),
        proposals in arb_proposals(),
    ) {
        let (catalog, engine) = build(&world);
        let before = owners(&catalog);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }

        prop_assert_eq!(owners(&catalog), before);
    }

    /// Successful proposals always satisfy the creation preconditions.
    #[test]
    fn successful_proposals_are_well_formed(
        world in arb_world(),
        proposals in arb_proposals(),
    ) {
        let (catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            if let Ok(proposal) = engine.propose(UserId(sender), ItemId(offered), ItemId(requested)) {
                prop_assert_eq!(proposal.sender, UserId(sender));
                prop_assert_ne!(proposal.sender, proposal.receiver);

                // Both items were public, owned as recorded.
                let offered_item = catalog.get(proposal.sender_item).unwrap().unwrap();
                let requested_item = catalog.get(proposal.receiver_item).unwrap().unwrap();
                prop_assert!(offered_item.is_public);
                prop_assert!(requested_item.is_public);
                prop_assert_eq!(offered_item.owner, proposal.sender);
                prop_assert_eq!(requested_item.owner, proposal.receiver);
            }
        }
    }
}

// =============================================================================
// Resolution Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Accept swaps exactly the two proposal items; refuse swaps nothing.
    #[test]
    fn resolution_ownership_laws(
        accept in any::<bool>(),
    ) {
        let world = vec![(1, true), (2, true)];
        let (catalog, engine) = build(&world);

        let proposal = engine.propose(UserId(1), ItemId(1), ItemId(2)).unwrap();
        let decision = if accept { Decision::Accept } else { Decision::Refuse };
        engine.resolve(proposal.id, UserId(2), decision).unwrap();

        let after = owners(&catalog);
        if accept {
            prop_assert_eq!(after, vec![(ItemId(1), UserId(2)), (ItemId(2), UserId(1))]);
        } else {
            prop_assert_eq!(after, vec![(ItemId(1), UserId(1)), (ItemId(2), UserId(2))]);
        }
    }

    /// A proposal is answered at most once, whatever else happens around it.
    #[test]
    fn resolution_happens_at_most_once(
        world in arb_world(),
        proposals in arb_proposals(),
        resolutions in arb_resolutions(),
    ) {
        let (_catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }

        let mut answered = HashSet::new();
        for (id, actor, accept) in resolutions {
            let decision = if accept { Decision::Accept } else { Decision::Refuse };
            match engine.resolve(ProposalId(id), UserId(actor), decision) {
                Ok(_) => {
                    prop_assert!(answered.insert(id), "proposal {} answered twice", id);
                }
                Err(ExchangeError::AlreadyResolved) => {
                    // Either an earlier loop iteration answered it, or it
                    // can only have been answered inside this run.
                    prop_assert!(engine.proposal(ProposalId(id)).unwrap().answered);
                }
                Err(_) => {}
            }
        }
    }

    /// Only the receiver ever resolves successfully.
    #[test]
    fn only_the_receiver_resolves(
        world in arb_world(),
        proposals in arb_proposals(),
        resolutions in arb_resolutions(),
    ) {
        let (_catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }

        for (id, actor, accept) in resolutions {
            let decision = if accept { Decision::Accept } else { Decision::Refuse };
            let recorded = engine.proposal(ProposalId(id));
            if engine.resolve(ProposalId(id), UserId(actor), decision).is_ok() {
                prop_assert_eq!(recorded.unwrap().receiver, UserId(actor));
            }
        }
    }
}

// =============================================================================
// Whole-System Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Items are conserved: every seeded item still exists afterwards and
    /// is owned by one of the seeded users; the double-commitment
    /// invariant holds at the end of any run.
    #[test]
    fn random_runs_conserve_items(
        world in arb_world(),
        proposals in arb_proposals(),
        resolutions in arb_resolutions(),
    ) {
        let (catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }
        for (id, actor, accept) in resolutions {
            let decision = if accept { Decision::Accept } else { Decision::Refuse };
            let _ = engine.resolve(ProposalId(id), UserId(actor), decision);
        }

        let snapshot = catalog.snapshot();
        prop_assert_eq!(snapshot.len(), NUM_ITEMS as usize);
        for item in &snapshot {
            prop_assert!(item.owner.0 >= 1 && item.owner.0 <= NUM_USERS);
        }

        assert_no_double_commitment(&engine);
    }

    /// The pending listing agrees with the audit trail.
    #[test]
    fn listing_matches_audit_trail(
        world in arb_world(),
        proposals in arb_proposals(),
    ) {
        let (_catalog, engine) = build(&world);

        for (sender, offered, requested) in proposals {
            let _ = engine.propose(UserId(sender), ItemId(offered), ItemId(requested));
        }

        for user in 1..=NUM_USERS {
            let listed = engine.pending_for(UserId(user)).count();
            let open = (1..=engine.proposal_count() as u64)
                .filter_map(|id| engine.proposal(ProposalId(id)))
                .filter(|p| p.is_pending() && p.receiver == UserId(user))
                .count();
            prop_assert_eq!(listed, open);
        }
    }
}
