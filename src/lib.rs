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

//! # Exchange Demo
//!
//! This library provides the negotiation engine of an item-trading site:
//! users propose direct item-for-item trades, and the receiver's one-time
//! accept or refuse decides whether ownership swaps.
//!
//! ## Core Components
//!
//! - [`ExchangeEngine`]: validates proposals, guards items against
//!   double-commitment, and executes the atomic ownership swap
//! - [`ExchangeStore`]: proposal persistence with the pending-item index
//! - [`ItemCatalog`], [`UserDirectory`], [`NotificationSink`]: narrow
//!   collaborator seams for the catalog, account, and messaging systems
//! - [`ExchangeError`]: validation failures, each leaving state unchanged
//!
//! ## Example
//!
//! ```
//! use exchange_demo_rs::{
//!     Decision, ExchangeEngine, Item, ItemCatalog, ItemId, LogSink, MemoryCatalog,
//!     MemoryDirectory, UserId,
//! };
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(MemoryCatalog::new());
//! catalog.add(Item::new(ItemId(1), UserId(1), "Penny Black"));
//! catalog.add(Item::new(ItemId(2), UserId(2), "Blue Mauritius"));
//!
//! let engine = ExchangeEngine::new(
//!     catalog.clone(),
//!     Arc::new(MemoryDirectory::new()),
//!     Arc::new(LogSink::new()),
//! );
//!
//! // User 1 offers item 1 for user 2's item 2.
//! let proposal = engine.propose(UserId(1), ItemId(1), ItemId(2)).unwrap();
//!
//! // Only the receiver may answer; accepting swaps ownership.
//! engine.resolve(proposal.id, UserId(2), Decision::Accept).unwrap();
//! assert_eq!(catalog.get(ItemId(1)).unwrap().unwrap().owner, UserId(2));
//! assert_eq!(catalog.get(ItemId(2)).unwrap().unwrap().owner, UserId(1));
//! ```
//!
//! ## Thread Safety
//!
//! All engine operations take `&self` and may be called from many threads.
//! The conflict check plus insert and the ownership swap are serialized
//! internally, so two racing proposals over the same item resolve to
//! exactly one success.

mod base;
pub mod catalog;
mod directory;
mod engine;
pub mod error;
mod notify;
mod proposal;
mod store;

pub use base::{ItemId, ProposalId, UserId};
pub use catalog::{Item, ItemCatalog, MemoryCatalog};
pub use directory::{MemoryDirectory, UserDirectory};
pub use engine::ExchangeEngine;
pub use error::ExchangeError;
pub use notify::{LogSink, NotificationSink};
pub use proposal::{Decision, PendingExchange, Proposal};
pub use store::ExchangeStore;
