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

//! Item catalog collaborator.
//!
//! The catalog owns item records; the engine only reads them and moves
//! ownership through [`ItemCatalog::transfer`]. The trait keeps the seam
//! narrow so a database-backed catalog can stand in for the in-memory one
//! used by the binaries and tests.

use crate::ExchangeError;
use crate::base::{ItemId, UserId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Snapshot of a catalog item.
///
/// `owner` is the only field the engine ever mutates, and only through an
/// accepted exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner: UserId,
    pub name: String,
    /// Year of issue, when known.
    pub year: Option<u16>,
    pub is_public: bool,
    /// Stored image file reference shown in listings.
    pub image: String,
}

impl Item {
    /// Creates a public item with no year or image reference.
    pub fn new(id: ItemId, owner: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            owner,
            name: name.into(),
            year: None,
            is_public: true,
            image: String::new(),
        }
    }
}

/// Read and transfer access to item records.
///
/// # Errors
///
/// Implementations backed by fallible storage report failures as
/// [`ExchangeError::Storage`]; `transfer` on an unknown id is
/// [`ExchangeError::ItemNotFound`].
pub trait ItemCatalog: Send + Sync {
    /// Looks up an item by id. `Ok(None)` means the item does not exist.
    fn get(&self, id: ItemId) -> Result<Option<Item>, ExchangeError>;

    /// Reassigns ownership of an item.
    ///
    /// Must be callable from inside the engine's critical section.
    fn transfer(&self, id: ItemId, new_owner: UserId) -> Result<(), ExchangeError>;
}

/// In-memory catalog backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    items: DashMap<ItemId, Item>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Adds or replaces an item record.
    pub fn add(&self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns a snapshot of every item, ordered by id.
    ///
    /// Used by the scenario runner to report final ownership.
    pub fn snapshot(&self) -> Vec<Item> {
        let mut all: Vec<Item> = self.items.iter().map(|entry| entry.clone()).collect();
        all.sort_by_key(|item| item.id);
        all
    }
}

impl ItemCatalog for MemoryCatalog {
    fn get(&self, id: ItemId) -> Result<Option<Item>, ExchangeError> {
        Ok(self.items.get(&id).map(|entry| entry.clone()))
    }

    fn transfer(&self, id: ItemId, new_owner: UserId) -> Result<(), ExchangeError> {
        let mut entry = self
            .items
            .get_mut(&id)
            .ok_or(ExchangeError::ItemNotFound)?;
        entry.owner = new_owner;
        Ok(())
    }
}
