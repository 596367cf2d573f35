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

//! User directory collaborator.
//!
//! Pending-exchange listings show who made the offer, so the engine needs
//! a display name for a user id. The account system behind the identity
//! provider implements this in production.

use crate::base::UserId;
use dashmap::DashMap;

/// Display-name lookup for user ids.
pub trait UserDirectory: Send + Sync {
    /// Returns the display name for a user, if one is registered.
    fn display_name(&self, user: UserId) -> Option<String>;
}

/// In-memory directory backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    names: DashMap<UserId, String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            names: DashMap::new(),
        }
    }

    /// Registers or replaces a user's display name.
    pub fn add(&self, user: UserId, name: impl Into<String>) {
        self.names.insert(user, name.into());
    }
}

impl UserDirectory for MemoryDirectory {
    fn display_name(&self, user: UserId) -> Option<String> {
        self.names.get(&user).map(|name| name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_name_is_returned() {
        let directory = MemoryDirectory::new();
        directory.add(UserId(1), "gabriel");
        assert_eq!(directory.display_name(UserId(1)), Some("gabriel".into()));
    }

    #[test]
    fn unknown_user_has_no_name() {
        let directory = MemoryDirectory::new();
        assert_eq!(directory.display_name(UserId(9)), None);
    }
}
