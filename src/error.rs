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

//! Error types for exchange processing.

use thiserror::Error;

/// Exchange processing errors.
///
/// Every variant except [`ExchangeError::Storage`] is a recoverable
/// validation failure: the operation left all state unchanged and the
/// caller can report it to the user. `Storage` is the fatal class
/// (transaction/backend failure) and is propagated unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Referenced item does not exist in the catalog
    #[error("item not found")]
    ItemNotFound,

    /// Sender already owns the requested item
    #[error("cannot trade with yourself")]
    SelfTrade,

    /// One of the items is not publicly listed
    #[error("item is not public")]
    ItemNotPublic,

    /// Offered item is not owned by the sender
    #[error("item not owned by sender")]
    NotOwner,

    /// An unresolved proposal already references the item
    #[error("item already committed to a pending exchange")]
    ItemAlreadyPending,

    /// Referenced proposal does not exist
    #[error("proposal not found")]
    ProposalNotFound,

    /// Proposal was already answered
    #[error("proposal already resolved")]
    AlreadyResolved,

    /// Only the receiver may answer a proposal
    #[error("user is not authorized to resolve this proposal")]
    NotAuthorized,

    /// Item ownership drifted since the proposal was created
    #[error("item ownership changed since proposal creation")]
    OwnershipChanged,

    /// Backend/transaction failure
    #[error("storage failure: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::ExchangeError;

    #[test]
    fn error_display_messages() {
        assert_eq!(ExchangeError::ItemNotFound.to_string(), "item not found");
        assert_eq!(
            ExchangeError::SelfTrade.to_string(),
            "cannot trade with yourself"
        );
        assert_eq!(
            ExchangeError::ItemNotPublic.to_string(),
            "item is not public"
        );
        assert_eq!(
            ExchangeError::NotOwner.to_string(),
            "item not owned by sender"
        );
        assert_eq!(
            ExchangeError::ItemAlreadyPending.to_string(),
            "item already committed to a pending exchange"
        );
        assert_eq!(
            ExchangeError::ProposalNotFound.to_string(),
            "proposal not found"
        );
        assert_eq!(
            ExchangeError::AlreadyResolved.to_string(),
            "proposal already resolved"
        );
        assert_eq!(
            ExchangeError::NotAuthorized.to_string(),
            "user is not authorized to resolve this proposal"
        );
        assert_eq!(
            ExchangeError::OwnershipChanged.to_string(),
            "item ownership changed since proposal creation"
        );
        assert_eq!(
            ExchangeError::Storage("lock timeout".into()).to_string(),
            "storage failure: lock timeout"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = ExchangeError::ItemAlreadyPending;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
