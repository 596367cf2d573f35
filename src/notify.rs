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

//! Notification sink collaborator.
//!
//! Resolutions emit a one-line system message to the proposal's sender.
//! Delivery is best-effort and happens after the resolution has committed;
//! a failed or dropped notification never rolls a resolution back, which
//! is why the contract is fire-and-forget.

use crate::base::UserId;

/// Best-effort delivery of one-line system messages.
pub trait NotificationSink: Send + Sync {
    /// Records a message for the user. Implementations swallow their own
    /// delivery failures.
    fn notify(&self, user: UserId, message: &str);
}

/// Sink that writes notifications to the log.
///
/// Useful for the scenario runner and as a stand-in when no messaging
/// backend is wired up.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogSink {
    fn notify(&self, user: UserId, message: &str) {
        tracing::info!(user = user.0, text = message, "notification");
    }
}
