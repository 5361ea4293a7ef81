// SPDX-FileCopyrightText: 2026 guildxp Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Store and chat adapters extend [`PluginAdapter`] and use `#[async_trait]`
//! for dynamic dispatch compatibility.

pub mod adapter;
pub mod clock;
pub mod sheet;

pub use adapter::PluginAdapter;
pub use clock::{Clock, SystemClock};
pub use sheet::SheetStore;
