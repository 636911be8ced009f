// SPDX-License-Identifier: GPL-3.0-only
//! Vendor-independent display types: believed state, inputs and notifications

mod events;
mod input;
mod state;

pub use events::{DisplayEvent, EventHandler, Observers, SubscriptionId};
pub use input::{InputSource, ParseInputError};
pub use state::DisplayState;
