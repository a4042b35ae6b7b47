//! Integration layer: the remote Bot API and bot identity.

pub mod api;
pub mod bot;
