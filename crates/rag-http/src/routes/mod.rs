//! Route handlers, one module per resource family (spec §4.6, §6).

pub mod chat;
pub mod documents;
pub mod health;
pub mod search;
pub mod sessions;
