//! Domain records for people, groups and group membership.
//!
//! # Invariants
//! - Ids are assigned by the store, never by callers.
//! - A group references its members by person id only; member lists are
//!   always sorted by ascending person id.

pub mod group;
pub mod person;
