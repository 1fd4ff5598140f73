//! Third-party kinds the operator reads and writes.
//!
//! Only the fields the operator relies on are modelled, the rest of each
//! object is dropped on deserialization.

pub mod argocd;
pub mod console;
pub mod olm;
pub mod route;
