//! User-directory view-model
//!
//! A client-held mirror of the backend's user collection, built for the
//! admin screen. Loads replace the collection wholesale; successful writes
//! patch the mirror in place instead of re-fetching. Subscribers observe
//! every accepted change through a watch channel.

mod store;

pub use store::{DirectorySnapshot, LoadPhase, UserDirectory};
