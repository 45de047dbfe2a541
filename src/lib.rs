//! Client library for remote plugin catalogs: fetch a plugin list once per
//! client, memoize it, and answer platform-compatibility queries against it.

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod sources;
pub mod version;
