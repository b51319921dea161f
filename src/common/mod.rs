//! Common, shared types.

pub mod layers;
pub mod spatial;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
