//! Shared test helpers
//!
//! - [`fixtures`] - Hand-built scenarios and seeded random spot sets
//! - [`assertions`] - Link-graph invariants and brute-force assignment

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
