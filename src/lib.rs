#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Error and result types shared across the crate.
pub mod error;

/// The 32-bit FNV-1 hasher, for callers that want a fixed, keyless hash.
pub mod fnv;

/// A HashMap implementation using Robin Hood hashing.
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A hash set implementation using Robin Hood hashing.
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

pub use error::Error;
pub use error::Result;
pub use hash_map::DefaultHashBuilder;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
