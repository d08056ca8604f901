//! Snowflake-style primary keys.
//!
//! `ferrule` allocates 64-bit, time-ordered, collision-free identifiers for
//! one (datacenter, worker) coordinate pair and hands them out as base-10
//! strings, ready to be stored in a `varchar(19)` primary-key column.
//!
//! ```text
//!  | sign (1) | timestamp (41) | datacenter (5) | worker (5) | sequence (12) |
//! ```
//!
//! ```
//! use ferrule::{IdAllocator, SnowflakeId, SystemClock};
//!
//! let allocator = IdAllocator::new(1, 1, SystemClock)?;
//! let id: SnowflakeId = allocator.next_id()?.parse().unwrap();
//! assert_eq!(id.worker_id(), 1);
//! assert_eq!(id.datacenter_id(), 1);
//! # Ok::<(), ferrule::Error>(())
//! ```
//!
//! ## Features
//!
//! - `parking-lot` (default): use `parking_lot::Mutex`, which cannot poison.
//! - `cache-padded`: pad the allocator state to a cache line.
//! - `serde`: (de)serialize [`SnowflakeId`] as a decimal string.
//! - `tracing`: trace-level spans on allocation calls.
//! - `async-tokio`: [`IdAllocatorAsyncExt`] for waiting on Tokio.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod entity;
mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
pub mod global;
mod id;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::config::*;
pub use crate::entity::*;
pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
