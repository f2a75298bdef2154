//! # storage-adapters
//!
//! Implementations of the repository ports: `memory` (always compiled) and
//! `postgres` (feature `db-postgres`).

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{
    MemoryContentRepository, MemoryGovernanceRepository, MemoryKnowledgeRepository,
    MemoryUserRepository, MemoryWarningRepository,
};
