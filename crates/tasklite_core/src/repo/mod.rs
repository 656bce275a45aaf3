//! Persistence layer: repositories translating records to and from rows.
//!
//! # Responsibility
//! - Own all SQL text and row mapping for the task entity.
//! - Keep upper layers free of storage details.

pub mod task_repo;
