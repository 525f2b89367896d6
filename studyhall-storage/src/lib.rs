//! Grading-queue persistence.
//!
//! Two implementations of [`studyhall_core::GradingQueue`]: Postgres for
//! production and an in-memory queue for tests and provider-less local
//! runs. Both enforce the same claim/transition semantics; the Postgres
//! queries mirror the memory queue operation for operation.

pub mod memory;
pub mod postgres;

pub use memory::MemoryGradingQueue;
pub use postgres::{create_pool, ensure_schema, PgGradingQueue};
