//! Cache-aside subsystem.
//!
//! # Data Flow
//! ```text
//! Application read:
//!     → store.rs get (hit → return, authoritative source untouched)
//!     → on miss: fetch from source → store.rs set → return
//! Application mutation:
//!     → mutate source → store.rs remove (invalidate stale entry)
//! ```
//!
//! # Design Decisions
//! - Every backend call runs under the resilient executor on the default
//!   pipeline, clamped by a short cache-call deadline
//! - Failures never propagate: a broken cache degrades to miss behavior and
//!   the authoritative source stays the correctness boundary

pub mod backend;
pub mod memory;
pub mod store;

pub use backend::{BackendError, CacheBackend};
pub use memory::MemoryBackend;
pub use store::{cache_key, CacheStore};
