//! Verified pure functions for the queue engine.
//!
//! This module is the functional core of the queue. All functions are:
//!
//! - **Deterministic**: No I/O, no system calls
//! - **Total**: Saturating arithmetic, `Option`/`Result` instead of panics
//! - **Independently tested**: Unit tests here, property tests behind `bolero`
//!
//! The async shell in [`crate::queue`] performs table reads and writes and asks
//! these functions every question that does not need storage.
//!
//! # Module Organization
//!
//! - [`keys`]: Row/column key codec and fixed-width integer encoding
//! - [`meta`]: Entry lifecycle and claim state cell encoding
//! - [`partition`]: Hash partition ownership
//! - [`fetch`]: Fetch window and shared-claim decisions
//! - [`validation`]: Ack checks and partition header encoding

pub mod fetch;
pub mod keys;
pub mod meta;
pub mod partition;
pub mod validation;

// ============================================================================
// Re-exports: Keys
// ============================================================================
pub use keys::active_entry_column;
pub use keys::consumer_meta_row;
pub use keys::consumer_read_pointer_column;
pub use keys::counter_column;
pub use keys::data_row;
pub use keys::decode_i32;
pub use keys::decode_u64;
pub use keys::display_key;
pub use keys::encode_u64;
pub use keys::entry_claim_column;
pub use keys::entry_data_column;
pub use keys::entry_header_column;
pub use keys::entry_id_counter_row;
pub use keys::entry_meta_column;
pub use keys::group_id_counter_row;
pub use keys::group_read_pointer_row;
// ============================================================================
// Re-exports: Meta
// ============================================================================
pub use meta::decode_claim_state;
pub use meta::decode_entry_state;
pub use meta::encode_claim_state;
pub use meta::encode_entry_state;
pub use meta::is_entry_servable;
pub use meta::is_valid_entry_transition;
// ============================================================================
// Re-exports: Partition / Fetch
// ============================================================================
pub use fetch::compute_disjoint_window;
pub use fetch::effective_batch_size;
pub use fetch::is_caught_up;
pub use fetch::should_claim_shared;
pub use partition::hash_partition_owner;
pub use partition::should_emit_hashed;
// ============================================================================
// Re-exports: Validation
// ============================================================================
pub use validation::AckDecision;
pub use validation::HeaderRejection;
pub use validation::check_ack;
pub use validation::encode_partition_headers;
