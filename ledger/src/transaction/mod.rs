//! # Transaction Module
//!
//! The record contract for every financial operation on the network:
//! purchases, sales, cash withdrawals, and cashback. Each operation is a
//! [`TransactionRecord`] that walks its type's state machine exactly once
//! and then freezes into an audit artifact.
//!
//! ## Architecture
//!
//! ```text
//! types.rs      — TransactionType, per-type status enums, TransactionStatus, Currency
//! codes.rs      — Business error codes, one closed space per type
//! record.rs     — The TransactionRecord entity and its lifecycle contract
//! builder.rs    — Fluent RecordBuilder for validated construction
//! validation.rs — Cross-field invariant validation
//! ```
//!
//! ## Record Lifecycle
//!
//! 1. **Build** — a terminal constructs the record via [`RecordBuilder`];
//!    the transaction type pins the status and error-code domains.
//! 2. **Accept** — the server assigns the authoritative remote id
//!    (`TransactionRecord::promote`, usually via the store).
//! 3. **Transition** — the execution engine drives `advance` / `fail`;
//!    a failure records its business [`ErrorCode`] atomically.
//! 4. **Freeze** — a terminal status ends the lifecycle; the record is
//!    never deleted.
//!
//! ## Design Decisions
//!
//! - Statuses are tagged by type ([`TransactionStatus`]), so a status from
//!   one type's machine cannot be attached to a record of another — the
//!   invalid combination has no representation.
//! - Business error codes are per-type closed enums. The numeric values
//!   overlap across types on the wire and carry type-specific meaning, so
//!   they are never compared across spaces.
//! - The derived flags (`is_purchased`, `is_sold`, and the store-level
//!   `is_withdrawn` / `can_be_cashed_out`) are computed, never stored:
//!   a contradictory flag/status pair cannot exist.

pub mod builder;
pub mod codes;
pub mod record;
pub mod types;
pub mod validation;

pub use builder::RecordBuilder;
pub use codes::{BuyErrorCode, ErrorCode, SellErrorCode, WithdrawErrorCode};
pub use record::{ExecutionOutcome, RecordError, TransactionRecord};
pub use types::{
    BuyStatus, CashbackStatus, Currency, SellStatus, TransactionStatus, TransactionType,
    WithdrawStatus,
};
pub use validation::validate_record;
