// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # TELLER — Transaction Ledger
//!
//! The transaction record and state model for the TELLER crypto-ATM
//! network: the canonical representation of a single financial operation —
//! crypto purchase, crypto sale, cash withdrawal, or cashback — as it moves
//! through its lifecycle, and the rules keeping statuses, error codes, and
//! derived flags mutually consistent.
//!
//! Everything else a terminal does — cash hardware, exchange connectivity,
//! persistence, transport — is an external collaborator consuming this
//! contract. This crate is the contract.
//!
//! ## Architecture
//!
//! - **transaction** — The record entity, its per-type state machines,
//!   error-code taxonomy, builder, and validation.
//! - **store** — The owning in-memory store: id handoff, serialized
//!   transitions, and the cross-record derived flags.
//! - **banknotes** — Denomination breakdowns attached to cash payouts.
//! - **config** — Model constants.
//!
//! ## Design Philosophy
//!
//! 1. Invalid combinations should have no representation, not a runtime check.
//! 2. Contract violations are surfaced, never coerced — a rejected write
//!    beats a silently wrong ledger.
//! 3. Records are append-only. Money questions get audited, not re-derived.

pub mod banknotes;
pub mod config;
pub mod store;
pub mod transaction;

pub use banknotes::{banknote_total, BanknoteCount};
pub use store::{StoreError, TransactionStore};
pub use transaction::{
    ErrorCode, RecordBuilder, RecordError, TransactionRecord, TransactionStatus, TransactionType,
};
