//! The transaction record entity and its lifecycle contract.
//!
//! A [`TransactionRecord`] is the canonical representation of one financial
//! operation on the network: a purchase, a sale, a cash withdrawal, or a
//! cashback. It is created by a terminal, accepted by the server, walks its
//! type's status sequence exactly once, and then freezes — records are
//! append-only audit artifacts and are never deleted.
//!
//! Two kinds of failure meet here and must not be confused:
//!
//! - [`RecordError`] — contract violations raised by this model (invalid
//!   transition, code outside the type's space, ...). These are integration
//!   bugs and are always surfaced to the caller.
//! - [`ErrorCode`] — business outcomes recorded as *data* on the record
//!   when an operation fails. The model never invents one; it only enforces
//!   that one is present exactly when the status says so.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codes::ErrorCode;
use super::types::{BuyStatus, Currency, SellStatus, TransactionStatus, TransactionType};
use crate::banknotes::BanknoteCount;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations raised when constructing or mutating a record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The status belongs to a different transaction type's state machine.
    #[error("status {status} does not belong to transaction type {tx_type}")]
    StatusTypeMismatch {
        /// The record's type.
        tx_type: TransactionType,
        /// The offending status.
        status: TransactionStatus,
    },

    /// The state machine does not permit this move.
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        /// Status before the attempted move.
        from: TransactionStatus,
        /// Requested target status.
        to: TransactionStatus,
    },

    /// The record is frozen in a terminal status.
    #[error("record is terminal in {status}; no further transitions accepted")]
    AlreadyTerminal {
        /// The terminal status.
        status: TransactionStatus,
    },

    /// An error status was requested without a business error code.
    #[error("status {status} is an error state and requires an error code")]
    MissingErrorCode {
        /// The error status in question.
        status: TransactionStatus,
    },

    /// The error code comes from a different type's code space.
    #[error("error code {code} does not belong to the {tx_type} code space")]
    ErrorCodeTypeMismatch {
        /// The record's type.
        tx_type: TransactionType,
        /// The offending code.
        code: ErrorCode,
    },

    /// A business error code was supplied while the status is not an error
    /// state.
    #[error("error code {code} requires an error status, current status is {status}")]
    ErrorCodeWithoutErrorStatus {
        /// The offending code.
        code: ErrorCode,
        /// The record's non-error status.
        status: TransactionStatus,
    },

    /// Cashback records enter a terminal status directly; the builder was
    /// given none.
    #[error("cashback records have no in-progress state; an explicit terminal status is required")]
    CashbackStatusRequired,

    /// The server id is assigned exactly once.
    #[error("remote transaction id already assigned: {existing}")]
    RemoteIdAlreadyAssigned {
        /// The id assigned earlier.
        existing: String,
    },

    /// A withdrawal must reference the sale it cashes out.
    #[error("withdraw records must reference the sell transaction being cashed out")]
    MissingRelatedTransaction,

    /// Only withdrawals may reference another record.
    #[error("related transaction reference is only valid on withdraw records, found on {tx_type}")]
    UnexpectedRelatedTransaction {
        /// The record's type.
        tx_type: TransactionType,
    },

    /// Banknote breakdowns are attached to cash-dispensing operations only.
    #[error("banknotes can only be attached to cash-dispensing operations, not {tx_type}")]
    BanknotesNotAllowed {
        /// The record's type.
        tx_type: TransactionType,
    },

    /// Monetary fields are never negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// Purchases and sales require a full monetary pair.
    #[error("{tx_type} requires a positive {field}")]
    MissingAmount {
        /// The record's type.
        tx_type: TransactionType,
        /// Name of the missing field.
        field: &'static str,
    },

    /// Risk is recorded on value-releasing operations only.
    #[error("risk can only be recorded on value-releasing types, not {tx_type}")]
    RiskNotApplicable {
        /// The record's type.
        tx_type: TransactionType,
    },

    /// Risk is recorded at the moment of release; a failed record never
    /// released value.
    #[error("risk is recorded at release; status {status} never released value")]
    RiskNotRecordable {
        /// The record's status.
        status: TransactionStatus,
    },

    /// The risk marker is one-way and already set.
    #[error("risk marker already recorded")]
    RiskAlreadyRecorded,

    /// Autoexecution marks a server-forced completion; the record is not in
    /// a completed state.
    #[error("autoexecution can only be recorded on a completed record, current status is {status}")]
    AutoexecutionNotRecordable {
        /// The record's status.
        status: TransactionStatus,
    },

    /// The autoexecution marker is one-way and already set.
    #[error("autoexecution marker already recorded")]
    AutoexecutionAlreadyRecorded,

    /// Execution results are not recorded on failed records.
    #[error("execution results cannot be recorded on a failed record (status {status})")]
    ExecutionNotRecordable {
        /// The record's status.
        status: TransactionStatus,
    },

    /// The execution result is written once.
    #[error("execution result already recorded: {detail}")]
    ExecutionAlreadyRecorded {
        /// The previously recorded external reference.
        detail: String,
    },
}

// ---------------------------------------------------------------------------
// ExecutionOutcome
// ---------------------------------------------------------------------------

/// What the execution engine reports back once a purchase or sale actually
/// executed on the wallet/exchange side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// External reference: wallet transaction hash or exchange trade id.
    pub detail: String,
    /// Number of the exchange strategy that finished the operation.
    pub exchange_strategy_used: Option<u32>,
    /// Price quoted by the rate source at execution time.
    pub rate_source_price: Option<Decimal>,
    /// Expected profit of the operation, in percent.
    pub expected_profit: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// TransactionRecord
// ---------------------------------------------------------------------------

/// One financial operation moving through its lifecycle.
///
/// The status and the error code form an atomic pair: every mutation that
/// touches one touches both (or provably leaves the other valid), so no
/// observer can see a status from one state combined with a code belonging
/// to another.
///
/// Constructed via [`RecordBuilder`](super::builder::RecordBuilder); the
/// builder fixes the transaction type, which pins the status and error-code
/// domains for the record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// The operation this record represents. Immutable.
    pub(crate) tx_type: TransactionType,

    /// Terminal-generated provisional id, used until the server accepts the
    /// record. Advisory once `remote_transaction_id` exists; both are kept
    /// during the handoff window.
    pub(crate) local_transaction_id: Option<String>,

    /// Server-assigned id, authoritative once present. Assigned exactly
    /// once via [`promote`](Self::promote).
    pub(crate) remote_transaction_id: Option<String>,

    /// Current lifecycle status. Always within `tx_type`'s domain.
    pub(crate) status: TransactionStatus,

    /// Business error code; `NoError` unless `status` is an error state.
    pub(crate) error_code: ErrorCode,

    /// Server clock at record time.
    pub server_time: DateTime<Utc>,

    /// Terminal clock at record time, in the terminal's own timezone.
    /// Independent of `server_time`: terminals drift and sit in other
    /// zones; neither value is ever derived from the other.
    pub terminal_time: DateTime<FixedOffset>,

    /// Serial number of the terminal that created the record.
    pub terminal_serial_number: String,

    /// Server-scope public id of the customer identity.
    pub identity_public_id: String,

    /// Phone number the customer used during the operation, if any.
    pub cell_phone_used: Option<String>,

    /// Fiat amount of the operation.
    pub cash_amount: Decimal,

    /// Fiat currency of `cash_amount`.
    pub cash_currency: Currency,

    /// Crypto amount of the operation. Zero for withdrawals and cashback,
    /// where no coins move.
    pub crypto_amount: Decimal,

    /// Crypto currency of `crypto_amount`.
    pub crypto_currency: Currency,

    /// Destination address coins were (or are to be) sent to. May be empty
    /// early in flows that collect it later.
    pub crypto_address: Option<String>,

    /// Fixed fee charged for the operation, in the cash currency.
    pub fixed_transaction_fee: Decimal,

    /// Discount code presented by the customer, if any.
    pub discount_code: Option<String>,

    /// Fee discount, in percent. Independent of the other discount fields;
    /// the contract enforces no arithmetic relation between them.
    pub fee_discount: Decimal,

    /// Discount granted in crypto.
    pub crypto_discount_amount: Decimal,

    /// Discount quotient as supplied by the server. Carried verbatim.
    pub discount_quotient: Decimal,

    /// Number of the exchange strategy used, once executed.
    pub exchange_strategy_used: Option<u32>,

    /// Rate source price at execution time, once executed.
    pub rate_source_price: Option<Decimal>,

    /// Expected profit in percent, once executed.
    pub expected_profit: Option<Decimal>,

    /// External reference (wallet tx hash or exchange trade id). Empty
    /// until the underlying action executed.
    pub detail: Option<String>,

    /// For withdrawals: remote id of the sell record being cashed out.
    /// Empty for every other type.
    pub related_remote_transaction_id: Option<String>,

    /// Free-text annotation. No format constraint.
    pub note: Option<String>,

    /// Denomination breakdown of the dispensed cash. Attached only for
    /// cash-dispensing operations; empty otherwise.
    pub banknotes: Vec<BanknoteCount>,

    /// Value was released before the required confirmation depth.
    pub(crate) risk: bool,

    /// The server force-completed the operation after the terminal went
    /// offline mid-flow.
    pub(crate) autoexecuted: bool,
}

impl TransactionRecord {
    /// The operation this record represents.
    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    /// Current lifecycle status.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Business error code; `NoError` unless the status is an error state.
    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    /// Terminal-generated provisional id.
    pub fn local_transaction_id(&self) -> Option<&str> {
        self.local_transaction_id.as_deref()
    }

    /// Server-assigned authoritative id.
    pub fn remote_transaction_id(&self) -> Option<&str> {
        self.remote_transaction_id.as_deref()
    }

    /// Value was released below the required confirmation depth.
    pub fn is_risk(&self) -> bool {
        self.risk
    }

    /// The server completed the operation without a final terminal
    /// acknowledgment.
    pub fn is_autoexecuted(&self) -> bool {
        self.autoexecuted
    }

    /// Coins were purchased on the exchange: true iff this is a purchase
    /// record that completed.
    pub fn is_purchased(&self) -> bool {
        self.status == TransactionStatus::Buy(BuyStatus::Completed)
    }

    /// Coins were sold on the exchange: true iff this is a sale whose
    /// payment at least started arriving and whose sale detail is recorded.
    pub fn is_sold(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Sell(SellStatus::PaymentArriving)
                | TransactionStatus::Sell(SellStatus::PaymentArrived)
        ) && self.detail.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Assigns the server id. The id is authoritative and assigned exactly
    /// once; the local id stays readable for the handoff window.
    ///
    /// # Errors
    ///
    /// [`RecordError::RemoteIdAlreadyAssigned`] on re-promotion.
    pub fn promote(&mut self, remote_id: impl Into<String>) -> Result<(), RecordError> {
        if let Some(existing) = &self.remote_transaction_id {
            return Err(RecordError::RemoteIdAlreadyAssigned {
                existing: existing.clone(),
            });
        }
        self.remote_transaction_id = Some(remote_id.into());
        Ok(())
    }

    /// Moves the record along its success path.
    ///
    /// Error states are entered via [`fail`](Self::fail), never here — an
    /// error entry must record a business code atomically with the status.
    ///
    /// # Errors
    ///
    /// - [`RecordError::StatusTypeMismatch`] if `next` belongs to another
    ///   type's state machine.
    /// - [`RecordError::MissingErrorCode`] if `next` is an error state.
    /// - [`RecordError::AlreadyTerminal`] once the record is frozen.
    /// - [`RecordError::InvalidTransition`] for backward or skipping moves.
    pub fn advance(&mut self, next: TransactionStatus) -> Result<(), RecordError> {
        if next.transaction_type() != self.tx_type {
            return Err(RecordError::StatusTypeMismatch {
                tx_type: self.tx_type,
                status: next,
            });
        }
        if next.is_error() {
            return Err(RecordError::MissingErrorCode { status: next });
        }
        if self.status.is_terminal() {
            return Err(RecordError::AlreadyTerminal {
                status: self.status,
            });
        }
        if !self.status.can_transition_to(&next) {
            return Err(RecordError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Moves the record into its type's error state, recording the business
    /// code in the same step. The status+code pair is updated atomically.
    ///
    /// Cashback records never pass through here: they are terminal on entry,
    /// so `fail` reports [`RecordError::AlreadyTerminal`] for them.
    ///
    /// # Errors
    ///
    /// - [`RecordError::AlreadyTerminal`] once the record is frozen.
    /// - [`RecordError::MissingErrorCode`] if `code` is `NoError`.
    /// - [`RecordError::ErrorCodeTypeMismatch`] if `code` belongs to another
    ///   type's space.
    pub fn fail(&mut self, code: ErrorCode) -> Result<(), RecordError> {
        if self.status.is_terminal() {
            return Err(RecordError::AlreadyTerminal {
                status: self.status,
            });
        }
        let error_status = self.tx_type.error_status();
        if !code.is_error() {
            return Err(RecordError::MissingErrorCode {
                status: error_status,
            });
        }
        if !code.applies_to(self.tx_type) {
            return Err(RecordError::ErrorCodeTypeMismatch {
                tx_type: self.tx_type,
                code,
            });
        }
        self.status = error_status;
        self.error_code = code;
        Ok(())
    }

    /// Records what the execution engine reported back: the external
    /// reference plus strategy, rate, and profit figures. Written once.
    ///
    /// Permitted on any non-error status, including `PaymentArrived` — a
    /// sale executes on the exchange only after the coin payment settles.
    ///
    /// # Errors
    ///
    /// - [`RecordError::ExecutionNotRecordable`] on a failed record.
    /// - [`RecordError::ExecutionAlreadyRecorded`] on a second write.
    pub fn record_execution(&mut self, outcome: ExecutionOutcome) -> Result<(), RecordError> {
        if self.status.is_error() {
            return Err(RecordError::ExecutionNotRecordable {
                status: self.status,
            });
        }
        if let Some(existing) = self.detail.as_deref().filter(|d| !d.is_empty()) {
            return Err(RecordError::ExecutionAlreadyRecorded {
                detail: existing.to_string(),
            });
        }
        self.detail = Some(outcome.detail);
        self.exchange_strategy_used = outcome.exchange_strategy_used;
        self.rate_source_price = outcome.rate_source_price;
        self.expected_profit = outcome.expected_profit;
        Ok(())
    }

    /// Attaches the denomination breakdown reported by the counting
    /// hardware. Replaces any previous breakdown.
    ///
    /// # Errors
    ///
    /// [`RecordError::BanknotesNotAllowed`] for purchases — only sell
    /// payouts, withdrawals, and cashback dispense cash.
    pub fn attach_banknotes(&mut self, notes: Vec<BanknoteCount>) -> Result<(), RecordError> {
        if self.tx_type == TransactionType::BuyCrypto {
            return Err(RecordError::BanknotesNotAllowed {
                tx_type: self.tx_type,
            });
        }
        self.banknotes = notes;
        Ok(())
    }

    /// Records that value was released before the required confirmation
    /// depth was reached. One-way; recorded at the moment of release.
    ///
    /// # Errors
    ///
    /// - [`RecordError::RiskNotApplicable`] for withdrawals and cashback,
    ///   which dispense from already-settled value.
    /// - [`RecordError::RiskNotRecordable`] on a failed record.
    /// - [`RecordError::RiskAlreadyRecorded`] on a second call.
    pub fn mark_risk(&mut self) -> Result<(), RecordError> {
        match self.tx_type {
            TransactionType::BuyCrypto | TransactionType::SellCrypto => {}
            other => return Err(RecordError::RiskNotApplicable { tx_type: other }),
        }
        if self.status.is_error() {
            return Err(RecordError::RiskNotRecordable {
                status: self.status,
            });
        }
        if self.risk {
            return Err(RecordError::RiskAlreadyRecorded);
        }
        self.risk = true;
        Ok(())
    }

    /// Records that the server force-completed this operation after the
    /// terminal went offline mid-flow. One-way; only meaningful once the
    /// record sits in a completed (terminal, non-error) status.
    ///
    /// # Errors
    ///
    /// - [`RecordError::AutoexecutionNotRecordable`] unless the status is a
    ///   completed terminal state.
    /// - [`RecordError::AutoexecutionAlreadyRecorded`] on a second call.
    pub fn mark_autoexecuted(&mut self) -> Result<(), RecordError> {
        if !self.status.is_terminal() || self.status.is_error() {
            return Err(RecordError::AutoexecutionNotRecordable {
                status: self.status,
            });
        }
        if self.autoexecuted {
            return Err(RecordError::AutoexecutionAlreadyRecorded);
        }
        self.autoexecuted = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
