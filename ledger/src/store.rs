//! The owning store for transaction records.
//!
//! Records are passive values; the store is where mutation gets serialized.
//! Every write goes through `&mut self`, so exactly one writer transitions a
//! given record at a time, and the status+error-code pair is only ever
//! updated through the record's own atomic operations.
//!
//! The store also answers the two derived questions a single record cannot:
//! whether a sale has been cashed out (`is_withdrawn`) and whether it is
//! ready to be (`can_be_cashed_out`). Both require looking across records
//! for a withdrawal referencing the sale, and the store is the one place
//! all records are visible.
//!
//! Two maps, one per identifier authority: `pending` holds terminal-created
//! records under their local ids until the server accepts them; `accepted`
//! holds everything with a remote id. [`accept`](TransactionStore::accept)
//! moves a record from one to the other, which is the id handoff of the
//! record lifecycle.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::banknotes::BanknoteCount;
use crate::transaction::codes::ErrorCode;
use crate::transaction::record::{ExecutionOutcome, RecordError, TransactionRecord};
use crate::transaction::types::{SellStatus, TransactionStatus, TransactionType, WithdrawStatus};
use crate::transaction::validation::validate_record;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of store-level operations: lookups, id handoff, and the
/// cross-record rules a single record cannot check.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No accepted record with this remote id.
    #[error("unknown transaction {remote_id}")]
    UnknownRecord {
        /// The id that was looked up.
        remote_id: String,
    },

    /// No pending record with this local id.
    #[error("no pending record with local id {local_id}")]
    UnknownLocalRecord {
        /// The id that was looked up.
        local_id: String,
    },

    /// Remote ids are unique in server scope.
    #[error("a record with remote id {remote_id} already exists")]
    DuplicateRemoteId {
        /// The colliding id.
        remote_id: String,
    },

    /// A pending record with this local id is already queued.
    #[error("a pending record with local id {local_id} already exists")]
    DuplicateLocalId {
        /// The colliding id.
        local_id: String,
    },

    /// The record already went through server acceptance.
    #[error("record already accepted as {remote_id}; submit is for terminal-created records")]
    AlreadyAccepted {
        /// The remote id the record carries.
        remote_id: String,
    },

    /// The record has no local id to key the pending map by.
    #[error("record carries no local transaction id")]
    MissingLocalId,

    /// The record has no remote id to key the accepted map by.
    #[error("record carries no remote transaction id; use submit for terminal-created records")]
    MissingRemoteId,

    /// A withdrawal referenced a sale that is not in the store.
    #[error("referenced sell transaction {remote_id} not found")]
    RelatedTransactionNotFound {
        /// The dangling reference.
        remote_id: String,
    },

    /// A withdrawal referenced a record of the wrong type.
    #[error("transaction {remote_id} is a {tx_type}, withdrawals must reference a sell")]
    RelatedNotSell {
        /// The referenced id.
        remote_id: String,
        /// The referenced record's actual type.
        tx_type: TransactionType,
    },

    /// The referenced sale has no cash waiting to be withdrawn.
    #[error("sell transaction {remote_id} is not ready to be cashed out")]
    NoCashableSource {
        /// The referenced sale.
        remote_id: String,
    },

    /// A record-level contract violation, passed through unchanged.
    #[error(transparent)]
    Record(#[from] RecordError),
}

// ---------------------------------------------------------------------------
// TransactionStore
// ---------------------------------------------------------------------------

/// In-memory store owning every transaction record the process knows about.
///
/// Records are append-only audit artifacts: the store offers no delete. A
/// record enters either through [`submit`](Self::submit) (terminal-created,
/// local id only) followed by [`accept`](Self::accept), or directly through
/// [`insert`](Self::insert) when reconstructed from a server snapshot that
/// already carries a remote id.
#[derive(Debug, Default)]
pub struct TransactionStore {
    /// Terminal-created records awaiting server acceptance, by local id.
    pending: HashMap<String, TransactionRecord>,
    /// Accepted records, by remote id.
    accepted: HashMap<String, TransactionRecord>,
}

impl TransactionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, pending and accepted.
    pub fn len(&self) -> usize {
        self.pending.len() + self.accepted.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.accepted.is_empty()
    }

    /// Queues a terminal-created record under its local id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyAccepted`] if the record already carries a
    ///   remote id — use [`insert`](Self::insert) for snapshots.
    /// - [`StoreError::MissingLocalId`] / [`StoreError::DuplicateLocalId`]
    ///   on id problems.
    pub fn submit(&mut self, record: TransactionRecord) -> Result<String, StoreError> {
        if let Some(remote_id) = record.remote_transaction_id() {
            return Err(StoreError::AlreadyAccepted {
                remote_id: remote_id.to_string(),
            });
        }
        let local_id = record
            .local_transaction_id()
            .ok_or(StoreError::MissingLocalId)?
            .to_string();
        if self.pending.contains_key(&local_id) {
            return Err(StoreError::DuplicateLocalId { local_id });
        }

        info!(
            local_id = %local_id,
            tx_type = %record.tx_type(),
            terminal = %record.terminal_serial_number,
            "record submitted, awaiting acceptance"
        );
        self.pending.insert(local_id.clone(), record);
        Ok(local_id)
    }

    /// Inserts a record that already carries a remote id, re-running the
    /// cross-field validation pass on the way in.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateRemoteId`], [`StoreError::MissingRemoteId`],
    /// or any validation failure.
    pub fn insert(&mut self, record: TransactionRecord) -> Result<(), StoreError> {
        validate_record(&record).map_err(StoreError::Record)?;
        let remote_id = record
            .remote_transaction_id()
            .ok_or(StoreError::MissingRemoteId)?
            .to_string();
        if self.accepted.contains_key(&remote_id) {
            return Err(StoreError::DuplicateRemoteId { remote_id });
        }
        self.accepted.insert(remote_id, record);
        Ok(())
    }

    /// Server acceptance: promotes a pending record to its remote id and
    /// moves it into the accepted map. The local id stays on the record for
    /// the handoff window.
    ///
    /// # Errors
    ///
    /// [`StoreError::UnknownLocalRecord`], [`StoreError::DuplicateRemoteId`],
    /// or the record's own promotion failure.
    pub fn accept(
        &mut self,
        local_id: &str,
        remote_id: impl Into<String>,
    ) -> Result<&TransactionRecord, StoreError> {
        let remote_id = remote_id.into();
        if self.accepted.contains_key(&remote_id) {
            return Err(StoreError::DuplicateRemoteId { remote_id });
        }
        let mut record =
            self.pending
                .remove(local_id)
                .ok_or_else(|| StoreError::UnknownLocalRecord {
                    local_id: local_id.to_string(),
                })?;

        if let Err(e) = record.promote(remote_id.clone()) {
            // Put the record back untouched before surfacing the failure.
            self.pending.insert(local_id.to_string(), record);
            return Err(StoreError::Record(e));
        }

        info!(
            local_id = %local_id,
            remote_id = %remote_id,
            tx_type = %record.tx_type(),
            "record accepted by server"
        );
        self.accepted.insert(remote_id.clone(), record);
        Ok(&self.accepted[&remote_id])
    }

    /// Looks up an accepted record by remote id.
    pub fn get(&self, remote_id: &str) -> Option<&TransactionRecord> {
        self.accepted.get(remote_id)
    }

    /// Looks up a pending record by local id.
    pub fn get_pending(&self, local_id: &str) -> Option<&TransactionRecord> {
        self.pending.get(local_id)
    }

    /// Advances an accepted record along its success path.
    pub fn advance(
        &mut self,
        remote_id: &str,
        next: TransactionStatus,
    ) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.advance(next)?;
        info!(remote_id = %remote_id, status = %next, "record advanced");
        Ok(())
    }

    /// Fails an accepted record, recording the business code atomically
    /// with the status change.
    pub fn fail(&mut self, remote_id: &str, code: ErrorCode) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.fail(code)?;
        warn!(remote_id = %remote_id, error_code = %code, "record failed");
        Ok(())
    }

    /// Records the execution engine's outcome on an accepted record.
    pub fn record_execution(
        &mut self,
        remote_id: &str,
        outcome: ExecutionOutcome,
    ) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.record_execution(outcome)?;
        Ok(())
    }

    /// Attaches a denomination breakdown to an accepted record.
    pub fn attach_banknotes(
        &mut self,
        remote_id: &str,
        notes: Vec<BanknoteCount>,
    ) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.attach_banknotes(notes)?;
        Ok(())
    }

    /// Marks a below-confirmation-depth release on an accepted record.
    pub fn mark_risk(&mut self, remote_id: &str) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.mark_risk()?;
        warn!(remote_id = %remote_id, "value released below confirmation depth");
        Ok(())
    }

    /// Marks a server-forced completion on an accepted record.
    pub fn mark_autoexecuted(&mut self, remote_id: &str) -> Result<(), StoreError> {
        let record = self.get_accepted_mut(remote_id)?;
        record.mark_autoexecuted()?;
        warn!(remote_id = %remote_id, "completed without terminal acknowledgment");
        Ok(())
    }

    /// Opens a withdrawal against a sale, enforcing the cross-record rule a
    /// withdrawal record cannot check on its own: the referenced record must
    /// be a sale with cash ready and not yet withdrawn.
    ///
    /// The withdrawal is queued like any terminal-created record and
    /// returned by local id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Record`] with
    ///   [`RecordError::MissingRelatedTransaction`] when the withdrawal
    ///   carries no reference.
    /// - [`StoreError::RelatedTransactionNotFound`] /
    ///   [`StoreError::RelatedNotSell`] /
    ///   [`StoreError::NoCashableSource`] when the reference does not point
    ///   at a cashable sale.
    pub fn open_withdrawal(&mut self, withdraw: TransactionRecord) -> Result<String, StoreError> {
        let sell_id = withdraw
            .related_remote_transaction_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(StoreError::Record(RecordError::MissingRelatedTransaction))?
            .to_string();

        let sell = self
            .accepted
            .get(&sell_id)
            .ok_or_else(|| StoreError::RelatedTransactionNotFound {
                remote_id: sell_id.clone(),
            })?;
        if sell.tx_type() != TransactionType::SellCrypto {
            return Err(StoreError::RelatedNotSell {
                remote_id: sell_id,
                tx_type: sell.tx_type(),
            });
        }
        if !self.can_be_cashed_out(&sell_id) {
            return Err(StoreError::NoCashableSource { remote_id: sell_id });
        }

        info!(sell_id = %sell_id, "withdrawal opened against sale");
        self.submit(withdraw)
    }

    /// Whether the cash of this sale has already been handed out: true iff
    /// a completed withdrawal referencing it exists.
    pub fn is_withdrawn(&self, sell_remote_id: &str) -> bool {
        self.all_records().any(|record| {
            record.tx_type() == TransactionType::WithdrawCash
                && record.status() == TransactionStatus::Withdraw(WithdrawStatus::Completed)
                && record.related_remote_transaction_id.as_deref() == Some(sell_remote_id)
        })
    }

    /// Whether cash is ready for this sale but not yet withdrawn: true iff
    /// the record is a sale in `PaymentArrived` with no completed
    /// withdrawal referencing it.
    pub fn can_be_cashed_out(&self, sell_remote_id: &str) -> bool {
        let Some(sell) = self.accepted.get(sell_remote_id) else {
            return false;
        };
        sell.status() == TransactionStatus::Sell(SellStatus::PaymentArrived)
            && !self.is_withdrawn(sell_remote_id)
    }

    /// Accepted records in a terminal, non-error status — the reconciliation
    /// view the reporting layer reads.
    pub fn completed_records(&self) -> Vec<&TransactionRecord> {
        self.accepted
            .values()
            .filter(|r| r.status().is_terminal() && !r.status().is_error())
            .collect()
    }

    /// All records created by one terminal, pending and accepted.
    pub fn records_for_terminal(&self, serial: &str) -> Vec<&TransactionRecord> {
        self.all_records()
            .filter(|r| r.terminal_serial_number == serial)
            .collect()
    }

    fn all_records(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.accepted.values().chain(self.pending.values())
    }

    fn get_accepted_mut(
        &mut self,
        remote_id: &str,
    ) -> Result<&mut TransactionRecord, StoreError> {
        self.accepted
            .get_mut(remote_id)
            .ok_or_else(|| StoreError::UnknownRecord {
                remote_id: remote_id.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::builder::RecordBuilder;
    use crate::transaction::codes::SellErrorCode;
    use crate::transaction::types::{BuyStatus, Currency};
    use rust_decimal_macros::dec;

    fn sell_record() -> TransactionRecord {
        RecordBuilder::new(TransactionType::SellCrypto)
            .terminal_serial_number("BT300055")
            .identity_public_id("ID9")
            .cash(dec!(400.00), Currency::EUR)
            .crypto(dec!(0.12), Currency::ETH)
            .build()
            .unwrap()
    }

    fn withdraw_record(sell_id: &str) -> TransactionRecord {
        RecordBuilder::new(TransactionType::WithdrawCash)
            .terminal_serial_number("BT300055")
            .identity_public_id("ID9")
            .cash(dec!(400.00), Currency::EUR)
            .related_remote_transaction_id(sell_id)
            .build()
            .unwrap()
    }

    /// Helper: submit + accept a sale and walk it to `PaymentArrived`.
    fn arrived_sell(store: &mut TransactionStore, remote_id: &str) {
        let local = store.submit(sell_record()).unwrap();
        store.accept(&local, remote_id).unwrap();
        store
            .advance(
                remote_id,
                TransactionStatus::Sell(SellStatus::PaymentArriving),
            )
            .unwrap();
        store
            .advance(
                remote_id,
                TransactionStatus::Sell(SellStatus::PaymentArrived),
            )
            .unwrap();
    }

    #[test]
    fn submit_then_accept_moves_record() {
        let mut store = TransactionStore::new();
        let local = store.submit(sell_record()).unwrap();
        assert!(store.get_pending(&local).is_some());

        let accepted = store.accept(&local, "R-100").unwrap();
        assert_eq!(accepted.remote_transaction_id(), Some("R-100"));
        assert_eq!(accepted.local_transaction_id(), Some(local.as_str()));
        assert!(store.get_pending(&local).is_none());
        assert!(store.get("R-100").is_some());
    }

    #[test]
    fn accept_unknown_local_id_fails() {
        let mut store = TransactionStore::new();
        let result = store.accept("no-such-id", "R-1");
        assert!(matches!(result, Err(StoreError::UnknownLocalRecord { .. })));
    }

    #[test]
    fn duplicate_remote_id_rejected() {
        let mut store = TransactionStore::new();
        let a = store.submit(sell_record()).unwrap();
        let b = store.submit(sell_record()).unwrap();
        store.accept(&a, "R-1").unwrap();

        let result = store.accept(&b, "R-1");
        assert!(matches!(result, Err(StoreError::DuplicateRemoteId { .. })));
        // The second record is still pending and untouched.
        assert!(store.get_pending(&b).is_some());
        assert!(store.get_pending(&b).unwrap().remote_transaction_id().is_none());
    }

    #[test]
    fn submit_rejects_accepted_record() {
        let mut store = TransactionStore::new();
        let record = RecordBuilder::new(TransactionType::SellCrypto)
            .remote_transaction_id("R-7")
            .terminal_serial_number("BT300055")
            .identity_public_id("ID9")
            .cash(dec!(10.00), Currency::EUR)
            .crypto(dec!(0.01), Currency::ETH)
            .build()
            .unwrap();
        let result = store.submit(record);
        assert!(matches!(result, Err(StoreError::AlreadyAccepted { .. })));
    }

    #[test]
    fn advance_and_fail_through_store() {
        let mut store = TransactionStore::new();
        let local = store.submit(sell_record()).unwrap();
        store.accept(&local, "R-200").unwrap();

        store
            .advance("R-200", TransactionStatus::Sell(SellStatus::PaymentArriving))
            .unwrap();
        store
            .fail("R-200", ErrorCode::Sell(SellErrorCode::PaymentInvalid))
            .unwrap();

        let record = store.get("R-200").unwrap();
        assert_eq!(record.status(), TransactionStatus::Sell(SellStatus::Error));
        assert_eq!(
            record.error_code(),
            ErrorCode::Sell(SellErrorCode::PaymentInvalid)
        );
    }

    #[test]
    fn advance_unknown_record_fails() {
        let mut store = TransactionStore::new();
        let result = store.advance("R-404", TransactionStatus::Buy(BuyStatus::Completed));
        assert!(matches!(result, Err(StoreError::UnknownRecord { .. })));
    }

    #[test]
    fn withdrawal_against_arrived_sell() {
        let mut store = TransactionStore::new();
        arrived_sell(&mut store, "R-SELL");
        assert!(store.can_be_cashed_out("R-SELL"));
        assert!(!store.is_withdrawn("R-SELL"));

        let local = store.open_withdrawal(withdraw_record("R-SELL")).unwrap();
        store.accept(&local, "R-WD").unwrap();
        store
            .advance("R-WD", TransactionStatus::Withdraw(WithdrawStatus::Completed))
            .unwrap();

        assert!(store.is_withdrawn("R-SELL"));
        assert!(!store.can_be_cashed_out("R-SELL"));
    }

    #[test]
    fn withdrawal_rejected_before_payment_arrives() {
        let mut store = TransactionStore::new();
        let local = store.submit(sell_record()).unwrap();
        store.accept(&local, "R-SELL").unwrap();
        store
            .advance("R-SELL", TransactionStatus::Sell(SellStatus::PaymentArriving))
            .unwrap();

        let result = store.open_withdrawal(withdraw_record("R-SELL"));
        assert!(matches!(result, Err(StoreError::NoCashableSource { .. })));
    }

    #[test]
    fn withdrawal_rejected_against_missing_sell() {
        let mut store = TransactionStore::new();
        let result = store.open_withdrawal(withdraw_record("R-GHOST"));
        assert!(matches!(
            result,
            Err(StoreError::RelatedTransactionNotFound { .. })
        ));
    }

    #[test]
    fn withdrawal_rejected_against_non_sell() {
        let mut store = TransactionStore::new();
        let buy = RecordBuilder::new(TransactionType::BuyCrypto)
            .remote_transaction_id("R-BUY")
            .terminal_serial_number("BT300055")
            .identity_public_id("ID9")
            .cash(dec!(50.00), Currency::EUR)
            .crypto(dec!(0.001), Currency::BTC)
            .build()
            .unwrap();
        store.insert(buy).unwrap();

        let result = store.open_withdrawal(withdraw_record("R-BUY"));
        assert!(matches!(result, Err(StoreError::RelatedNotSell { .. })));
    }

    #[test]
    fn second_withdrawal_rejected_after_cashout() {
        let mut store = TransactionStore::new();
        arrived_sell(&mut store, "R-SELL");

        let local = store.open_withdrawal(withdraw_record("R-SELL")).unwrap();
        store.accept(&local, "R-WD").unwrap();
        store
            .advance("R-WD", TransactionStatus::Withdraw(WithdrawStatus::Completed))
            .unwrap();

        let result = store.open_withdrawal(withdraw_record("R-SELL"));
        assert!(matches!(result, Err(StoreError::NoCashableSource { .. })));
    }

    #[test]
    fn failed_withdrawal_leaves_sale_cashable() {
        let mut store = TransactionStore::new();
        arrived_sell(&mut store, "R-SELL");

        let local = store.open_withdrawal(withdraw_record("R-SELL")).unwrap();
        store.accept(&local, "R-WD").unwrap();
        store
            .fail(
                "R-WD",
                ErrorCode::Withdraw(
                    crate::transaction::codes::WithdrawErrorCode::CashDispensingFailed,
                ),
            )
            .unwrap();

        // The dispenser jammed; the cash is still owed.
        assert!(!store.is_withdrawn("R-SELL"));
        assert!(store.can_be_cashed_out("R-SELL"));
        // A retry withdrawal is accepted.
        assert!(store.open_withdrawal(withdraw_record("R-SELL")).is_ok());
    }

    #[test]
    fn reporting_queries() {
        let mut store = TransactionStore::new();
        arrived_sell(&mut store, "R-1");

        let other = RecordBuilder::new(TransactionType::BuyCrypto)
            .remote_transaction_id("R-2")
            .terminal_serial_number("BT300099")
            .identity_public_id("ID1")
            .cash(dec!(75.00), Currency::USD)
            .crypto(dec!(0.002), Currency::BTC)
            .build()
            .unwrap();
        store.insert(other).unwrap();

        // The sale arrived (terminal, non-error); the buy is still in progress.
        let completed = store.completed_records();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].remote_transaction_id(), Some("R-1"));

        assert_eq!(store.records_for_terminal("BT300055").len(), 1);
        assert_eq!(store.records_for_terminal("BT300099").len(), 1);
        assert_eq!(store.len(), 2);
    }
}
