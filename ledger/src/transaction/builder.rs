//! Record construction via the builder pattern.
//!
//! [`RecordBuilder::new`] fixes the transaction type, and with it the status
//! and error-code domains that apply for the rest of the record's life.
//! `.build()` runs the full cross-field validation pass and hands back either
//! a consistent [`TransactionRecord`] or the specific contract violation —
//! nothing is silently coerced.

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::codes::ErrorCode;
use super::record::{RecordError, TransactionRecord};
use super::types::{Currency, TransactionStatus, TransactionType};
use super::validation::validate_record;
use crate::banknotes::BanknoteCount;

/// Fluent builder for [`TransactionRecord`] instances.
///
/// # Usage
///
/// ```
/// use rust_decimal::Decimal;
/// use teller_ledger::transaction::{Currency, RecordBuilder, TransactionType};
///
/// let record = RecordBuilder::new(TransactionType::BuyCrypto)
///     .terminal_serial_number("BT300042")
///     .identity_public_id("IA7HHQXL")
///     .cash(Decimal::new(20000, 2), Currency::USD)
///     .crypto(Decimal::new(215_000, 8), Currency::BTC)
///     .build()
///     .expect("valid purchase record");
///
/// assert!(record.local_transaction_id().is_some());
/// assert!(record.remote_transaction_id().is_none());
/// ```
///
/// Defaults: a fresh v4 local transaction id, `server_time`/`terminal_time`
/// of now, the type's initial status, and `ErrorCode::NoError`. Cashback has
/// no initial status — [`status`](Self::status) must be called with one of
/// its terminal states.
pub struct RecordBuilder {
    tx_type: TransactionType,
    local_transaction_id: Option<String>,
    remote_transaction_id: Option<String>,
    status: Option<TransactionStatus>,
    error_code: ErrorCode,
    server_time: Option<DateTime<Utc>>,
    terminal_time: Option<DateTime<FixedOffset>>,
    terminal_serial_number: String,
    identity_public_id: String,
    cell_phone_used: Option<String>,
    cash_amount: Decimal,
    cash_currency: Currency,
    crypto_amount: Decimal,
    crypto_currency: Currency,
    crypto_address: Option<String>,
    fixed_transaction_fee: Decimal,
    discount_code: Option<String>,
    fee_discount: Decimal,
    crypto_discount_amount: Decimal,
    discount_quotient: Decimal,
    related_remote_transaction_id: Option<String>,
    note: Option<String>,
    banknotes: Vec<BanknoteCount>,
}

impl RecordBuilder {
    /// Creates a builder for the given transaction type.
    pub fn new(tx_type: TransactionType) -> Self {
        Self {
            tx_type,
            local_transaction_id: None,
            remote_transaction_id: None,
            status: None,
            error_code: ErrorCode::NoError,
            server_time: None,
            terminal_time: None,
            terminal_serial_number: String::new(),
            identity_public_id: String::new(),
            cell_phone_used: None,
            cash_amount: Decimal::ZERO,
            cash_currency: Currency::USD,
            crypto_amount: Decimal::ZERO,
            crypto_currency: Currency::BTC,
            crypto_address: None,
            fixed_transaction_fee: Decimal::ZERO,
            discount_code: None,
            fee_discount: Decimal::ZERO,
            crypto_discount_amount: Decimal::ZERO,
            discount_quotient: Decimal::ZERO,
            related_remote_transaction_id: None,
            note: None,
            banknotes: Vec::new(),
        }
    }

    /// Overrides the terminal-generated local id. Without this, `build()`
    /// generates a fresh v4 id.
    pub fn local_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.local_transaction_id = Some(id.into());
        self
    }

    /// Sets the server-assigned remote id. Used when reconstructing a
    /// record from a server snapshot; terminal-created records get theirs
    /// via `TransactionRecord::promote` instead.
    pub fn remote_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.remote_transaction_id = Some(id.into());
        self
    }

    /// Overrides the entry status. Must belong to the builder's type;
    /// mandatory for cashback records, which enter a terminal state
    /// directly.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the business error code. Only consistent together with the
    /// type's error status.
    pub fn error_code(mut self, code: ErrorCode) -> Self {
        self.error_code = code;
        self
    }

    /// Sets the server clock explicitly. Defaults to now.
    pub fn server_time(mut self, time: DateTime<Utc>) -> Self {
        self.server_time = Some(time);
        self
    }

    /// Sets the terminal's local-timezone clock explicitly. Defaults to
    /// now at UTC offset; real terminals report their own zone.
    pub fn terminal_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.terminal_time = Some(time);
        self
    }

    /// Serial number of the originating terminal.
    pub fn terminal_serial_number(mut self, serial: impl Into<String>) -> Self {
        self.terminal_serial_number = serial.into();
        self
    }

    /// Server-scope public id of the customer identity.
    pub fn identity_public_id(mut self, id: impl Into<String>) -> Self {
        self.identity_public_id = id.into();
        self
    }

    /// Phone number used during the operation.
    pub fn cell_phone_used(mut self, phone: impl Into<String>) -> Self {
        self.cell_phone_used = Some(phone.into());
        self
    }

    /// Fiat side of the monetary pair.
    pub fn cash(mut self, amount: Decimal, currency: Currency) -> Self {
        self.cash_amount = amount;
        self.cash_currency = currency;
        self
    }

    /// Crypto side of the monetary pair.
    pub fn crypto(mut self, amount: Decimal, currency: Currency) -> Self {
        self.crypto_amount = amount;
        self.crypto_currency = currency;
        self
    }

    /// Destination address for the coins.
    pub fn crypto_address(mut self, address: impl Into<String>) -> Self {
        self.crypto_address = Some(address.into());
        self
    }

    /// Fixed fee charged for the operation, in the cash currency.
    pub fn fixed_transaction_fee(mut self, fee: Decimal) -> Self {
        self.fixed_transaction_fee = fee;
        self
    }

    /// Discount code presented by the customer.
    pub fn discount_code(mut self, code: impl Into<String>) -> Self {
        self.discount_code = Some(code.into());
        self
    }

    /// Fee discount in percent.
    pub fn fee_discount(mut self, discount: Decimal) -> Self {
        self.fee_discount = discount;
        self
    }

    /// Discount granted in crypto.
    pub fn crypto_discount_amount(mut self, amount: Decimal) -> Self {
        self.crypto_discount_amount = amount;
        self
    }

    /// Discount quotient as supplied by the server.
    pub fn discount_quotient(mut self, quotient: Decimal) -> Self {
        self.discount_quotient = quotient;
        self
    }

    /// Remote id of the sell record a withdrawal cashes out. Only valid on
    /// withdraw records.
    pub fn related_remote_transaction_id(mut self, id: impl Into<String>) -> Self {
        self.related_remote_transaction_id = Some(id.into());
        self
    }

    /// Free-text annotation.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Denomination breakdown for cash-dispensing operations.
    pub fn banknotes(mut self, notes: Vec<BanknoteCount>) -> Self {
        self.banknotes = notes;
        self
    }

    /// Consumes the builder and produces a validated [`TransactionRecord`].
    ///
    /// # Errors
    ///
    /// [`RecordError::CashbackStatusRequired`] for a cashback build without
    /// an explicit status, plus everything
    /// [`validate_record`](super::validation::validate_record) rejects.
    pub fn build(self) -> Result<TransactionRecord, RecordError> {
        let status = match self.status.or_else(|| self.tx_type.initial_status()) {
            Some(status) => status,
            None => return Err(RecordError::CashbackStatusRequired),
        };

        let server_time = self.server_time.unwrap_or_else(Utc::now);
        let terminal_time = self
            .terminal_time
            .unwrap_or_else(|| server_time.fixed_offset());
        let local_transaction_id = self
            .local_transaction_id
            .or_else(|| Some(Uuid::new_v4().to_string()));

        let record = TransactionRecord {
            tx_type: self.tx_type,
            local_transaction_id,
            remote_transaction_id: self.remote_transaction_id,
            status,
            error_code: self.error_code,
            server_time,
            terminal_time,
            terminal_serial_number: self.terminal_serial_number,
            identity_public_id: self.identity_public_id,
            cell_phone_used: self.cell_phone_used,
            cash_amount: self.cash_amount,
            cash_currency: self.cash_currency,
            crypto_amount: self.crypto_amount,
            crypto_currency: self.crypto_currency,
            crypto_address: self.crypto_address,
            fixed_transaction_fee: self.fixed_transaction_fee,
            discount_code: self.discount_code,
            fee_discount: self.fee_discount,
            crypto_discount_amount: self.crypto_discount_amount,
            discount_quotient: self.discount_quotient,
            exchange_strategy_used: None,
            rate_source_price: None,
            expected_profit: None,
            detail: None,
            related_remote_transaction_id: self.related_remote_transaction_id,
            note: self.note,
            banknotes: self.banknotes,
            risk: false,
            autoexecuted: false,
        };

        validate_record(&record)?;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
