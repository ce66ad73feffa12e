//! Cross-field invariant validation.
//!
//! Every record entering the system — fresh from the builder or
//! reconstructed from a server snapshot — must pass [`validate_record`].
//! The checks are ordered from cheapest to most expensive so clearly broken
//! records fail fast, and the first violated invariant is returned as the
//! error; nothing is coerced or repaired.

use rust_decimal::Decimal;

use super::record::{RecordError, TransactionRecord};
use super::types::TransactionType;

/// Validates a record against the cross-field contract.
///
/// The checks, in order:
///
/// 1. **Status domain** — the status must belong to the record's type.
/// 2. **Error pairing** — a business error code is present exactly when the
///    status is the type's error state, and comes from the type's own code
///    space. Cashback has no code space, so its error state carries
///    `NoError`.
/// 3. **Amount signs** — no monetary field is negative.
/// 4. **Monetary pair** — purchases and sales carry a positive cash and
///    crypto amount; every operation moves a positive amount of cash.
/// 5. **Related reference** — withdrawals reference the sale they cash
///    out; no other type carries a reference.
/// 6. **Banknotes** — a denomination breakdown only appears on
///    cash-dispensing operations, never on a purchase.
///
/// # Errors
///
/// Returns the first failing check as a [`RecordError`].
pub fn validate_record(record: &TransactionRecord) -> Result<(), RecordError> {
    let tx_type = record.tx_type();
    let status = record.status();
    let code = record.error_code();

    // 1. Status must be within the type's domain.
    if status.transaction_type() != tx_type {
        return Err(RecordError::StatusTypeMismatch { tx_type, status });
    }

    // 2. Error code <-> error status pairing, atomically consistent.
    if status.is_error() {
        if !code.applies_to(tx_type) {
            return Err(RecordError::ErrorCodeTypeMismatch { tx_type, code });
        }
        // Cashback's code space is empty; its error state stands alone.
        if tx_type != TransactionType::Cashback && !code.is_error() {
            return Err(RecordError::MissingErrorCode { status });
        }
    } else if code.is_error() {
        return Err(RecordError::ErrorCodeWithoutErrorStatus { code, status });
    }

    // 3. Monetary fields are never negative.
    for (field, value) in [
        ("cash amount", record.cash_amount),
        ("crypto amount", record.crypto_amount),
        ("fixed transaction fee", record.fixed_transaction_fee),
        ("fee discount", record.fee_discount),
        ("crypto discount amount", record.crypto_discount_amount),
        ("discount quotient", record.discount_quotient),
        (
            "rate source price",
            record.rate_source_price.unwrap_or(Decimal::ZERO),
        ),
    ] {
        if value.is_sign_negative() {
            return Err(RecordError::NegativeAmount { field, value });
        }
    }

    // 4. Monetary pair requirements.
    if record.cash_amount.is_zero() {
        return Err(RecordError::MissingAmount {
            tx_type,
            field: "cash amount",
        });
    }
    if matches!(
        tx_type,
        TransactionType::BuyCrypto | TransactionType::SellCrypto
    ) && record.crypto_amount.is_zero()
    {
        return Err(RecordError::MissingAmount {
            tx_type,
            field: "crypto amount",
        });
    }

    // 5. Related-transaction reference: withdrawals only, and mandatory there.
    match tx_type {
        TransactionType::WithdrawCash => {
            let missing = record
                .related_remote_transaction_id
                .as_deref()
                .map_or(true, str::is_empty);
            if missing {
                return Err(RecordError::MissingRelatedTransaction);
            }
        }
        _ => {
            if record.related_remote_transaction_id.is_some() {
                return Err(RecordError::UnexpectedRelatedTransaction { tx_type });
            }
        }
    }

    // 6. Banknote breakdowns never appear on purchases.
    if tx_type == TransactionType::BuyCrypto && !record.banknotes.is_empty() {
        return Err(RecordError::BanknotesNotAllowed { tx_type });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banknotes::BanknoteCount;
    use crate::transaction::builder::RecordBuilder;
    use crate::transaction::codes::{ErrorCode, WithdrawErrorCode};
    use crate::transaction::types::{CashbackStatus, Currency, TransactionStatus, WithdrawStatus};
    use rust_decimal_macros::dec;

    // The builder runs validate_record on every build, so most of the
    // rejection matrix lives in builder tests. These cover the paths a
    // builder cannot produce: records mutated after construction.

    #[test]
    fn valid_records_of_every_type_pass() {
        let buy = RecordBuilder::new(crate::transaction::TransactionType::BuyCrypto)
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .crypto(dec!(0.001), Currency::BTC)
            .build()
            .unwrap();
        assert!(validate_record(&buy).is_ok());

        let sell = RecordBuilder::new(crate::transaction::TransactionType::SellCrypto)
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .crypto(dec!(0.001), Currency::BTC)
            .build()
            .unwrap();
        assert!(validate_record(&sell).is_ok());

        let withdraw = RecordBuilder::new(crate::transaction::TransactionType::WithdrawCash)
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .related_remote_transaction_id("R-SELL-1")
            .banknotes(vec![BanknoteCount::new(dec!(50), 2)])
            .build()
            .unwrap();
        assert!(validate_record(&withdraw).is_ok());

        let cashback = RecordBuilder::new(crate::transaction::TransactionType::Cashback)
            .status(TransactionStatus::Cashback(CashbackStatus::Completed))
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(15.00), Currency::USD)
            .build()
            .unwrap();
        assert!(validate_record(&cashback).is_ok());
    }

    #[test]
    fn errored_withdraw_snapshot_passes() {
        let record = RecordBuilder::new(crate::transaction::TransactionType::WithdrawCash)
            .status(TransactionStatus::Withdraw(WithdrawStatus::Error))
            .error_code(ErrorCode::Withdraw(WithdrawErrorCode::NotEnoughCash))
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .related_remote_transaction_id("R-SELL-1")
            .build()
            .unwrap();
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn cashback_error_carries_no_code() {
        // The cashback code space is empty: its error status stands alone.
        let record = RecordBuilder::new(crate::transaction::TransactionType::Cashback)
            .status(TransactionStatus::Cashback(CashbackStatus::Error))
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(15.00), Currency::USD)
            .build()
            .unwrap();
        assert!(validate_record(&record).is_ok());
        assert_eq!(record.error_code(), ErrorCode::NoError);
    }

    #[test]
    fn cashback_error_with_foreign_code_rejected() {
        let result = RecordBuilder::new(crate::transaction::TransactionType::Cashback)
            .status(TransactionStatus::Cashback(CashbackStatus::Error))
            .error_code(ErrorCode::Withdraw(WithdrawErrorCode::UnknownError))
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(15.00), Currency::USD)
            .build();
        assert!(matches!(result, Err(RecordError::ErrorCodeTypeMismatch { .. })));
    }

    #[test]
    fn mutated_negative_fee_detected() {
        let mut record = RecordBuilder::new(crate::transaction::TransactionType::SellCrypto)
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .crypto(dec!(0.001), Currency::BTC)
            .build()
            .unwrap();
        record.fixed_transaction_fee = dec!(-5.00);
        assert!(matches!(
            validate_record(&record),
            Err(RecordError::NegativeAmount { field: "fixed transaction fee", .. })
        ));
    }

    #[test]
    fn empty_related_reference_counts_as_missing() {
        let mut record = RecordBuilder::new(crate::transaction::TransactionType::WithdrawCash)
            .terminal_serial_number("BT300001")
            .identity_public_id("ID1")
            .cash(dec!(100.00), Currency::USD)
            .related_remote_transaction_id("R-SELL-1")
            .build()
            .unwrap();
        record.related_remote_transaction_id = Some(String::new());
        assert!(matches!(
            validate_record(&record),
            Err(RecordError::MissingRelatedTransaction)
        ));
    }
}
