//! Business error codes, one closed space per transaction type.
//!
//! These codes are *data*, not raised errors: they are recorded on a failed
//! record as the permanent, auditable explanation of why the operation
//! failed. The numeric values are reused across types and carry
//! type-specific meaning — `13` is "fee greater than amount" on a purchase
//! but "not enough cash" on a withdrawal — so each type gets its own
//! enumeration and the spaces are never compared directly.
//!
//! Cashback has no code space: a failed cashback is recorded by its status
//! alone.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::TransactionType;

// ---------------------------------------------------------------------------
// Per-type code spaces
// ---------------------------------------------------------------------------

/// Why a crypto purchase failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuyErrorCode {
    /// The request parameters were malformed or inconsistent.
    InvalidParameters,
    /// The requested currency pair is not configured on this terminal.
    InvalidCurrency,
    /// The customer's inserted cash did not cover the purchase.
    InvalidBalance,
    /// Failure with no more specific classification.
    UnknownError,
    /// Sending coins from the hot wallet failed.
    HotWalletSend,
    /// Reading the hot wallet balance failed.
    HotWalletBalance,
    /// Reading the exchange balance failed.
    ExchangeBalance,
    /// Withdrawing purchased coins from the exchange failed.
    ExchangeWithdrawal,
    /// The purchase order on the exchange failed.
    ExchangePurchase,
    /// The configured exchange strategy number is not known to the server.
    UnknownExchangeStrategy,
    /// Server-side configuration problem.
    ConfigurationProblem,
    /// The customer's fingerprint did not match any registered identity.
    FingerprintUnknown,
    /// The fixed fee exceeded the inserted cash amount.
    FeeGreaterThanAmount,
    /// The supplied identity public id is not registered.
    PublicIdUnknown,
    /// The identity is registered but not approved for purchases.
    NotApproved,
}

impl BuyErrorCode {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidParameters => 1,
            Self::InvalidCurrency => 2,
            Self::InvalidBalance => 3,
            Self::UnknownError => 4,
            Self::HotWalletSend => 5,
            Self::HotWalletBalance => 6,
            Self::ExchangeBalance => 7,
            Self::ExchangeWithdrawal => 8,
            Self::ExchangePurchase => 9,
            Self::UnknownExchangeStrategy => 10,
            Self::ConfigurationProblem => 11,
            Self::FingerprintUnknown => 12,
            Self::FeeGreaterThanAmount => 13,
            Self::PublicIdUnknown => 19,
            Self::NotApproved => 20,
        }
    }

    /// Maps a wire code back to a purchase error code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::InvalidParameters),
            2 => Some(Self::InvalidCurrency),
            3 => Some(Self::InvalidBalance),
            4 => Some(Self::UnknownError),
            5 => Some(Self::HotWalletSend),
            6 => Some(Self::HotWalletBalance),
            7 => Some(Self::ExchangeBalance),
            8 => Some(Self::ExchangeWithdrawal),
            9 => Some(Self::ExchangePurchase),
            10 => Some(Self::UnknownExchangeStrategy),
            11 => Some(Self::ConfigurationProblem),
            12 => Some(Self::FingerprintUnknown),
            13 => Some(Self::FeeGreaterThanAmount),
            19 => Some(Self::PublicIdUnknown),
            20 => Some(Self::NotApproved),
            _ => None,
        }
    }
}

/// Why a crypto sale failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellErrorCode {
    /// The request parameters were malformed or inconsistent.
    InvalidParameters,
    /// The requested currency pair is not configured on this terminal.
    InvalidCurrency,
    /// The declared amount did not cover the sale.
    InvalidBalance,
    /// Failure with no more specific classification.
    UnknownError,
    /// Server-side configuration problem.
    ConfigurationProblem,
    /// The customer's fingerprint did not match any registered identity.
    FingerprintUnknown,
    /// Obtaining a deposit address for the incoming coins failed.
    DepositAddress,
    /// The coin payment did not arrive within the wait window.
    PaymentWaitTimedOut,
    /// The exchange held too few coins to execute the sale.
    NotEnoughCoinsOnExchange,
    /// The sell order on the exchange failed.
    ExchangeSell,
    /// The received payment did not match what was requested.
    PaymentInvalid,
    /// Selling is disabled on this terminal.
    SellDisabled,
    /// The identity is registered but not approved for sales.
    NotApproved,
    /// Moving the sold coins to the exchange failed.
    WithdrawalProblem,
    /// The exchange refused the coin withdrawal.
    WithdrawalNotAllowed,
}

impl SellErrorCode {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidParameters => 1,
            Self::InvalidCurrency => 2,
            Self::InvalidBalance => 3,
            Self::UnknownError => 4,
            Self::ConfigurationProblem => 11,
            Self::FingerprintUnknown => 12,
            Self::DepositAddress => 13,
            Self::PaymentWaitTimedOut => 14,
            Self::NotEnoughCoinsOnExchange => 15,
            Self::ExchangeSell => 16,
            Self::PaymentInvalid => 17,
            Self::SellDisabled => 20,
            Self::NotApproved => 21,
            Self::WithdrawalProblem => 22,
            Self::WithdrawalNotAllowed => 23,
        }
    }

    /// Maps a wire code back to a sale error code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::InvalidParameters),
            2 => Some(Self::InvalidCurrency),
            3 => Some(Self::InvalidBalance),
            4 => Some(Self::UnknownError),
            11 => Some(Self::ConfigurationProblem),
            12 => Some(Self::FingerprintUnknown),
            13 => Some(Self::DepositAddress),
            14 => Some(Self::PaymentWaitTimedOut),
            15 => Some(Self::NotEnoughCoinsOnExchange),
            16 => Some(Self::ExchangeSell),
            17 => Some(Self::PaymentInvalid),
            20 => Some(Self::SellDisabled),
            21 => Some(Self::NotApproved),
            22 => Some(Self::WithdrawalProblem),
            23 => Some(Self::WithdrawalNotAllowed),
            _ => None,
        }
    }
}

/// Why a cash withdrawal failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawErrorCode {
    /// The request parameters were malformed or inconsistent.
    InvalidParameters,
    /// The requested currency is not configured on this terminal.
    InvalidCurrency,
    /// Failure with no more specific classification.
    UnknownError,
    /// The customer's fingerprint did not match any registered identity.
    FingerprintUnknown,
    /// The terminal's cassettes held too little cash.
    NotEnoughCash,
    /// The supplied phone number is not registered.
    PhoneNumberUnknown,
    /// The identity is registered but not approved for withdrawals.
    NotApproved,
    /// The dispenser hardware failed mid-payout.
    CashDispensingFailed,
}

impl WithdrawErrorCode {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidParameters => 1,
            Self::InvalidCurrency => 2,
            Self::UnknownError => 4,
            Self::FingerprintUnknown => 12,
            Self::NotEnoughCash => 13,
            Self::PhoneNumberUnknown => 18,
            Self::NotApproved => 19,
            Self::CashDispensingFailed => 22,
        }
    }

    /// Maps a wire code back to a withdrawal error code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::InvalidParameters),
            2 => Some(Self::InvalidCurrency),
            4 => Some(Self::UnknownError),
            12 => Some(Self::FingerprintUnknown),
            13 => Some(Self::NotEnoughCash),
            18 => Some(Self::PhoneNumberUnknown),
            19 => Some(Self::NotApproved),
            22 => Some(Self::CashDispensingFailed),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// The error-code slot of a transaction record.
///
/// `NoError` is the only value valid on a record whose status is not an
/// error state; each other variant carries a code from exactly one type's
/// space, so a sell code can never be recorded on a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The operation has not failed. Wire code 0 in every type's space.
    NoError,
    /// A purchase failure.
    Buy(BuyErrorCode),
    /// A sale failure.
    Sell(SellErrorCode),
    /// A withdrawal failure.
    Withdraw(WithdrawErrorCode),
}

impl ErrorCode {
    /// Returns `true` unless this is [`ErrorCode::NoError`].
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoError)
    }

    /// Returns `true` if this code may be recorded on a record of the given
    /// type. `NoError` belongs to every type's space.
    pub fn applies_to(&self, tx_type: TransactionType) -> bool {
        match self {
            Self::NoError => true,
            Self::Buy(_) => tx_type == TransactionType::BuyCrypto,
            Self::Sell(_) => tx_type == TransactionType::SellCrypto,
            Self::Withdraw(_) => tx_type == TransactionType::WithdrawCash,
        }
    }

    /// Wire code. Meaningful only together with the transaction type.
    pub fn code(&self) -> u8 {
        match self {
            Self::NoError => 0,
            Self::Buy(c) => c.code(),
            Self::Sell(c) => c.code(),
            Self::Withdraw(c) => c.code(),
        }
    }

    /// Maps a (type, wire code) pair back to an error code. Code 0 is
    /// `NoError` for every type; Cashback accepts nothing else because it
    /// has no code space.
    pub fn from_code(tx_type: TransactionType, code: u8) -> Option<Self> {
        if code == 0 {
            return Some(Self::NoError);
        }
        match tx_type {
            TransactionType::BuyCrypto => BuyErrorCode::from_code(code).map(Self::Buy),
            TransactionType::SellCrypto => SellErrorCode::from_code(code).map(Self::Sell),
            TransactionType::WithdrawCash => WithdrawErrorCode::from_code(code).map(Self::Withdraw),
            TransactionType::Cashback => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => write!(f, "NoError"),
            Self::Buy(c) => write!(f, "Buy/{:?}", c),
            Self::Sell(c) => write!(f, "Sell/{:?}", c),
            Self::Withdraw(c) => write!(f, "Withdraw/{:?}", c),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
