//! Core type definitions for TELLER transaction records.
//!
//! These types form the vocabulary of every financial operation on the
//! network. Each transaction type carries its own closed status enumeration,
//! so a status from one type's state machine cannot be attached to a record
//! of another type: the combination simply does not exist.
//!
//! The remote server speaks small integers on the wire; every enum here
//! exposes `code()` / `from_code()` to map to and from that numbering.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction record represents.
///
/// Assigned at record creation and immutable for the lifetime of the record.
/// The type determines which status and error-code domains apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Customer inserts cash, coins are sent to their address.
    BuyCrypto,
    /// Customer sends coins, cash is paid out once the payment arrives.
    SellCrypto,
    /// Cash-out of a previously completed sale.
    WithdrawCash,
    /// Cash returned to the customer outside a crypto operation.
    Cashback,
}

impl TransactionType {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::BuyCrypto => 0,
            Self::SellCrypto => 1,
            Self::WithdrawCash => 2,
            Self::Cashback => 3,
        }
    }

    /// Maps a wire code back to a type. Returns `None` for unknown codes —
    /// we don't guess.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BuyCrypto),
            1 => Some(Self::SellCrypto),
            2 => Some(Self::WithdrawCash),
            3 => Some(Self::Cashback),
            _ => None,
        }
    }

    /// The status a fresh record of this type enters the state machine with.
    ///
    /// Cashback has no in-progress state and enters a terminal status
    /// directly, chosen by the caller, so there is no default for it.
    pub fn initial_status(&self) -> Option<TransactionStatus> {
        match self {
            Self::BuyCrypto => Some(TransactionStatus::Buy(BuyStatus::InProgress)),
            Self::SellCrypto => Some(TransactionStatus::Sell(SellStatus::PaymentRequested)),
            Self::WithdrawCash => Some(TransactionStatus::Withdraw(WithdrawStatus::InProgress)),
            Self::Cashback => None,
        }
    }

    /// The error status of this type's state machine.
    pub fn error_status(&self) -> TransactionStatus {
        match self {
            Self::BuyCrypto => TransactionStatus::Buy(BuyStatus::Error),
            Self::SellCrypto => TransactionStatus::Sell(SellStatus::Error),
            Self::WithdrawCash => TransactionStatus::Withdraw(WithdrawStatus::Error),
            Self::Cashback => TransactionStatus::Cashback(CashbackStatus::Error),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuyCrypto => write!(f, "BuyCrypto"),
            Self::SellCrypto => write!(f, "SellCrypto"),
            Self::WithdrawCash => write!(f, "WithdrawCash"),
            Self::Cashback => write!(f, "Cashback"),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-type status enumerations
// ---------------------------------------------------------------------------

/// Lifecycle states of a crypto purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuyStatus {
    /// Cash accepted, coins not yet sent.
    InProgress,
    /// Coins delivered to the customer's address.
    Completed,
    /// The purchase failed; the record carries a [`BuyErrorCode`].
    ///
    /// [`BuyErrorCode`]: super::codes::BuyErrorCode
    Error,
}

/// Lifecycle states of a crypto sale.
///
/// A sale has no `Completed` state of its own: `PaymentArrived` is the
/// terminal success state, after which the cash side is settled by a
/// separate [`WithdrawCash`](TransactionType::WithdrawCash) record that
/// references this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellStatus {
    /// The terminal asked the customer to send coins.
    PaymentRequested,
    /// The coin payment was seen on the network, confirmations pending.
    PaymentArriving,
    /// The sale failed; the record carries a [`SellErrorCode`].
    ///
    /// [`SellErrorCode`]: super::codes::SellErrorCode
    Error,
    /// The coin payment is confirmed; cash is ready to be paid out.
    PaymentArrived,
}

/// Lifecycle states of a cash withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawStatus {
    /// Dispensing in progress.
    InProgress,
    /// Cash handed to the customer.
    Completed,
    /// The withdrawal failed; the record carries a [`WithdrawErrorCode`].
    ///
    /// [`WithdrawErrorCode`]: super::codes::WithdrawErrorCode
    Error,
}

/// Lifecycle states of a cashback operation.
///
/// Cashback is recorded after the fact — there is no in-progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashbackStatus {
    /// Cash returned to the customer.
    Completed,
    /// The cashback failed.
    Error,
}

impl BuyStatus {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Completed => 1,
            Self::Error => 2,
        }
    }

    /// Maps a wire code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::InProgress),
            1 => Some(Self::Completed),
            2 => Some(Self::Error),
            _ => None,
        }
    }
}

impl SellStatus {
    /// Wire code used by the remote server. Note that `PaymentArrived` was
    /// numbered after `Error` historically, hence the gap in ordering.
    pub fn code(&self) -> u8 {
        match self {
            Self::PaymentRequested => 0,
            Self::PaymentArriving => 1,
            Self::Error => 2,
            Self::PaymentArrived => 3,
        }
    }

    /// Maps a wire code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::PaymentRequested),
            1 => Some(Self::PaymentArriving),
            2 => Some(Self::Error),
            3 => Some(Self::PaymentArrived),
            _ => None,
        }
    }
}

impl WithdrawStatus {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::InProgress => 0,
            Self::Completed => 1,
            Self::Error => 2,
        }
    }

    /// Maps a wire code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::InProgress),
            1 => Some(Self::Completed),
            2 => Some(Self::Error),
            _ => None,
        }
    }
}

impl CashbackStatus {
    /// Wire code used by the remote server.
    pub fn code(&self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Error => 1,
        }
    }

    /// Maps a wire code back to a status.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Completed),
            1 => Some(Self::Error),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// The status of a transaction record, tagged by transaction type.
///
/// The tag makes cross-type combinations unrepresentable: there is no way
/// to express "a Buy record in `PaymentArriving`" because `PaymentArriving`
/// only exists inside the `Sell` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Status of a [`TransactionType::BuyCrypto`] record.
    Buy(BuyStatus),
    /// Status of a [`TransactionType::SellCrypto`] record.
    Sell(SellStatus),
    /// Status of a [`TransactionType::WithdrawCash`] record.
    Withdraw(WithdrawStatus),
    /// Status of a [`TransactionType::Cashback`] record.
    Cashback(CashbackStatus),
}

impl TransactionStatus {
    /// The transaction type this status belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::Buy(_) => TransactionType::BuyCrypto,
            Self::Sell(_) => TransactionType::SellCrypto,
            Self::Withdraw(_) => TransactionType::WithdrawCash,
            Self::Cashback(_) => TransactionType::Cashback,
        }
    }

    /// Returns `true` if this status denotes a failed operation.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::Buy(BuyStatus::Error)
                | Self::Sell(SellStatus::Error)
                | Self::Withdraw(WithdrawStatus::Error)
                | Self::Cashback(CashbackStatus::Error)
        )
    }

    /// Returns `true` if no further transition is accepted from this status.
    ///
    /// `Sell(PaymentArrived)` is terminal for the sale itself — the cash
    /// side continues in a separate withdrawal record. Cashback statuses
    /// are terminal on entry.
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Buy(s) => matches!(s, BuyStatus::Completed | BuyStatus::Error),
            Self::Sell(s) => matches!(s, SellStatus::PaymentArrived | SellStatus::Error),
            Self::Withdraw(s) => matches!(s, WithdrawStatus::Completed | WithdrawStatus::Error),
            Self::Cashback(_) => true,
        }
    }

    /// Wire code of the inner status. Meaningful only together with the
    /// transaction type — the numbering is reused across types.
    pub fn code(&self) -> u8 {
        match self {
            Self::Buy(s) => s.code(),
            Self::Sell(s) => s.code(),
            Self::Withdraw(s) => s.code(),
            Self::Cashback(s) => s.code(),
        }
    }

    /// Maps a (type, wire code) pair back to a status. Returns `None` when
    /// the code is outside the type's status domain.
    pub fn from_code(tx_type: TransactionType, code: u8) -> Option<Self> {
        match tx_type {
            TransactionType::BuyCrypto => BuyStatus::from_code(code).map(Self::Buy),
            TransactionType::SellCrypto => SellStatus::from_code(code).map(Self::Sell),
            TransactionType::WithdrawCash => WithdrawStatus::from_code(code).map(Self::Withdraw),
            TransactionType::Cashback => CashbackStatus::from_code(code).map(Self::Cashback),
        }
    }

    /// Returns `true` if the state machine permits moving from `self` to
    /// `next`.
    ///
    /// Transitions are strictly forward; terminal statuses permit nothing.
    /// A status of a different type is never a valid target.
    pub fn can_transition_to(&self, next: &TransactionStatus) -> bool {
        match (self, next) {
            (Self::Buy(BuyStatus::InProgress), Self::Buy(to)) => {
                matches!(to, BuyStatus::Completed | BuyStatus::Error)
            }
            (Self::Sell(SellStatus::PaymentRequested), Self::Sell(to)) => {
                matches!(to, SellStatus::PaymentArriving | SellStatus::Error)
            }
            (Self::Sell(SellStatus::PaymentArriving), Self::Sell(to)) => {
                matches!(to, SellStatus::PaymentArrived | SellStatus::Error)
            }
            (Self::Withdraw(WithdrawStatus::InProgress), Self::Withdraw(to)) => {
                matches!(to, WithdrawStatus::Completed | WithdrawStatus::Error)
            }
            // Everything else: terminal source, cashback, or cross-type.
            _ => false,
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy(s) => write!(f, "Buy/{:?}", s),
            Self::Sell(s) => write!(f, "Sell/{:?}", s),
            Self::Withdraw(s) => write!(f, "Withdraw/{:?}", s),
            Self::Cashback(s) => write!(f, "Cashback/{:?}", s),
        }
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Currency codes the network quotes prices in.
///
/// The closed variants are the denominations terminals are configured with
/// today; [`Currency::Other`] carries the long tail of tickers without a
/// code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// United States Dollar.
    USD,
    /// Euro.
    EUR,
    /// Czech Koruna.
    CZK,
    /// British Pound.
    GBP,
    /// Bitcoin.
    BTC,
    /// Ether.
    ETH,
    /// Litecoin.
    LTC,
    /// USD Coin stablecoin.
    USDC,
    /// Arbitrary ticker for currencies not listed above.
    Other(String),
}

impl Currency {
    /// Number of decimal places used for display formatting.
    ///
    /// Purely presentational — amounts are carried as exact decimals and
    /// never truncated by the model.
    pub fn decimals(&self) -> u32 {
        match self {
            Self::USD | Self::EUR | Self::CZK | Self::GBP => 2,
            Self::BTC | Self::LTC => 8,
            Self::ETH => 18,
            Self::USDC => 6,
            Self::Other(_) => 8,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::USD => write!(f, "USD"),
            Self::EUR => write!(f, "EUR"),
            Self::CZK => write!(f, "CZK"),
            Self::GBP => write!(f, "GBP"),
            Self::BTC => write!(f, "BTC"),
            Self::ETH => write!(f, "ETH"),
            Self::LTC => write!(f, "LTC"),
            Self::USDC => write!(f, "USDC"),
            Self::Other(ticker) => write!(f, "{}", ticker),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_wire_codes_roundtrip() {
        for tx_type in [
            TransactionType::BuyCrypto,
            TransactionType::SellCrypto,
            TransactionType::WithdrawCash,
            TransactionType::Cashback,
        ] {
            assert_eq!(TransactionType::from_code(tx_type.code()), Some(tx_type));
        }
        assert_eq!(TransactionType::from_code(4), None);
    }

    #[test]
    fn status_wire_codes_roundtrip_per_type() {
        let statuses = [
            TransactionStatus::Buy(BuyStatus::InProgress),
            TransactionStatus::Buy(BuyStatus::Completed),
            TransactionStatus::Buy(BuyStatus::Error),
            TransactionStatus::Sell(SellStatus::PaymentRequested),
            TransactionStatus::Sell(SellStatus::PaymentArriving),
            TransactionStatus::Sell(SellStatus::Error),
            TransactionStatus::Sell(SellStatus::PaymentArrived),
            TransactionStatus::Withdraw(WithdrawStatus::InProgress),
            TransactionStatus::Withdraw(WithdrawStatus::Completed),
            TransactionStatus::Withdraw(WithdrawStatus::Error),
            TransactionStatus::Cashback(CashbackStatus::Completed),
            TransactionStatus::Cashback(CashbackStatus::Error),
        ];
        for status in statuses {
            let recovered = TransactionStatus::from_code(status.transaction_type(), status.code());
            assert_eq!(recovered, Some(status));
        }
    }

    #[test]
    fn sell_payment_arrived_has_historic_code_three() {
        // The sell state machine grew PaymentArrived after Error was already
        // numbered, so the terminal success state sits at 3, not 2.
        assert_eq!(SellStatus::PaymentArrived.code(), 3);
        assert_eq!(SellStatus::Error.code(), 2);
    }

    #[test]
    fn codes_outside_domain_are_rejected() {
        assert_eq!(TransactionStatus::from_code(TransactionType::BuyCrypto, 3), None);
        assert_eq!(TransactionStatus::from_code(TransactionType::Cashback, 2), None);
        assert_eq!(TransactionStatus::from_code(TransactionType::SellCrypto, 4), None);
    }

    #[test]
    fn initial_statuses() {
        assert_eq!(
            TransactionType::BuyCrypto.initial_status(),
            Some(TransactionStatus::Buy(BuyStatus::InProgress))
        );
        assert_eq!(
            TransactionType::SellCrypto.initial_status(),
            Some(TransactionStatus::Sell(SellStatus::PaymentRequested))
        );
        assert_eq!(
            TransactionType::WithdrawCash.initial_status(),
            Some(TransactionStatus::Withdraw(WithdrawStatus::InProgress))
        );
        assert_eq!(TransactionType::Cashback.initial_status(), None);
    }

    #[test]
    fn buy_transitions() {
        let from = TransactionStatus::Buy(BuyStatus::InProgress);
        assert!(from.can_transition_to(&TransactionStatus::Buy(BuyStatus::Completed)));
        assert!(from.can_transition_to(&TransactionStatus::Buy(BuyStatus::Error)));
        // Terminal statuses permit nothing, including going backwards.
        let done = TransactionStatus::Buy(BuyStatus::Completed);
        assert!(!done.can_transition_to(&TransactionStatus::Buy(BuyStatus::InProgress)));
        assert!(!done.can_transition_to(&TransactionStatus::Buy(BuyStatus::Error)));
    }

    #[test]
    fn sell_transitions_are_strictly_forward() {
        let requested = TransactionStatus::Sell(SellStatus::PaymentRequested);
        let arriving = TransactionStatus::Sell(SellStatus::PaymentArriving);
        let arrived = TransactionStatus::Sell(SellStatus::PaymentArrived);
        let error = TransactionStatus::Sell(SellStatus::Error);

        assert!(requested.can_transition_to(&arriving));
        assert!(requested.can_transition_to(&error));
        // Skipping straight to arrived is not permitted.
        assert!(!requested.can_transition_to(&arrived));

        assert!(arriving.can_transition_to(&arrived));
        assert!(arriving.can_transition_to(&error));
        assert!(!arriving.can_transition_to(&requested));

        // PaymentArrived is terminal; errors can no longer be raised.
        assert!(!arrived.can_transition_to(&error));
        assert!(!error.can_transition_to(&arrived));
    }

    #[test]
    fn cashback_permits_no_transitions() {
        let completed = TransactionStatus::Cashback(CashbackStatus::Completed);
        let error = TransactionStatus::Cashback(CashbackStatus::Error);
        assert!(!completed.can_transition_to(&error));
        assert!(!error.can_transition_to(&completed));
        assert!(completed.is_terminal());
        assert!(error.is_terminal());
    }

    #[test]
    fn cross_type_transitions_never_valid() {
        let buy = TransactionStatus::Buy(BuyStatus::InProgress);
        let sell = TransactionStatus::Sell(SellStatus::PaymentArriving);
        let withdraw = TransactionStatus::Withdraw(WithdrawStatus::Completed);
        assert!(!buy.can_transition_to(&sell));
        assert!(!buy.can_transition_to(&withdraw));
        assert!(!sell.can_transition_to(&buy));
    }

    #[test]
    fn terminal_and_error_predicates() {
        assert!(TransactionStatus::Buy(BuyStatus::Error).is_error());
        assert!(TransactionStatus::Buy(BuyStatus::Error).is_terminal());
        assert!(!TransactionStatus::Buy(BuyStatus::InProgress).is_terminal());
        assert!(TransactionStatus::Sell(SellStatus::PaymentArrived).is_terminal());
        assert!(!TransactionStatus::Sell(SellStatus::PaymentArrived).is_error());
        assert!(!TransactionStatus::Sell(SellStatus::PaymentArriving).is_terminal());
    }

    #[test]
    fn currency_decimals() {
        assert_eq!(Currency::USD.decimals(), 2);
        assert_eq!(Currency::BTC.decimals(), 8);
        assert_eq!(Currency::ETH.decimals(), 18);
        assert_eq!(Currency::Other("DOGE".to_string()).decimals(), 8);
    }

    #[test]
    fn status_display_includes_type() {
        let status = TransactionStatus::Sell(SellStatus::PaymentArriving);
        assert_eq!(status.to_string(), "Sell/PaymentArriving");
    }
}
