//! Model-wide constants.
//!
//! Every magic number of the record model lives here. Terminals and the
//! remote server both hold richer runtime configuration; these are only the
//! values the *model itself* needs to stay consistent.

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Decimal places cash totals are normalized to. Fiat ledgers everywhere
/// settle on two; denominations with finer granularity do not exist in any
/// cassette we ship.
pub const CASH_SCALE: u32 = 2;

/// Decimal places crypto amounts are displayed with by default. Individual
/// currencies override this via `Currency::decimals`.
pub const CRYPTO_SCALE: u32 = 8;

// ---------------------------------------------------------------------------
// Release policy
// ---------------------------------------------------------------------------

/// On-chain confirmation depth required before value may be released without
/// marking the record as a risk transaction. A release below this depth must
/// be recorded via `TransactionRecord::mark_risk`.
pub const REQUIRED_CONFIRMATIONS: u32 = 2;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
