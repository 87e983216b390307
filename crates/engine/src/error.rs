//! The module contains the errors the engine can return.
//!
//! Every error is an input-validation failure: the engine does no I/O, so it
//! has no environmental failure modes.
//!
//! - [`InvalidRoster`] empty roster where a split is required, or duplicate
//!   member ids.
//! - [`UnknownMember`] a ledger entry references a member outside the roster.
//! - [`ShareMismatch`] the shares of a ledger entry do not add up to its
//!   amount.
//! - [`InvalidBalance`] the settlement planner received balances that do not
//!   sum to zero.
//! - [`MemberInUse`] a member still referenced by ledger entries was asked to
//!   leave the roster.
//!
//!  [`InvalidRoster`]: EngineError::InvalidRoster
//!  [`UnknownMember`]: EngineError::UnknownMember
//!  [`ShareMismatch`]: EngineError::ShareMismatch
//!  [`InvalidBalance`]: EngineError::InvalidBalance
//!  [`MemberInUse`]: EngineError::MemberInUse
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid roster: {0}")]
    InvalidRoster(String),
    #[error("Unknown member: {0}")]
    UnknownMember(String),
    #[error("Share mismatch: {0}")]
    ShareMismatch(String),
    #[error("Invalid balance: {0}")]
    InvalidBalance(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Member in use: {0}")]
    MemberInUse(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
}
