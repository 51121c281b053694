// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchoolError {
    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Account '{0}' already exists")]
    AccountExists(String),

    #[error("No account given: pass --account or set default_account")]
    NoAccount,

    #[error("{kind} #{id} not found for this account")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Unknown payment type '{0}' (see `fee types --all`)")]
    UnknownPaymentType(String),

    #[error("Unknown expense category '{0}' (see `expense categories --all`)")]
    UnknownCategory(String),

    #[error("Invalid year '{0}', expected a four-digit year")]
    InvalidYear(String),

    #[error("Invalid status '{0}', expected active or inactive")]
    InvalidStatus(String),

    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(String),

    #[error("Amount {0} is larger than the accepted maximum")]
    AmountTooLarge(String),
}
