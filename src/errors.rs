// Section 45X production data submission client
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use crate::{
    FieldErrors, LedgerError, QuantityOverflow, ScVal, SendStatus, TxHash, WalletError,
};

/// Alert shown to the user when a submission can't proceed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum Notice {
    #[display("Please connect your wallet first")]
    ConnectWallet,

    #[display("Transaction failed. Please try again.")]
    TransactionFailed,
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum SubmitError {
    /// another submission is already in progress.
    Busy,

    /// no wallet is connected.
    NoWallet,

    /// the form has invalid fields: {0}
    Invalid(FieldErrors),

    #[from]
    #[display(inner)]
    Quantity(QuantityOverflow),

    #[from]
    #[display(inner)]
    Wallet(WalletError),

    #[from]
    #[display(inner)]
    Ledger(LedgerError),

    /// transaction {hash} was rejected by the ledger with status {status}.
    NotPending {
        hash: TxHash,
        status: SendStatus,
        error_result: Option<String>,
    },

    /// transaction {0} has failed.
    TxFailed(TxHash, Option<String>),

    /// transaction {0} has succeeded, but the ledger provided no contract return value.
    MissingReturnValue(TxHash),

    /// contract has returned {1} instead of a batch id in transaction {0}.
    UnexpectedReturn(TxHash, ScVal),

    /// submission was cancelled.
    Cancelled,

    /// transaction {0} is still unknown to the ledger after {1} status queries.
    PollExhausted(TxHash, u32),
}

impl SubmitError {
    /// Alert to display, if the error is not reported inline or silently.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            SubmitError::Busy | SubmitError::Invalid(_) | SubmitError::Cancelled => None,
            SubmitError::NoWallet => Some(Notice::ConnectWallet),
            _ => Some(Notice::TransactionFailed),
        }
    }

    /// Raw failure payload returned by the ledger.
    pub fn payload(&self) -> Option<&str> {
        match self {
            SubmitError::NotPending { error_result: payload, .. }
            | SubmitError::TxFailed(_, payload) => payload.as_deref(),
            _ => None,
        }
    }
}
