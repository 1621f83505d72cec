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

//! Ledger collaborator: account lookup, transaction build and preparation, submission and
//! status resolution.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Address, ContractCall, ScVal, SignedEnvelope};

/// Hex-encoded hash of a submitted transaction.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct TxHash(String);

impl TxHash {
    #[inline]
    pub fn new(hash: impl Into<String>) -> Self { TxHash(hash.into()) }
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

/// Initial status reported by the ledger for a submitted transaction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum SendStatus {
    /// Accepted into the pending pool.
    #[display("PENDING")]
    Pending,

    #[display("DUPLICATE")]
    Duplicate,

    #[display("TRY_AGAIN_LATER")]
    TryAgainLater,

    #[display("ERROR")]
    Error,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SendResponse {
    pub status: SendStatus,
    pub hash: TxHash,
    /// Encoded transaction result, provided by the ledger when the status is `Error`.
    pub error_result: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TxStatus {
    /// The ledger doesn't know about the transaction yet.
    NotFound,

    /// Applied successfully; carries the return value of the contract call if execution
    /// metadata was available.
    Success { return_value: Option<ScVal> },

    /// Applied and failed; carries the raw failure payload.
    Failed { result: Option<String> },
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum LedgerError {
    /// cannot connect to the RPC server.
    Connectivity,

    /// RPC server has responded with data which can't be parsed.
    Protocol,

    /// account {0} does not exist on the ledger.
    AccountNotFound(Address),

    /// transaction simulation has failed: {0}
    Simulation(String),

    /// signed transaction envelope is invalid: {0}
    InvalidEnvelope(String),

    /// the RPC server has returned an error "{0}"
    ServerSide(String),
}

/// Blockchain SDK and RPC client the submission workflow drives.
///
/// Transaction representations are owned by the implementation. A `Draft` must go through
/// [`Ledger::prepare`] before it can be serialized with [`Ledger::envelope`] for signing.
#[allow(async_fn_in_trait)]
pub trait Ledger {
    type Account;
    type Draft;
    type Prepared;

    async fn account(&self, address: &Address) -> Result<Self::Account, LedgerError>;

    /// Builds a transaction with a single contract invocation, valid for `validity` from now.
    fn build(
        &self,
        account: Self::Account,
        call: &ContractCall,
        fee: u32,
        validity: Duration,
    ) -> Result<Self::Draft, LedgerError>;

    /// Simulates the transaction, filling resource footprint and fees.
    async fn prepare(&self, draft: Self::Draft) -> Result<Self::Prepared, LedgerError>;

    /// Canonical base64 envelope of a prepared transaction.
    fn envelope(&self, tx: &Self::Prepared) -> Result<String, LedgerError>;

    async fn submit(&self, signed: &SignedEnvelope) -> Result<SendResponse, LedgerError>;

    async fn transaction_status(&self, hash: &TxHash) -> Result<TxStatus, LedgerError>;
}

/// Status of a transaction the ledger has applied.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FinalStatus {
    Success(Option<ScVal>),
    Failed(Option<String>),
}

/// How polling for a final transaction status has ended without a final status.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum PollError {
    #[from]
    #[display(inner)]
    Ledger(LedgerError),

    /// polling was cancelled.
    Cancelled,

    /// transaction was not found after {0} status queries.
    Exhausted(u32),
}

/// Queries the transaction status until the ledger reports it as applied or failed.
///
/// Waits `interval` between queries. The token is checked before every query and interrupts
/// the wait. With `max_attempts` set to `None` polling continues until cancelled.
pub async fn await_final_status<L: Ledger>(
    ledger: &L,
    hash: &TxHash,
    interval: Duration,
    max_attempts: Option<u32>,
    token: &CancellationToken,
) -> Result<FinalStatus, PollError> {
    let mut attempt = 0u32;
    loop {
        if token.is_cancelled() {
            return Err(PollError::Cancelled);
        }
        attempt = attempt.saturating_add(1);
        let status = match ledger.transaction_status(hash).await? {
            TxStatus::NotFound => None,
            TxStatus::Success { return_value } => Some(FinalStatus::Success(return_value)),
            TxStatus::Failed { result } => Some(FinalStatus::Failed(result)),
        };
        if let Some(status) = status {
            debug!("Transaction {hash} resolved after {attempt} status queries");
            return Ok(status);
        }
        trace!("Transaction {hash} is not found yet (attempt {attempt})");
        if max_attempts.is_some_and(|max| attempt >= max) {
            return Err(PollError::Exhausted(attempt));
        }
        tokio::select! {
            _ = token.cancelled() => return Err(PollError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
