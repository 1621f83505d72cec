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

//! Submission form: field state, validation and the submit workflow.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::ledger::{await_final_status, FinalStatus, PollError};
use crate::{
    Address, BatchId, ConfigError, ContractCall, Field, FieldErrors, Ledger, SendStatus,
    SubmissionRecord, SubmitConfig, SubmitError, TxHash, ValidRecord, WalletConnector,
    WalletSession,
};

/// Stage of the submit workflow.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Display)]
#[display(lowercase)]
pub enum SubmitStage {
    #[default]
    Idle,
    Validating,
    Building,
    Signing,
    Submitting,
    Polling,
    Succeeded,
    Failed,
}

impl SubmitStage {
    /// Whether a transaction is being built, signed, submitted or awaited.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            SubmitStage::Building
                | SubmitStage::Signing
                | SubmitStage::Submitting
                | SubmitStage::Polling
        )
    }
}

/// Result of a submission which was applied on the ledger.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct TransactionOutcome {
    pub transaction_hash: TxHash,
    pub batch_id: BatchId,
    pub confirmed_at: DateTime<Utc>,
    pub explorer_link: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct FormState {
    pub record: SubmissionRecord,
    pub errors: FieldErrors,
    pub stage: SubmitStage,
    pub busy: bool,
    pub outcome: Option<TransactionOutcome>,
}

/// Releases the busy flag when the submission ends, including when its future is dropped.
struct BusyGuard<'a>(&'a Mutex<FormState>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.busy = false;
        if state.stage.is_in_flight() {
            state.stage = SubmitStage::Idle;
        }
    }
}

pub struct SubmissionForm<W: WalletConnector, L: Ledger> {
    session: Arc<WalletSession<W>>,
    ledger: L,
    config: SubmitConfig,
    state: Mutex<FormState>,
}

impl<W: WalletConnector, L: Ledger> SubmissionForm<W, L> {
    /// Creates an empty form; fails if the configuration doesn't pass [`SubmitConfig::check`].
    pub fn new(
        session: Arc<WalletSession<W>>,
        ledger: L,
        config: SubmitConfig,
    ) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self { session, ledger, config, state: default!() })
    }

    #[inline]
    pub fn session(&self) -> &WalletSession<W> { &self.session }
    #[inline]
    pub fn ledger(&self) -> &L { &self.ledger }
    #[inline]
    pub fn config(&self) -> &SubmitConfig { &self.config }

    #[inline]
    pub fn snapshot(&self) -> FormState { self.state.lock().clone() }
    #[inline]
    pub fn record(&self) -> SubmissionRecord { self.state.lock().record.clone() }
    #[inline]
    pub fn errors(&self) -> FieldErrors { self.state.lock().errors.clone() }
    #[inline]
    pub fn stage(&self) -> SubmitStage { self.state.lock().stage }
    #[inline]
    pub fn is_busy(&self) -> bool { self.state.lock().busy }
    #[inline]
    pub fn outcome(&self) -> Option<TransactionOutcome> { self.state.lock().outcome.clone() }

    /// Inputs are disabled while a submission is in flight.
    #[inline]
    pub fn inputs_enabled(&self) -> bool { !self.is_busy() }

    /// Whether the submit control is active.
    pub fn can_submit(&self) -> bool { !self.is_busy() && self.session.is_connected() }

    /// Updates a field value and clears the error previously reported for that field.
    ///
    /// Returns `false` and leaves the form intact if the inputs are disabled.
    pub fn edit(&self, field: Field, value: impl Into<String>) -> bool {
        let mut state = self.state.lock();
        if state.busy {
            return false;
        }
        state.record.set(field, value);
        state.errors.clear(field);
        true
    }

    /// Validates the form and, if the wallet is connected, submits the record to the contract.
    ///
    /// Polling for the transaction result stops when `token` is cancelled. Failures keep the
    /// entered values so the user may resubmit.
    pub async fn submit(
        &self,
        token: &CancellationToken,
    ) -> Result<TransactionOutcome, SubmitError> {
        let (address, record) = self.begin()?;
        let _busy = BusyGuard(&self.state);

        match self.execute(&address, &record, token).await {
            Ok(outcome) => {
                info!(
                    "Submitted batch {} in transaction {}",
                    outcome.batch_id, outcome.transaction_hash
                );
                let mut state = self.state.lock();
                state.outcome = Some(outcome.clone());
                state.stage = SubmitStage::Succeeded;
                Ok(outcome)
            }
            Err(SubmitError::Cancelled) => {
                warn!("Submission was cancelled while awaiting the transaction result");
                self.state.lock().stage = SubmitStage::Idle;
                Err(SubmitError::Cancelled)
            }
            Err(err) => {
                error!("Transaction failed: {err}");
                if let Some(payload) = err.payload() {
                    debug!("Ledger failure payload: {payload}");
                }
                self.state.lock().stage = SubmitStage::Failed;
                Err(err)
            }
        }
    }

    /// Checks the preconditions and marks the form busy.
    fn begin(&self) -> Result<(Address, ValidRecord), SubmitError> {
        let mut state = self.state.lock();
        if state.busy {
            debug!("Submission is already in progress, ignoring");
            return Err(SubmitError::Busy);
        }
        let Some(address) = self.session.address() else {
            return Err(SubmitError::NoWallet);
        };

        state.stage = SubmitStage::Validating;
        match state.record.clone().validate() {
            Err(errors) => {
                debug!("Form has invalid fields: {errors}");
                state.errors = errors.clone();
                state.stage = SubmitStage::Idle;
                Err(SubmitError::Invalid(errors))
            }
            Ok(record) => {
                state.errors = FieldErrors::new();
                state.outcome = None;
                state.busy = true;
                state.stage = SubmitStage::Building;
                Ok((address, record))
            }
        }
    }

    fn advance(&self, stage: SubmitStage) {
        debug!("Submission stage: {stage}");
        self.state.lock().stage = stage;
    }

    async fn execute(
        &self,
        address: &Address,
        record: &ValidRecord,
        token: &CancellationToken,
    ) -> Result<TransactionOutcome, SubmitError> {
        let config = &self.config;

        self.advance(SubmitStage::Building);
        let call = ContractCall::submit_data(config.contract_id.clone(), record)?;
        trace!("Invoking {call} from {address}");
        let account = self.ledger.account(address).await?;
        let draft = self
            .ledger
            .build(account, &call, config.base_fee, config.tx_timeout())?;
        let prepared = self.ledger.prepare(draft).await?;

        self.advance(SubmitStage::Signing);
        let envelope = self.ledger.envelope(&prepared)?;
        let signed = self.session.sign(&envelope, config.passphrase()).await?;

        self.advance(SubmitStage::Submitting);
        let response = self.ledger.submit(&signed).await?;
        if response.status != SendStatus::Pending {
            return Err(SubmitError::NotPending {
                hash: response.hash,
                status: response.status,
                error_result: response.error_result,
            });
        }
        let hash = response.hash;

        self.advance(SubmitStage::Polling);
        let status = await_final_status(
            &self.ledger,
            &hash,
            config.poll_interval(),
            config.max_poll_attempts,
            token,
        )
        .await
        .map_err(|err| match err {
            PollError::Ledger(err) => SubmitError::Ledger(err),
            PollError::Cancelled => SubmitError::Cancelled,
            PollError::Exhausted(attempts) => SubmitError::PollExhausted(hash.clone(), attempts),
        })?;

        let return_value = match status {
            FinalStatus::Success(Some(value)) => value,
            FinalStatus::Success(None) => return Err(SubmitError::MissingReturnValue(hash)),
            FinalStatus::Failed(result) => return Err(SubmitError::TxFailed(hash, result)),
        };
        let batch_id = BatchId::decode(return_value)
            .map_err(|value| SubmitError::UnexpectedReturn(hash.clone(), value))?;

        Ok(TransactionOutcome {
            explorer_link: config.explorer_link(hash.as_str()),
            transaction_hash: hash,
            batch_id,
            confirmed_at: Utc::now(),
        })
    }
}
