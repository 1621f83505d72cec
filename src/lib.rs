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

//! Client for submitting Section 45X production data to a Soroban registry contract.
//!
//! The crate drives a single workflow: validate the five form fields, build a `submit_data`
//! contract invocation for the connected wallet, have the wallet sign it, submit it to the
//! ledger and wait for the batch id the contract returns. Key custody and the blockchain SDK
//! stay behind the [`WalletConnector`] and [`Ledger`] traits.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

pub mod config;
mod contract;
mod errors;
mod form;
mod indicator;
pub mod ledger;
mod record;
mod wallet;

pub use config::{ConfigError, Network, SubmitConfig, CONTRACT_ID};
pub use contract::{BatchId, ContractCall, ContractId, QuantityOverflow, ScVal, SUBMIT_DATA_FN};
pub use errors::{Notice, SubmitError};
pub use form::{FormState, SubmissionForm, SubmitStage, TransactionOutcome};
pub use indicator::{ConnectionIndicator, IndicatorAction, IndicatorView};
pub use ledger::{Ledger, LedgerError, SendResponse, SendStatus, TxHash, TxStatus};
pub use record::{Field, FieldError, FieldErrors, SubmissionRecord, ValidRecord};
pub use tokio_util::sync::CancellationToken;
pub use wallet::{
    Address, SessionState, SignedEnvelope, WalletConnector, WalletError, WalletId, WalletSession,
};
