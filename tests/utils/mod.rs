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

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use s45x::{
    Address, ContractCall, Field, Ledger, LedgerError, ScVal, SendResponse, SendStatus,
    SignedEnvelope, SubmissionForm, SubmissionRecord, SubmitConfig, TxHash, TxStatus,
    WalletConnector, WalletError, WalletId, WalletSession,
};
use tokio::sync::Notify;

pub const ADDRESS: &str = "GBRPYHIL2CI3FNQ4BXLFMNDLFJUNPU2HY3ZMFSHONUCEOASW7QC7OX2H";
pub const OTHER_ADDRESS: &str = "GDQNY3PBOJOKYZSRMK2S7LHHGWZIUISD4QORETLMXEWXBI7KFZZMKTL3";
pub const HASH: &str = "e2a2b4f1c0d8aa0b5d6f8f3a3c1e9d7b6a5f4e3d2c1b0a99887766554433221a";
pub const BATCH_ID: &str = "batch-123";
pub const FAILURE_XDR: &str = "AAAAAAAAAGT/////";

pub fn init_logging() { let _ = env_logger::builder().is_test(true).try_init(); }

pub fn valid_record() -> SubmissionRecord {
    SubmissionRecord {
        component_type: "SolarPanel-TypeA".to_owned(),
        production_quantity: "1200".to_owned(),
        production_date: "2024-05-01".to_owned(),
        facility_id: "FACILITY-ALPHA-001".to_owned(),
        doc_hash: "a1b2c3d4e5f60718293a4b5c6d7e8f901234567890abcdef1234567890abcdef".to_owned(),
    }
}

pub fn success(batch: &str) -> TxStatus {
    TxStatus::Success { return_value: Some(ScVal::Str(batch.to_owned())) }
}

/// Wallet connector with scripted answers, recording every call.
#[derive(Default)]
pub struct MockWallet {
    pub authorized: RefCell<Option<Address>>,
    pub selection: Option<WalletId>,
    pub wallet_address: Option<Address>,
    pub fail_lookup: Option<WalletError>,
    pub fail_selection: Option<WalletError>,
    pub fail_activation: Option<WalletError>,
    pub fail_drop: Option<WalletError>,
    pub fail_sign: Option<WalletError>,
    pub selection_gate: Option<Rc<Notify>>,
    pub sign_gate: Option<Rc<Notify>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockWallet {
    /// Wallet where selecting `freighter` exposes [`ADDRESS`].
    pub fn freighter() -> Self {
        MockWallet {
            selection: Some(WalletId::new("freighter")),
            wallet_address: Some(Address::from(ADDRESS)),
            ..Default::default()
        }
    }

    /// Wallet which has already authorized [`ADDRESS`].
    pub fn authorized() -> Self {
        let wallet = Self::freighter();
        *wallet.authorized.borrow_mut() = Some(Address::from(ADDRESS));
        wallet
    }

    pub fn calls(&self) -> Vec<String> { self.calls.borrow().clone() }

    fn record(&self, call: impl Into<String>) { self.calls.borrow_mut().push(call.into()); }
}

impl WalletConnector for MockWallet {
    async fn active_address(&self) -> Result<Option<Address>, WalletError> {
        self.record("active_address");
        if let Some(err) = &self.fail_lookup {
            return Err(err.clone());
        }
        Ok(self.authorized.borrow().clone())
    }

    async fn open_selection(&self) -> Result<Option<WalletId>, WalletError> {
        self.record("open_selection");
        if let Some(gate) = &self.selection_gate {
            gate.notified().await;
        }
        if let Some(err) = &self.fail_selection {
            return Err(err.clone());
        }
        Ok(self.selection.clone())
    }

    async fn set_active_wallet(&self, wallet: &WalletId) -> Result<(), WalletError> {
        self.record(format!("set_active_wallet {wallet}"));
        if let Some(err) = &self.fail_activation {
            return Err(err.clone());
        }
        *self.authorized.borrow_mut() = self.wallet_address.clone();
        Ok(())
    }

    async fn drop_session(&self) -> Result<(), WalletError> {
        self.record("drop_session");
        if let Some(err) = &self.fail_drop {
            return Err(err.clone());
        }
        *self.authorized.borrow_mut() = None;
        Ok(())
    }

    async fn sign(&self, envelope: &str, network: &str) -> Result<SignedEnvelope, WalletError> {
        self.record(format!("sign {envelope} for {network}"));
        if let Some(gate) = &self.sign_gate {
            gate.notified().await;
        }
        if let Some(err) = &self.fail_sign {
            return Err(err.clone());
        }
        Ok(SignedEnvelope::new(format!("signed:{envelope}")))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MockAccount {
    pub address: Address,
    pub sequence: i64,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DraftTx {
    pub source: MockAccount,
    pub call: ContractCall,
    pub fee: u32,
    pub validity: Duration,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PreparedTx(pub DraftTx);

/// Ledger answering from a script of transaction statuses; once the script is exhausted the
/// transaction stays unknown.
pub struct MockLedger {
    pub send_status: SendStatus,
    pub statuses: RefCell<VecDeque<TxStatus>>,
    pub fail_account: Option<LedgerError>,
    pub fail_prepare: Option<LedgerError>,
    pub account_gate: Option<Rc<Notify>>,
    pub submit_gate: Option<Rc<Notify>>,
    pub built: RefCell<Vec<DraftTx>>,
    pub submitted: RefCell<Vec<SignedEnvelope>>,
    pub status_queries: Cell<u32>,
    pub calls: RefCell<Vec<&'static str>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        MockLedger {
            send_status: SendStatus::Pending,
            statuses: RefCell::new(VecDeque::new()),
            fail_account: None,
            fail_prepare: None,
            account_gate: None,
            submit_gate: None,
            built: RefCell::new(Vec::new()),
            submitted: RefCell::new(Vec::new()),
            status_queries: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MockLedger {
    pub fn with_statuses(statuses: impl IntoIterator<Item = TxStatus>) -> Self {
        MockLedger { statuses: RefCell::new(statuses.into_iter().collect()), ..Default::default() }
    }

    pub fn calls(&self) -> Vec<&'static str> { self.calls.borrow().clone() }
}

impl Ledger for MockLedger {
    type Account = MockAccount;
    type Draft = DraftTx;
    type Prepared = PreparedTx;

    async fn account(&self, address: &Address) -> Result<MockAccount, LedgerError> {
        self.calls.borrow_mut().push("account");
        if let Some(gate) = &self.account_gate {
            gate.notified().await;
        }
        if let Some(err) = &self.fail_account {
            return Err(err.clone());
        }
        Ok(MockAccount { address: address.clone(), sequence: 4_295_032_832 })
    }

    fn build(
        &self,
        account: MockAccount,
        call: &ContractCall,
        fee: u32,
        validity: Duration,
    ) -> Result<DraftTx, LedgerError> {
        self.calls.borrow_mut().push("build");
        let draft = DraftTx { source: account, call: call.clone(), fee, validity };
        self.built.borrow_mut().push(draft.clone());
        Ok(draft)
    }

    async fn prepare(&self, draft: DraftTx) -> Result<PreparedTx, LedgerError> {
        self.calls.borrow_mut().push("prepare");
        if let Some(err) = &self.fail_prepare {
            return Err(err.clone());
        }
        Ok(PreparedTx(draft))
    }

    fn envelope(&self, tx: &PreparedTx) -> Result<String, LedgerError> {
        self.calls.borrow_mut().push("envelope");
        Ok(format!("AAAA{}", tx.0.call.function))
    }

    async fn submit(&self, signed: &SignedEnvelope) -> Result<SendResponse, LedgerError> {
        self.calls.borrow_mut().push("submit");
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        self.submitted.borrow_mut().push(signed.clone());
        let error_result = match self.send_status {
            SendStatus::Error => Some(FAILURE_XDR.to_owned()),
            _ => None,
        };
        Ok(SendResponse { status: self.send_status, hash: TxHash::new(HASH), error_result })
    }

    async fn transaction_status(&self, _hash: &TxHash) -> Result<TxStatus, LedgerError> {
        self.calls.borrow_mut().push("transaction_status");
        self.status_queries.set(self.status_queries.get() + 1);
        Ok(self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(TxStatus::NotFound))
    }
}

pub type MockForm = SubmissionForm<MockWallet, MockLedger>;

/// Form over a session already connected to [`ADDRESS`], filled with a valid record.
pub async fn connected_form(ledger: MockLedger) -> MockForm {
    form_with(MockWallet::authorized(), ledger, SubmitConfig::default()).await
}

pub async fn form_with(wallet: MockWallet, ledger: MockLedger, config: SubmitConfig) -> MockForm {
    init_logging();
    let session = Arc::new(WalletSession::start(wallet).await);
    let form = SubmissionForm::new(session, ledger, config).unwrap();
    fill(&form, &valid_record());
    form
}

pub fn fill(form: &MockForm, record: &SubmissionRecord) {
    for field in Field::ALL {
        assert!(form.edit(field, record.get(field)));
    }
}
