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

//! Wallet connection: the connector collaborator and the session state built on top of it.

use parking_lot::Mutex;

/// Public identifier (`G...` strkey) of the account controlled by the connected wallet.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct Address(String);

impl Address {
    #[inline]
    pub fn new(addr: impl Into<String>) -> Self { Address(addr.into()) }
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Abbreviated form `GABC...WXYZ` used where the full address does not fit.
    pub fn short(&self) -> String {
        let chars = self.0.chars().collect::<Vec<_>>();
        if chars.len() <= 8 {
            return self.0.clone();
        }
        let head = chars[..4].iter().collect::<String>();
        let tail = chars[chars.len() - 4..].iter().collect::<String>();
        format!("{head}...{tail}")
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self { Address(addr.to_owned()) }
}

/// Identifier of a wallet module known to the connector (e.g. `freighter`).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[display(inner)]
pub struct WalletId(String);

impl WalletId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self { WalletId(id.into()) }
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

/// Base64-encoded transaction envelope carrying the wallet signature.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display(inner)]
pub struct SignedEnvelope(String);

impl SignedEnvelope {
    #[inline]
    pub fn new(xdr: impl Into<String>) -> Self { SignedEnvelope(xdr.into()) }
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display(doc_comments)]
pub enum WalletError {
    /// the user has rejected the request in the wallet.
    Rejected,

    /// no wallet is available or the selected wallet is not installed.
    Unavailable,

    /// wallet is not set up for the {0} network.
    WrongNetwork(String),

    /// wallet connector error: {0}
    Connector(String),
}

/// Wallet-connection toolkit holding the keys; the session never sees them.
#[allow(async_fn_in_trait)]
pub trait WalletConnector {
    /// Address the connector is already authorized for, if any.
    async fn active_address(&self) -> Result<Option<Address>, WalletError>;

    /// Lets the user pick a wallet. Returns `None` if the user closes the selection.
    async fn open_selection(&self) -> Result<Option<WalletId>, WalletError>;

    async fn set_active_wallet(&self, wallet: &WalletId) -> Result<(), WalletError>;

    async fn drop_session(&self) -> Result<(), WalletError>;

    /// Signs a base64 transaction envelope for the network with the given passphrase.
    async fn sign(&self, envelope: &str, network: &str) -> Result<SignedEnvelope, WalletError>;
}

/// Observable state of a wallet session.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SessionState {
    pub address: Option<Address>,
    pub is_connecting: bool,
}

/// Connection to a single wallet, shared between the connect control and the submission form.
pub struct WalletSession<W: WalletConnector> {
    connector: W,
    state: Mutex<SessionState>,
}

/// Resets `is_connecting` when the connect attempt ends, however it ends.
struct ConnectingGuard<'a>(&'a Mutex<SessionState>);

impl<'a> ConnectingGuard<'a> {
    fn acquire(state: &'a Mutex<SessionState>) -> Option<Self> {
        let mut lock = state.lock();
        if lock.is_connecting {
            return None;
        }
        lock.is_connecting = true;
        Some(ConnectingGuard(state))
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) { self.0.lock().is_connecting = false; }
}

impl<W: WalletConnector> WalletSession<W> {
    /// Creates a disconnected session without contacting the connector.
    pub fn new(connector: W) -> Self { Self { connector, state: default!() } }

    /// Creates a session and adopts an address the connector is already authorized for.
    pub async fn start(connector: W) -> Self {
        let session = Self::new(connector);
        session.reconcile_on_startup().await;
        session
    }

    pub async fn reconcile_on_startup(&self) {
        match self.connector.active_address().await {
            Ok(Some(address)) => {
                debug!("Adopting already authorized wallet address {address}");
                self.state.lock().address = Some(address);
            }
            Ok(None) => trace!("No existing wallet connection"),
            Err(err) => warn!("Failed to check existing wallet connection: {err}"),
        }
    }

    #[inline]
    pub fn connector(&self) -> &W { &self.connector }
    #[inline]
    pub fn address(&self) -> Option<Address> { self.state.lock().address.clone() }
    #[inline]
    pub fn is_connected(&self) -> bool { self.state.lock().address.is_some() }
    #[inline]
    pub fn is_connecting(&self) -> bool { self.state.lock().is_connecting }
    #[inline]
    pub fn snapshot(&self) -> SessionState { self.state.lock().clone() }

    /// Runs the wallet selection and activates the chosen wallet.
    ///
    /// Returns the newly active address, or `None` if the user cancelled the selection. A call
    /// made while another connect is in progress does nothing and returns the current address.
    pub async fn connect(&self) -> Result<Option<Address>, WalletError> {
        let Some(_guard) = ConnectingGuard::acquire(&self.state) else {
            debug!("Wallet connection is already in progress");
            return Ok(self.address());
        };
        self.select_wallet().await.map_err(|err| {
            error!("Failed to connect wallet: {err}");
            err
        })
    }

    async fn select_wallet(&self) -> Result<Option<Address>, WalletError> {
        let Some(wallet) = self.connector.open_selection().await? else {
            debug!("Wallet selection was cancelled");
            return Ok(None);
        };
        self.connector.set_active_wallet(&wallet).await?;
        let address = self.connector.active_address().await?;
        match &address {
            Some(addr) => info!("Connected wallet {wallet} with address {addr}"),
            None => warn!("Wallet {wallet} is active but doesn't expose an address"),
        }
        self.state.lock().address = address.clone();
        Ok(address)
    }

    /// Drops the wallet session; the local address is cleared only once the connector confirms.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        match self.connector.drop_session().await {
            Ok(()) => {
                if let Some(addr) = self.state.lock().address.take() {
                    info!("Disconnected wallet address {addr}");
                }
                Ok(())
            }
            Err(err) => {
                error!("Failed to disconnect wallet: {err}");
                Err(err)
            }
        }
    }

    pub async fn sign(&self, envelope: &str, network: &str) -> Result<SignedEnvelope, WalletError> {
        self.connector.sign(envelope, network).await
    }
}
