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

//! Connect/disconnect control reflecting the wallet session.

use std::sync::Arc;

use crate::{Address, SessionState, WalletConnector, WalletError, WalletSession};

/// What the control currently shows.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
pub enum IndicatorView {
    #[display("Connect Wallet")]
    Connect,

    #[display("Connecting...")]
    Connecting,

    #[display("{short}")]
    Connected { address: Address, short: String },
}

impl IndicatorView {
    pub fn from_state(state: &SessionState) -> Self {
        match (&state.address, state.is_connecting) {
            (Some(address), _) => IndicatorView::Connected {
                address: address.clone(),
                short: address.short(),
            },
            (None, true) => IndicatorView::Connecting,
            (None, false) => IndicatorView::Connect,
        }
    }

    /// Caption of the button.
    pub fn action_label(&self) -> &'static str {
        match self {
            IndicatorView::Connect => "Connect Wallet",
            IndicatorView::Connecting => "Connecting...",
            IndicatorView::Connected { .. } => "Disconnect",
        }
    }

    /// The button is disabled while a connection attempt is running.
    pub fn is_enabled(&self) -> bool { !matches!(self, IndicatorView::Connecting) }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum IndicatorAction {
    /// Selection completed; `None` if the user dismissed it.
    Connected(Option<Address>),
    Disconnected,
    /// The control was disabled.
    Ignored,
}

pub struct ConnectionIndicator<W: WalletConnector> {
    session: Arc<WalletSession<W>>,
}

impl<W: WalletConnector> ConnectionIndicator<W> {
    pub fn new(session: Arc<WalletSession<W>>) -> Self { Self { session } }

    pub fn view(&self) -> IndicatorView { IndicatorView::from_state(&self.session.snapshot()) }

    /// Connects when disconnected and disconnects when connected.
    pub async fn press(&self) -> Result<IndicatorAction, WalletError> {
        match self.view() {
            IndicatorView::Connecting => Ok(IndicatorAction::Ignored),
            IndicatorView::Connect => self.session.connect().await.map(IndicatorAction::Connected),
            IndicatorView::Connected { .. } => {
                self.session.disconnect().await?;
                Ok(IndicatorAction::Disconnected)
            }
        }
    }
}
