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

//! Network presets and the fixed configuration of the submission client.

use std::str::FromStr;
use std::time::Duration;

use crate::ContractId;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";

pub const SOROBAN_TESTNET_URL: &str = "https://soroban-testnet.stellar.org:443";
pub const SOROBAN_FUTURENET_URL: &str = "https://rpc-futurenet.stellar.org:443";

pub const EXPLORER_URL: &str = "https://stellar.expert/explorer";

/// Address of the deployed Section 45X data registry contract.
pub const CONTRACT_ID: &str = "CCGHWWNJDDTOE5T6LU6HIODI3ODMIO3G2JZV5EYR4PM34A5U4YD6LJZW";

/// Minimal inclusion fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;
/// Validity window of a built transaction, in seconds.
pub const TX_TIMEOUT_SECS: u64 = 30;
pub const POLL_INTERVAL_MS: u64 = 1000;

/// Stellar network the client submits to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "lowercase")
)]
#[display(lowercase)]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
    Futurenet,
}

impl Network {
    pub fn passphrase(self) -> &'static str {
        match self {
            Network::Testnet => TESTNET_PASSPHRASE,
            Network::Mainnet => MAINNET_PASSPHRASE,
            Network::Futurenet => FUTURENET_PASSPHRASE,
        }
    }

    /// Public RPC endpoint, if the network has one operated by SDF.
    pub fn default_rpc(self) -> Option<&'static str> {
        match self {
            Network::Testnet => Some(SOROBAN_TESTNET_URL),
            Network::Futurenet => Some(SOROBAN_FUTURENET_URL),
            Network::Mainnet => None,
        }
    }

    fn explorer_slug(self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "public",
            Network::Futurenet => "futurenet",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" | "public" | "pubnet" => Ok(Network::Mainnet),
            "futurenet" => Ok(Network::Futurenet),
            _ => Err(ConfigError::UnknownNetwork(s.to_owned())),
        }
    }
}

/// Everything the submission workflow needs to know about where and how to submit.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase", default)
)]
pub struct SubmitConfig {
    pub network: Network,
    pub rpc_url: String,
    pub contract_id: ContractId,
    pub base_fee: u32,
    pub tx_timeout_secs: u64,
    pub poll_interval_ms: u64,
    /// Upper bound on status queries after submission; `None` polls until the ledger answers
    /// or the caller cancels.
    pub max_poll_attempts: Option<u32>,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        SubmitConfig {
            network: Network::Testnet,
            rpc_url: SOROBAN_TESTNET_URL.to_owned(),
            contract_id: ContractId::from_static(CONTRACT_ID),
            base_fee: BASE_FEE,
            tx_timeout_secs: TX_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            max_poll_attempts: None,
        }
    }
}

impl SubmitConfig {
    pub fn with_network(network: Network) -> Self {
        SubmitConfig {
            network,
            rpc_url: network.default_rpc().map(str::to_owned).unwrap_or_default(),
            ..default!()
        }
    }

    #[inline]
    pub fn passphrase(&self) -> &'static str { self.network.passphrase() }

    #[inline]
    pub fn tx_timeout(&self) -> Duration { Duration::from_secs(self.tx_timeout_secs) }

    #[inline]
    pub fn poll_interval(&self) -> Duration { Duration::from_millis(self.poll_interval_ms) }

    /// Link to the transaction page on the public block explorer.
    pub fn explorer_link(&self, tx_hash: &str) -> String {
        format!("{EXPLORER_URL}/{}/tx/{tx_hash}", self.network.explorer_slug())
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.rpc_url.is_empty() {
            return Err(ConfigError::NoRpcUrl(self.network));
        }
        self.contract_id.check()?;
        if self.base_fee == 0 {
            return Err(ConfigError::ZeroFee);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Reads configuration from a YAML document; absent keys keep their default values.
    #[cfg(feature = "serde")]
    pub fn from_yaml(reader: impl std::io::Read) -> Result<Self, ConfigError> {
        let config: SubmitConfig = serde_yaml::from_reader(reader)?;
        config.check()?;
        Ok(config)
    }
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ConfigError {
    /// unknown network '{0}'; use one of testnet, mainnet or futurenet.
    UnknownNetwork(String),

    /// no RPC endpoint is configured for {0}.
    NoRpcUrl(Network),

    /// '{0}' is not a valid contract address.
    InvalidContractId(String),

    /// base fee must not be zero.
    ZeroFee,

    /// poll interval must not be zero.
    ZeroPollInterval,

    #[cfg(feature = "serde")]
    #[from]
    #[display(inner)]
    Yaml(serde_yaml::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = SubmitConfig::default();
        assert_eq!(config.passphrase(), TESTNET_PASSPHRASE);
        assert_eq!(config.rpc_url, "https://soroban-testnet.stellar.org:443");
        assert_eq!(config.contract_id.as_str(), CONTRACT_ID);
        assert_eq!(config.tx_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.max_poll_attempts, None);
        config.check().unwrap();
    }

    #[test]
    fn explorer_link() {
        let config = SubmitConfig::default();
        assert_eq!(
            config.explorer_link("abcd"),
            "https://stellar.expert/explorer/testnet/tx/abcd"
        );
        let config = SubmitConfig::with_network(Network::Mainnet);
        assert_eq!(
            config.explorer_link("abcd"),
            "https://stellar.expert/explorer/public/tx/abcd"
        );
    }

    #[test]
    fn network_names() {
        assert_eq!(Network::from_str("PUBLIC").unwrap(), Network::Mainnet);
        assert_eq!(Network::from_str("futurenet").unwrap(), Network::Futurenet);
        assert!(Network::from_str("regtest").is_err());
        assert_eq!(Network::Testnet.to_string(), "testnet");
    }

    #[test]
    fn mainnet_requires_rpc() {
        let mut config = SubmitConfig::with_network(Network::Mainnet);
        assert_eq!(config.passphrase(), MAINNET_PASSPHRASE);
        assert!(matches!(config.check(), Err(ConfigError::NoRpcUrl(Network::Mainnet))));
        config.rpc_url = s!("https://rpc.example.org");
        config.check().unwrap();
    }

    #[test]
    fn rejects_zero_values() {
        let config = SubmitConfig { base_fee: 0, ..default!() };
        assert!(matches!(config.check(), Err(ConfigError::ZeroFee)));
        let config = SubmitConfig { poll_interval_ms: 0, ..default!() };
        assert!(matches!(config.check(), Err(ConfigError::ZeroPollInterval)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn yaml_rejects_zero_poll_interval() {
        let res = SubmitConfig::from_yaml("pollIntervalMs: 0\n".as_bytes());
        assert!(matches!(res, Err(ConfigError::ZeroPollInterval)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn yaml_overrides() {
        let yaml = "network: futurenet\nrpcUrl: http://localhost:8000\nmaxPollAttempts: 5\n";
        let config = SubmitConfig::from_yaml(yaml.as_bytes()).unwrap();
        assert_eq!(config.network, Network::Futurenet);
        assert_eq!(config.rpc_url, "http://localhost:8000");
        assert_eq!(config.max_poll_attempts, Some(5));
        assert_eq!(config.base_fee, BASE_FEE);
        assert_eq!(config.contract_id.as_str(), CONTRACT_ID);
    }
}
