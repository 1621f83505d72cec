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

//! Shape of the `submit_data` call on the Section 45X registry contract.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::config::ConfigError;
use crate::ValidRecord;

pub const SUBMIT_DATA_FN: &str = "submit_data";

const STRKEY_LEN: usize = 56;

/// Strkey-encoded address of a deployed contract (`C...`).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct ContractId(String);

impl ContractId {
    pub(crate) fn from_static(s: &'static str) -> Self { ContractId(s.to_owned()) }

    /// Checks the id has the form of a contract strkey; the checksum is left to the ledger.
    pub fn check(&self) -> Result<(), ConfigError> {
        let valid = self.0.len() == STRKEY_LEN
            && self.0.starts_with('C')
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidContractId(self.0.clone()))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for ContractId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = ContractId(s.to_owned());
        id.check()?;
        Ok(id)
    }
}

/// Contract value as it travels in invocation arguments and return values.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase", tag = "type", content = "value")
)]
pub enum ScVal {
    Void,
    Bool(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Str(String),
    Symbol(String),
}

impl ScVal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScVal::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for ScVal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScVal::Void => f.write_str("void"),
            ScVal::Bool(v) => write!(f, "bool({v})"),
            ScVal::I32(v) => write!(f, "i32({v})"),
            ScVal::U32(v) => write!(f, "u32({v})"),
            ScVal::I64(v) => write!(f, "i64({v})"),
            ScVal::U64(v) => write!(f, "u64({v})"),
            ScVal::Str(v) => write!(f, "string({v:?})"),
            ScVal::Symbol(v) => write!(f, "symbol({v})"),
        }
    }
}

/// Production quantity does not fit the contract's `i32` argument.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
#[display("production quantity {0} does not fit into a 32-bit signed integer")]
pub struct QuantityOverflow(pub String);

/// Invocation of a single contract function with positional arguments.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct ContractCall {
    pub contract_id: ContractId,
    pub function: String,
    pub args: Vec<ScVal>,
}

impl ContractCall {
    /// Maps the five validated record fields onto the `submit_data` arguments:
    /// `(component_type: String, production_quantity: i32, production_date: String,
    /// facility_id: String, doc_hash: String)`.
    pub fn submit_data(
        contract_id: ContractId,
        record: &ValidRecord,
    ) -> Result<Self, QuantityOverflow> {
        let quantity = record
            .production_quantity()
            .parse::<i32>()
            .map_err(|_| QuantityOverflow(record.production_quantity().to_owned()))?;
        Ok(ContractCall {
            contract_id,
            function: SUBMIT_DATA_FN.to_owned(),
            args: vec![
                ScVal::Str(record.component_type().to_owned()),
                ScVal::I32(quantity),
                ScVal::Str(record.production_date().to_owned()),
                ScVal::Str(record.facility_id().to_owned()),
                ScVal::Str(record.doc_hash().to_owned()),
            ],
        })
    }
}

impl Display for ContractCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.contract_id, self.function)?;
        for (no, arg) in self.args.iter().enumerate() {
            if no > 0 {
                f.write_str(", ")?;
            }
            Display::fmt(arg, f)?;
        }
        f.write_str(")")
    }
}

/// Identifier of the data batch, as returned by `submit_data`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
#[display(inner)]
pub struct BatchId(String);

impl BatchId {
    /// Decodes the contract return value; only a string is a valid batch id.
    pub fn decode(value: ScVal) -> Result<Self, ScVal> {
        match value {
            ScVal::Str(s) => Ok(BatchId(s)),
            other => Err(other),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }
}
