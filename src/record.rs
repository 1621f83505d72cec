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

//! Form record with the five production data fields and their validation rules.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;

/// Input field of the submission form, in display order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Field {
    #[display("Component type")]
    ComponentType,

    #[display("Production quantity")]
    ProductionQuantity,

    #[display("Production date")]
    ProductionDate,

    #[display("Facility ID")]
    FacilityId,

    #[display("Document hash")]
    DocHash,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::ComponentType,
        Field::ProductionQuantity,
        Field::ProductionDate,
        Field::FacilityId,
        Field::DocHash,
    ];

    /// Input name, matching the contract argument name.
    pub fn name(self) -> &'static str {
        match self {
            Field::ComponentType => "component_type",
            Field::ProductionQuantity => "production_quantity",
            Field::ProductionDate => "production_date",
            Field::FacilityId => "facility_id",
            Field::DocHash => "doc_hash",
        }
    }

    /// Maximal length of the raw value in bytes, for the fields limited by length.
    pub fn max_len(self) -> Option<usize> {
        match self {
            Field::ComponentType | Field::FacilityId => Some(64),
            Field::ProductionDate => Some(20),
            Field::DocHash => Some(70),
            Field::ProductionQuantity => None,
        }
    }

    fn check(self, value: &str) -> Option<FieldError> {
        if value.trim().is_empty() {
            return Some(FieldError::Required(self));
        }
        match self.max_len() {
            Some(max) if value.len() > max => Some(FieldError::TooLong(max)),
            Some(_) => None,
            None if !is_digits(value) => Some(FieldError::NotInteger),
            None => None,
        }
    }
}

/// Equivalent of `^\d+$`: ASCII digits only, no sign, separator or surrounding space.
fn is_digits(value: &str) -> bool { !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) }

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub enum FieldError {
    #[display("{0} is required")]
    Required(Field),

    #[display("Maximum {0} bytes allowed")]
    TooLong(usize),

    #[display("Must be a positive integer")]
    NotInteger,
}

/// Per-field validation errors, kept in the order the fields appear in the form.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct FieldErrors(IndexMap<Field, FieldError>);

impl FieldErrors {
    #[inline]
    pub fn new() -> Self { default!() }
    #[inline]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    #[inline]
    pub fn len(&self) -> usize { self.0.len() }
    #[inline]
    pub fn get(&self, field: Field) -> Option<FieldError> { self.0.get(&field).copied() }
    #[inline]
    pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

    /// Removes the error of a single field, returning whether there was one.
    pub fn clear(&mut self, field: Field) -> bool { self.0.shift_remove(&field).is_some() }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(field, err)| (*field, *err))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (no, (field, err)) in self.iter().enumerate() {
            if no > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {err}", field.name())?;
        }
        Ok(())
    }
}

/// Raw values of the submission form, exactly as entered.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", default)
)]
pub struct SubmissionRecord {
    pub component_type: String,
    pub production_quantity: String,
    pub production_date: String,
    pub facility_id: String,
    pub doc_hash: String,
}

impl SubmissionRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ComponentType => &self.component_type,
            Field::ProductionQuantity => &self.production_quantity,
            Field::ProductionDate => &self.production_date,
            Field::FacilityId => &self.facility_id,
            Field::DocHash => &self.doc_hash,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::ComponentType => &mut self.component_type,
            Field::ProductionQuantity => &mut self.production_quantity,
            Field::ProductionDate => &mut self.production_date,
            Field::FacilityId => &mut self.facility_id,
            Field::DocHash => &mut self.doc_hash,
        };
        *slot = value.into();
    }

    /// Runs all field rules, collecting every failing field.
    pub fn field_errors(&self) -> FieldErrors {
        FieldErrors(
            Field::ALL
                .into_iter()
                .filter_map(|field| field.check(self.get(field)).map(|err| (field, err)))
                .collect(),
        )
    }

    pub fn validate(self) -> Result<ValidRecord, FieldErrors> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(ValidRecord(self))
        } else {
            Err(errors)
        }
    }
}

/// Record which passed validation; the only input accepted for building a contract call.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ValidRecord(SubmissionRecord);

impl ValidRecord {
    #[inline]
    pub fn component_type(&self) -> &str { &self.0.component_type }
    #[inline]
    pub fn production_quantity(&self) -> &str { &self.0.production_quantity }
    #[inline]
    pub fn production_date(&self) -> &str { &self.0.production_date }
    #[inline]
    pub fn facility_id(&self) -> &str { &self.0.facility_id }
    #[inline]
    pub fn doc_hash(&self) -> &str { &self.0.doc_hash }
    #[inline]
    pub fn into_inner(self) -> SubmissionRecord { self.0 }
}
