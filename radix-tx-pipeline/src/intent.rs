/*******************************************************************************
*   (c) 2022-2024 Zondax AG
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! Intent assembly and its local invariants
//!
//! Inputs are checked when an action is added, so a malformed intent never
//! reaches the node.

use radix_node_api::types::{AccountAddress, Action, Rri, TransactionIntent, ValidatorAddress};

use crate::errors::{IntentError, PipelineError};

/// Ergonomic intent builder
///
/// Every action method performs its checks and returns the builder for
/// chaining.
#[derive(Clone, Debug, Default)]
pub struct IntentBuilder {
    actions: Vec<Action>,
    message: Option<String>,
}

impl IntentBuilder {
    /// Instantiate an empty builder
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a token transfer to the intent
    pub fn transfer(
        mut self,
        from: AccountAddress,
        to: AccountAddress,
        amount: &str,
        rri: Rri,
    ) -> Result<Self, IntentError> {
        check_amount(amount)?;
        if to.0.is_empty() {
            return Err(IntentError::MissingRecipient);
        }

        self.actions.push(Action::Transfer { from, to, amount: amount.to_owned(), rri });
        Ok(self)
    }

    /// Add a stake delegation to the intent
    pub fn stake(
        mut self,
        from: AccountAddress,
        validator: ValidatorAddress,
        amount: &str,
    ) -> Result<Self, IntentError> {
        check_amount(amount)?;
        if validator.0.is_empty() {
            return Err(IntentError::MissingValidator);
        }

        self.actions.push(Action::Stake { from, validator, amount: amount.to_owned() });
        Ok(self)
    }

    /// Add a stake withdrawal to the intent
    pub fn unstake(
        mut self,
        from: AccountAddress,
        validator: ValidatorAddress,
        amount: &str,
    ) -> Result<Self, IntentError> {
        check_amount(amount)?;
        if validator.0.is_empty() {
            return Err(IntentError::MissingValidator);
        }

        self.actions.push(Action::Unstake { from, validator, amount: amount.to_owned() });
        Ok(self)
    }

    /// Attach a plaintext message
    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }

    /// Finish the intent
    pub fn build(self) -> TransactionIntent {
        TransactionIntent { actions: self.actions, message: self.message }
    }
}

fn check_amount(amount: &str) -> Result<(), IntentError> {
    let positive = !amount.is_empty() && amount.bytes().all(|b| b.is_ascii_digit()) && amount.bytes().any(|b| b != b'0');
    if positive {
        Ok(())
    } else {
        Err(IntentError::InvalidAmount(amount.to_owned()))
    }
}

/// The HRP to announce to the Ledger app for this intent
///
/// Collects the distinct non-native resources across the transfer actions.
/// The app can display at most one, so two or more distinct ones fail with
/// [`PipelineError::MultipleNonNativeRRIs`] before any I/O happens.
pub fn non_native_hrp(intent: &TransactionIntent) -> Result<Option<String>, PipelineError> {
    let mut distinct: Vec<&str> = vec![];

    for action in &intent.actions {
        if let Action::Transfer { rri, .. } = action {
            if !rri.is_native() && !distinct.contains(&rri.hrp()) {
                distinct.push(rri.hrp());
            }
        }
    }

    match distinct.as_slice() {
        [] => Ok(None),
        [hrp] => Ok(Some((*hrp).to_owned())),
        _ => Err(PipelineError::MultipleNonNativeRRIs),
    }
}
