//! Key lifecycle state machine
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use keysmith_types::{KeyId, KeyStatus};
use std::fmt;

/// A lifecycle operation addressed at a single key id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Enable,
    Disable,
    SetPrimary,
    Delete,
    Destroy,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::SetPrimary => "set_primary",
            Operation::Delete => "delete",
            Operation::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an accepted operation does to the key entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Move the key to a new status
    Status(KeyStatus),
    /// Key already in the requested state
    Unchanged,
    /// Make the key the primary
    Promote,
    /// Drop the entry from the keyset
    Remove,
}

/// Decide whether `op` may be applied to key `id` currently in `status`.
pub fn check(op: Operation, id: KeyId, status: KeyStatus, is_primary: bool) -> KeyResult<Outcome> {
    let reject = |reason: &'static str| KeyError::InvalidTransition {
        id,
        status,
        operation: op.as_str(),
        reason,
    };

    match op {
        Operation::Enable => match status {
            KeyStatus::Enabled => Ok(Outcome::Unchanged),
            KeyStatus::Disabled => Ok(Outcome::Status(KeyStatus::Enabled)),
            KeyStatus::Destroyed => Err(reject("destroyed keys cannot be re-enabled")),
        },
        Operation::Disable => {
            if is_primary {
                return Err(reject("the primary key must stay enabled; set another primary first"));
            }
            match status {
                KeyStatus::Enabled => Ok(Outcome::Status(KeyStatus::Disabled)),
                KeyStatus::Disabled => Ok(Outcome::Unchanged),
                KeyStatus::Destroyed => Err(reject("destroyed keys cannot change state")),
            }
        }
        Operation::SetPrimary => match status {
            KeyStatus::Enabled => Ok(Outcome::Promote),
            _ => Err(reject("only enabled keys can be primary")),
        },
        Operation::Delete => {
            if is_primary {
                return Err(reject("the primary key cannot be deleted; set another primary first"));
            }
            match status {
                KeyStatus::Enabled => Err(reject("enabled keys must be disabled before deletion")),
                KeyStatus::Disabled | KeyStatus::Destroyed => Ok(Outcome::Remove),
            }
        }
        Operation::Destroy => {
            if is_primary {
                return Err(reject("the primary key cannot be destroyed; set another primary first"));
            }
            match status {
                KeyStatus::Destroyed => Ok(Outcome::Unchanged),
                KeyStatus::Enabled | KeyStatus::Disabled => {
                    Ok(Outcome::Status(KeyStatus::Destroyed))
                }
            }
        }
    }
}
