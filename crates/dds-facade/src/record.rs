// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The two-field payload exchanged between publishers and subscribers.

/// A published sample: sequence-style `index` plus UTF-8 `message`.
///
/// Fields are private so a record cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    index: u32,
    message: String,
}

impl Record {
    pub fn new(index: u32, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Consume the record, keeping only the text.
    pub fn into_message(self) -> String {
        self.message
    }

    pub fn into_parts(self) -> (u32, String) {
        (self.index, self.message)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Index={}, Message=\"{}\"", self.index, self.message)
    }
}
