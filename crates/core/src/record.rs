//! Name records as they move through the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A name record as published upstream.
///
/// Wire format is a JSON object with `Name`, `Surname` and `Patrynomic`.
/// The `Patrynomic` spelling is what producers send and must be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Surname")]
    pub surname: String,
    #[serde(rename = "Patrynomic")]
    pub patronymic: String,
}

impl RawRecord {
    pub fn new(
        name: impl Into<String>,
        surname: impl Into<String>,
        patronymic: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            patronymic: patronymic.into(),
        }
    }

    /// Parses a message payload. Missing fields or non-JSON input fail.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Encodes the record as a message payload.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A raw record plus its three predicted attributes.
///
/// Only built once all three predictions are in hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Surname")]
    pub surname: String,
    #[serde(rename = "Patrynomic")]
    pub patronymic: String,
    #[serde(rename = "Age")]
    pub age: i32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "National")]
    pub nationality: String,
}

impl EnrichedRecord {
    /// Joins a raw record with its predictions.
    pub fn new(raw: RawRecord, age: i32, gender: String, nationality: String) -> Self {
        Self {
            name: raw.name,
            surname: raw.surname,
            patronymic: raw.patronymic,
            age,
            gender,
            nationality,
        }
    }
}
