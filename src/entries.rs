//! Entry specification resolution
//!
//! The host pipeline configures its entries as nothing, a single path, a
//! list of paths, or a name-to-path mapping. The shape is decided once at
//! configuration time into an explicit tagged variant instead of being
//! re-sniffed on every query.

use crate::error::InspectError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A logical build entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    pub entry_name: String,
    pub entry_path: String,
}

/// The `list()` query result: project root plus derived entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntriesList {
    pub root: String,
    pub entries: Vec<EntryInfo>,
}

/// The configured entry specification, classified once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntrySpec {
    /// No configured entries; a single default entry is assumed
    #[default]
    Absent,
    Single(String),
    List(Vec<String>),
    /// name -> path pairs, insertion order preserved
    Mapping(Vec<(String, String)>),
}

impl EntrySpec {
    /// Classify a JSON entry specification.
    ///
    /// `None` or JSON null mean absent. Any other unrecognized shape is an
    /// error the configuration layer downgrades to an empty entry list.
    pub fn from_json(value: Option<&Value>) -> Result<Self, InspectError> {
        let value = match value {
            None | Some(Value::Null) => return Ok(EntrySpec::Absent),
            Some(value) => value,
        };
        match value {
            Value::String(path) => Ok(EntrySpec::Single(path.clone())),
            Value::Array(items) => {
                let mut paths = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(path) => paths.push(path.clone()),
                        _ => {
                            return Err(InspectError::UnsupportedEntrySpec {
                                found: "array with non-string element",
                            })
                        }
                    }
                }
                Ok(EntrySpec::List(paths))
            }
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (name, path) in map {
                    match path {
                        Value::String(path) => pairs.push((name.clone(), path.clone())),
                        _ => {
                            return Err(InspectError::UnsupportedEntrySpec {
                                found: "mapping with non-string value",
                            })
                        }
                    }
                }
                Ok(EntrySpec::Mapping(pairs))
            }
            Value::Bool(_) => Err(InspectError::UnsupportedEntrySpec { found: "boolean" }),
            Value::Number(_) => Err(InspectError::UnsupportedEntrySpec { found: "number" }),
            Value::Null => unreachable!("handled above"),
        }
    }

    /// Derive the entry list. Pure and deterministic; never fails.
    pub fn entries(&self) -> Vec<EntryInfo> {
        match self {
            EntrySpec::Absent => vec![EntryInfo {
                entry_name: "index".to_string(),
                entry_path: "index.html".to_string(),
            }],
            EntrySpec::Single(path) => vec![entry_from_path(path)],
            EntrySpec::List(paths) => paths.iter().map(|path| entry_from_path(path)).collect(),
            EntrySpec::Mapping(pairs) => pairs
                .iter()
                .map(|(name, path)| EntryInfo {
                    entry_name: name.clone(),
                    entry_path: path.clone(),
                })
                .collect(),
        }
    }
}

/// Entry named after the path's file stem.
fn entry_from_path(path: &str) -> EntryInfo {
    let name = Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    EntryInfo {
        entry_name: name,
        entry_path: path.to_string(),
    }
}
