//! # Field Selector
//!
//! Parses the `-i` option and narrows a [`SignalReading`] down to the
//! requested fields.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

use super::fields::{find_field, FieldValue, FIELD_SPECS};
use super::parser::SignalReading;
use crate::error::{Result, SignalInfoError};

/// Keyword that selects every field
pub const ANY: &str = "any";

/// `-i` default
pub const DEFAULT_INCLUDE: &str = "rat,band,rsrp,sinr";

/// Fields asked for on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedFields {
    /// Every field in the table
    Any,
    /// Table indices of the named fields
    Only(BTreeSet<usize>),
}

impl RequestedFields {
    /// Parse a comma-separated list of field names, or `any`
    ///
    /// # Errors
    ///
    /// - [`SignalInfoError::UnknownField`] for a name outside the table
    /// - [`SignalInfoError::NoFieldsRequested`] when the list is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use onyx_signal_info::signal::RequestedFields;
    ///
    /// assert_eq!(RequestedFields::parse("any")?, RequestedFields::Any);
    /// assert!(RequestedFields::parse("rsrp,bogus").is_err());
    /// # Ok::<(), onyx_signal_info::error::SignalInfoError>(())
    /// ```
    pub fn parse(include: &str) -> Result<Self> {
        let names: Vec<&str> = include
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Err(SignalInfoError::NoFieldsRequested);
        }

        let mut indices = BTreeSet::new();
        let mut any = false;
        for name in names {
            if name == ANY {
                any = true;
                continue;
            }
            let (index, _) =
                find_field(name).ok_or_else(|| SignalInfoError::UnknownField(name.to_string()))?;
            indices.insert(index);
        }

        Ok(if any { RequestedFields::Any } else { RequestedFields::Only(indices) })
    }

    /// Requested `(name, value)` pairs in table order
    pub fn select(&self, reading: &SignalReading) -> SelectedFields {
        let pairs = match self {
            RequestedFields::Any => reading.iter().map(|(n, v)| (n, v.clone())).collect(),
            RequestedFields::Only(indices) => indices
                .iter()
                .filter_map(|&i| reading.at(i))
                .map(|(n, v)| (*n, v.clone()))
                .collect(),
        };
        SelectedFields(pairs)
    }

    /// Number of fields the selection yields
    pub fn len(&self) -> usize {
        match self {
            RequestedFields::Any => FIELD_SPECS.len(),
            RequestedFields::Only(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered `(name, value)` pairs ready for a sink
///
/// Serializes as a JSON object with keys in table order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectedFields(pub Vec<(&'static str, FieldValue)>);

impl SelectedFields {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(n, _)| *n).collect()
    }
}

impl Serialize for SelectedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
