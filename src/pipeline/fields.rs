//! Field extraction: turn free-form `Key: value` text into a [`FieldSet`].
//!
//! App-idea documents are written by people, not machines, so the parser is
//! deliberately forgiving:
//!
//! ```text
//! Project name: Foo            ← key line: split on the first ':'
//! Description: A simple app    ← key line
//! for tracking tasks.          ← continuation, space-joined onto Description
//!                              ← blank line: ignored
//! ```
//!
//! Lines before the first key line are discarded. Nothing here can fail: a
//! document with no recognisable keys still produces a complete [`FieldSet`]
//! with every known field set to the empty string.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Separator between a key and its value on a key line.
pub const SEPARATOR: char = ':';

/// The nine fields the generation chain knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    ProjectName,
    Organization,
    BundleName,
    Platforms,
    Description,
    PrimaryFunctionality,
    DesignPreferences,
    ColorScheme,
    TargetAudience,
}

impl FieldName {
    /// Every known field, in canonical display order.
    pub const ALL: [FieldName; 9] = [
        FieldName::ProjectName,
        FieldName::Organization,
        FieldName::BundleName,
        FieldName::Platforms,
        FieldName::Description,
        FieldName::PrimaryFunctionality,
        FieldName::DesignPreferences,
        FieldName::ColorScheme,
        FieldName::TargetAudience,
    ];

    /// The exact key text expected in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::ProjectName => "Project name",
            FieldName::Organization => "Organization",
            FieldName::BundleName => "Bundle Name",
            FieldName::Platforms => "Platforms",
            FieldName::Description => "Description",
            FieldName::PrimaryFunctionality => "Primary functionality",
            FieldName::DesignPreferences => "Design Preferences",
            FieldName::ColorScheme => "Color Scheme",
            FieldName::TargetAudience => "Target Audience",
        }
    }

    /// Exact, case- and whitespace-sensitive lookup.
    pub fn from_key(key: &str) -> Option<FieldName> {
        FieldName::ALL.into_iter().find(|f| f.as_str() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured description of an app idea.
///
/// Always holds a value for every [`FieldName`]; missing fields are empty
/// strings. Keys found in the document that are not known fields are kept
/// aside as *extra fields* in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: [String; 9],
    extras: Vec<(String, String)>,
}

impl FieldSet {
    /// Value of a known field (empty string when the document omitted it).
    pub fn get(&self, field: FieldName) -> &str {
        &self.values[field.index()]
    }

    /// Look up a known field by its key text.
    pub fn get_key(&self, key: &str) -> Option<&str> {
        FieldName::from_key(key).map(|f| self.get(f))
    }

    /// Iterate over the nine known fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Number of known fields. Always nine.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Known fields that are still empty.
    pub fn missing(&self) -> Vec<FieldName> {
        self.iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(f, _)| f)
            .collect()
    }

    /// Unrecognised `key: value` pairs, in document order.
    pub fn extras(&self) -> &[(String, String)] {
        &self.extras
    }

    /// Display name of the project, falling back to a neutral phrase.
    pub fn project_name(&self) -> &str {
        match self.get(FieldName::ProjectName) {
            "" => "unnamed",
            name => name,
        }
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

/// Parse document text into a [`FieldSet`].
///
/// Pure and infallible: the same text always yields the same set.
pub fn extract_fields(text: &str) -> FieldSet {
    // Insertion-ordered so repeated keys overwrite in place.
    let mut entries: Vec<(String, String)> = Vec::new();
    let mut current: Option<usize> = None;

    for line in text.split('\n') {
        if let Some((key, value)) = line.split_once(SEPARATOR) {
            let key = key.trim();
            let value = value.trim().to_string();
            let idx = match entries.iter().position(|(k, _)| k == key) {
                Some(idx) => {
                    entries[idx].1 = value;
                    idx
                }
                None => {
                    entries.push((key.to_string(), value));
                    entries.len() - 1
                }
            };
            current = Some(idx);
        } else if let Some(idx) = current {
            let continuation = line.trim();
            if continuation.is_empty() {
                continue;
            }
            // Always one joining space, even onto an empty value.
            let value = &mut entries[idx].1;
            value.push(' ');
            value.push_str(continuation);
        }
    }

    let mut fields = FieldSet::default();
    for (key, value) in entries {
        match FieldName::from_key(&key) {
            Some(field) => fields.values[field.index()] = value,
            None => fields.extras.push((key, value)),
        }
    }
    fields
}
