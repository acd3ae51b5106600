//! Purpose: Record field-level provenance for decoded API objects.
//! Exports: `FieldStatus`, `FieldMeta`, `Metadata`, `HasMetadata`.
//! Role: Side channel attached to every decoded object (`meta` field).
//! Invariants: Every declared field has exactly one `FieldMeta` entry.
//! Invariants: Raw text is the exact JSON slice seen on the wire for that value.
//! Invariants: Keys that match no declared field land in `extras`, never in `fields`.

use serde_json::value::RawValue;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldStatus {
    /// Key was not present in the payload.
    Missing,
    /// Key was present with a JSON `null`.
    Null,
    /// Key was present with a non-null value.
    Present,
}

impl FieldStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldStatus::Missing => "missing",
            FieldStatus::Null => "null",
            FieldStatus::Present => "present",
        }
    }
}

#[derive(Clone, Debug)]
pub struct FieldMeta {
    status: FieldStatus,
    raw: Option<Box<RawValue>>,
}

impl FieldMeta {
    pub(crate) fn missing() -> Self {
        Self {
            status: FieldStatus::Missing,
            raw: None,
        }
    }

    pub(crate) fn seen(raw: &RawValue) -> Self {
        let status = if raw.get().trim() == "null" {
            FieldStatus::Null
        } else {
            FieldStatus::Present
        };
        Self {
            status,
            raw: Some(raw.to_owned()),
        }
    }

    pub fn status(&self) -> FieldStatus {
        self.status
    }

    pub fn is_present(&self) -> bool {
        self.status == FieldStatus::Present
    }

    /// Raw JSON text for the field, `None` when the key was missing.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref().map(RawValue::get)
    }
}

#[derive(Clone, Debug)]
pub struct Metadata {
    raw: Box<RawValue>,
    fields: BTreeMap<&'static str, FieldMeta>,
    extras: BTreeMap<String, Box<RawValue>>,
}

impl Metadata {
    pub(crate) fn new(
        raw: Box<RawValue>,
        fields: BTreeMap<&'static str, FieldMeta>,
        extras: BTreeMap<String, Box<RawValue>>,
    ) -> Self {
        Self { raw, fields, extras }
    }

    /// The whole object exactly as received.
    pub fn raw(&self) -> &str {
        self.raw.get()
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldMeta)> {
        self.fields.iter().map(|(name, meta)| (*name, meta))
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(|raw| raw.get())
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extras
            .iter()
            .map(|(key, raw)| (key.as_str(), raw.get()))
    }

    pub fn has_extras(&self) -> bool {
        !self.extras.is_empty()
    }

    /// Parses an overflow value into a caller-chosen type.
    pub fn extra_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.extras.get(key)?;
        serde_json::from_str(raw.get()).ok()
    }
}

/// Implemented by top-level API objects so generic code can reach their `meta`.
pub trait HasMetadata {
    fn metadata(&self) -> &Metadata;
}
