//! Purpose: Tolerant, reflection-free decoding of API payloads into typed values.
//! Exports: `Decode`, `ObjectDecoder`, `JsonKind`, `from_str`, `from_slice`.
//! Role: Every response type implements `Decode` by walking an `ObjectDecoder`.
//! Invariants: Unknown keys are never an error; they end up in `Metadata` extras.
//! Invariants: A required key that is absent fails with `MissingField` naming it.
//! Invariants: Kind mismatches fail with `TypeMismatch` naming field, expected and actual.
//! Invariants: Field paths in errors are dotted for objects and `[i]` for arrays.

use crate::core::error::{Error, ErrorKind};
use crate::core::meta::{FieldMeta, Metadata};
use crate::json::parse;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub type DecodeResult<T> = Result<T, Error>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(raw: &RawValue) -> Self {
        match raw.get().trim_start().as_bytes().first() {
            Some(b'{') => JsonKind::Object,
            Some(b'[') => JsonKind::Array,
            Some(b'"') => JsonKind::String,
            Some(b't') | Some(b'f') => JsonKind::Boolean,
            Some(b'n') => JsonKind::Null,
            _ => JsonKind::Number,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }
}

/// A type that can be built from one JSON value.
pub trait Decode: Sized {
    /// Name of the semantic type, reported as `expected` in mismatch errors.
    const EXPECTED: &'static str;

    fn decode(raw: &RawValue) -> DecodeResult<Self>;
}

/// Parses `input` and decodes it as `T`.
pub fn from_str<T: Decode>(input: &str) -> DecodeResult<T> {
    let raw = parse::from_str(input).map_err(parse_error)?;
    T::decode(raw)
}

pub fn from_slice<T: Decode>(input: &[u8]) -> DecodeResult<T> {
    let raw = parse::from_slice(input).map_err(parse_error)?;
    T::decode(raw)
}

fn parse_error(err: serde_json::Error) -> Error {
    let hint = parse::hint_for_error(&err, "response body");
    Error::new(ErrorKind::Parse)
        .with_message("payload is not well-formed json")
        .with_hint(hint)
        .with_source(err)
}

fn expect_kind(raw: &RawValue, expected: JsonKind, semantic: &'static str) -> DecodeResult<()> {
    let actual = JsonKind::of(raw);
    if actual == expected {
        Ok(())
    } else {
        Err(Error::type_mismatch(semantic, actual.as_str()))
    }
}

impl Decode for String {
    const EXPECTED: &'static str = "string";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::String, Self::EXPECTED)?;
        serde_json::from_str(raw.get()).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("invalid string literal")
                .with_source(err)
        })
    }
}

impl Decode for i64 {
    const EXPECTED: &'static str = "integer";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::Number, Self::EXPECTED)?;
        serde_json::from_str(raw.get())
            .map_err(|_| Error::type_mismatch(Self::EXPECTED, JsonKind::Number.as_str()))
    }
}

impl Decode for bool {
    const EXPECTED: &'static str = "boolean";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::Boolean, Self::EXPECTED)?;
        Ok(raw.get().trim_start().starts_with('t'))
    }
}

impl Decode for OffsetDateTime {
    const EXPECTED: &'static str = "date-time";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::String, Self::EXPECTED)?;
        let text = String::decode(raw)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(|err| {
            Error::type_mismatch(Self::EXPECTED, JsonKind::String.as_str()).with_source(err)
        })
    }
}

impl Decode for Date {
    const EXPECTED: &'static str = "date";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::String, Self::EXPECTED)?;
        let text = String::decode(raw)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]")).map_err(|err| {
            Error::type_mismatch(Self::EXPECTED, JsonKind::String.as_str()).with_source(err)
        })
    }
}

impl<T: Decode> Decode for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::Array, Self::EXPECTED)?;
        let elements: Vec<&RawValue> = serde_json::from_str(raw.get()).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("invalid array")
                .with_source(err)
        })?;
        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                if JsonKind::of(element) == JsonKind::Null {
                    return Err(Error::type_mismatch(T::EXPECTED, "null").within_index(index));
                }
                T::decode(element).map_err(|err| err.within_index(index))
            })
            .collect()
    }
}

/// Object keys in payload order, each paired with its unparsed value.
struct RawEntries<'a>(Vec<(String, &'a RawValue)>);

impl<'de> Deserialize<'de> for RawEntries<'de> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries<'de>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(key) = map.next_key::<String>()? {
                    let value: &'de RawValue = map.next_value()?;
                    entries.push((key, value));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Walks one JSON object, handing out declared fields and keeping the rest.
///
/// Typical use inside a `Decode` impl:
///
/// ```
/// use increase::core::decode::{self, Decode, DecodeResult, ObjectDecoder};
/// use increase::core::meta::Metadata;
/// use serde_json::value::RawValue;
///
/// struct Widget {
///     id: String,
///     size: Option<i64>,
///     meta: Metadata,
/// }
///
/// impl Decode for Widget {
///     const EXPECTED: &'static str = "object";
///
///     fn decode(raw: &RawValue) -> DecodeResult<Self> {
///         let mut object = ObjectDecoder::new(raw)?;
///         Ok(Self {
///             id: object.required("id")?,
///             size: object.optional("size")?,
///             meta: object.finish(),
///         })
///     }
/// }
///
/// let widget: Widget = decode::from_str(r#"{"id": "w_1", "color": "red"}"#).unwrap();
/// assert_eq!(widget.id, "w_1");
/// assert_eq!(widget.size, None);
/// assert_eq!(widget.meta.extra("color"), Some("\"red\""));
/// ```
pub struct ObjectDecoder<'a> {
    raw: &'a RawValue,
    entries: Vec<(String, &'a RawValue)>,
    claimed: Vec<bool>,
    fields: BTreeMap<&'static str, FieldMeta>,
}

impl<'a> ObjectDecoder<'a> {
    pub fn new(raw: &'a RawValue) -> DecodeResult<Self> {
        expect_kind(raw, JsonKind::Object, "object")?;
        let RawEntries(entries) = serde_json::from_str(raw.get()).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message("invalid object")
                .with_source(err)
        })?;
        let claimed = vec![false; entries.len()];
        Ok(Self {
            raw,
            entries,
            claimed,
            fields: BTreeMap::new(),
        })
    }

    /// Decodes a key that must be present and non-null.
    pub fn required<T: Decode>(&mut self, key: &'static str) -> DecodeResult<T> {
        let Some(value) = self.claim(key) else {
            return Err(Error::missing_field(key));
        };
        if JsonKind::of(value) == JsonKind::Null {
            return Err(Error::type_mismatch(T::EXPECTED, "null").within_field(key));
        }
        T::decode(value).map_err(|err| err.within_field(key))
    }

    /// Decodes a key that may be absent or `null`.
    pub fn optional<T: Decode>(&mut self, key: &'static str) -> DecodeResult<Option<T>> {
        match self.claim(key) {
            None => Ok(None),
            Some(value) if JsonKind::of(value) == JsonKind::Null => Ok(None),
            Some(value) => T::decode(value)
                .map(Some)
                .map_err(|err| err.within_field(key)),
        }
    }

    /// Records a declared key without decoding it.
    pub fn declare(&mut self, key: &'static str) {
        let _ = self.claim(key);
    }

    /// Closes the object; unclaimed keys become extras.
    pub fn finish(self) -> Metadata {
        let mut extras = BTreeMap::new();
        for ((key, value), claimed) in self.entries.into_iter().zip(self.claimed) {
            if !claimed {
                extras.insert(key, value.to_owned());
            }
        }
        if !extras.is_empty() {
            tracing::debug!(
                keys = ?extras.keys().collect::<Vec<_>>(),
                "kept unknown fields as extras"
            );
        }
        Metadata::new(self.raw.to_owned(), self.fields, extras)
    }

    /// Marks every occurrence of `key` claimed and returns the last one.
    fn claim(&mut self, key: &'static str) -> Option<&'a RawValue> {
        let mut found = None;
        for (index, (name, value)) in self.entries.iter().enumerate() {
            if name == key {
                self.claimed[index] = true;
                found = Some(*value);
            }
        }
        let meta = match found {
            Some(value) => FieldMeta::seen(value),
            None => FieldMeta::missing(),
        };
        self.fields.insert(key, meta);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::{Decode, DecodeResult, JsonKind, ObjectDecoder, from_str};
    use crate::core::error::ErrorKind;
    use crate::core::meta::{FieldStatus, Metadata};
    use serde_json::value::RawValue;
    use time::macros::{date, datetime};
    use time::{Date, OffsetDateTime};

    #[derive(Debug)]
    struct Inner {
        amount: i64,
        meta: Metadata,
    }

    impl Decode for Inner {
        const EXPECTED: &'static str = "object";

        fn decode(raw: &RawValue) -> DecodeResult<Self> {
            let mut object = ObjectDecoder::new(raw)?;
            Ok(Self {
                amount: object.required("amount")?,
                meta: object.finish(),
            })
        }
    }

    #[derive(Debug)]
    struct Outer {
        id: String,
        active: bool,
        created_at: OffsetDateTime,
        settles_on: Option<Date>,
        inner: Inner,
        items: Vec<Inner>,
        meta: Metadata,
    }

    impl Decode for Outer {
        const EXPECTED: &'static str = "object";

        fn decode(raw: &RawValue) -> DecodeResult<Self> {
            let mut object = ObjectDecoder::new(raw)?;
            Ok(Self {
                id: object.required("id")?,
                active: object.required("active")?,
                created_at: object.required("created_at")?,
                settles_on: object.optional("settles_on")?,
                inner: object.required("inner")?,
                items: object.required("items")?,
                meta: object.finish(),
            })
        }
    }

    const VALID: &str = r#"{
        "id": "obj_1",
        "active": true,
        "created_at": "2020-01-31T23:59:59Z",
        "settles_on": "2020-02-03",
        "inner": {"amount": -150, "note": "x"},
        "items": [{"amount": 1}, {"amount": 2}],
        "surprise": [1, 2, 3]
    }"#;

    #[test]
    fn decodes_nested_values_and_keeps_extras() {
        let outer: Outer = from_str(VALID).expect("decode");
        assert_eq!(outer.id, "obj_1");
        assert!(outer.active);
        assert_eq!(outer.created_at, datetime!(2020-01-31 23:59:59 UTC));
        assert_eq!(outer.settles_on, Some(date!(2020 - 02 - 03)));
        assert_eq!(outer.inner.amount, -150);
        assert_eq!(outer.inner.meta.extra("note"), Some("\"x\""));
        assert_eq!(outer.items.len(), 2);
        assert_eq!(outer.items[1].amount, 2);
        assert_eq!(outer.meta.extra("surprise"), Some("[1, 2, 3]"));
        assert!(outer.meta.extra("id").is_none());
    }

    #[test]
    fn records_raw_text_per_field() {
        let outer: Outer = from_str(VALID).expect("decode");
        let inner = outer.meta.field("inner").expect("inner meta");
        assert_eq!(inner.status(), FieldStatus::Present);
        assert_eq!(inner.raw(), Some(r#"{"amount": -150, "note": "x"}"#));
        assert_eq!(
            outer.meta.field("created_at").and_then(|meta| meta.raw()),
            Some("\"2020-01-31T23:59:59Z\"")
        );
    }

    #[test]
    fn missing_required_field_is_named() {
        let err = from_str::<Inner>(r#"{"other": 1}"#).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn nested_errors_carry_full_path() {
        let payload = r#"{
            "id": "obj_1", "active": false, "created_at": "2020-01-31T23:59:59Z",
            "inner": {"amount": 1},
            "items": [{"amount": 1}, {"amount": "2"}]
        }"#;
        let err = from_str::<Outer>(payload).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.field(), Some("items[1].amount"));
        assert_eq!(err.expected(), Some("integer"));
        assert_eq!(err.actual(), Some("string"));
    }

    #[test]
    fn optional_field_distinguishes_null_and_missing() {
        let base = r#""id": "obj_1", "active": true, "created_at": "2020-01-31T23:59:59Z",
            "inner": {"amount": 1}, "items": []"#;
        let missing: Outer = from_str(&format!("{{{base}}}")).expect("missing");
        let null: Outer = from_str(&format!("{{{base}, \"settles_on\": null}}")).expect("null");

        assert_eq!(missing.settles_on, None);
        assert_eq!(null.settles_on, None);
        assert_eq!(
            missing.meta.field("settles_on").map(|m| m.status()),
            Some(FieldStatus::Missing)
        );
        assert_eq!(
            null.meta.field("settles_on").map(|m| m.status()),
            Some(FieldStatus::Null)
        );
    }

    #[test]
    fn required_null_is_type_mismatch() {
        let err = from_str::<Inner>(r#"{"amount": null}"#).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.expected(), Some("integer"));
        assert_eq!(err.actual(), Some("null"));
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn fractional_and_oversized_integers_are_rejected() {
        for payload in [r#"{"amount": 1.5}"#, r#"{"amount": 99999999999999999999}"#] {
            let err = from_str::<Inner>(payload).expect_err("err");
            assert_eq!(err.kind(), ErrorKind::TypeMismatch);
            assert_eq!(err.actual(), Some("number"));
        }
    }

    #[test]
    fn malformed_timestamp_is_type_mismatch() {
        let err = from_str::<OffsetDateTime>("\"yesterday\"").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.expected(), Some("date-time"));
        assert_eq!(err.actual(), Some("string"));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = from_str::<Inner>(r#"{"amount": }"#).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.hint().expect("hint").contains("parse category: syntax"));
    }

    #[test]
    fn duplicate_keys_resolve_to_last_value() {
        let inner: Inner = from_str(r#"{"amount": 1, "amount": 2}"#).expect("decode");
        assert_eq!(inner.amount, 2);
        assert!(!inner.meta.has_extras());
    }

    #[test]
    fn non_object_is_rejected_for_struct() {
        let err = from_str::<Inner>("[1]").expect_err("err");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.expected(), Some("object"));
        assert_eq!(err.actual(), Some("array"));
    }

    #[test]
    fn kind_detection_covers_all_shapes() {
        let cases = [
            ("null", JsonKind::Null),
            ("true", JsonKind::Boolean),
            ("false", JsonKind::Boolean),
            ("-3", JsonKind::Number),
            ("\"s\"", JsonKind::String),
            ("[]", JsonKind::Array),
            ("{}", JsonKind::Object),
        ];
        for (text, kind) in cases {
            let raw = RawValue::from_string(text.to_string()).expect("raw");
            assert_eq!(JsonKind::of(&raw), kind);
        }
    }
}
