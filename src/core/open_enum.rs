// String-backed enums that accept values this crate has never heard of.

/// Declares a string newtype with named constants for the known values.
///
/// Equality, ordering and hashing use the underlying string, so a value decoded
/// from the wire compares equal to the matching constant.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident = $value:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(::std::borrow::Cow<'static, str>);

        #[allow(dead_code)]
        impl $name {
            $(
                $(#[$variant_meta])*
                pub const $variant: Self = Self(::std::borrow::Cow::Borrowed($value));
            )*

            /// Every value this crate knows about, in declaration order.
            pub const KNOWN: &'static [&'static str] = &[$($value),*];

            pub fn new(value: impl Into<String>) -> Self {
                Self(::std::borrow::Cow::Owned(value.into()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_known(&self) -> bool {
                Self::KNOWN.contains(&self.as_str())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl ::std::convert::From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl ::std::cmp::PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.as_str() == other
            }
        }

        impl ::std::cmp::PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl $crate::core::decode::Decode for $name {
            const EXPECTED: &'static str = "string";

            fn decode(
                raw: &::serde_json::value::RawValue,
            ) -> $crate::core::decode::DecodeResult<Self> {
                <String as $crate::core::decode::Decode>::decode(raw).map(Self::new)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

pub(crate) use open_enum;

open_enum! {
    /// ISO 4217 currency code.
    pub struct Currency {
        CAD = "CAD",
        CHF = "CHF",
        EUR = "EUR",
        GBP = "GBP",
        JPY = "JPY",
        USD = "USD",
    }
}
