// Core modules implementing decoding, field metadata, open enums, and error modeling.
pub mod decode;
pub mod error;
pub mod meta;
pub mod open_enum;
