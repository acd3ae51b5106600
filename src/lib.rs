//! Purpose: Typed blocking client for the Increase banking API.
//! Exports: `api` (client, resources, pagination), `core` (decoder, metadata, errors).
//! Role: Library behind the `increase` CLI; usable on its own.
//! Invariants: Responses decode through `core::decode`; unknown keys and enum values never fail.
//! Invariants: Decoded objects are immutable snapshots carrying their own `Metadata`.
pub mod api;
pub mod core;
mod json;
