//! Purpose: Internal JSON parsing boundary shared by the decoder and the client.
//! Exports: `parse` module with the raw-value entrypoint and error categorization.
//! Role: Single seam for syntax validation so callsites avoid ad hoc parsing.
//! Invariants: Wire payloads are parsed once into borrowed raw values; no copies.

pub(crate) mod parse;
