//! Purpose: Typed models and services for each Increase API resource.
//! Exports: One submodule per resource family plus shared list filters.
//! Role: Declares field-to-key mappings by hand; no reflection, no codegen step.
//! Invariants: Every object type carries `meta: Metadata` (raw, fields, extras).
//! Invariants: Enum-like string fields are open enums; unknown values decode fine.
//! Invariants: Amounts are `i64` minor units; timestamps RFC 3339; dates `YYYY-MM-DD`.
#![allow(clippy::result_large_err)]

pub mod account_numbers;
pub mod account_transfers;
pub mod accounts;
pub mod ach_transfers;
pub mod card_disputes;
pub mod check_deposits;
pub mod simulations;
pub mod transactions;

use super::client::ApiResult;
use super::page::ListRequest;
use crate::core::error::{Error, ErrorKind};
use crate::core::meta::{HasMetadata, Metadata};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

macro_rules! impl_has_metadata {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HasMetadata for $ty {
                fn metadata(&self) -> &Metadata {
                    &self.meta
                }
            }
        )*
    };
}

impl_has_metadata!(
    account_numbers::AccountNumber,
    account_transfers::AccountTransfer,
    accounts::Account,
    ach_transfers::AchTransfer,
    card_disputes::CardDispute,
    check_deposits::CheckDeposit,
    simulations::CardAuthorizationSimulation,
    simulations::DeclinedTransaction,
    simulations::PendingTransaction,
    transactions::Transaction,
);

/// Bounds on `created_at` shared by every list endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreatedAtFilter {
    pub after: Option<OffsetDateTime>,
    pub before: Option<OffsetDateTime>,
    pub on_or_after: Option<OffsetDateTime>,
    pub on_or_before: Option<OffsetDateTime>,
}

impl CreatedAtFilter {
    pub(crate) fn apply(&self, mut request: ListRequest) -> ApiResult<ListRequest> {
        let bounds = [
            ("created_at.after", self.after),
            ("created_at.before", self.before),
            ("created_at.on_or_after", self.on_or_after),
            ("created_at.on_or_before", self.on_or_before),
        ];
        for (key, value) in bounds {
            if let Some(value) = value {
                request = request.with_query(key, format_timestamp(value)?);
            }
        }
        Ok(request)
    }
}

/// Starts a list request with the paging parameters every endpoint accepts.
pub(crate) fn list_request(
    segments: &[&str],
    cursor: Option<&str>,
    limit: Option<u32>,
    created_at: Option<&CreatedAtFilter>,
) -> ApiResult<ListRequest> {
    let request = ListRequest::new(segments)
        .with_optional_query("cursor", cursor)
        .with_optional_query("limit", limit);
    match created_at {
        Some(filter) => filter.apply(request),
        None => Ok(request),
    }
}

/// `serialize_with` helper for optional RFC 3339 request fields.
pub(crate) fn serialize_optional_timestamp<S>(
    value: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(value) => {
            let text = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&text)
        }
        None => serializer.serialize_none(),
    }
}

fn format_timestamp(value: OffsetDateTime) -> ApiResult<String> {
    value.format(&Rfc3339).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("timestamp cannot be formatted as RFC 3339")
            .with_source(err)
    })
}
