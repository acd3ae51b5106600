//! Purpose: Account number model and the `/account_numbers` service.
//! Exports: `AccountNumber`, nested settings, params, `AccountNumbers`.
//! Invariants: `account_number` is required; an object with only `id` is rejected.
#![allow(clippy::result_large_err)]

use super::{CreatedAtFilter, list_request};
use crate::api::client::{ApiResult, Client};
use crate::api::page::{AutoPager, ListRequest, Page};
use crate::core::decode::{Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use crate::core::open_enum::open_enum;
use serde::Serialize;
use serde_json::value::RawValue;
use time::OffsetDateTime;

open_enum! {
    pub struct AccountNumberStatus {
        ACTIVE = "active",
        DISABLED = "disabled",
        CANCELED = "canceled",
    }
}

open_enum! {
    pub struct InboundAchDebitStatus {
        ALLOWED = "allowed",
        BLOCKED = "blocked",
    }
}

open_enum! {
    pub struct InboundChecksStatus {
        ALLOWED = "allowed",
        CHECK_TRANSFERS_ONLY = "check_transfers_only",
    }
}

open_enum! {
    pub struct AccountNumberType {
        ACCOUNT_NUMBER = "account_number",
    }
}

#[derive(Clone, Debug)]
pub struct AccountNumber {
    pub id: String,
    pub account_number: String,
    pub account_id: String,
    pub created_at: OffsetDateTime,
    pub idempotency_key: Option<String>,
    pub inbound_ach: InboundAch,
    pub inbound_checks: InboundChecks,
    pub name: String,
    pub routing_number: String,
    pub status: AccountNumberStatus,
    pub kind: AccountNumberType,
    pub meta: Metadata,
}

impl Decode for AccountNumber {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_number: object.required("account_number")?,
            account_id: object.required("account_id")?,
            created_at: object.required("created_at")?,
            idempotency_key: object.optional("idempotency_key")?,
            inbound_ach: object.required("inbound_ach")?,
            inbound_checks: object.required("inbound_checks")?,
            name: object.required("name")?,
            routing_number: object.required("routing_number")?,
            status: object.required("status")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct InboundAch {
    pub debit_status: InboundAchDebitStatus,
    pub meta: Metadata,
}

impl Decode for InboundAch {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            debit_status: object.required("debit_status")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct InboundChecks {
    pub status: InboundChecksStatus,
    pub meta: Metadata,
}

impl Decode for InboundChecks {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            status: object.required("status")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct InboundAchParams {
    pub debit_status: InboundAchDebitStatus,
}

#[derive(Clone, Debug, Serialize)]
pub struct InboundChecksParams {
    pub status: InboundChecksStatus,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountNumberCreateParams {
    pub account_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_ach: Option<InboundAchParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_checks: Option<InboundChecksParams>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountNumberUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountNumberStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_ach: Option<InboundAchParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound_checks: Option<InboundChecksParams>,
}

#[derive(Clone, Debug, Default)]
pub struct AccountNumberListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub account_id: Option<String>,
    pub ach_debit_status: Option<InboundAchDebitStatus>,
    pub idempotency_key: Option<String>,
    pub status: Option<AccountNumberStatus>,
}

pub struct AccountNumbers<'a> {
    client: &'a Client,
}

impl Client {
    pub fn account_numbers(&self) -> AccountNumbers<'_> {
        AccountNumbers { client: self }
    }
}

impl AccountNumbers<'_> {
    pub fn create(&self, params: &AccountNumberCreateParams) -> ApiResult<AccountNumber> {
        self.client.post(&["account_numbers"], params)
    }

    pub fn retrieve(&self, account_number_id: &str) -> ApiResult<AccountNumber> {
        self.client.get(&["account_numbers", account_number_id])
    }

    pub fn update(
        &self,
        account_number_id: &str,
        params: &AccountNumberUpdateParams,
    ) -> ApiResult<AccountNumber> {
        self.client
            .patch(&["account_numbers", account_number_id], params)
    }

    pub fn list(&self, params: &AccountNumberListParams) -> ApiResult<Page<AccountNumber>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &AccountNumberListParams,
    ) -> ApiResult<AutoPager<AccountNumber>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &AccountNumberListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["account_numbers"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("account_id", params.account_id.as_deref())
        .with_optional_query("ach_debit_status.in", params.ach_debit_status.as_ref())
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref())
        .with_optional_query("status.in", params.status.as_ref()))
}
