//! Purpose: Transfers between two Increase accounts.
//! Exports: `AccountTransfer`, `TransferApproval`, `TransferCancellation`, params, `AccountTransfers`.
#![allow(clippy::result_large_err)]

use super::{CreatedAtFilter, list_request};
use crate::api::client::{ApiResult, Client};
use crate::api::page::{AutoPager, ListRequest, Page};
use crate::core::decode::{Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use crate::core::open_enum::{Currency, open_enum};
use serde::Serialize;
use serde_json::value::RawValue;
use time::OffsetDateTime;

open_enum! {
    pub struct AccountTransferStatus {
        PENDING_APPROVAL = "pending_approval",
        CANCELED = "canceled",
        COMPLETE = "complete",
    }
}

open_enum! {
    pub struct AccountTransferNetwork {
        ACCOUNT = "account",
    }
}

open_enum! {
    pub struct AccountTransferType {
        ACCOUNT_TRANSFER = "account_transfer",
    }
}

#[derive(Clone, Debug)]
pub struct AccountTransfer {
    pub id: String,
    pub account_id: String,
    /// Minor units of `currency`.
    pub amount: i64,
    pub approval: Option<TransferApproval>,
    pub cancellation: Option<TransferCancellation>,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub description: String,
    pub destination_account_id: String,
    pub destination_transaction_id: Option<String>,
    pub idempotency_key: Option<String>,
    pub network: AccountTransferNetwork,
    pub pending_transaction_id: Option<String>,
    pub status: AccountTransferStatus,
    pub transaction_id: Option<String>,
    pub kind: AccountTransferType,
    pub meta: Metadata,
}

impl Decode for AccountTransfer {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_id: object.required("account_id")?,
            amount: object.required("amount")?,
            approval: object.optional("approval")?,
            cancellation: object.optional("cancellation")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            description: object.required("description")?,
            destination_account_id: object.required("destination_account_id")?,
            destination_transaction_id: object.optional("destination_transaction_id")?,
            idempotency_key: object.optional("idempotency_key")?,
            network: object.required("network")?,
            pending_transaction_id: object.optional("pending_transaction_id")?,
            status: object.required("status")?,
            transaction_id: object.optional("transaction_id")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

/// Who approved a transfer that required approval, and when.
#[derive(Clone, Debug)]
pub struct TransferApproval {
    pub approved_at: OffsetDateTime,
    pub approved_by: Option<String>,
    pub meta: Metadata,
}

impl Decode for TransferApproval {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            approved_at: object.required("approved_at")?,
            approved_by: object.optional("approved_by")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct TransferCancellation {
    pub canceled_at: OffsetDateTime,
    pub canceled_by: Option<String>,
    pub meta: Metadata,
}

impl Decode for TransferCancellation {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            canceled_at: object.required("canceled_at")?,
            canceled_by: object.optional("canceled_by")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountTransferCreateParams {
    pub account_id: String,
    pub amount: i64,
    pub description: String,
    pub destination_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct AccountTransferListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub account_id: Option<String>,
    pub idempotency_key: Option<String>,
}

pub struct AccountTransfers<'a> {
    client: &'a Client,
}

impl Client {
    pub fn account_transfers(&self) -> AccountTransfers<'_> {
        AccountTransfers { client: self }
    }
}

impl AccountTransfers<'_> {
    pub fn create(&self, params: &AccountTransferCreateParams) -> ApiResult<AccountTransfer> {
        self.client.post(&["account_transfers"], params)
    }

    pub fn retrieve(&self, account_transfer_id: &str) -> ApiResult<AccountTransfer> {
        self.client.get(&["account_transfers", account_transfer_id])
    }

    /// Approves a transfer created with `require_approval`.
    pub fn approve(&self, account_transfer_id: &str) -> ApiResult<AccountTransfer> {
        self.client
            .post_empty(&["account_transfers", account_transfer_id, "approve"])
    }

    pub fn cancel(&self, account_transfer_id: &str) -> ApiResult<AccountTransfer> {
        self.client
            .post_empty(&["account_transfers", account_transfer_id, "cancel"])
    }

    pub fn list(&self, params: &AccountTransferListParams) -> ApiResult<Page<AccountTransfer>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &AccountTransferListParams,
    ) -> ApiResult<AutoPager<AccountTransfer>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &AccountTransferListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["account_transfers"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("account_id", params.account_id.as_deref())
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref()))
}
