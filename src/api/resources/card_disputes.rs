//! Purpose: Card disputes and the `/card_disputes` service.
//! Exports: `CardDispute`, `CardDisputeAcceptance`, `CardDisputeRejection`, params, `CardDisputes`.
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
    pub struct CardDisputeStatus {
        PENDING_REVIEWING = "pending_reviewing",
        PENDING_USER_INFORMATION = "pending_user_information",
        ACCEPTED = "accepted",
        REJECTED = "rejected",
        LOST = "lost",
        WON = "won",
    }
}

open_enum! {
    pub struct CardDisputeType {
        CARD_DISPUTE = "card_dispute",
    }
}

#[derive(Clone, Debug)]
pub struct CardDispute {
    pub id: String,
    pub acceptance: Option<CardDisputeAcceptance>,
    pub amount: Option<i64>,
    pub created_at: OffsetDateTime,
    pub disputed_transaction_id: String,
    pub explanation: String,
    pub idempotency_key: Option<String>,
    pub rejection: Option<CardDisputeRejection>,
    pub status: CardDisputeStatus,
    pub kind: CardDisputeType,
    pub meta: Metadata,
}

impl Decode for CardDispute {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            acceptance: object.optional("acceptance")?,
            amount: object.optional("amount")?,
            created_at: object.required("created_at")?,
            disputed_transaction_id: object.required("disputed_transaction_id")?,
            explanation: object.required("explanation")?,
            idempotency_key: object.optional("idempotency_key")?,
            rejection: object.optional("rejection")?,
            status: object.required("status")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CardDisputeAcceptance {
    pub accepted_at: OffsetDateTime,
    pub card_dispute_id: String,
    /// The credit issued back to the cardholder.
    pub transaction_id: String,
    pub meta: Metadata,
}

impl Decode for CardDisputeAcceptance {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            accepted_at: object.required("accepted_at")?,
            card_dispute_id: object.required("card_dispute_id")?,
            transaction_id: object.required("transaction_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CardDisputeRejection {
    pub card_dispute_id: String,
    pub explanation: String,
    pub rejected_at: OffsetDateTime,
    pub meta: Metadata,
}

impl Decode for CardDisputeRejection {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            card_dispute_id: object.required("card_dispute_id")?,
            explanation: object.required("explanation")?,
            rejected_at: object.required("rejected_at")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CardDisputeCreateParams {
    pub disputed_transaction_id: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct CardDisputeListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub idempotency_key: Option<String>,
    pub status: Option<CardDisputeStatus>,
}

pub struct CardDisputes<'a> {
    client: &'a Client,
}

impl Client {
    pub fn card_disputes(&self) -> CardDisputes<'_> {
        CardDisputes { client: self }
    }
}

impl CardDisputes<'_> {
    pub fn create(&self, params: &CardDisputeCreateParams) -> ApiResult<CardDispute> {
        self.client.post(&["card_disputes"], params)
    }

    pub fn retrieve(&self, card_dispute_id: &str) -> ApiResult<CardDispute> {
        self.client.get(&["card_disputes", card_dispute_id])
    }

    pub fn list(&self, params: &CardDisputeListParams) -> ApiResult<Page<CardDispute>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &CardDisputeListParams,
    ) -> ApiResult<AutoPager<CardDispute>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &CardDisputeListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["card_disputes"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref())
        .with_optional_query("status.in", params.status.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::{CardDispute, CardDisputeStatus};
    use crate::core::decode::from_str;
    use crate::core::meta::FieldStatus;

    #[test]
    fn accepted_dispute_links_credit_transaction() {
        let payload = r#"{
            "acceptance": {
                "accepted_at": "2020-01-31T23:59:59Z",
                "card_dispute_id": "card_dispute_h9sc95nbl1cgltpp7men",
                "transaction_id": "transaction_uyrp7fld2ium70oa7oi"
            },
            "created_at": "2020-01-31T23:59:59Z",
            "disputed_transaction_id": "transaction_uyrp7fld2ium70oa7oi",
            "explanation": "Unauthorized recurring purchase",
            "id": "card_dispute_h9sc95nbl1cgltpp7men",
            "idempotency_key": null,
            "rejection": null,
            "status": "won",
            "type": "card_dispute"
        }"#;
        let dispute: CardDispute = from_str(payload).expect("decode");
        assert_eq!(dispute.status, CardDisputeStatus::WON);
        assert_eq!(
            dispute.acceptance.expect("acceptance").transaction_id,
            "transaction_uyrp7fld2ium70oa7oi"
        );
        assert_eq!(dispute.amount, None);
        assert_eq!(
            dispute.meta.field("amount").map(|meta| meta.status()),
            Some(FieldStatus::Missing)
        );
    }
}
