//! Purpose: Mobile check deposits and the `/check_deposits` service.
//! Exports: `CheckDeposit`, `CheckDepositRejection`, `CheckDepositSubmission`, params, `CheckDeposits`.
//! Invariants: At most one of acceptance/rejection/return is non-null, per `status`.
#![allow(clippy::result_large_err)]

use super::transactions::{CheckDepositAcceptance, CheckDepositReturn};
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
    pub struct CheckDepositStatus {
        PENDING = "pending",
        SUBMITTED = "submitted",
        REJECTED = "rejected",
        RETURNED = "returned",
    }
}

open_enum! {
    pub struct CheckDepositRejectionReason {
        INCOMPLETE_IMAGE = "incomplete_image",
        DUPLICATE = "duplicate",
        POOR_IMAGE_QUALITY = "poor_image_quality",
        INCORRECT_AMOUNT = "incorrect_amount",
        INCORRECT_RECIPIENT = "incorrect_recipient",
        NOT_ELIGIBLE_FOR_MOBILE_DEPOSIT = "not_eligible_for_mobile_deposit",
        MISSING_REQUIRED_DATA_ELEMENTS = "missing_required_data_elements",
        SUSPECTED_FRAUD = "suspected_fraud",
        DEPOSIT_WINDOW_EXPIRED = "deposit_window_expired",
        UNKNOWN = "unknown",
    }
}

open_enum! {
    pub struct CheckDepositType {
        CHECK_DEPOSIT = "check_deposit",
    }
}

#[derive(Clone, Debug)]
pub struct CheckDeposit {
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub back_image_file_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub deposit_acceptance: Option<CheckDepositAcceptance>,
    pub deposit_rejection: Option<CheckDepositRejection>,
    pub deposit_return: Option<CheckDepositReturn>,
    pub deposit_submission: Option<CheckDepositSubmission>,
    pub description: Option<String>,
    pub front_image_file_id: String,
    pub idempotency_key: Option<String>,
    pub status: CheckDepositStatus,
    pub transaction_id: Option<String>,
    pub kind: CheckDepositType,
    pub meta: Metadata,
}

impl Decode for CheckDeposit {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_id: object.required("account_id")?,
            amount: object.required("amount")?,
            back_image_file_id: object.optional("back_image_file_id")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            deposit_acceptance: object.optional("deposit_acceptance")?,
            deposit_rejection: object.optional("deposit_rejection")?,
            deposit_return: object.optional("deposit_return")?,
            deposit_submission: object.optional("deposit_submission")?,
            description: object.optional("description")?,
            front_image_file_id: object.required("front_image_file_id")?,
            idempotency_key: object.optional("idempotency_key")?,
            status: object.required("status")?,
            transaction_id: object.optional("transaction_id")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CheckDepositRejection {
    pub amount: i64,
    pub check_deposit_id: String,
    pub currency: Currency,
    pub reason: CheckDepositRejectionReason,
    pub rejected_at: OffsetDateTime,
    pub meta: Metadata,
}

impl Decode for CheckDepositRejection {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            amount: object.required("amount")?,
            check_deposit_id: object.required("check_deposit_id")?,
            currency: object.required("currency")?,
            reason: object.required("reason")?,
            rejected_at: object.required("rejected_at")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CheckDepositSubmission {
    pub back_file_id: String,
    pub front_file_id: String,
    pub submitted_at: OffsetDateTime,
    pub meta: Metadata,
}

impl Decode for CheckDepositSubmission {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            back_file_id: object.required("back_file_id")?,
            front_file_id: object.required("front_file_id")?,
            submitted_at: object.required("submitted_at")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CheckDepositCreateParams {
    pub account_id: String,
    pub amount: i64,
    pub back_image_file_id: String,
    pub front_image_file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CheckDepositListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub account_id: Option<String>,
    pub idempotency_key: Option<String>,
}

pub struct CheckDeposits<'a> {
    client: &'a Client,
}

impl Client {
    pub fn check_deposits(&self) -> CheckDeposits<'_> {
        CheckDeposits { client: self }
    }
}

impl CheckDeposits<'_> {
    pub fn create(&self, params: &CheckDepositCreateParams) -> ApiResult<CheckDeposit> {
        self.client.post(&["check_deposits"], params)
    }

    pub fn retrieve(&self, check_deposit_id: &str) -> ApiResult<CheckDeposit> {
        self.client.get(&["check_deposits", check_deposit_id])
    }

    pub fn list(&self, params: &CheckDepositListParams) -> ApiResult<Page<CheckDeposit>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &CheckDepositListParams,
    ) -> ApiResult<AutoPager<CheckDeposit>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &CheckDepositListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["check_deposits"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("account_id", params.account_id.as_deref())
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::{CheckDeposit, CheckDepositRejectionReason, CheckDepositStatus};
    use crate::core::decode::from_str;

    #[test]
    fn rejected_deposit_carries_reason() {
        let payload = r#"{
            "account_id": "account_in71c4amph0vgo2qllky",
            "amount": 1000,
            "back_image_file_id": null,
            "created_at": "2020-01-31T23:59:59Z",
            "currency": "USD",
            "deposit_acceptance": null,
            "deposit_rejection": {
                "amount": 1000,
                "check_deposit_id": "check_deposit_f06n9gpg7sxn8t19lfc1",
                "currency": "USD",
                "reason": "incomplete_image",
                "rejected_at": "2020-02-01T00:00:00Z"
            },
            "deposit_return": null,
            "deposit_submission": null,
            "description": null,
            "front_image_file_id": "file_makxrc67oh9l6sg7w9yc",
            "id": "check_deposit_f06n9gpg7sxn8t19lfc1",
            "idempotency_key": null,
            "inbound_mail_item_id": null,
            "status": "rejected",
            "transaction_id": null,
            "type": "check_deposit"
        }"#;
        let deposit: CheckDeposit = from_str(payload).expect("decode");
        assert_eq!(deposit.status, CheckDepositStatus::REJECTED);
        let rejection = deposit.deposit_rejection.as_ref().expect("rejection");
        assert_eq!(rejection.reason, CheckDepositRejectionReason::INCOMPLETE_IMAGE);
        assert!(deposit.deposit_acceptance.is_none());
        assert_eq!(deposit.meta.extra("inbound_mail_item_id"), Some("null"));
    }
}
