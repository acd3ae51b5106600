//! Purpose: Outbound ACH transfers and the `/ach_transfers` service.
//! Exports: `AchTransfer`, `AchTransferReturn`, `AchTransferSubmission`, params, `AchTransfers`.
//! Invariants: `return` is a Rust keyword; the field is exposed as `return_`.
#![allow(clippy::result_large_err)]

use super::account_transfers::{TransferApproval, TransferCancellation};
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
    pub struct AchTransferStatus {
        PENDING_APPROVAL = "pending_approval",
        PENDING_REVIEWING = "pending_reviewing",
        PENDING_SUBMISSION = "pending_submission",
        SUBMITTED = "submitted",
        RETURNED = "returned",
        REJECTED = "rejected",
        CANCELED = "canceled",
        REQUIRES_ATTENTION = "requires_attention",
    }
}

open_enum! {
    pub struct AchFunding {
        CHECKING = "checking",
        SAVINGS = "savings",
    }
}

open_enum! {
    pub struct DestinationAccountHolder {
        BUSINESS = "business",
        INDIVIDUAL = "individual",
        UNKNOWN = "unknown",
    }
}

open_enum! {
    pub struct StandardEntryClassCode {
        CORPORATE_CREDIT_OR_DEBIT = "corporate_credit_or_debit",
        CORPORATE_TRADE_EXCHANGE = "corporate_trade_exchange",
        PREARRANGED_PAYMENTS_AND_DEPOSIT = "prearranged_payments_and_deposit",
        INTERNET_INITIATED = "internet_initiated",
    }
}

open_enum! {
    /// Subset of NACHA return reasons; the API sends many more.
    pub struct AchReturnReasonCode {
        INSUFFICIENT_FUND = "insufficient_fund",
        NO_ACCOUNT = "no_account",
        ACCOUNT_CLOSED = "account_closed",
        INVALID_ACCOUNT_NUMBER_STRUCTURE = "invalid_account_number_structure",
        AUTHORIZATION_REVOKED_BY_CUSTOMER = "authorization_revoked_by_customer",
        PAYMENT_STOPPED = "payment_stopped",
        UNCOLLECTED_FUNDS = "uncollected_funds",
    }
}

open_enum! {
    pub struct AchNetwork {
        ACH = "ach",
    }
}

open_enum! {
    pub struct AchTransferType {
        ACH_TRANSFER = "ach_transfer",
    }
}

#[derive(Clone, Debug)]
pub struct AchTransfer {
    pub id: String,
    pub account_id: String,
    pub account_number: String,
    pub amount: i64,
    pub approval: Option<TransferApproval>,
    pub cancellation: Option<TransferCancellation>,
    pub company_descriptive_date: Option<String>,
    pub company_discretionary_data: Option<String>,
    pub company_entry_description: Option<String>,
    pub company_name: Option<String>,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub destination_account_holder: DestinationAccountHolder,
    pub external_account_id: Option<String>,
    pub funding: AchFunding,
    pub idempotency_key: Option<String>,
    pub individual_id: Option<String>,
    pub individual_name: Option<String>,
    pub network: AchNetwork,
    pub pending_transaction_id: Option<String>,
    pub return_: Option<AchTransferReturn>,
    pub routing_number: String,
    pub standard_entry_class_code: StandardEntryClassCode,
    pub statement_descriptor: String,
    pub status: AchTransferStatus,
    pub submission: Option<AchTransferSubmission>,
    pub transaction_id: Option<String>,
    pub kind: AchTransferType,
    pub meta: Metadata,
}

impl Decode for AchTransfer {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_id: object.required("account_id")?,
            account_number: object.required("account_number")?,
            amount: object.required("amount")?,
            approval: object.optional("approval")?,
            cancellation: object.optional("cancellation")?,
            company_descriptive_date: object.optional("company_descriptive_date")?,
            company_discretionary_data: object.optional("company_discretionary_data")?,
            company_entry_description: object.optional("company_entry_description")?,
            company_name: object.optional("company_name")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            destination_account_holder: object.required("destination_account_holder")?,
            external_account_id: object.optional("external_account_id")?,
            funding: object.required("funding")?,
            idempotency_key: object.optional("idempotency_key")?,
            individual_id: object.optional("individual_id")?,
            individual_name: object.optional("individual_name")?,
            network: object.required("network")?,
            pending_transaction_id: object.optional("pending_transaction_id")?,
            return_: object.optional("return")?,
            routing_number: object.required("routing_number")?,
            standard_entry_class_code: object.required("standard_entry_class_code")?,
            statement_descriptor: object.required("statement_descriptor")?,
            status: object.required("status")?,
            submission: object.optional("submission")?,
            transaction_id: object.optional("transaction_id")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AchTransferReturn {
    pub created_at: OffsetDateTime,
    pub raw_return_reason_code: String,
    pub return_reason_code: AchReturnReasonCode,
    pub transaction_id: String,
    pub meta: Metadata,
}

impl Decode for AchTransferReturn {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            created_at: object.required("created_at")?,
            raw_return_reason_code: object.required("raw_return_reason_code")?,
            return_reason_code: object.required("return_reason_code")?,
            transaction_id: object.required("transaction_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AchTransferSubmission {
    pub submitted_at: OffsetDateTime,
    pub trace_number: String,
    pub meta: Metadata,
}

impl Decode for AchTransferSubmission {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            submitted_at: object.required("submitted_at")?,
            trace_number: object.required("trace_number")?,
            meta: object.finish(),
        })
    }
}

/// Either `account_number` + `routing_number` or `external_account_id` is required.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AchTransferCreateParams {
    pub account_id: String,
    pub amount: i64,
    pub statement_descriptor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<AchFunding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_entry_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub individual_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_entry_class_code: Option<StandardEntryClassCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct AchTransferListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub account_id: Option<String>,
    pub external_account_id: Option<String>,
    pub idempotency_key: Option<String>,
    pub status: Option<AchTransferStatus>,
}

pub struct AchTransfers<'a> {
    client: &'a Client,
}

impl Client {
    pub fn ach_transfers(&self) -> AchTransfers<'_> {
        AchTransfers { client: self }
    }
}

impl AchTransfers<'_> {
    pub fn create(&self, params: &AchTransferCreateParams) -> ApiResult<AchTransfer> {
        self.client.post(&["ach_transfers"], params)
    }

    pub fn retrieve(&self, ach_transfer_id: &str) -> ApiResult<AchTransfer> {
        self.client.get(&["ach_transfers", ach_transfer_id])
    }

    pub fn list(&self, params: &AchTransferListParams) -> ApiResult<Page<AchTransfer>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &AchTransferListParams,
    ) -> ApiResult<AutoPager<AchTransfer>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &AchTransferListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["ach_transfers"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("account_id", params.account_id.as_deref())
        .with_optional_query("external_account_id", params.external_account_id.as_deref())
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref())
        .with_optional_query("status.in", params.status.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::{AchReturnReasonCode, AchTransfer, AchTransferCreateParams, AchTransferStatus};
    use crate::core::decode::from_str;

    const RETURNED: &str = r#"{
        "account_id": "account_in71c4amph0vgo2qllky",
        "account_number": "987654321",
        "amount": 100,
        "approval": null,
        "cancellation": null,
        "company_descriptive_date": null,
        "company_discretionary_data": null,
        "company_entry_description": null,
        "company_name": "National Phonograph Company",
        "created_at": "2020-01-31T23:59:59Z",
        "currency": "USD",
        "destination_account_holder": "business",
        "external_account_id": "external_account_ukk55lr923a3ac0pp7iv",
        "funding": "checking",
        "id": "ach_transfer_uoxatyh3lt5evrsdvo7q",
        "idempotency_key": null,
        "individual_id": null,
        "individual_name": "Ian Crease",
        "network": "ach",
        "pending_transaction_id": null,
        "return": {
            "created_at": "2020-02-03T10:00:00Z",
            "raw_return_reason_code": "R01",
            "return_reason_code": "insufficient_fund",
            "trace_number": "111122223292834",
            "transaction_id": "transaction_uyrp7fld2ium70oa7oi"
        },
        "routing_number": "101050001",
        "standard_entry_class_code": "corporate_credit_or_debit",
        "statement_descriptor": "Statement descriptor",
        "status": "returned",
        "submission": {"submitted_at": "2020-01-31T23:59:59Z", "trace_number": "058349238292834"},
        "transaction_id": "transaction_uyrp7fld2ium70oa7oi",
        "type": "ach_transfer"
    }"#;

    #[test]
    fn decodes_return_block_and_keeps_unknown_keys_nested() {
        let transfer: AchTransfer = from_str(RETURNED).expect("decode");
        assert_eq!(transfer.status, AchTransferStatus::RETURNED);
        let returned = transfer.return_.expect("return");
        assert_eq!(returned.return_reason_code, AchReturnReasonCode::INSUFFICIENT_FUND);
        assert_eq!(returned.raw_return_reason_code, "R01");
        assert_eq!(returned.meta.extra("trace_number"), Some("\"111122223292834\""));
        assert_eq!(
            transfer.submission.expect("submission").trace_number,
            "058349238292834"
        );
        assert!(!transfer.meta.has_extras());
    }

    #[test]
    fn create_params_serialize_routing_details() {
        let params = AchTransferCreateParams {
            account_id: "account_1".to_string(),
            amount: 100,
            statement_descriptor: "payroll".to_string(),
            account_number: Some("987654321".to_string()),
            routing_number: Some("101050001".to_string()),
            ..AchTransferCreateParams::default()
        };
        let value = serde_json::to_value(&params).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "account_id": "account_1",
                "amount": 100,
                "statement_descriptor": "payroll",
                "account_number": "987654321",
                "routing_number": "101050001"
            })
        );
    }
}
