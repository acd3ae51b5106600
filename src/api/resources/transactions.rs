//! Purpose: Settled transactions and their category-tagged `source`.
//! Exports: `Transaction`, `TransactionSource`, `SourceDetail`, payload structs, `Transactions`.
//! Role: Turns the wire's flat "one non-null sibling per category" shape into a sum type.
//! Invariants: `source.category` selects exactly one `SourceDetail` variant.
//! Invariants: Sibling category keys are claimed (not extras); unmodeled payloads stay raw.
//! Notes: Categories without a typed payload here (known or not) decode to `SourceDetail::Unrecognized`.
#![allow(clippy::result_large_err)]

use super::ach_transfers::AchReturnReasonCode;
use super::{CreatedAtFilter, list_request};
use crate::api::client::{ApiResult, Client};
use crate::api::page::{AutoPager, ListRequest, Page};
use crate::core::decode::{Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use crate::core::open_enum::{Currency, open_enum};
use serde_json::value::RawValue;
use time::{Date, OffsetDateTime};

open_enum! {
    pub struct TransactionSourceCategory {
        ACCOUNT_TRANSFER_INTENTION = "account_transfer_intention",
        ACH_TRANSFER_INTENTION = "ach_transfer_intention",
        ACH_TRANSFER_REJECTION = "ach_transfer_rejection",
        ACH_TRANSFER_RETURN = "ach_transfer_return",
        CARD_DISPUTE_ACCEPTANCE = "card_dispute_acceptance",
        CARD_REFUND = "card_refund",
        CARD_SETTLEMENT = "card_settlement",
        CARD_REVENUE_PAYMENT = "card_revenue_payment",
        CHECK_DEPOSIT_ACCEPTANCE = "check_deposit_acceptance",
        CHECK_DEPOSIT_RETURN = "check_deposit_return",
        CHECK_TRANSFER_DEPOSIT = "check_transfer_deposit",
        FEE_PAYMENT = "fee_payment",
        INBOUND_ACH_TRANSFER = "inbound_ach_transfer",
        INBOUND_REAL_TIME_PAYMENTS_TRANSFER_CONFIRMATION = "inbound_real_time_payments_transfer_confirmation",
        INBOUND_WIRE_TRANSFER = "inbound_wire_transfer",
        INTEREST_PAYMENT = "interest_payment",
        INTERNAL_SOURCE = "internal_source",
        REAL_TIME_PAYMENTS_TRANSFER_ACKNOWLEDGEMENT = "real_time_payments_transfer_acknowledgement",
        WIRE_TRANSFER_INTENTION = "wire_transfer_intention",
        OTHER = "other",
    }
}

open_enum! {
    pub struct RouteType {
        ACCOUNT_NUMBER = "account_number",
        CARD = "card",
        LOCKBOX = "lockbox",
    }
}

open_enum! {
    pub struct CheckDepositReturnReason {
        ACH_CONVERSION_NOT_SUPPORTED = "ach_conversion_not_supported",
        CLOSED_ACCOUNT = "closed_account",
        DUPLICATE_SUBMISSION = "duplicate_submission",
        INSUFFICIENT_FUNDS = "insufficient_funds",
        NO_ACCOUNT = "no_account",
        NOT_AUTHORIZED = "not_authorized",
        STALE_DATED = "stale_dated",
        STOP_PAYMENT = "stop_payment",
        UNKNOWN_REASON = "unknown_reason",
        UNMATCHED_DETAILS = "unmatched_details",
        UNREADABLE_IMAGE = "unreadable_image",
        ENDORSEMENT_IRREGULAR = "endorsement_irregular",
        ALTERED_OR_FICTITIOUS_ITEM = "altered_or_fictitious_item",
        FROZEN_OR_BLOCKED_ACCOUNT = "frozen_or_blocked_account",
        POST_DATED = "post_dated",
        ENDORSEMENT_MISSING = "endorsement_missing",
        SIGNATURE_MISSING = "signature_missing",
        STOP_PAYMENT_SUSPECT = "stop_payment_suspect",
        UNUSABLE_IMAGE = "unusable_image",
        IMAGE_FAILS_SECURITY_CHECK = "image_fails_security_check",
        CANNOT_DETERMINE_AMOUNT = "cannot_determine_amount",
        SIGNATURE_IRREGULAR = "signature_irregular",
        NON_CASH_ITEM = "non_cash_item",
        UNABLE_TO_PROCESS = "unable_to_process",
        ITEM_EXCEEDS_DOLLAR_LIMIT = "item_exceeds_dollar_limit",
        BRANCH_OR_ACCOUNT_SOLD = "branch_or_account_sold",
    }
}

open_enum! {
    pub struct InternalSourceReason {
        ACCOUNT_CLOSURE = "account_closure",
        BANK_MIGRATION = "bank_migration",
        CASHBACK = "cashback",
        CHECK_ADJUSTMENT = "check_adjustment",
        COLLECTION_RECEIVABLE = "collection_receivable",
        EMPYRIAL_CASHBACK = "empyrial_cashback",
        ERROR = "error",
        ERROR_CORRECTION = "error_correction",
        FEES = "fees",
        INTEREST = "interest",
        NEGATIVE_BALANCE_FORGIVENESS = "negative_balance_forgiveness",
        SAMPLE_FUNDS = "sample_funds",
        SAMPLE_FUNDS_RETURN = "sample_funds_return",
    }
}

open_enum! {
    pub struct TransactionType {
        TRANSACTION = "transaction",
    }
}

/// Every category key that may appear as a sibling of `category`.
const SOURCE_KEYS: &[&str] = &[
    "account_transfer_intention",
    "ach_transfer_intention",
    "ach_transfer_rejection",
    "ach_transfer_return",
    "card_dispute_acceptance",
    "card_refund",
    "card_settlement",
    "card_revenue_payment",
    "check_deposit_acceptance",
    "check_deposit_return",
    "check_transfer_deposit",
    "fee_payment",
    "inbound_ach_transfer",
    "inbound_real_time_payments_transfer_confirmation",
    "inbound_wire_transfer",
    "interest_payment",
    "internal_source",
    "real_time_payments_transfer_acknowledgement",
    "wire_transfer_intention",
];

#[derive(Clone, Debug)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    /// Signed minor units; negative for debits.
    pub amount: i64,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub description: String,
    pub route_id: Option<String>,
    pub route_type: Option<RouteType>,
    pub source: TransactionSource,
    pub kind: TransactionType,
    pub meta: Metadata,
}

impl Decode for Transaction {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_id: object.required("account_id")?,
            amount: object.required("amount")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            description: object.required("description")?,
            route_id: object.optional("route_id")?,
            route_type: object.optional("route_type")?,
            source: object.required("source")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

/// Why a transaction happened, tagged by `category`.
#[derive(Clone, Debug)]
pub struct TransactionSource {
    pub category: TransactionSourceCategory,
    pub detail: SourceDetail,
    pub meta: Metadata,
}

impl TransactionSource {
    /// Raw JSON of the category payload, whether or not it is modeled.
    pub fn detail_raw(&self) -> Option<&str> {
        let key = self.category.as_str();
        self.meta
            .field(key)
            .and_then(|field| field.raw())
            .or_else(|| self.meta.extra(key))
    }
}

#[derive(Clone, Debug)]
pub enum SourceDetail {
    AccountTransferIntention(AccountTransferIntention),
    AchTransferIntention(AchTransferIntention),
    AchTransferRejection(AchTransferRejection),
    AchTransferReturn(AchTransferReturn),
    CheckDepositAcceptance(CheckDepositAcceptance),
    CheckDepositReturn(CheckDepositReturn),
    FeePayment(FeePayment),
    InterestPayment(InterestPayment),
    InternalSource(InternalSource),
    /// `category: "other"` carries no payload.
    Other,
    /// No typed payload for this category. Covers both categories listed in
    /// `TransactionSourceCategory` but not modeled (e.g. `card_settlement`) and
    /// categories newer than this crate; `category.is_known()` tells them apart.
    /// The payload stays reachable through `TransactionSource::detail_raw`.
    Unrecognized,
}

impl Decode for TransactionSource {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        let category: TransactionSourceCategory = object.required("category")?;
        let detail = match category.as_str() {
            "account_transfer_intention" => SourceDetail::AccountTransferIntention(
                object.required("account_transfer_intention")?,
            ),
            "ach_transfer_intention" => {
                SourceDetail::AchTransferIntention(object.required("ach_transfer_intention")?)
            }
            "ach_transfer_rejection" => {
                SourceDetail::AchTransferRejection(object.required("ach_transfer_rejection")?)
            }
            "ach_transfer_return" => {
                SourceDetail::AchTransferReturn(object.required("ach_transfer_return")?)
            }
            "check_deposit_acceptance" => {
                SourceDetail::CheckDepositAcceptance(object.required("check_deposit_acceptance")?)
            }
            "check_deposit_return" => {
                SourceDetail::CheckDepositReturn(object.required("check_deposit_return")?)
            }
            "fee_payment" => SourceDetail::FeePayment(object.required("fee_payment")?),
            "interest_payment" => SourceDetail::InterestPayment(object.required("interest_payment")?),
            "internal_source" => SourceDetail::InternalSource(object.required("internal_source")?),
            "other" => SourceDetail::Other,
            _ => SourceDetail::Unrecognized,
        };
        for &key in SOURCE_KEYS {
            let selected = key == category.as_str();
            if !selected || matches!(detail, SourceDetail::Unrecognized) {
                object.declare(key);
            }
        }
        Ok(Self {
            category,
            detail,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AccountTransferIntention {
    pub amount: i64,
    pub currency: Currency,
    pub description: String,
    pub destination_account_id: String,
    pub source_account_id: String,
    pub transfer_id: String,
    pub meta: Metadata,
}

impl Decode for AccountTransferIntention {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            amount: object.required("amount")?,
            currency: object.required("currency")?,
            description: object.required("description")?,
            destination_account_id: object.required("destination_account_id")?,
            source_account_id: object.required("source_account_id")?,
            transfer_id: object.required("transfer_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AchTransferIntention {
    pub account_number: String,
    pub amount: i64,
    pub routing_number: String,
    pub statement_descriptor: String,
    pub transfer_id: String,
    pub meta: Metadata,
}

impl Decode for AchTransferIntention {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            account_number: object.required("account_number")?,
            amount: object.required("amount")?,
            routing_number: object.required("routing_number")?,
            statement_descriptor: object.required("statement_descriptor")?,
            transfer_id: object.required("transfer_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AchTransferRejection {
    pub transfer_id: String,
    pub meta: Metadata,
}

impl Decode for AchTransferRejection {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            transfer_id: object.required("transfer_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct AchTransferReturn {
    pub created_at: OffsetDateTime,
    pub raw_return_reason_code: String,
    pub return_reason_code: AchReturnReasonCode,
    pub trace_number: String,
    pub transaction_id: String,
    pub transfer_id: String,
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
            trace_number: object.required("trace_number")?,
            transaction_id: object.required("transaction_id")?,
            transfer_id: object.required("transfer_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CheckDepositAcceptance {
    pub account_number: String,
    pub amount: i64,
    pub auxiliary_on_us: Option<String>,
    pub check_deposit_id: String,
    pub currency: Currency,
    pub routing_number: String,
    pub serial_number: Option<String>,
    pub meta: Metadata,
}

impl Decode for CheckDepositAcceptance {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            account_number: object.required("account_number")?,
            amount: object.required("amount")?,
            auxiliary_on_us: object.optional("auxiliary_on_us")?,
            check_deposit_id: object.required("check_deposit_id")?,
            currency: object.required("currency")?,
            routing_number: object.required("routing_number")?,
            serial_number: object.optional("serial_number")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct CheckDepositReturn {
    pub amount: i64,
    pub check_deposit_id: String,
    pub currency: Currency,
    pub return_reason: CheckDepositReturnReason,
    pub returned_at: OffsetDateTime,
    pub transaction_id: String,
    pub meta: Metadata,
}

impl Decode for CheckDepositReturn {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            amount: object.required("amount")?,
            check_deposit_id: object.required("check_deposit_id")?,
            currency: object.required("currency")?,
            return_reason: object.required("return_reason")?,
            returned_at: object.required("returned_at")?,
            transaction_id: object.required("transaction_id")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct FeePayment {
    pub amount: i64,
    pub currency: Currency,
    pub fee_period_start: Date,
    pub meta: Metadata,
}

impl Decode for FeePayment {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            amount: object.required("amount")?,
            currency: object.required("currency")?,
            fee_period_start: object.required("fee_period_start")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct InterestPayment {
    pub accrued_on_account_id: String,
    pub amount: i64,
    pub currency: Currency,
    pub period_end: OffsetDateTime,
    pub period_start: OffsetDateTime,
    pub meta: Metadata,
}

impl Decode for InterestPayment {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            accrued_on_account_id: object.required("accrued_on_account_id")?,
            amount: object.required("amount")?,
            currency: object.required("currency")?,
            period_end: object.required("period_end")?,
            period_start: object.required("period_start")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct InternalSource {
    pub amount: i64,
    pub currency: Currency,
    pub reason: InternalSourceReason,
    pub meta: Metadata,
}

impl Decode for InternalSource {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            amount: object.required("amount")?,
            currency: object.required("currency")?,
            reason: object.required("reason")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct TransactionListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub account_id: Option<String>,
    pub route_id: Option<String>,
    pub category: Option<TransactionSourceCategory>,
}

pub struct Transactions<'a> {
    client: &'a Client,
}

impl Client {
    pub fn transactions(&self) -> Transactions<'_> {
        Transactions { client: self }
    }
}

impl Transactions<'_> {
    pub fn retrieve(&self, transaction_id: &str) -> ApiResult<Transaction> {
        self.client.get(&["transactions", transaction_id])
    }

    pub fn list(&self, params: &TransactionListParams) -> ApiResult<Page<Transaction>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(
        &self,
        params: &TransactionListParams,
    ) -> ApiResult<AutoPager<Transaction>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &TransactionListParams) -> ApiResult<ListRequest> {
    let request = list_request(
        &["transactions"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("account_id", params.account_id.as_deref())
        .with_optional_query("route_id", params.route_id.as_deref())
        .with_optional_query("category.in", params.category.as_ref()))
}
