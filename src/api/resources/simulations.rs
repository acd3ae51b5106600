//! Purpose: Sandbox-only endpoints that push objects through their lifecycle.
//! Exports: `Simulations` and its per-resource services, `CardAuthorizationSimulation`,
//! `PendingTransaction`, `DeclinedTransaction`, simulation params.
//! Role: Lets tests and demos drive state changes the real networks would cause.
//! Invariants: Every path lives under `/simulations`; production keys are rejected server-side.
//! Notes: Pending/declined sources keep only `category`; payloads stay in `meta` extras.
#![allow(clippy::result_large_err)]

use super::account_transfers::AccountTransfer;
use super::check_deposits::CheckDeposit;
use super::serialize_optional_timestamp;
use super::transactions::{RouteType, Transaction};
use crate::api::client::{ApiResult, Client};
use crate::core::decode::{Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use crate::core::open_enum::{Currency, open_enum};
use serde::Serialize;
use serde_json::value::RawValue;
use time::OffsetDateTime;

const SIMULATIONS: &str = "simulations";

open_enum! {
    pub struct PendingTransactionStatus {
        PENDING = "pending",
        COMPLETE = "complete",
    }
}

open_enum! {
    pub struct PendingTransactionSourceCategory {
        ACCOUNT_TRANSFER_INSTRUCTION = "account_transfer_instruction",
        ACH_TRANSFER_INSTRUCTION = "ach_transfer_instruction",
        CARD_AUTHORIZATION = "card_authorization",
        CHECK_DEPOSIT_INSTRUCTION = "check_deposit_instruction",
        CHECK_TRANSFER_INSTRUCTION = "check_transfer_instruction",
        INBOUND_FUNDS_HOLD = "inbound_funds_hold",
        REAL_TIME_PAYMENTS_TRANSFER_INSTRUCTION = "real_time_payments_transfer_instruction",
        WIRE_TRANSFER_INSTRUCTION = "wire_transfer_instruction",
        OTHER = "other",
    }
}

open_enum! {
    pub struct DeclinedTransactionSourceCategory {
        ACH_DECLINE = "ach_decline",
        CARD_DECLINE = "card_decline",
        CHECK_DECLINE = "check_decline",
        CHECK_DEPOSIT_REJECTION = "check_deposit_rejection",
        INBOUND_REAL_TIME_PAYMENTS_TRANSFER_DECLINE = "inbound_real_time_payments_transfer_decline",
        WIRE_DECLINE = "wire_decline",
        OTHER = "other",
    }
}

open_enum! {
    pub struct PendingTransactionType {
        PENDING_TRANSACTION = "pending_transaction",
    }
}

open_enum! {
    pub struct DeclinedTransactionType {
        DECLINED_TRANSACTION = "declined_transaction",
    }
}

open_enum! {
    pub struct CardAuthorizationSimulationType {
        INBOUND_CARD_AUTHORIZATION_SIMULATION_RESULT = "inbound_card_authorization_simulation_result",
    }
}

/// A source reduced to its `category`; the payload is reachable through `detail_raw`.
#[derive(Clone, Debug)]
pub struct CategorizedSource<C> {
    pub category: C,
    pub meta: Metadata,
}

impl<C: AsRef<str>> CategorizedSource<C> {
    pub fn detail_raw(&self) -> Option<&str> {
        self.meta.extra(self.category.as_ref())
    }
}

impl<C: Decode> Decode for CategorizedSource<C> {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            category: object.required("category")?,
            meta: object.finish(),
        })
    }
}

/// Funds held for an in-flight operation.
#[derive(Clone, Debug)]
pub struct PendingTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub description: String,
    pub route_id: Option<String>,
    pub route_type: Option<RouteType>,
    pub source: CategorizedSource<PendingTransactionSourceCategory>,
    pub status: PendingTransactionStatus,
    pub kind: PendingTransactionType,
    pub meta: Metadata,
}

impl Decode for PendingTransaction {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            account_id: object.required("account_id")?,
            amount: object.required("amount")?,
            completed_at: object.optional("completed_at")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            description: object.required("description")?,
            route_id: object.optional("route_id")?,
            route_type: object.optional("route_type")?,
            source: object.required("source")?,
            status: object.required("status")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

/// An attempted movement of money that was refused.
#[derive(Clone, Debug)]
pub struct DeclinedTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: i64,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub description: String,
    pub route_id: Option<String>,
    pub route_type: Option<RouteType>,
    pub source: CategorizedSource<DeclinedTransactionSourceCategory>,
    pub kind: DeclinedTransactionType,
    pub meta: Metadata,
}

impl Decode for DeclinedTransaction {
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

/// Outcome of a simulated authorization: exactly one side is usually set.
#[derive(Clone, Debug)]
pub struct CardAuthorizationSimulation {
    pub declined_transaction: Option<DeclinedTransaction>,
    pub pending_transaction: Option<PendingTransaction>,
    pub kind: CardAuthorizationSimulationType,
    pub meta: Metadata,
}

impl Decode for CardAuthorizationSimulation {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            declined_transaction: object.optional("declined_transaction")?,
            pending_transaction: object.optional("pending_transaction")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CardAuthorizationCreateParams {
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_wallet_token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_acceptor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_category_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_descriptor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_card_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct InterestPaymentCreateParams {
    pub account_id: String,
    pub amount: i64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    pub period_start: Option<OffsetDateTime>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_timestamp"
    )]
    pub period_end: Option<OffsetDateTime>,
}

pub struct Simulations<'a> {
    client: &'a Client,
}

impl Client {
    pub fn simulations(&self) -> Simulations<'_> {
        Simulations { client: self }
    }
}

impl<'a> Simulations<'a> {
    pub fn account_transfers(&self) -> AccountTransferSimulations<'a> {
        AccountTransferSimulations {
            client: self.client,
        }
    }

    pub fn check_deposits(&self) -> CheckDepositSimulations<'a> {
        CheckDepositSimulations {
            client: self.client,
        }
    }

    pub fn card_authorizations(&self) -> CardAuthorizationSimulations<'a> {
        CardAuthorizationSimulations {
            client: self.client,
        }
    }

    pub fn interest_payments(&self) -> InterestPaymentSimulations<'a> {
        InterestPaymentSimulations {
            client: self.client,
        }
    }
}

pub struct AccountTransferSimulations<'a> {
    client: &'a Client,
}

impl AccountTransferSimulations<'_> {
    /// Completes a pending transfer as if the network had settled it.
    pub fn complete(&self, account_transfer_id: &str) -> ApiResult<AccountTransfer> {
        self.client.post_empty(&[
            SIMULATIONS,
            "account_transfers",
            account_transfer_id,
            "complete",
        ])
    }
}

pub struct CheckDepositSimulations<'a> {
    client: &'a Client,
}

impl CheckDepositSimulations<'_> {
    pub fn reject(&self, check_deposit_id: &str) -> ApiResult<CheckDeposit> {
        self.action(check_deposit_id, "reject")
    }

    /// Named `return_` because `return` is reserved.
    pub fn return_(&self, check_deposit_id: &str) -> ApiResult<CheckDeposit> {
        self.action(check_deposit_id, "return")
    }

    pub fn submit(&self, check_deposit_id: &str) -> ApiResult<CheckDeposit> {
        self.action(check_deposit_id, "submit")
    }

    fn action(&self, check_deposit_id: &str, action: &str) -> ApiResult<CheckDeposit> {
        self.client
            .post_empty(&[SIMULATIONS, "check_deposits", check_deposit_id, action])
    }
}

pub struct CardAuthorizationSimulations<'a> {
    client: &'a Client,
}

impl CardAuthorizationSimulations<'_> {
    pub fn create(
        &self,
        params: &CardAuthorizationCreateParams,
    ) -> ApiResult<CardAuthorizationSimulation> {
        self.client
            .post(&[SIMULATIONS, "card_authorizations"], params)
    }
}

pub struct InterestPaymentSimulations<'a> {
    client: &'a Client,
}

impl InterestPaymentSimulations<'_> {
    pub fn create(&self, params: &InterestPaymentCreateParams) -> ApiResult<Transaction> {
        self.client.post(&[SIMULATIONS, "interest_payments"], params)
    }
}
