//! Purpose: Account model and the `/accounts` service.
//! Exports: `Account`, `AccountStatus`, `AccountBank`, `AccountType`, params, `Accounts`.
//! Role: Reference shape for resource modules (model, open enums, params, service).
//! Invariants: `interest_accrued` and `interest_rate` stay decimal strings as sent.
#![allow(clippy::result_large_err)]

use super::{CreatedAtFilter, list_request};
use crate::api::client::{ApiResult, Client};
use crate::api::page::{AutoPager, Page};
use crate::core::decode::{Decode, DecodeResult, ObjectDecoder};
use crate::core::meta::Metadata;
use crate::core::open_enum::{Currency, open_enum};
use serde::Serialize;
use serde_json::value::RawValue;
use time::{Date, OffsetDateTime};

open_enum! {
    pub struct AccountStatus {
        CLOSED = "closed",
        OPEN = "open",
    }
}

open_enum! {
    /// Partner bank holding the account.
    pub struct AccountBank {
        BLUE_RIDGE_BANK = "blue_ridge_bank",
        CORE_BANK = "core_bank",
        FIRST_INTERNET_BANK = "first_internet_bank",
        GRASSHOPPER_BANK = "grasshopper_bank",
    }
}

open_enum! {
    pub struct AccountType {
        ACCOUNT = "account",
    }
}

#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub bank: AccountBank,
    pub closed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub currency: Currency,
    pub entity_id: Option<String>,
    pub idempotency_key: Option<String>,
    pub informational_entity_id: Option<String>,
    pub interest_accrued: String,
    pub interest_accrued_at: Option<Date>,
    pub interest_rate: String,
    pub name: String,
    pub program_id: String,
    pub status: AccountStatus,
    pub kind: AccountType,
    pub meta: Metadata,
}

impl Decode for Account {
    const EXPECTED: &'static str = "object";

    fn decode(raw: &RawValue) -> DecodeResult<Self> {
        let mut object = ObjectDecoder::new(raw)?;
        Ok(Self {
            id: object.required("id")?,
            bank: object.required("bank")?,
            closed_at: object.optional("closed_at")?,
            created_at: object.required("created_at")?,
            currency: object.required("currency")?,
            entity_id: object.optional("entity_id")?,
            idempotency_key: object.optional("idempotency_key")?,
            informational_entity_id: object.optional("informational_entity_id")?,
            interest_accrued: object.required("interest_accrued")?,
            interest_accrued_at: object.optional("interest_accrued_at")?,
            interest_rate: object.required("interest_rate")?,
            name: object.required("name")?,
            program_id: object.required("program_id")?,
            status: object.required("status")?,
            kind: object.required("type")?,
            meta: object.finish(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountCreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informational_entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct AccountListParams {
    pub cursor: Option<String>,
    pub limit: Option<u32>,
    pub created_at: Option<CreatedAtFilter>,
    pub entity_id: Option<String>,
    pub informational_entity_id: Option<String>,
    pub program_id: Option<String>,
    pub idempotency_key: Option<String>,
    pub status: Option<AccountStatus>,
}

pub struct Accounts<'a> {
    client: &'a Client,
}

impl Client {
    pub fn accounts(&self) -> Accounts<'_> {
        Accounts { client: self }
    }
}

impl Accounts<'_> {
    pub fn create(&self, params: &AccountCreateParams) -> ApiResult<Account> {
        self.client.post(&["accounts"], params)
    }

    pub fn retrieve(&self, account_id: &str) -> ApiResult<Account> {
        self.client.get(&["accounts", account_id])
    }

    pub fn update(&self, account_id: &str, params: &AccountUpdateParams) -> ApiResult<Account> {
        self.client.patch(&["accounts", account_id], params)
    }

    pub fn close(&self, account_id: &str) -> ApiResult<Account> {
        self.client.post_empty(&["accounts", account_id, "close"])
    }

    pub fn list(&self, params: &AccountListParams) -> ApiResult<Page<Account>> {
        self.client.list(list_params(params)?)
    }

    pub fn list_auto_paging(&self, params: &AccountListParams) -> ApiResult<AutoPager<Account>> {
        Ok(self.client.list_auto_paging(list_params(params)?))
    }
}

fn list_params(params: &AccountListParams) -> ApiResult<crate::api::page::ListRequest> {
    let request = list_request(
        &["accounts"],
        params.cursor.as_deref(),
        params.limit,
        params.created_at.as_ref(),
    )?;
    Ok(request
        .with_optional_query("entity_id", params.entity_id.as_deref())
        .with_optional_query(
            "informational_entity_id",
            params.informational_entity_id.as_deref(),
        )
        .with_optional_query("program_id", params.program_id.as_deref())
        .with_optional_query("idempotency_key", params.idempotency_key.as_deref())
        .with_optional_query("status.in", params.status.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::{Account, AccountBank, AccountListParams, AccountStatus, list_params};
    use crate::core::decode::from_str;
    use crate::core::error::ErrorKind;
    use crate::core::meta::FieldStatus;
    use crate::core::open_enum::Currency;
    use time::macros::datetime;

    const ACCOUNT: &str = r#"{
        "bank": "first_internet_bank",
        "closed_at": null,
        "created_at": "2020-01-31T23:59:59Z",
        "currency": "USD",
        "entity_id": "entity_n8y8tnk2p9339ti393yi",
        "id": "account_in71c4amph0vgo2qllky",
        "idempotency_key": null,
        "informational_entity_id": null,
        "interest_accrued": "0.01",
        "interest_accrued_at": "2020-01-31",
        "interest_rate": "0.055",
        "name": "My first account!",
        "program_id": "program_i2v2os4mwza1oetokh9i",
        "status": "open",
        "type": "account"
    }"#;

    #[test]
    fn decodes_documented_account() {
        let account: Account = from_str(ACCOUNT).expect("account");
        assert_eq!(account.id, "account_in71c4amph0vgo2qllky");
        assert_eq!(account.bank, AccountBank::FIRST_INTERNET_BANK);
        assert_eq!(account.currency, Currency::USD);
        assert_eq!(account.status, AccountStatus::OPEN);
        assert_eq!(account.created_at, datetime!(2020-01-31 23:59:59 UTC));
        assert_eq!(account.closed_at, None);
        assert_eq!(account.interest_rate, "0.055");
        assert_eq!(account.kind, "account");
        assert_eq!(
            account.meta.field("closed_at").map(|meta| meta.status()),
            Some(FieldStatus::Null)
        );
        assert!(!account.meta.has_extras());
    }

    #[test]
    fn new_bank_value_is_accepted() {
        let payload = ACCOUNT.replace("first_internet_bank", "moon_bank");
        let account: Account = from_str(&payload).expect("account");
        assert_eq!(account.bank.as_str(), "moon_bank");
        assert!(!account.bank.is_known());
    }

    #[test]
    fn wrong_kind_for_name_names_field() {
        let payload = ACCOUNT.replace("\"My first account!\"", "42");
        let err = from_str::<Account>(&payload).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.field(), Some("name"));
        assert_eq!(err.expected(), Some("string"));
        assert_eq!(err.actual(), Some("number"));
    }

    #[test]
    fn list_params_use_status_in_filter() {
        let params = AccountListParams {
            status: Some(AccountStatus::CLOSED),
            entity_id: Some("entity_1".to_string()),
            limit: Some(5),
            ..AccountListParams::default()
        };
        let request = list_params(&params).expect("request");
        assert!(
            request
                .query()
                .contains(&("status.in".to_string(), "closed".to_string()))
        );
        assert!(
            request
                .query()
                .contains(&("entity_id".to_string(), "entity_1".to_string()))
        );
    }
}
