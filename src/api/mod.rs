//! Purpose: Define the public Rust API boundary for the Increase client.
//! Exports: Client, pagination, transport seam, resource models, errors and metadata.
//! Role: Public, additive-only surface; callers should not need `core` paths.
//! Invariants: Resource services hang off `Client` (`client.accounts()`, ...).

pub mod client;
pub mod page;
pub mod resources;
pub mod transport;

pub use crate::core::decode::{Decode, JsonKind};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::meta::{FieldMeta, FieldStatus, HasMetadata, Metadata};
pub use crate::core::open_enum::Currency;
pub use client::{ApiResult, Client, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, Environment};
pub use page::{AutoPager, ListRequest, ListResponse, Page};
pub use resources::CreatedAtFilter;
pub use resources::account_numbers::{AccountNumber, AccountNumbers};
pub use resources::account_transfers::{AccountTransfer, AccountTransfers};
pub use resources::accounts::{Account, Accounts};
pub use resources::ach_transfers::{AchTransfer, AchTransfers};
pub use resources::card_disputes::{CardDispute, CardDisputes};
pub use resources::check_deposits::{CheckDeposit, CheckDeposits};
pub use resources::simulations::{CardAuthorizationSimulation, Simulations};
pub use resources::transactions::{SourceDetail, Transaction, TransactionSource, Transactions};
pub use transport::{Method, Request, Response, Transport, UreqTransport};
