//! Purpose: Hold top-level CLI command dispatch for `increase`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap; map each resource to its service.
//! Invariants: `decode` never builds a client, so it needs no API key or network.

use super::*;
use increase::api::resources::{
    account_numbers::{AccountNumber, AccountNumberListParams},
    account_transfers::{AccountTransfer, AccountTransferListParams},
    accounts::{Account, AccountListParams},
    ach_transfers::{AchTransfer, AchTransferListParams},
    card_disputes::{CardDispute, CardDisputeListParams},
    check_deposits::{CheckDeposit, CheckDepositListParams},
    transactions::{Transaction, TransactionListParams},
};
use increase::core::decode;

pub(super) fn dispatch_command(
    command: Command,
    config: &ClientConfig,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "increase", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Decode { resource, file } => {
            let input = read_input(file.as_deref())?;
            let meta = decode_metadata(resource, &input)?;
            emit_json(metadata_report(resource, &meta)?);
            Ok(RunOutcome::ok())
        }
        Command::Get { resource, id } => {
            let client = config.build()?;
            match resource {
                Resource::Account => emit_object(&client.accounts().retrieve(&id)?),
                Resource::AccountNumber => {
                    emit_object(&client.account_numbers().retrieve(&id)?)
                }
                Resource::AccountTransfer => {
                    emit_object(&client.account_transfers().retrieve(&id)?)
                }
                Resource::AchTransfer => emit_object(&client.ach_transfers().retrieve(&id)?),
                Resource::CardDispute => emit_object(&client.card_disputes().retrieve(&id)?),
                Resource::CheckDeposit => emit_object(&client.check_deposits().retrieve(&id)?),
                Resource::Transaction => emit_object(&client.transactions().retrieve(&id)?),
            }?;
            Ok(RunOutcome::ok())
        }
        Command::List {
            resource,
            limit,
            all,
        } => {
            if limit == Some(0) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("--limit must be at least 1")
                    .with_hint("Omit --limit to use the API default page size."));
            }
            let client = config.build()?;
            list_resource(&client, resource, limit, all)
        }
    }
}

fn decode_metadata(resource: Resource, input: &str) -> Result<Metadata, Error> {
    let meta = match resource {
        Resource::Account => decode::from_str::<Account>(input)?.meta,
        Resource::AccountNumber => decode::from_str::<AccountNumber>(input)?.meta,
        Resource::AccountTransfer => decode::from_str::<AccountTransfer>(input)?.meta,
        Resource::AchTransfer => decode::from_str::<AchTransfer>(input)?.meta,
        Resource::CardDispute => decode::from_str::<CardDispute>(input)?.meta,
        Resource::CheckDeposit => decode::from_str::<CheckDeposit>(input)?.meta,
        Resource::Transaction => decode::from_str::<Transaction>(input)?.meta,
    };
    Ok(meta)
}

fn list_resource(
    client: &Client,
    resource: Resource,
    limit: Option<u32>,
    all: bool,
) -> Result<RunOutcome, Error> {
    match resource {
        Resource::Account => {
            let params = AccountListParams {
                limit,
                ..AccountListParams::default()
            };
            let service = client.accounts();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::AccountNumber => {
            let params = AccountNumberListParams {
                limit,
                ..AccountNumberListParams::default()
            };
            let service = client.account_numbers();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::AccountTransfer => {
            let params = AccountTransferListParams {
                limit,
                ..AccountTransferListParams::default()
            };
            let service = client.account_transfers();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::AchTransfer => {
            let params = AchTransferListParams {
                limit,
                ..AchTransferListParams::default()
            };
            let service = client.ach_transfers();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::CardDispute => {
            let params = CardDisputeListParams {
                limit,
                ..CardDisputeListParams::default()
            };
            let service = client.card_disputes();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::CheckDeposit => {
            let params = CheckDepositListParams {
                limit,
                ..CheckDepositListParams::default()
            };
            let service = client.check_deposits();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
        Resource::Transaction => {
            let params = TransactionListParams {
                limit,
                ..TransactionListParams::default()
            };
            let service = client.transactions();
            if all {
                emit_all(service.list_auto_paging(&params)?)
            } else {
                emit_page(service.list(&params)?)
            }
        }
    }
}
