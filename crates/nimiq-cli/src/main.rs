mod cli;

use clap::Parser;
use eyre::WrapErr;
use tracing::info;

use nimiq_rpc::types::Syncing;
use nimiq_rpc::Client;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_level(true)
        .init();

    let client = Client::connect(
        &args.rpc_url,
        args.rpc_user.as_deref(),
        args.rpc_pass.as_deref(),
    )
    .wrap_err("configure RPC client")?;

    match args.command {
        Command::Status => {
            let consensus = client
                .consensus()
                .await
                .wrap_err("query consensus state")?;
            let height = client.block_number().await.wrap_err("query chain height")?;
            let peers = client.peer_count().await.wrap_err("query peer count")?;

            println!("consensus: {consensus}");
            println!("height:    {height}");
            println!("peers:     {peers}");
            match client.syncing().await.wrap_err("query sync state")? {
                Syncing::Flag(false) => println!("syncing:   no"),
                Syncing::Flag(true) => println!("syncing:   yes"),
                Syncing::Status(status) => println!(
                    "syncing:   block {} of {} (started at {})",
                    status.current_block, status.highest_block, status.starting_block
                ),
            }
        }
        Command::Block { id, full } => {
            // A bare integer is a height, anything else a block hash.
            let block = match id.parse::<u32>() {
                Ok(number) => {
                    info!(number, "looking up block by height");
                    client.get_block_by_number(number, full).await
                }
                Err(_) => {
                    info!(hash = %id, "looking up block by hash");
                    client.get_block_by_hash(&id, full).await
                }
            }
            .wrap_err("fetch block")?;

            match block {
                Some(block) => println!("{block:#?}"),
                None => println!("block `{id}` not found"),
            }
        }
        Command::Mempool => {
            let info = client.mempool().await.wrap_err("fetch mempool info")?;
            println!("pending transactions: {}", info.total);
            let mut boundaries: Vec<_> = info.transactions_per_bucket.iter().collect();
            boundaries.sort();
            for (boundary, count) in boundaries {
                println!("  >= {boundary} luna/byte: {count}");
            }
        }
        Command::Account { address } => {
            let account = client
                .get_account(&address)
                .await
                .wrap_err("fetch account")?;
            println!("{account:#?}");
        }
        Command::Transaction { hash } => {
            let transaction = client
                .get_transaction_by_hash(&hash)
                .await
                .wrap_err("fetch transaction")?;
            match transaction {
                Some(tx) => println!("{tx:#?}"),
                None => println!("transaction `{hash}` not found"),
            }
        }
    }

    Ok(())
}
