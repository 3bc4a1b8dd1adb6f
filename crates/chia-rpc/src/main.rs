mod cli;

use std::path::PathBuf;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;
use serde_json::{json, Value};

use chia_rpc_core::amount::{parse_display_amount, to_base_units, to_display_units};
use chia_rpc_core::codec::{AddressCodec, Bech32mCodec};
use chia_rpc_core::provider::{timeout_from_secs_f64, EndpointConfig, HttpProvider};
use chia_rpc_core::{
    BlockId, ChiaClient, ConnectionManager, CoreError, EndpointName, ProviderSpec, RpcParams,
    RpcRequest,
};

use cli::{Command, ConnectionArgs};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let output = run(args).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("render output as JSON")?
    );
    Ok(())
}

async fn run(args: cli::Cli) -> eyre::Result<Value> {
    let codec = Bech32mCodec::new(&args.connection.address_prefix)?;

    // Conversions never touch the network, so they run without building
    // providers (and without needing readable certificates).
    match args.command {
        Command::ToMojo { amount } => {
            let mojos = to_base_units(parse_display_amount(&amount)?)?;
            Ok(json!({ "mojos": mojos }))
        }
        Command::ToXch { mojos } => Ok(json!({ "xch": to_display_units(mojos).to_string() })),
        Command::EncodeAddress { puzzle_hash } => Ok(json!({
            "address": codec.puzzle_hash_to_address(&puzzle_hash)?,
        })),
        Command::DecodeAddress { address } => Ok(json!({
            "puzzle_hash": codec.address_to_puzzle_hash(&address)?,
        })),
        command => {
            let client = build_client(&args.connection, codec)?;
            execute(&client, command).await
        }
    }
}

fn build_client(args: &ConnectionArgs, codec: Bech32mCodec) -> eyre::Result<ChiaClient> {
    let timeout = timeout_from_secs_f64(args.timeout_secs)?;

    let endpoint = |url: &str,
                    cert: &Option<PathBuf>,
                    key: &Option<PathBuf>|
     -> eyre::Result<ProviderSpec> {
        // Half-configured identities are rejected by HttpProvider::new.
        let mut config = EndpointConfig::new(url).with_timeout(timeout);
        config.cert_path = cert.clone();
        config.key_path = key.clone();
        for (name, value) in &args.headers {
            config = config.with_header(name, value);
        }
        let provider =
            HttpProvider::new(config).wrap_err_with(|| format!("configure endpoint `{url}`"))?;
        Ok(ProviderSpec::prebuilt(provider))
    };

    let manager = ConnectionManager::new([
        (
            EndpointName::FullNode,
            endpoint(
                &args.full_node_url,
                &args.full_node_cert,
                &args.full_node_key,
            )?,
        ),
        (
            EndpointName::WalletServer,
            endpoint(&args.wallet_url, &args.wallet_cert, &args.wallet_key)?,
        ),
    ])?;
    tracing::debug!(?manager, "connection manager ready");

    Ok(ChiaClient::new(manager, codec))
}

#[derive(Serialize)]
struct EndpointStatus {
    endpoint: EndpointName,
    url: String,
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn execute(client: &ChiaClient, command: Command) -> eyre::Result<Value> {
    let result = match command {
        Command::Status => return status(client).await,
        Command::BlockchainState => client.get_blockchain_state().await,
        Command::Block { block } => {
            let block: BlockId = block.parse()?;
            client.get_block_record(Some(&block)).await
        }
        Command::AdditionsAndRemovals { block } => {
            let block: BlockId = block.parse()?;
            client.get_additions_and_removals(&block).await
        }
        Command::CoinRecords { target, start, end } => {
            client.get_coin_records_by_address(&target, start, end).await
        }
        Command::Coin { name } => client.get_coin_record_by_name(&name).await,
        Command::MempoolItem { tx_id } => client.get_mempool_item_by_tx_id(&tx_id).await,
        Command::PushTx { spend_bundle } => client.push_tx(spend_bundle_value(spend_bundle)).await,
        Command::Wallets => client.get_wallets().await,
        Command::Balance => client.get_wallet_balance().await,
        Command::Transactions => client.get_transactions().await,
        Command::Transaction { transaction_id } => client.get_transaction(&transaction_id).await,
        Command::TransactionCount => client.get_transaction_count().await,
        Command::NextAddress { new } => client.get_next_address(new).await,
        Command::Send { to, amount } => {
            let amount = parse_display_amount(&amount)?;
            client.send_transaction(&to, amount).await
        }
        Command::Call {
            method,
            params,
            endpoint,
            verb,
        } => {
            let params: RpcParams = serde_json::from_str(&params)
                .wrap_err("--params must be a JSON object")?;
            let request = RpcRequest::new(method)
                .params(params)
                .endpoint(endpoint.into())
                .verb(verb.into());
            client.manager().send(&request).await
        }
        Command::ToMojo { .. }
        | Command::ToXch { .. }
        | Command::EncodeAddress { .. }
        | Command::DecodeAddress { .. } => {
            return Err(eyre!("offline command routed to the network"));
        }
    };

    result.map(Value::Object).map_err(rpc_failure)
}

async fn status(client: &ChiaClient) -> eyre::Result<Value> {
    let mut entries = Vec::new();
    for (endpoint, probe) in client.manager().probe_all().await {
        let url = client.manager().provider(endpoint)?.base_url().to_owned();
        let (connected, error) = match probe {
            Ok(connected) => (connected, None),
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "endpoint unreachable");
                (false, Some(error_chain(&err)))
            }
        };
        entries.push(EndpointStatus {
            endpoint,
            url,
            connected,
            error,
        });
    }
    Ok(serde_json::to_value(entries)?)
}

/// Spend bundles are usually JSON objects; anything else is sent as text.
fn spend_bundle_value(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::String(raw),
    }
}

fn error_chain(err: &CoreError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

fn rpc_failure(err: CoreError) -> eyre::Report {
    let message = match &err {
        CoreError::Transport { url, .. } => format_rpc_connect_error(url, &error_chain(&err)),
        _ => error_chain(&err),
    };
    eyre!(message)
}

fn format_rpc_connect_error(rpc_url: &str, source_error: &str) -> String {
    let mut lines = vec![
        format!("could not reach RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if source_error.contains("dns error") || source_error.contains("failed to lookup address") {
        lines.push(
            "hint: hostname resolution failed; verify the endpoint hostname and your DNS/network"
                .into(),
        );
    } else if source_error.contains("Connection refused") {
        lines.push(
            "hint: nothing is listening; verify the node/wallet service is running and the port is right"
                .into(),
        );
    } else if source_error.contains("certificate")
        || source_error.contains("tls")
        || source_error.contains("handshake")
    {
        lines.push(
            "hint: TLS handshake failed; pass the service's private .crt/.key pair via --full-node-cert/--wallet-cert"
                .into(),
        );
    } else if source_error.contains("timed out") {
        lines.push("hint: request timed out; raise --timeout-secs or check the node is synced".into());
    }

    lines.join("\n")
}
