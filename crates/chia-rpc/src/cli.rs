use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use chia_rpc_core::manager::{DEFAULT_FULL_NODE_URL, DEFAULT_WALLET_URL};
use chia_rpc_core::{EndpointName, HttpVerb};

/// chia-rpc — query a Chia full node and wallet over their RPC endpoints.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Full node RPC URL.
    #[arg(long, default_value = DEFAULT_FULL_NODE_URL, env = "CHIA_FULL_NODE_URL")]
    pub full_node_url: String,

    /// Client certificate for the full node (e.g. private_full_node.crt).
    #[arg(long, env = "CHIA_FULL_NODE_CERT")]
    pub full_node_cert: Option<PathBuf>,

    /// Private key for the full node certificate.
    #[arg(long, env = "CHIA_FULL_NODE_KEY")]
    pub full_node_key: Option<PathBuf>,

    /// Wallet RPC URL.
    #[arg(long, default_value = DEFAULT_WALLET_URL, env = "CHIA_WALLET_URL")]
    pub wallet_url: String,

    /// Client certificate for the wallet (e.g. private_wallet.crt).
    #[arg(long, env = "CHIA_WALLET_CERT")]
    pub wallet_cert: Option<PathBuf>,

    /// Private key for the wallet certificate.
    #[arg(long, env = "CHIA_WALLET_KEY")]
    pub wallet_key: Option<PathBuf>,

    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long, default_value = "30", env = "CHIA_RPC_TIMEOUT_SECS")]
    pub timeout_secs: f64,

    /// Extra request header as KEY=VALUE (repeatable).
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Address prefix (`xch` on mainnet, `txch` on testnets).
    #[arg(long, default_value = "xch", env = "CHIA_ADDRESS_PREFIX")]
    pub address_prefix: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Probe both endpoints and report which are reachable.
    Status,
    /// Print the full node's blockchain state.
    BlockchainState,
    /// Print a block record: `latest`, a height, or a 0x header hash.
    Block {
        #[arg(default_value = "latest")]
        block: String,
    },
    /// Print coins created and spent in a block.
    AdditionsAndRemovals {
        #[arg(default_value = "latest")]
        block: String,
    },
    /// Print coin records for an address or puzzle hash.
    CoinRecords {
        target: String,
        /// First height to include (0 = from genesis).
        #[arg(long, default_value = "0")]
        start: u32,
        /// Height to stop at (0 = up to the peak).
        #[arg(long, default_value = "0")]
        end: u32,
    },
    /// Print a coin record by coin name.
    Coin { name: String },
    /// Print a mempool item by transaction id.
    MempoolItem { tx_id: String },
    /// Broadcast a spend bundle (JSON object or hex string).
    PushTx { spend_bundle: String },
    /// List the wallets.
    Wallets,
    /// Print the standard wallet's balance.
    Balance,
    /// List the standard wallet's transactions.
    Transactions,
    /// Print one wallet transaction.
    Transaction { transaction_id: String },
    /// Print the standard wallet's transaction count.
    TransactionCount,
    /// Print a receive address of the standard wallet.
    NextAddress {
        /// Derive a fresh address instead of reusing the current one.
        #[arg(long)]
        new: bool,
    },
    /// Send XCH to an address or puzzle hash.
    Send { to: String, amount: String },
    /// Issue an arbitrary RPC call.
    Call {
        method: String,
        /// JSON object sent as the request body.
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, value_enum, default_value_t = EndpointArg::FullNode)]
        endpoint: EndpointArg,
        #[arg(long, value_enum, default_value_t = VerbArg::Post)]
        verb: VerbArg,
    },
    /// Convert an XCH amount to mojos.
    ToMojo { amount: String },
    /// Convert mojos to XCH.
    ToXch { mojos: u64 },
    /// Encode a puzzle hash as an address.
    EncodeAddress { puzzle_hash: String },
    /// Decode an address into its puzzle hash.
    DecodeAddress { address: String },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EndpointArg {
    FullNode,
    Wallet,
}

impl From<EndpointArg> for EndpointName {
    fn from(arg: EndpointArg) -> Self {
        match arg {
            EndpointArg::FullNode => EndpointName::FullNode,
            EndpointArg::Wallet => EndpointName::WalletServer,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VerbArg {
    Get,
    Post,
}

impl From<VerbArg> for HttpVerb {
    fn from(arg: VerbArg) -> Self {
        match arg {
            VerbArg::Get => HttpVerb::Get,
            VerbArg::Post => HttpVerb::Post,
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("header `{raw}` must be formatted as KEY=VALUE"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header `{raw}` has an empty name"));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}
