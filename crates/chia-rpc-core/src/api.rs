//! High-level Chia API.
//!
//! [`ChiaClient`] assembles a method name and a parameter map for each
//! operation and hands it to [`ConnectionManager::request`]; it never talks
//! to a provider directly.

use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::amount::to_base_units;
use crate::codec::{resolve_puzzle_hash, AddressCodec, Bech32mCodec};
use crate::error::CoreError;
use crate::manager::ConnectionManager;
use crate::types::{BlockId, EndpointName, HttpVerb, RpcParams, RpcResult};

/// The wallet all wallet-side calls address: the standard XCH wallet.
const STANDARD_WALLET_ID: &str = "1";

pub struct ChiaClient {
    manager: ConnectionManager,
    codec: Box<dyn AddressCodec>,
    default_block: BlockId,
}

impl ChiaClient {
    pub fn new(manager: ConnectionManager, codec: impl AddressCodec + 'static) -> Self {
        Self {
            manager,
            codec: Box::new(codec),
            default_block: BlockId::Latest,
        }
    }

    /// Both endpoints on localhost with mainnet addresses.
    pub fn with_defaults() -> Result<Self, CoreError> {
        Ok(Self::new(
            ConnectionManager::with_defaults()?,
            Bech32mCodec::mainnet(),
        ))
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub fn codec(&self) -> &dyn AddressCodec {
        self.codec.as_ref()
    }

    /// Block used by [`get_block_record`](Self::get_block_record) when the
    /// caller passes `None`.
    pub fn set_default_block(&mut self, block: BlockId) {
        self.default_block = block;
    }

    pub fn default_block(&self) -> &BlockId {
        &self.default_block
    }

    pub async fn is_connected(&self) -> Vec<(EndpointName, bool)> {
        self.manager.is_connected().await
    }

    async fn full_node(&self, method: &str, params: RpcParams) -> Result<RpcResult, CoreError> {
        self.manager
            .request(method, &params, EndpointName::FullNode, HttpVerb::Post)
            .await
    }

    async fn wallet(&self, method: &str, params: RpcParams) -> Result<RpcResult, CoreError> {
        self.manager
            .request(method, &params, EndpointName::WalletServer, HttpVerb::Post)
            .await
    }

    // ==========================================================================
    // Full Node
    // ==========================================================================

    pub async fn get_blockchain_state(&self) -> Result<RpcResult, CoreError> {
        self.full_node("get_blockchain_state", RpcParams::new()).await
    }

    /// Height of the current peak, from `blockchain_state.peak.height`.
    pub async fn get_latest_block_height(&self) -> Result<u32, CoreError> {
        let state = self.get_blockchain_state().await?;
        let height = lookup(&state, &["blockchain_state", "peak", "height"], "get_blockchain_state")?;
        height
            .as_u64()
            .and_then(|h| u32::try_from(h).ok())
            .ok_or_else(|| {
                CoreError::invalid_response(
                    "get_blockchain_state",
                    format!("peak height is not a block height: {height}"),
                )
            })
    }

    pub async fn get_current_block(&self) -> Result<RpcResult, CoreError> {
        let height = self.get_latest_block_height().await?;
        self.get_block_record_by_height(height).await
    }

    /// Block record for `block`, or for the default block when `None`.
    pub async fn get_block_record(&self, block: Option<&BlockId>) -> Result<RpcResult, CoreError> {
        match block.unwrap_or(&self.default_block) {
            BlockId::Latest => self.get_current_block().await,
            BlockId::Height(height) => self.get_block_record_by_height(*height).await,
            BlockId::Hash(hash) => self.get_block_record_by_hash(hash).await,
        }
    }

    pub async fn get_block_record_by_hash(&self, header_hash: &str) -> Result<RpcResult, CoreError> {
        self.full_node(
            "get_block_record",
            params(json!({ "header_hash": header_hash })),
        )
        .await
    }

    pub async fn get_block_record_by_height(&self, height: u32) -> Result<RpcResult, CoreError> {
        self.full_node(
            "get_block_record_by_height",
            params(json!({ "height": height })),
        )
        .await
    }

    /// Coins created and spent in a block. Heights and `Latest` are first
    /// resolved to the block's header hash.
    pub async fn get_additions_and_removals(&self, block: &BlockId) -> Result<RpcResult, CoreError> {
        let header_hash = match block {
            BlockId::Hash(hash) => hash.clone(),
            other => {
                let record = self.get_block_record(Some(other)).await?;
                let hash = lookup(&record, &["block_record", "header_hash"], "get_block_record")?;
                hash.as_str()
                    .ok_or_else(|| {
                        CoreError::invalid_response(
                            "get_block_record",
                            format!("header_hash is not a string: {hash}"),
                        )
                    })?
                    .to_owned()
            }
        };

        self.full_node(
            "get_additions_and_removals",
            params(json!({ "header_hash": header_hash })),
        )
        .await
    }

    /// Coin records for a puzzle hash. A height of zero leaves that bound
    /// open.
    pub async fn get_coin_records_by_puzzle_hash(
        &self,
        puzzle_hash: &str,
        start_height: u32,
        end_height: u32,
    ) -> Result<RpcResult, CoreError> {
        let mut data = params(json!({ "puzzle_hash": puzzle_hash }));
        if start_height > 0 {
            data.insert("start_height".to_owned(), json!(start_height));
        }
        if end_height > 0 {
            data.insert("end_height".to_owned(), json!(end_height));
        }
        self.full_node("get_coin_records_by_puzzle_hash", data).await
    }

    pub async fn get_coin_records_by_address(
        &self,
        address: &str,
        start_height: u32,
        end_height: u32,
    ) -> Result<RpcResult, CoreError> {
        let puzzle_hash = resolve_puzzle_hash(self.codec(), address)?;
        self.get_coin_records_by_puzzle_hash(&puzzle_hash, start_height, end_height)
            .await
    }

    pub async fn get_coin_record_by_name(&self, name: &str) -> Result<RpcResult, CoreError> {
        self.full_node("get_coin_record_by_name", params(json!({ "name": name })))
            .await
    }

    /// Broadcast a spend bundle.
    pub async fn push_tx(&self, spend_bundle: impl Into<Value>) -> Result<RpcResult, CoreError> {
        let mut data = RpcParams::new();
        data.insert("spend_bundle".to_owned(), spend_bundle.into());
        self.full_node("push_tx", data).await
    }

    pub async fn get_mempool_item_by_tx_id(&self, tx_id: &str) -> Result<RpcResult, CoreError> {
        self.full_node(
            "get_mempool_item_by_tx_id",
            params(json!({ "tx_id": tx_id })),
        )
        .await
    }

    // ==========================================================================
    // Wallet
    // ==========================================================================

    pub async fn get_wallets(&self) -> Result<RpcResult, CoreError> {
        self.wallet("get_wallets", RpcParams::new()).await
    }

    pub async fn get_wallet_balance(&self) -> Result<RpcResult, CoreError> {
        self.wallet(
            "get_wallet_balance",
            params(json!({ "wallet_id": STANDARD_WALLET_ID })),
        )
        .await
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> Result<RpcResult, CoreError> {
        self.wallet(
            "get_transaction",
            params(json!({
                "wallet_id": STANDARD_WALLET_ID,
                "transaction_id": transaction_id,
            })),
        )
        .await
    }

    pub async fn get_transactions(&self) -> Result<RpcResult, CoreError> {
        self.wallet(
            "get_transactions",
            params(json!({ "wallet_id": STANDARD_WALLET_ID })),
        )
        .await
    }

    pub async fn get_transaction_count(&self) -> Result<RpcResult, CoreError> {
        self.wallet(
            "get_transaction_count",
            params(json!({ "wallet_id": STANDARD_WALLET_ID })),
        )
        .await
    }

    pub async fn get_next_address(&self, new_address: bool) -> Result<RpcResult, CoreError> {
        self.wallet(
            "get_next_address",
            params(json!({
                "wallet_id": STANDARD_WALLET_ID,
                "new_address": new_address,
            })),
        )
        .await
    }

    /// Ask the wallet to build and sign a transaction paying `amount` mojos
    /// to `puzzle_hash`. Nothing is broadcast.
    pub async fn create_signed_transaction(
        &self,
        amount: u64,
        puzzle_hash: &str,
    ) -> Result<RpcResult, CoreError> {
        self.wallet(
            "create_signed_transaction",
            params(json!({
                "additions": [{ "amount": amount, "puzzle_hash": puzzle_hash }],
            })),
        )
        .await
    }

    /// Pay `amount` XCH to `to` (an address or puzzle hash): sign through
    /// the wallet, then broadcast through the full node.
    pub async fn send_transaction(&self, to: &str, amount: Decimal) -> Result<RpcResult, CoreError> {
        let mojos = to_base_units(amount)?;
        let puzzle_hash = resolve_puzzle_hash(self.codec(), to)?;

        let signed = self.create_signed_transaction(mojos, &puzzle_hash).await?;
        let spend_bundle = lookup(
            &signed,
            &["signed_tx", "spend_bundle"],
            "create_signed_transaction",
        )?;
        self.push_tx(spend_bundle.clone()).await
    }
}

/// Turn a `json!` object literal into request params.
fn params(value: Value) -> RpcParams {
    match value {
        Value::Object(map) => map,
        _ => RpcParams::new(),
    }
}

/// Follow `path` through nested objects of a result.
fn lookup<'a>(result: &'a RpcResult, path: &[&str], method: &str) -> Result<&'a Value, CoreError> {
    let missing = || CoreError::invalid_response(method, format!("missing `{}`", path.join(".")));
    let (first, rest) = path.split_first().ok_or_else(missing)?;
    let mut value = result.get(*first).ok_or_else(missing)?;
    for key in rest {
        value = value.get(*key).ok_or_else(missing)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::manager::ProviderSpec;
    use crate::provider::mock::{CallLog, MockProvider};
    use crate::test_util::{block_record, blockchain_state, header_hash_for};

    struct Harness {
        client: ChiaClient,
        node_calls: CallLog,
        wallet_calls: CallLog,
    }

    fn harness(node: MockProvider, wallet: MockProvider) -> Harness {
        let node_calls = node.calls();
        let wallet_calls = wallet.calls();
        let manager = ConnectionManager::new([
            (EndpointName::FullNode, ProviderSpec::prebuilt(node)),
            (EndpointName::WalletServer, ProviderSpec::prebuilt(wallet)),
        ])
        .unwrap();
        Harness {
            client: ChiaClient::new(manager, Bech32mCodec::mainnet()),
            node_calls,
            wallet_calls,
        }
    }

    fn empty_wallet() -> MockProvider {
        MockProvider::builder("https://wallet:9256").build()
    }

    fn empty_node() -> MockProvider {
        MockProvider::builder("https://node:8555").build()
    }

    #[tokio::test]
    async fn latest_height_reads_peak() {
        let node = MockProvider::builder("https://node:8555")
            .with_result("get_blockchain_state", blockchain_state(4_200_000))
            .build();
        let h = harness(node, empty_wallet());
        assert_eq!(h.client.get_latest_block_height().await.unwrap(), 4_200_000);
    }

    #[tokio::test]
    async fn latest_height_without_peak_is_invalid_response() {
        let node = MockProvider::builder("https://node:8555")
            .with_result("get_blockchain_state", serde_json::json!({"success": true}))
            .build();
        let h = harness(node, empty_wallet());
        let err = h.client.get_latest_block_height().await.expect_err("must fail");
        assert!(err.to_string().contains("blockchain_state.peak.height"));
    }

    #[tokio::test]
    async fn block_record_by_height_sends_height_param() {
        let h = harness(empty_node(), empty_wallet());
        h.client.get_block_record_by_height(17).await.unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[0].path, "get_block_record_by_height");
        assert_eq!(calls[0].params["height"], 17);
        assert_eq!(calls[0].verb, HttpVerb::Post);
        assert!(h.wallet_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_block_resolves_through_peak_height() {
        let node = MockProvider::builder("https://node:8555")
            .with_result("get_blockchain_state", blockchain_state(99))
            .with_result("get_block_record_by_height", block_record(99))
            .build();
        let h = harness(node, empty_wallet());

        let record = h.client.get_block_record(None).await.unwrap();
        assert_eq!(record["block_record"]["height"], 99);

        let calls = h.node_calls.lock().unwrap();
        let paths: Vec<_> = calls.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, ["get_blockchain_state", "get_block_record_by_height"]);
    }

    #[tokio::test]
    async fn default_block_applies_when_none_given() {
        let mut h = harness(empty_node(), empty_wallet());
        let hash = header_hash_for(3);
        h.client.set_default_block(BlockId::Hash(hash.clone()));
        h.client.get_block_record(None).await.unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[0].path, "get_block_record");
        assert_eq!(calls[0].params["header_hash"], hash.as_str());
    }

    #[tokio::test]
    async fn additions_and_removals_by_height_use_header_hash() {
        let node = MockProvider::builder("https://node:8555")
            .with_result("get_block_record_by_height", block_record(5))
            .build();
        let h = harness(node, empty_wallet());
        h.client
            .get_additions_and_removals(&BlockId::Height(5))
            .await
            .unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[1].path, "get_additions_and_removals");
        assert_eq!(calls[1].params["header_hash"], header_hash_for(5).as_str());
    }

    #[tokio::test]
    async fn coin_records_omit_zero_heights() {
        let h = harness(empty_node(), empty_wallet());
        let puzzle_hash = header_hash_for(1);
        h.client
            .get_coin_records_by_puzzle_hash(&puzzle_hash, 0, 0)
            .await
            .unwrap();
        h.client
            .get_coin_records_by_puzzle_hash(&puzzle_hash, 10, 20)
            .await
            .unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[0].params.len(), 1);
        assert_eq!(calls[1].params["start_height"], 10);
        assert_eq!(calls[1].params["end_height"], 20);
    }

    #[tokio::test]
    async fn coin_records_by_address_decode_the_address() {
        let h = harness(empty_node(), empty_wallet());
        let puzzle_hash = header_hash_for(8);
        let address = h.client.codec().puzzle_hash_to_address(&puzzle_hash).unwrap();

        h.client
            .get_coin_records_by_address(&address, 100, 0)
            .await
            .unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[0].params["puzzle_hash"], puzzle_hash.as_str());
        assert_eq!(calls[0].params["start_height"], 100);
    }

    #[tokio::test]
    async fn bad_address_is_a_codec_error_and_sends_nothing() {
        let h = harness(empty_node(), empty_wallet());
        let err = h
            .client
            .get_coin_records_by_address("xch1notanaddress", 0, 0)
            .await
            .expect_err("must fail");
        assert!(matches!(err, CoreError::Codec(_)));
        assert!(h.node_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_tx_goes_to_full_node() {
        let h = harness(empty_node(), empty_wallet());
        h.client.push_tx("0xbundle").await.unwrap();

        let calls = h.node_calls.lock().unwrap();
        assert_eq!(calls[0].path, "push_tx");
        assert_eq!(calls[0].params["spend_bundle"], "0xbundle");
    }

    #[tokio::test]
    async fn wallet_balance_uses_standard_wallet() {
        let h = harness(empty_node(), empty_wallet());
        h.client.get_wallet_balance().await.unwrap();

        assert!(h.node_calls.lock().unwrap().is_empty());
        let calls = h.wallet_calls.lock().unwrap();
        assert_eq!(calls[0].path, "get_wallet_balance");
        assert_eq!(calls[0].params["wallet_id"], "1");
    }

    #[tokio::test]
    async fn send_transaction_signs_on_wallet_and_pushes_on_node() {
        let bundle = serde_json::json!({"coin_spends": [], "aggregated_signature": "0xc0"});
        let wallet = MockProvider::builder("https://wallet:9256")
            .with_result(
                "create_signed_transaction",
                serde_json::json!({"signed_tx": {"spend_bundle": bundle.clone()}, "success": true}),
            )
            .build();
        let node = MockProvider::builder("https://node:8555")
            .with_result("push_tx", serde_json::json!({"status": "SUCCESS", "success": true}))
            .build();
        let h = harness(node, wallet);
        let to = header_hash_for(2);

        let result = h
            .client
            .send_transaction(&to, Decimal::from_str("0.1").unwrap())
            .await
            .unwrap();
        assert_eq!(result["status"], "SUCCESS");

        let wallet_calls = h.wallet_calls.lock().unwrap();
        let addition = &wallet_calls[0].params["additions"][0];
        assert_eq!(addition["amount"], 100_000_000_000u64);
        assert_eq!(addition["puzzle_hash"], to.as_str());

        let node_calls = h.node_calls.lock().unwrap();
        assert_eq!(node_calls[0].params["spend_bundle"], bundle);
    }

    #[tokio::test]
    async fn send_transaction_rejects_negative_amounts_before_any_call() {
        let h = harness(empty_node(), empty_wallet());
        let err = h
            .client
            .send_transaction(&header_hash_for(2), Decimal::from_str("-1").unwrap())
            .await
            .expect_err("must fail");
        assert!(matches!(err, CoreError::InvalidAmount(_)));
        assert!(h.wallet_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_transaction_without_bundle_is_invalid_response() {
        let h = harness(empty_node(), empty_wallet());
        let err = h
            .client
            .send_transaction(&header_hash_for(2), Decimal::ONE)
            .await
            .expect_err("must fail");
        assert!(matches!(err, CoreError::InvalidResponse { ref method, .. } if method == "create_signed_transaction"));
        assert!(h.node_calls.lock().unwrap().is_empty());
    }
}
