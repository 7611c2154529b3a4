//! Typed wrappers, one per RPC method of the Nimiq node API.
//!
//! Each wrapper only supplies the method name, the positional params, and
//! the expected result shape; all dispatch semantics live in
//! [`Client::call`]. Methods whose result may be JSON null return `Option`.

use serde_json::json;

use crate::client::Client;
use crate::error::RpcError;
use crate::types::{
    Account, Block, BlockTemplate, HashOrTransaction, LogLevel, MempoolInfo, OutgoingTransaction,
    Peer, PoolConnectionState, PoolSetting, Syncing, Transaction, TransactionReceipt, Wallet,
    WorkInstructions,
};

impl Client {
    /// List the accounts the node manages.
    pub async fn accounts(&self) -> Result<Vec<Account>, RpcError> {
        self.call("accounts", Vec::new()).await
    }

    /// Height of the current chain head.
    pub async fn block_number(&self) -> Result<u32, RpcError> {
        self.call("blockNumber", Vec::new()).await
    }

    /// Consensus state, e.g. `"established"`.
    pub async fn consensus(&self) -> Result<String, RpcError> {
        self.call("consensus", Vec::new()).await
    }

    /// Read a chain constant, or override it when `value` is given.
    pub async fn constant(&self, name: &str, value: Option<u64>) -> Result<u64, RpcError> {
        let mut params = vec![json!(name)];
        if let Some(value) = value {
            params.push(json!(value));
        }
        self.call("constant", params).await
    }

    /// Create a fresh account on the node.
    pub async fn create_account(&self) -> Result<Wallet, RpcError> {
        self.call("createAccount", Vec::new()).await
    }

    /// Build and sign a transaction without relaying it; returns the
    /// hex-encoded raw transaction.
    pub async fn create_raw_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, RpcError> {
        self.call("createRawTransaction", vec![transaction.to_param()])
            .await
    }

    pub async fn get_account(&self, address: &str) -> Result<Account, RpcError> {
        self.call("getAccount", vec![json!(address)]).await
    }

    /// Balance of an account in luna.
    pub async fn get_balance(&self, address: &str) -> Result<u64, RpcError> {
        self.call("getBalance", vec![json!(address)]).await
    }

    /// Fetch a block by hash. With `full_transactions` the node expands the
    /// block's transactions into full records instead of hashes.
    pub async fn get_block_by_hash(
        &self,
        hash: &str,
        full_transactions: bool,
    ) -> Result<Option<Block>, RpcError> {
        self.call("getBlockByHash", vec![json!(hash), json!(full_transactions)])
            .await
    }

    /// Fetch a block by height. See [`Client::get_block_by_hash`].
    pub async fn get_block_by_number(
        &self,
        number: u32,
        full_transactions: bool,
    ) -> Result<Option<Block>, RpcError> {
        self.call(
            "getBlockByNumber",
            vec![json!(number), json!(full_transactions)],
        )
        .await
    }

    /// Template for mining the next block on top of the current head.
    pub async fn get_block_template(
        &self,
        address: &str,
        extra_data: &str,
    ) -> Result<BlockTemplate, RpcError> {
        self.call("getBlockTemplate", vec![json!(address), json!(extra_data)])
            .await
    }

    pub async fn get_block_transaction_count_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<u32>, RpcError> {
        self.call("getBlockTransactionCountByHash", vec![json!(hash)])
            .await
    }

    pub async fn get_block_transaction_count_by_number(
        &self,
        number: u32,
    ) -> Result<Option<u32>, RpcError> {
        self.call("getBlockTransactionCountByNumber", vec![json!(number)])
            .await
    }

    pub async fn get_transaction_by_block_hash_and_index(
        &self,
        hash: &str,
        index: u32,
    ) -> Result<Option<Transaction>, RpcError> {
        self.call(
            "getTransactionByBlockHashAndIndex",
            vec![json!(hash), json!(index)],
        )
        .await
    }

    pub async fn get_transaction_by_block_number_and_index(
        &self,
        number: u32,
        index: u32,
    ) -> Result<Option<Transaction>, RpcError> {
        self.call(
            "getTransactionByBlockNumberAndIndex",
            vec![json!(number), json!(index)],
        )
        .await
    }

    pub async fn get_transaction_by_hash(
        &self,
        hash: &str,
    ) -> Result<Option<Transaction>, RpcError> {
        self.call("getTransactionByHash", vec![json!(hash)]).await
    }

    pub async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, RpcError> {
        self.call("getTransactionReceipt", vec![json!(hash)]).await
    }

    /// Latest transactions involving `address`, newest first, at most
    /// `limit` entries.
    pub async fn get_transactions_by_address(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<Transaction>, RpcError> {
        self.call(
            "getTransactionsByAddress",
            vec![json!(address), json!(limit)],
        )
        .await
    }

    /// Proof-of-work instructions for an external miner.
    pub async fn get_work(
        &self,
        address: &str,
        extra_data: &str,
    ) -> Result<WorkInstructions, RpcError> {
        self.call("getWork", vec![json!(address), json!(extra_data)])
            .await
    }

    /// Node hashrate in hashes per second.
    pub async fn hashrate(&self) -> Result<f64, RpcError> {
        self.call("hashrate", Vec::new()).await
    }

    /// Set the node's log level for `tag` (`"*"` for all tags).
    pub async fn log(&self, tag: &str, level: LogLevel) -> Result<bool, RpcError> {
        self.call("log", vec![json!(tag), json!(level.as_str())])
            .await
    }

    /// Mempool statistics with per-fee-bucket counts.
    pub async fn mempool(&self) -> Result<MempoolInfo, RpcError> {
        self.call("mempool", Vec::new()).await
    }

    /// Pending transactions, as hashes or full records depending on
    /// `full_transactions`. Each element resolves independently.
    pub async fn mempool_content(
        &self,
        full_transactions: bool,
    ) -> Result<Vec<HashOrTransaction>, RpcError> {
        self.call("mempoolContent", vec![json!(full_transactions)])
            .await
    }

    pub async fn miner_address(&self) -> Result<String, RpcError> {
        self.call("minerAddress", Vec::new()).await
    }

    /// Read the miner thread count, or set it when `threads` is given.
    pub async fn miner_threads(&self, threads: Option<u32>) -> Result<u32, RpcError> {
        let params = threads.map(|t| vec![json!(t)]).unwrap_or_default();
        self.call("minerThreads", params).await
    }

    /// Read the minimum fee per byte, or set it when `fee` is given.
    pub async fn min_fee_per_byte(&self, fee: Option<u64>) -> Result<u64, RpcError> {
        let params = fee.map(|f| vec![json!(f)]).unwrap_or_default();
        self.call("minFeePerByte", params).await
    }

    /// Whether the node is currently mining.
    pub async fn mining(&self) -> Result<bool, RpcError> {
        self.call("mining", Vec::new()).await
    }

    pub async fn peer_count(&self) -> Result<u32, RpcError> {
        self.call("peerCount", Vec::new()).await
    }

    pub async fn peer_list(&self) -> Result<Vec<Peer>, RpcError> {
        self.call("peerList", Vec::new()).await
    }

    pub async fn peer_state(&self, address: &str) -> Result<Peer, RpcError> {
        self.call("peerState", vec![json!(address)]).await
    }

    /// Read the mining pool in use, or change it when `setting` is given.
    /// Returns the pool address, or `None` when no pool is configured.
    pub async fn pool(&self, setting: Option<&PoolSetting>) -> Result<Option<String>, RpcError> {
        let params = setting.map(|s| vec![s.to_param()]).unwrap_or_default();
        self.call("pool", params).await
    }

    /// Pool balance confirmed for payout, in luna.
    pub async fn pool_confirmed_balance(&self) -> Result<u64, RpcError> {
        self.call("poolConfirmedBalance", Vec::new()).await
    }

    pub async fn pool_connection_state(&self) -> Result<PoolConnectionState, RpcError> {
        self.call("poolConnectionState", Vec::new()).await
    }

    /// Relay a signed raw transaction; returns its hash.
    pub async fn send_raw_transaction(&self, raw: &str) -> Result<String, RpcError> {
        self.call("sendRawTransaction", vec![json!(raw)]).await
    }

    /// Build, sign, and relay a transaction; returns its hash.
    pub async fn send_transaction(
        &self,
        transaction: &OutgoingTransaction,
    ) -> Result<String, RpcError> {
        self.call("sendTransaction", vec![transaction.to_param()])
            .await
    }

    /// Submit a mined block, hex-encoded.
    pub async fn submit_block(&self, block: &str) -> Result<(), RpcError> {
        self.call("submitBlock", vec![json!(block)]).await
    }

    /// Sync progress while the node is catching up, a flag otherwise.
    pub async fn syncing(&self) -> Result<Syncing, RpcError> {
        self.call("syncing", Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::mock::MockTransport;
    use crate::types::{BlockTransactions, HashOrTransaction, Syncing};

    use super::*;

    #[tokio::test]
    async fn block_number_wrapper_queries_the_node() {
        let mock = Arc::new(MockTransport::builder().with_result(json!(4242)).build());
        let client = crate::Client::with_transport(Arc::clone(&mock));

        let height = client.block_number().await.expect("call succeeds");
        assert_eq!(height, 4242);
        assert_eq!(mock.requests()[0]["method"], "blockNumber");
    }

    #[tokio::test]
    async fn get_block_by_hash_sends_flag_and_decodes_hashes() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!({
                    "number": 1,
                    "hash": "h",
                    "pow": "p",
                    "parentHash": "pp",
                    "nonce": 0,
                    "bodyHash": "b",
                    "accountsHash": "a",
                    "difficulty": "1",
                    "timestamp": 0,
                    "confirmations": 1,
                    "miner": "m",
                    "minerAddress": "ma",
                    "extraData": "",
                    "size": 0,
                    "transactions": ["t1", "t2"]
                }))
                .build(),
        );
        let client = Client::with_transport(Arc::clone(&mock));

        let block = client
            .get_block_by_hash("h", false)
            .await
            .expect("call succeeds")
            .expect("block is present");
        assert_eq!(
            block.transactions,
            BlockTransactions::Hashes(vec!["t1".to_owned(), "t2".to_owned()])
        );

        let requests = mock.requests();
        assert_eq!(requests[0]["method"], "getBlockByHash");
        assert_eq!(requests[0]["params"], json!(["h", false]));
    }

    #[tokio::test]
    async fn mempool_content_resolves_elements_independently() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!(["aaaa", "bbbb"]))
                .build(),
        );
        let client = Client::with_transport(Arc::clone(&mock));

        let content = client
            .mempool_content(false)
            .await
            .expect("call succeeds");
        assert_eq!(
            content,
            vec![
                HashOrTransaction::Hash("aaaa".to_owned()),
                HashOrTransaction::Hash("bbbb".to_owned()),
            ]
        );
        assert_eq!(mock.requests()[0]["params"], json!([false]));
    }

    #[tokio::test]
    async fn syncing_wrapper_decodes_flag() {
        let mock = Arc::new(MockTransport::builder().with_result(json!(false)).build());
        let client = Client::with_transport(Arc::clone(&mock));

        let state = client.syncing().await.expect("call succeeds");
        assert_eq!(state, Syncing::Flag(false));
    }

    #[tokio::test]
    async fn optional_setter_methods_omit_absent_params() {
        let mock = Arc::new(
            MockTransport::builder()
                .with_result(json!(2))
                .with_result(json!(4))
                .build(),
        );
        let client = Client::with_transport(Arc::clone(&mock));

        let current = client.miner_threads(None).await.expect("read succeeds");
        assert_eq!(current, 2);
        let updated = client.miner_threads(Some(4)).await.expect("set succeeds");
        assert_eq!(updated, 4);

        let requests = mock.requests();
        assert_eq!(requests[0]["params"], json!([]));
        assert_eq!(requests[1]["params"], json!([4]));
    }
}
