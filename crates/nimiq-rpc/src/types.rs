//! Domain types returned by the Nimiq node RPC API and their decoders.
//!
//! All records decode manually through [`Record`] so that absent fields and
//! wrong-kind fields stay distinguishable. Polymorphic results
//! ([`HashOrTransaction`], [`Syncing`], [`BlockTransactions`]) carry a fixed
//! candidate order and fall back only on a shape mismatch; a missing field
//! inside a candidate is a hard failure.

use std::collections::HashMap;

use serde_json::Value;

use crate::decode::{mismatch, FromJson, Record};
use crate::error::{DecodeError, RpcError};

// ==============================================================================
// Accounts and wallets
// ==============================================================================

/// A basic account as returned by `accounts` and `getAccount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub address: String,
    /// Balance in luna (the smallest unit).
    pub balance: u64,
    pub account_type: u8,
}

impl FromJson for Account {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "account")?;
        Ok(Self {
            id: record.str_field("id")?,
            address: record.str_field("address")?,
            balance: record.uint_field("balance")?,
            account_type: record.uint_field("type")?,
        })
    }
}

/// A wallet account with key material, as returned by `createAccount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wallet {
    pub id: String,
    pub address: String,
    pub public_key: String,
    /// Only present when the node is configured to expose it.
    pub private_key: Option<String>,
}

impl FromJson for Wallet {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "wallet")?;
        Ok(Self {
            id: record.str_field("id")?,
            address: record.str_field("address")?,
            public_key: record.str_field("publicKey")?,
            private_key: record.opt_str_field("privateKey")?,
        })
    }
}

// ==============================================================================
// Transactions
// ==============================================================================

/// A transaction to be signed and sent by the node, for `sendTransaction`
/// and `createRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingTransaction {
    pub from: String,
    pub from_type: Option<u8>,
    pub to: String,
    pub to_type: Option<u8>,
    /// Value in luna.
    pub value: u64,
    /// Fee in luna.
    pub fee: u64,
    /// Hex-encoded extra data.
    pub data: Option<String>,
}

impl OutgoingTransaction {
    /// The single positional parameter object these methods take.
    /// Optional fields are omitted rather than sent as null.
    pub(crate) fn to_param(&self) -> Value {
        let mut fields = serde_json::Map::new();
        fields.insert("from".to_owned(), Value::from(self.from.clone()));
        fields.insert("to".to_owned(), Value::from(self.to.clone()));
        fields.insert("value".to_owned(), Value::from(self.value));
        fields.insert("fee".to_owned(), Value::from(self.fee));
        if let Some(from_type) = self.from_type {
            fields.insert("fromType".to_owned(), Value::from(from_type));
        }
        if let Some(to_type) = self.to_type {
            fields.insert("toType".to_owned(), Value::from(to_type));
        }
        if let Some(ref data) = self.data {
            fields.insert("data".to_owned(), Value::from(data.clone()));
        }
        Value::Object(fields)
    }
}

/// A confirmed or pending transaction.
///
/// Block-related fields are absent while the transaction is still in the
/// mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub block_hash: Option<String>,
    pub block_number: Option<u32>,
    pub timestamp: Option<u64>,
    pub confirmations: Option<u32>,
    pub transaction_index: Option<u32>,
    /// Sender public key.
    pub from: String,
    pub from_address: String,
    /// Recipient account hash.
    pub to: String,
    pub to_address: String,
    pub value: u64,
    pub fee: u64,
    pub data: Option<String>,
    pub flags: u8,
}

impl FromJson for Transaction {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "transaction")?;
        Ok(Self {
            hash: record.str_field("hash")?,
            block_hash: record.opt_str_field("blockHash")?,
            block_number: record.opt_uint_field("blockNumber")?,
            timestamp: record.opt_uint_field("timestamp")?,
            confirmations: record.opt_uint_field("confirmations")?,
            transaction_index: record.opt_uint_field("transactionIndex")?,
            from: record.str_field("from")?,
            from_address: record.str_field("fromAddress")?,
            to: record.str_field("to")?,
            to_address: record.str_field("toAddress")?,
            value: record.uint_field("value")?,
            fee: record.uint_field("fee")?,
            data: record.opt_str_field("data")?,
            flags: record.uint_field("flags")?,
        })
    }
}

/// A mempool or block entry that is either a bare transaction hash or a
/// fully expanded transaction, depending on the `fullTransactions` flag the
/// request was made with.
///
/// The decoder does not consult that flag: it tries the full record first
/// and falls back to the hash form only on a shape mismatch, so each list
/// element resolves independently.
#[derive(Debug, Clone, PartialEq)]
pub enum HashOrTransaction {
    Hash(String),
    Transaction(Transaction),
}

impl FromJson for HashOrTransaction {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        match Transaction::from_json(value) {
            Ok(tx) => Ok(Self::Transaction(tx)),
            Err(RpcError::Decode(DecodeError::TypeMismatch { .. })) => match value.as_str() {
                Some(hash) => Ok(Self::Hash(hash.to_owned())),
                None => Err(RpcError::Protocol {
                    context: "hash-or-transaction",
                }),
            },
            Err(other) => Err(other),
        }
    }
}

/// A transaction inclusion receipt from `getTransactionReceipt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub transaction_index: u32,
    pub block_hash: String,
    pub block_number: u32,
    pub confirmations: u32,
    pub timestamp: u64,
}

impl FromJson for TransactionReceipt {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "transaction receipt")?;
        Ok(Self {
            transaction_hash: record.str_field("transactionHash")?,
            transaction_index: record.uint_field("transactionIndex")?,
            block_hash: record.str_field("blockHash")?,
            block_number: record.uint_field("blockNumber")?,
            confirmations: record.uint_field("confirmations")?,
            timestamp: record.uint_field("timestamp")?,
        })
    }
}

// ==============================================================================
// Blocks
// ==============================================================================

/// The `transactions` field of a [`Block`]: bare hashes or full records,
/// decided server-side by the `fullTransactions` request flag.
///
/// The decoder is shape-agnostic and tries the richer shape first. The two
/// shapes never mix within one response.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockTransactions {
    Hashes(Vec<String>),
    Full(Vec<Transaction>),
}

impl BlockTransactions {
    pub fn len(&self) -> usize {
        match self {
            Self::Hashes(hashes) => hashes.len(),
            Self::Full(txs) => txs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromJson for BlockTransactions {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        match Vec::<Transaction>::from_json(value) {
            Ok(full) => Ok(Self::Full(full)),
            Err(RpcError::Decode(DecodeError::TypeMismatch { .. })) => {
                match Vec::<String>::from_json(value) {
                    Ok(hashes) => Ok(Self::Hashes(hashes)),
                    Err(RpcError::Decode(DecodeError::TypeMismatch { .. })) => {
                        Err(RpcError::Protocol {
                            context: "block transactions",
                        })
                    }
                    Err(other) => Err(other),
                }
            }
            Err(other) => Err(other),
        }
    }
}

/// A full block as returned by `getBlockByHash` and `getBlockByNumber`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub number: u32,
    pub hash: String,
    pub pow: String,
    pub parent_hash: String,
    pub nonce: u64,
    pub body_hash: String,
    pub accounts_hash: String,
    pub difficulty: String,
    pub timestamp: u64,
    pub confirmations: u32,
    /// Miner public key.
    pub miner: String,
    pub miner_address: String,
    pub extra_data: String,
    pub size: u64,
    pub transactions: BlockTransactions,
}

impl FromJson for Block {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "block")?;
        Ok(Self {
            number: record.uint_field("number")?,
            hash: record.str_field("hash")?,
            pow: record.str_field("pow")?,
            parent_hash: record.str_field("parentHash")?,
            nonce: record.uint_field("nonce")?,
            body_hash: record.str_field("bodyHash")?,
            accounts_hash: record.str_field("accountsHash")?,
            difficulty: record.str_field("difficulty")?,
            timestamp: record.uint_field("timestamp")?,
            confirmations: record.uint_field("confirmations")?,
            miner: record.str_field("miner")?,
            miner_address: record.str_field("minerAddress")?,
            extra_data: record.str_field("extraData")?,
            size: record.uint_field("size")?,
            transactions: BlockTransactions::from_json(record.field("transactions")?)?,
        })
    }
}

/// Header part of a mining block template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplateHeader {
    pub version: u32,
    pub prev_hash: String,
    pub interlink_hash: String,
    pub accounts_hash: String,
    pub n_bits: u32,
    pub height: u32,
}

impl FromJson for BlockTemplateHeader {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "block template header")?;
        Ok(Self {
            version: record.uint_field("version")?,
            prev_hash: record.str_field("prevHash")?,
            interlink_hash: record.str_field("interlinkHash")?,
            accounts_hash: record.str_field("accountsHash")?,
            n_bits: record.uint_field("nBits")?,
            height: record.uint_field("height")?,
        })
    }
}

/// Body part of a mining block template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplateBody {
    pub hash: String,
    pub miner_addr: String,
    pub extra_data: String,
    pub transactions: Vec<String>,
    pub pruned_accounts: Vec<String>,
    pub merkle_hashes: Vec<String>,
}

impl FromJson for BlockTemplateBody {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "block template body")?;
        Ok(Self {
            hash: record.str_field("hash")?,
            miner_addr: record.str_field("minerAddr")?,
            extra_data: record.str_field("extraData")?,
            transactions: record.seq_field("transactions")?,
            pruned_accounts: record.seq_field("prunedAccounts")?,
            merkle_hashes: record.seq_field("merkleHashes")?,
        })
    }
}

/// A block template for external miners, from `getBlockTemplate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTemplate {
    pub header: BlockTemplateHeader,
    pub interlink: String,
    pub body: BlockTemplateBody,
    pub target: u64,
}

impl FromJson for BlockTemplate {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "block template")?;
        Ok(Self {
            header: BlockTemplateHeader::from_json(record.field("header")?)?,
            interlink: record.str_field("interlink")?,
            body: BlockTemplateBody::from_json(record.field("body")?)?,
            target: record.uint_field("target")?,
        })
    }
}

/// Proof-of-work instructions for an external miner, from `getWork`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkInstructions {
    /// Hex-encoded block header prefix.
    pub data: String,
    /// Hex-encoded block suffix.
    pub suffix: String,
    pub target: u64,
    pub algorithm: String,
}

impl FromJson for WorkInstructions {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "work instructions")?;
        Ok(Self {
            data: record.str_field("data")?,
            suffix: record.str_field("suffix")?,
            target: record.uint_field("target")?,
            algorithm: record.str_field("algorithm")?,
        })
    }
}

// ==============================================================================
// Mempool
// ==============================================================================

/// Mempool statistics from `mempool`.
///
/// Next to the fixed `total` and `buckets` fields the node reports one
/// counter per occupied fee bucket, keyed by the stringified bucket boundary
/// (`"10000": 3`). Which buckets appear is only known at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolInfo {
    /// Total number of pending transactions.
    pub total: u64,
    /// Fee-per-byte bucket boundaries in use.
    pub buckets: Vec<u64>,
    /// Pending transaction count per bucket boundary. No ordering guarantee.
    pub transactions_per_bucket: HashMap<u64, u64>,
}

impl FromJson for MempoolInfo {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "mempool info")?;
        let total = record.uint_field("total")?;
        let buckets = record.seq_field("buckets")?;

        let mut transactions_per_bucket = HashMap::new();
        for (key, entry) in record.entries() {
            if key == "total" || key == "buckets" {
                continue;
            }
            // Keys that do not parse as an integer are not bucket counters
            // and are skipped; a non-integer value under a bucket key is a
            // decode failure.
            let Ok(boundary) = key.parse::<u64>() else {
                continue;
            };
            let count = entry.as_u64().ok_or_else(|| {
                mismatch(
                    format!("{}.{}", record.context(), key),
                    "unsigned integer",
                    entry,
                )
            })?;
            transactions_per_bucket.insert(boundary, count);
        }

        Ok(Self {
            total,
            buckets,
            transactions_per_bucket,
        })
    }
}

// ==============================================================================
// Peers
// ==============================================================================

/// Connection lifecycle of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New = 1,
    Connecting = 2,
    Connected = 3,
    Negotiating = 4,
    Established = 5,
    Closed = 6,
}

impl PeerConnectionState {
    fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::New),
            2 => Some(Self::Connecting),
            3 => Some(Self::Connected),
            4 => Some(Self::Negotiating),
            5 => Some(Self::Established),
            6 => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A known peer, from `peerList` and `peerState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: String,
    pub address: String,
    pub address_state: u8,
    pub connection_state: Option<PeerConnectionState>,
    pub version: Option<u32>,
    pub time_offset: Option<i64>,
    pub head_hash: Option<String>,
    pub latency: Option<u64>,
    pub rx: Option<u64>,
    pub tx: Option<u64>,
}

impl FromJson for Peer {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "peer")?;
        let connection_state = match record.opt_uint_field::<u64>("connectionState")? {
            None => None,
            Some(code) => Some(PeerConnectionState::from_code(code).ok_or_else(|| {
                DecodeError::TypeMismatch {
                    context: "peer.connectionState".to_owned(),
                    expected: "connection state code 1-6",
                    found: format!("number {code}"),
                }
            })?),
        };
        Ok(Self {
            id: record.str_field("id")?,
            address: record.str_field("address")?,
            address_state: record.uint_field("addressState")?,
            connection_state,
            version: record.opt_uint_field("version")?,
            time_offset: record.opt_i64_field("timeOffset")?,
            head_hash: record.opt_str_field("headHash")?,
            latency: record.opt_uint_field("latency")?,
            rx: record.opt_uint_field("rx")?,
            tx: record.opt_uint_field("tx")?,
        })
    }
}

// ==============================================================================
// Mining pool
// ==============================================================================

/// Connection state of the mining pool, from `poolConnectionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolConnectionState {
    Connected = 0,
    Connecting = 1,
    Closed = 2,
}

impl FromJson for PoolConnectionState {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let code = value
            .as_u64()
            .ok_or_else(|| mismatch("pool connection state", "number", value))?;
        match code {
            0 => Ok(Self::Connected),
            1 => Ok(Self::Connecting),
            2 => Ok(Self::Closed),
            other => Err(DecodeError::TypeMismatch {
                context: "pool connection state".to_owned(),
                expected: "state code 0-2",
                found: format!("number {other}"),
            }
            .into()),
        }
    }
}

/// Argument to the `pool` method: point the node at a pool address or
/// toggle the existing connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolSetting {
    Address(String),
    Enabled(bool),
}

impl PoolSetting {
    pub(crate) fn to_param(&self) -> Value {
        match self {
            Self::Address(address) => Value::from(address.clone()),
            Self::Enabled(enabled) => Value::from(*enabled),
        }
    }
}

// ==============================================================================
// Sync state
// ==============================================================================

/// Chain sync progress, the structured alternative of [`Syncing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub starting_block: u32,
    pub current_block: u32,
    pub highest_block: u32,
}

impl FromJson for SyncStatus {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        let record = Record::open(value, "sync status")?;
        Ok(Self {
            starting_block: record.uint_field("startingBlock")?,
            current_block: record.uint_field("currentBlock")?,
            highest_block: record.uint_field("highestBlock")?,
        })
    }
}

/// Result of `syncing`: a progress record while the node is syncing, a bare
/// boolean otherwise. The structured shape is tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syncing {
    Status(SyncStatus),
    Flag(bool),
}

impl FromJson for Syncing {
    fn from_json(value: &Value) -> Result<Self, RpcError> {
        match SyncStatus::from_json(value) {
            Ok(status) => Ok(Self::Status(status)),
            Err(RpcError::Decode(DecodeError::TypeMismatch { .. })) => match value.as_bool() {
                Some(flag) => Ok(Self::Flag(flag)),
                None => Err(RpcError::Protocol { context: "syncing" }),
            },
            Err(other) => Err(other),
        }
    }
}

// ==============================================================================
// Logging
// ==============================================================================

/// Log level accepted by the node's `log` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Assert => "assert",
        }
    }
}
