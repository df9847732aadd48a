use chain::{
    BlockId, Currency, FileContract, FileContractId, Height, SiacoinOutput, SiacoinOutputId,
    SiafundOutput, SiafundOutputId,
};
use primitives::Bytes;
use ser::{deserialize, serialize, Error as ReaderError};
use storage::ProcessedBlock;

/// Database column.
pub type Location = u32;

pub const COL_META: Location = 0;
pub const COL_BLOCK_MAP: Location = 1;
pub const COL_BLOCK_PATH: Location = 2;
pub const COL_SIACOIN_OUTPUTS: Location = 3;
pub const COL_FILE_CONTRACTS: Location = 4;
pub const COL_SIAFUND_OUTPUTS: Location = 5;
pub const COL_SIAFUND_POOL: Location = 6;
pub const COL_DELAYED_OUTPUTS: Location = 7;
pub const COL_FILE_CONTRACT_EXPIRATIONS: Location = 8;
pub const COL_COUNT: u32 = 9;

const KEY_SIAFUND_POOL: &[u8] = b"pool";

/// Typed key into one of the columns.
///
/// Path and bucket keys use big-endian heights so that lexicographic key
/// order equals numeric height order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Meta(&'static str),
    Block(BlockId),
    BlockPath(Height),
    SiacoinOutput(SiacoinOutputId),
    FileContract(FileContractId),
    SiafundOutput(SiafundOutputId),
    SiafundPool,
    DelayedOutput(Height, SiacoinOutputId),
    /// Marker recording that the delayed bucket for a height exists.
    DelayedBucket(Height),
    FileContractExpiration(Height, FileContractId),
}

/// Typed key plus the value inserted under it.
#[derive(Debug, Clone)]
pub enum KeyValue {
    Meta(&'static str, Bytes),
    Block(BlockId, ProcessedBlock),
    BlockPath(Height, BlockId),
    SiacoinOutput(SiacoinOutputId, SiacoinOutput),
    FileContract(FileContractId, FileContract),
    SiafundOutput(SiafundOutputId, SiafundOutput),
    SiafundPool(Currency),
    DelayedOutput(Height, SiacoinOutputId, SiacoinOutput),
    DelayedBucket(Height),
    FileContractExpiration(Height, FileContractId),
}

/// Typed value read back from a column.
#[derive(Debug, Clone)]
pub enum Value {
    Meta(Bytes),
    Block(ProcessedBlock),
    BlockPath(BlockId),
    SiacoinOutput(SiacoinOutput),
    FileContract(FileContract),
    SiafundOutput(SiafundOutput),
    SiafundPool(Currency),
    DelayedOutput(SiacoinOutput),
    DelayedBucket,
    FileContractExpiration,
}

impl Value {
    pub fn for_key(key: &Key, bytes: &[u8]) -> Result<Value, ReaderError> {
        match *key {
            Key::Meta(_) => Ok(Value::Meta(bytes.into())),
            Key::Block(_) => deserialize(bytes).map(Value::Block),
            Key::BlockPath(_) => deserialize(bytes).map(Value::BlockPath),
            Key::SiacoinOutput(_) => deserialize(bytes).map(Value::SiacoinOutput),
            Key::FileContract(_) => deserialize(bytes).map(Value::FileContract),
            Key::SiafundOutput(_) => deserialize(bytes).map(Value::SiafundOutput),
            Key::SiafundPool => deserialize(bytes).map(Value::SiafundPool),
            Key::DelayedOutput(_, _) => deserialize(bytes).map(Value::DelayedOutput),
            Key::DelayedBucket(_) => Ok(Value::DelayedBucket),
            Key::FileContractExpiration(_, _) => Ok(Value::FileContractExpiration),
        }
    }

    pub fn as_meta(self) -> Option<Bytes> {
        match self {
            Value::Meta(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_block(self) -> Option<ProcessedBlock> {
        match self {
            Value::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_block_path(self) -> Option<BlockId> {
        match self {
            Value::BlockPath(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_siacoin_output(self) -> Option<SiacoinOutput> {
        match self {
            Value::SiacoinOutput(output) => Some(output),
            _ => None,
        }
    }

    pub fn as_file_contract(self) -> Option<FileContract> {
        match self {
            Value::FileContract(contract) => Some(contract),
            _ => None,
        }
    }

    pub fn as_siafund_output(self) -> Option<SiafundOutput> {
        match self {
            Value::SiafundOutput(output) => Some(output),
            _ => None,
        }
    }

    pub fn as_siafund_pool(self) -> Option<Currency> {
        match self {
            Value::SiafundPool(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_delayed_output(self) -> Option<SiacoinOutput> {
        match self {
            Value::DelayedOutput(output) => Some(output),
            _ => None,
        }
    }
}

/// State of a key in a database or an overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyState<V> {
    Insert(V),
    Delete,
    Unknown,
}

impl<V> Default for KeyState<V> {
    fn default() -> Self {
        KeyState::Unknown
    }
}

impl<V> KeyState<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            KeyState::Insert(value) => Some(value),
            KeyState::Delete => None,
            KeyState::Unknown => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Operation {
    Insert(KeyValue),
    Delete(Key),
}

#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub operations: Vec<Operation>,
}

impl Transaction {
    pub fn new() -> Self {
        Transaction::default()
    }

    pub fn insert(&mut self, insert: KeyValue) {
        self.operations.push(Operation::Insert(insert));
    }

    pub fn delete(&mut self, delete: Key) {
        self.operations.push(Operation::Delete(delete));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawKey {
    pub location: Location,
    pub key: Bytes,
}

impl RawKey {
    pub fn new<B>(location: Location, key: B) -> Self
    where
        B: Into<Bytes>,
    {
        RawKey {
            location,
            key: key.into(),
        }
    }
}

fn height_key(height: Height) -> Bytes {
    height.to_be_bytes()[..].into()
}

fn composite_key(height: Height, id: &[u8]) -> Bytes {
    let mut key = Bytes::new();
    key.append(&height.to_be_bytes());
    key.append(id);
    key
}

impl<'a> From<&'a Key> for RawKey {
    fn from(key: &'a Key) -> Self {
        match *key {
            Key::Meta(name) => RawKey::new(COL_META, name.as_bytes()),
            Key::Block(ref id) => RawKey::new(COL_BLOCK_MAP, id.as_ref()),
            Key::BlockPath(height) => RawKey::new(COL_BLOCK_PATH, height_key(height)),
            Key::SiacoinOutput(ref id) => RawKey::new(COL_SIACOIN_OUTPUTS, id.as_ref()),
            Key::FileContract(ref id) => RawKey::new(COL_FILE_CONTRACTS, id.as_ref()),
            Key::SiafundOutput(ref id) => RawKey::new(COL_SIAFUND_OUTPUTS, id.as_ref()),
            Key::SiafundPool => RawKey::new(COL_SIAFUND_POOL, KEY_SIAFUND_POOL),
            Key::DelayedOutput(height, ref id) => {
                RawKey::new(COL_DELAYED_OUTPUTS, composite_key(height, id.as_ref()))
            }
            Key::DelayedBucket(height) => RawKey::new(COL_DELAYED_OUTPUTS, height_key(height)),
            Key::FileContractExpiration(height, ref id) => RawKey::new(
                COL_FILE_CONTRACT_EXPIRATIONS,
                composite_key(height, id.as_ref()),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RawKeyValue {
    pub location: Location,
    pub key: Bytes,
    pub value: Bytes,
}

impl<'a> From<&'a KeyValue> for RawKeyValue {
    fn from(kv: &'a KeyValue) -> Self {
        let (raw_key, value) = match *kv {
            KeyValue::Meta(name, ref value) => {
                (RawKey::from(&Key::Meta(name)), value.clone())
            }
            KeyValue::Block(ref id, ref block) => {
                (RawKey::from(&Key::Block(*id)), serialize(block))
            }
            KeyValue::BlockPath(height, ref id) => {
                (RawKey::from(&Key::BlockPath(height)), serialize(id))
            }
            KeyValue::SiacoinOutput(ref id, ref output) => {
                (RawKey::from(&Key::SiacoinOutput(*id)), serialize(output))
            }
            KeyValue::FileContract(ref id, ref contract) => {
                (RawKey::from(&Key::FileContract(*id)), serialize(contract))
            }
            KeyValue::SiafundOutput(ref id, ref output) => {
                (RawKey::from(&Key::SiafundOutput(*id)), serialize(output))
            }
            KeyValue::SiafundPool(ref pool) => (RawKey::from(&Key::SiafundPool), serialize(pool)),
            KeyValue::DelayedOutput(height, ref id, ref output) => (
                RawKey::from(&Key::DelayedOutput(height, *id)),
                serialize(output),
            ),
            KeyValue::DelayedBucket(height) => {
                (RawKey::from(&Key::DelayedBucket(height)), Bytes::new())
            }
            KeyValue::FileContractExpiration(height, ref id) => (
                RawKey::from(&Key::FileContractExpiration(height, *id)),
                Bytes::new(),
            ),
        };

        RawKeyValue {
            location: raw_key.location,
            key: raw_key.key,
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RawOperation {
    Insert(RawKeyValue),
    Delete(RawKey),
}

#[derive(Debug, Clone, Default)]
pub struct RawTransaction {
    pub operations: Vec<RawOperation>,
}

impl RawTransaction {
    pub fn new() -> Self {
        RawTransaction::default()
    }

    pub fn insert_raw(&mut self, key: RawKey, value: Bytes) {
        self.operations.push(RawOperation::Insert(RawKeyValue {
            location: key.location,
            key: key.key,
            value,
        }));
    }

    pub fn delete_raw(&mut self, key: RawKey) {
        self.operations.push(RawOperation::Delete(key));
    }
}

impl From<Transaction> for RawTransaction {
    fn from(tx: Transaction) -> Self {
        RawTransaction {
            operations: tx
                .operations
                .iter()
                .map(|op| match *op {
                    Operation::Insert(ref kv) => RawOperation::Insert(kv.into()),
                    Operation::Delete(ref key) => RawOperation::Delete(key.into()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Key, RawKey, COL_DELAYED_OUTPUTS};
    use chain::SiacoinOutputId;
    use primitives::H256;

    #[test]
    fn test_path_keys_sort_numerically() {
        let low = RawKey::from(&Key::BlockPath(255));
        let high = RawKey::from(&Key::BlockPath(256));
        assert!(low < high);
    }

    #[test]
    fn test_bucket_marker_precedes_bucket_contents() {
        let id = SiacoinOutputId::from(H256::default());
        let marker = RawKey::from(&Key::DelayedBucket(7));
        let output = RawKey::from(&Key::DelayedOutput(7, id));
        assert_eq!(marker.location, COL_DELAYED_OUTPUTS);
        assert!(marker < output);
        assert!(output.key.starts_with(&marker.key));
    }
}
