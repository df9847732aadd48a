use crate::kv::{Key, KeyState, Location, RawKey, RawTransaction, Transaction, Value};
use primitives::Bytes;

/// Transactional key-value store.
///
/// A write applies every operation of the transaction atomically; readers
/// never observe a prefix of it.
pub trait KeyValueDatabase: Send + Sync {
    fn write(&self, tx: Transaction) -> Result<(), String> {
        self.write_raw(tx.into())
    }

    fn write_raw(&self, tx: RawTransaction) -> Result<(), String>;

    fn get(&self, key: &Key) -> Result<KeyState<Value>, String> {
        match self.get_raw(&key.into())? {
            KeyState::Insert(bytes) => {
                let value = Value::for_key(key, &bytes)
                    .map_err(|_| format!("unreadable value under {:?}", key))?;
                Ok(KeyState::Insert(value))
            }
            KeyState::Delete => Ok(KeyState::Delete),
            KeyState::Unknown => Ok(KeyState::Unknown),
        }
    }

    fn get_raw(&self, key: &RawKey) -> Result<KeyState<Bytes>, String>;

    /// Key-ordered contents of a column, restricted to keys that start
    /// with `prefix`.
    fn iter(&self, location: Location, prefix: &[u8]) -> Result<Vec<(Bytes, Bytes)>, String>;
}
