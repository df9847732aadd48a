use crate::kv::db::KeyValueDatabase;
use crate::kv::{KeyState, Location, RawKey, RawOperation, RawTransaction};
use parking_lot::RwLock;
use primitives::Bytes;
use std::collections::BTreeMap;

/// Ephemeral in-memory database. Used in tests and as the overlay
/// backing store.
#[derive(Default)]
pub struct MemoryDatabase {
    map: RwLock<BTreeMap<RawKey, Bytes>>,
}

impl KeyValueDatabase for MemoryDatabase {
    fn write_raw(&self, tx: RawTransaction) -> Result<(), String> {
        let mut map = self.map.write();
        for op in tx.operations {
            match op {
                RawOperation::Insert(kv) => {
                    map.insert(RawKey::new(kv.location, kv.key), kv.value);
                }
                RawOperation::Delete(key) => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn get_raw(&self, key: &RawKey) -> Result<KeyState<Bytes>, String> {
        match self.map.read().get(key) {
            Some(value) => Ok(KeyState::Insert(value.clone())),
            None => Ok(KeyState::Unknown),
        }
    }

    fn iter(&self, location: Location, prefix: &[u8]) -> Result<Vec<(Bytes, Bytes)>, String> {
        let start = RawKey::new(location, prefix);
        Ok(self
            .map
            .read()
            .range(start..)
            .take_while(|(key, _)| key.location == location && key.key.starts_with(prefix))
            .map(|(key, value)| (key.key.clone(), value.clone()))
            .collect())
    }
}
