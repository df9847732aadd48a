use crate::kv::db::KeyValueDatabase;
use crate::kv::{KeyState, Location, RawKey, RawOperation, RawTransaction};
use parking_lot::RwLock;
use primitives::Bytes;
use std::collections::BTreeMap;
use std::mem;

/// Buffers writes on top of another database.
///
/// Reads fall through to the backing database unless the overlay holds a
/// newer state for the key. Nothing reaches the backing database until
/// `flush`; dropping the overlay without flushing discards every buffered
/// write, which is what makes it usable as a transaction scope.
pub struct OverlayDatabase<'a, T>
where
    T: KeyValueDatabase,
{
    blackbox: &'a T,
    overlay: RwLock<BTreeMap<RawKey, KeyState<Bytes>>>,
}

impl<'a, T> OverlayDatabase<'a, T>
where
    T: KeyValueDatabase,
{
    pub fn new(blackbox: &'a T) -> Self {
        OverlayDatabase {
            blackbox,
            overlay: RwLock::new(BTreeMap::new()),
        }
    }

    /// Writes all buffered changes to the backing database as a single
    /// atomic transaction.
    pub fn flush(&self) -> Result<(), String> {
        let overlay = mem::take(&mut *self.overlay.write());
        let mut tx = RawTransaction::new();
        for (key, state) in overlay {
            match state {
                KeyState::Insert(value) => tx.insert_raw(key, value),
                KeyState::Delete => tx.delete_raw(key),
                KeyState::Unknown => (),
            }
        }
        self.blackbox.write_raw(tx)
    }
}

impl<'a, T> KeyValueDatabase for OverlayDatabase<'a, T>
where
    T: KeyValueDatabase,
{
    fn write_raw(&self, tx: RawTransaction) -> Result<(), String> {
        let mut overlay = self.overlay.write();
        for op in tx.operations {
            match op {
                RawOperation::Insert(kv) => {
                    overlay.insert(
                        RawKey::new(kv.location, kv.key),
                        KeyState::Insert(kv.value),
                    );
                }
                RawOperation::Delete(key) => {
                    overlay.insert(key, KeyState::Delete);
                }
            }
        }
        Ok(())
    }

    fn get_raw(&self, key: &RawKey) -> Result<KeyState<Bytes>, String> {
        match self.overlay.read().get(key) {
            Some(state) => Ok(state.clone()),
            None => self.blackbox.get_raw(key),
        }
    }

    fn iter(&self, location: Location, prefix: &[u8]) -> Result<Vec<(Bytes, Bytes)>, String> {
        let mut merged: BTreeMap<Bytes, Option<Bytes>> = self
            .blackbox
            .iter(location, prefix)?
            .into_iter()
            .map(|(key, value)| (key, Some(value)))
            .collect();

        let overlay = self.overlay.read();
        let start = RawKey::new(location, prefix);
        let range = overlay
            .range(start..)
            .take_while(|(key, _)| key.location == location && key.key.starts_with(prefix));
        for (key, state) in range {
            match *state {
                KeyState::Insert(ref value) => {
                    merged.insert(key.key.clone(), Some(value.clone()));
                }
                KeyState::Delete => {
                    merged.insert(key.key.clone(), None);
                }
                KeyState::Unknown => (),
            }
        }

        Ok(merged
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::OverlayDatabase;
    use crate::kv::{KeyState, KeyValueDatabase, MemoryDatabase, RawKey, RawTransaction};

    fn insert<T>(db: &T, location: u32, key: &[u8], value: &[u8])
    where
        T: KeyValueDatabase,
    {
        let mut tx = RawTransaction::new();
        tx.insert_raw(RawKey::new(location, key), value.into());
        db.write_raw(tx).unwrap();
    }

    #[test]
    fn test_overlay_is_invisible_until_flush() {
        let backing = MemoryDatabase::default();
        insert(&backing, 0, b"a", b"old");

        let overlay = OverlayDatabase::new(&backing);
        insert(&overlay, 0, b"a", b"new");
        insert(&overlay, 0, b"b", b"fresh");

        assert_eq!(
            overlay.get_raw(&RawKey::new(0, &b"a"[..])).unwrap(),
            KeyState::Insert(b"new"[..].into())
        );
        assert_eq!(
            backing.get_raw(&RawKey::new(0, &b"a"[..])).unwrap(),
            KeyState::Insert(b"old"[..].into())
        );

        overlay.flush().unwrap();
        assert_eq!(
            backing.get_raw(&RawKey::new(0, &b"a"[..])).unwrap(),
            KeyState::Insert(b"new"[..].into())
        );
        assert_eq!(
            backing.get_raw(&RawKey::new(0, &b"b"[..])).unwrap(),
            KeyState::Insert(b"fresh"[..].into())
        );
    }

    #[test]
    fn test_dropping_overlay_discards_writes() {
        let backing = MemoryDatabase::default();
        {
            let overlay = OverlayDatabase::new(&backing);
            insert(&overlay, 0, b"a", b"buffered");
        }
        assert_eq!(
            backing.get_raw(&RawKey::new(0, &b"a"[..])).unwrap(),
            KeyState::Unknown
        );
    }

    #[test]
    fn test_overlay_iter_merges_and_hides_deletes() {
        let backing = MemoryDatabase::default();
        insert(&backing, 0, b"a", b"1");
        insert(&backing, 0, b"c", b"3");

        let overlay = OverlayDatabase::new(&backing);
        insert(&overlay, 0, b"b", b"2");
        let mut tx = RawTransaction::new();
        tx.delete_raw(RawKey::new(0, &b"c"[..]));
        overlay.write_raw(tx).unwrap();

        let keys: Vec<_> = overlay
            .iter(0, b"")
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec![b"a"[..].into(), b"b"[..].into()]);
    }
}
