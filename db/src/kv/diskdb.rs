use crate::kv::db::KeyValueDatabase;
use crate::kv::{KeyState, Location, RawKey, RawOperation, RawTransaction, COL_COUNT};
use primitives::Bytes;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

const COLUMN_NAMES: [&str; COL_COUNT as usize] = [
    "meta",
    "block_map",
    "block_path",
    "siacoin_outputs",
    "file_contracts",
    "siafund_outputs",
    "siafund_pool",
    "delayed_outputs",
    "file_contract_expirations",
];

/// RocksDB-backed database with one column family per bucket.
pub struct DiskDatabase {
    db: DB,
}

impl DiskDatabase {
    pub fn open<P>(path: P) -> Result<Self, String>
    where
        P: AsRef<Path>,
    {
        let mut options = Options::default();
        options.create_if_missing(true);
        options.create_missing_column_families(true);

        let descriptors = COLUMN_NAMES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&options, path, descriptors)
            .map_err(|err| err.to_string())?;
        Ok(DiskDatabase { db })
    }

    fn column(&self, location: Location) -> &ColumnFamily {
        self.db
            .cf_handle(COLUMN_NAMES[location as usize])
            .expect("all column families are created at open; qed")
    }
}

impl KeyValueDatabase for DiskDatabase {
    fn write_raw(&self, tx: RawTransaction) -> Result<(), String> {
        let mut batch = WriteBatch::default();
        for op in tx.operations {
            match op {
                RawOperation::Insert(kv) => {
                    batch.put_cf(self.column(kv.location), &kv.key, &kv.value)
                }
                RawOperation::Delete(key) => batch.delete_cf(self.column(key.location), &key.key),
            }
        }
        self.db.write(batch).map_err(|err| err.to_string())
    }

    fn get_raw(&self, key: &RawKey) -> Result<KeyState<Bytes>, String> {
        match self
            .db
            .get_cf(self.column(key.location), &key.key)
            .map_err(|err| err.to_string())?
        {
            Some(value) => Ok(KeyState::Insert(value.into())),
            None => Ok(KeyState::Unknown),
        }
    }

    fn iter(&self, location: Location, prefix: &[u8]) -> Result<Vec<(Bytes, Bytes)>, String> {
        let mut result = Vec::new();
        let iter = self.db.iterator_cf(
            self.column(location),
            IteratorMode::From(prefix, Direction::Forward),
        );
        for item in iter {
            let (key, value) = item.map_err(|err| err.to_string())?;
            if !key.starts_with(prefix) {
                break;
            }
            result.push((key.to_vec().into(), value.to_vec().into()));
        }
        Ok(result)
    }
}
