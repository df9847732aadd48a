mod db;
mod diskdb;
mod memorydb;
mod overlaydb;
mod transaction;

pub use self::db::KeyValueDatabase;
pub use self::diskdb::DiskDatabase;
pub use self::memorydb::MemoryDatabase;
pub use self::overlaydb::OverlayDatabase;
pub use self::transaction::{
    Key, KeyState, KeyValue, Location, Operation, RawKey, RawKeyValue, RawOperation,
    RawTransaction, Transaction, Value, COL_BLOCK_MAP, COL_BLOCK_PATH, COL_COUNT,
    COL_DELAYED_OUTPUTS, COL_FILE_CONTRACTS, COL_FILE_CONTRACT_EXPIRATIONS, COL_META,
    COL_SIACOIN_OUTPUTS, COL_SIAFUND_OUTPUTS, COL_SIAFUND_POOL,
};
