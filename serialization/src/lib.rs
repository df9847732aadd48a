//! Stable binary encoding for persisted consensus objects.
//!
//! Integers are little-endian fixed width, variable-length items carry an
//! 8-byte length prefix and lists an 8-byte element count. The byte
//! sequences produced here are normative; on-disk state must be portable
//! between implementations.

mod impls;
mod list;
mod reader;
mod stream;

pub use primitives::{bytes, hash};

pub use crate::list::{serialize_list, serialized_list_size};
pub use crate::reader::{deserialize, Deserializable, Error, Reader};
pub use crate::stream::{serialize, Serializable, Stream};
