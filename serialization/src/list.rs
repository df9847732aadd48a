use crate::reader::{Deserializable, Error, Reader};
use crate::stream::{Serializable, Stream};
use primitives::Bytes;
use std::io;

impl<S> Serializable for Vec<S>
where
    S: Serializable,
{
    fn serialize(&self, s: &mut Stream) {
        s.append_list(self);
    }

    fn serialized_size(&self) -> usize {
        8 + self.iter().map(Serializable::serialized_size).sum::<usize>()
    }
}

impl<D> Deserializable for Vec<D>
where
    D: Deserializable,
{
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        reader.read_list()
    }
}

pub fn serialize_list<S>(t: &[S]) -> Bytes
where
    S: Serializable,
{
    let mut stream = Stream::default();
    stream.append_list(t);
    stream.out()
}

pub fn serialized_list_size<S>(t: &[S]) -> usize
where
    S: Serializable,
{
    8 + t.iter().map(Serializable::serialized_size).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::serialize_list;
    use crate::deserialize;

    #[test]
    fn test_list_roundtrip_preserves_order() {
        let list = vec![3u64, 1, 2];
        let serialized = serialize_list(&list);
        assert_eq!(serialized.len(), 8 + 3 * 8);
        assert_eq!(list, deserialize::<Vec<u64>>(&serialized).unwrap());
    }
}
