//! Stream used for serialization of consensus objects.

use primitives::Bytes;

/// Objects with a canonical byte representation.
pub trait Serializable {
    /// Serialize the struct and appends it to the end of stream.
    fn serialize(&self, s: &mut Stream);

    /// Hint about the size of serialized struct.
    fn serialized_size(&self) -> usize;
}

/// Stream used for serialization of consensus objects.
#[derive(Default)]
pub struct Stream {
    buffer: Bytes,
}

impl Stream {
    /// New stream
    pub fn new() -> Self {
        Stream::default()
    }

    /// Serializes the struct and appends it to the end of stream.
    pub fn append<T>(&mut self, t: &T) -> &mut Self
    where
        T: Serializable,
    {
        t.serialize(self);
        self
    }

    /// Appends raw bytes to the end of the stream, without a length prefix.
    pub fn append_slice(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.append(bytes);
        self
    }

    /// Appends an 8-byte element count followed by every list element.
    pub fn append_list<T>(&mut self, t: &[T]) -> &mut Self
    where
        T: Serializable,
    {
        self.append(&(t.len() as u64));
        for item in t {
            self.append(item);
        }
        self
    }

    /// Full stream.
    pub fn out(self) -> Bytes {
        self.buffer
    }
}

pub fn serialize<T>(t: &T) -> Bytes
where
    T: Serializable,
{
    let mut stream = Stream::default();
    stream.append(t);
    stream.out()
}

#[cfg(test)]
mod tests {
    use super::{serialize, Stream};

    #[test]
    fn test_stream_append() {
        let mut stream = Stream::default();
        stream
            .append(&1u64)
            .append(&0x0201u32)
            .append_slice(&[0xff]);
        let expected = vec![1, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x02, 0, 0, 0xff].into();
        assert_eq!(stream.out(), expected);
    }

    #[test]
    fn test_serialize_integers_are_little_endian() {
        assert_eq!(serialize(&0x0100_00ffu32), vec![0xff, 0x00, 0x00, 0x01].into());
        assert_eq!(
            serialize(&0x01u64),
            vec![1, 0, 0, 0, 0, 0, 0, 0].into()
        );
    }
}
