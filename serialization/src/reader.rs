use std::io;

/// Limit on a single length-prefixed item, to keep a corrupt length prefix
/// from asking for an absurd allocation.
pub const MAX_ITEM_LEN: u64 = 32 * 1024 * 1024;

#[derive(Debug, PartialEq)]
pub enum Error {
    MalformedData,
    UnexpectedEnd,
    UnreadData,
}

impl From<io::Error> for Error {
    fn from(_: io::Error) -> Self {
        Error::UnexpectedEnd
    }
}

pub trait Deserializable: Sized {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read;
}

/// Deserializes an object from the given byte slice. The slice must be
/// consumed exactly.
pub fn deserialize<T>(buffer: &[u8]) -> Result<T, Error>
where
    T: Deserializable,
{
    let mut reader = Reader::new(buffer);
    let result = reader.read()?;

    if !reader.is_finished() {
        return Err(Error::UnreadData);
    }

    Ok(result)
}

/// Binary stream reader.
pub struct Reader<T> {
    buffer: T,
}

impl<T> Reader<T>
where
    T: io::Read,
{
    pub fn new(buffer: T) -> Self {
        Reader { buffer }
    }

    pub fn read<D>(&mut self) -> Result<D, Error>
    where
        D: Deserializable,
    {
        D::deserialize(self)
    }

    /// Reads an 8-byte element count followed by every list element.
    pub fn read_list<D>(&mut self) -> Result<Vec<D>, Error>
    where
        D: Deserializable,
    {
        let len: u64 = self.read()?;
        if len > MAX_ITEM_LEN {
            return Err(Error::MalformedData);
        }

        let mut result = Vec::new();
        for _ in 0..len {
            result.push(self.read()?);
        }

        Ok(result)
    }

    pub fn read_slice(&mut self, bytes: &mut [u8]) -> Result<(), Error> {
        self.buffer
            .read_exact(bytes)
            .map_err(|_| Error::UnexpectedEnd)
    }

    pub fn is_finished(&mut self) -> bool {
        let mut peek = [0u8; 1];
        match self.buffer.read(&mut peek) {
            Ok(0) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{deserialize, Error};

    #[test]
    fn test_reader_read() {
        let buffer = vec![1, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(1u64, deserialize(&buffer[..]).unwrap());
    }

    #[test]
    fn test_reader_unexpected_end() {
        let buffer = vec![1, 0, 0];
        assert_eq!(
            deserialize::<u64>(&buffer[..]).unwrap_err(),
            Error::UnexpectedEnd
        );
    }

    #[test]
    fn test_reader_unread_data() {
        let buffer = vec![1, 0, 0, 0, 0, 0, 0, 0, 0xff];
        assert_eq!(
            deserialize::<u64>(&buffer[..]).unwrap_err(),
            Error::UnreadData
        );
    }
}
