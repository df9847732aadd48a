use crate::reader::{Deserializable, Error, Reader, MAX_ITEM_LEN};
use crate::stream::{Serializable, Stream};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use primitives::{Bytes, H256};
use std::io;

impl Serializable for bool {
    fn serialize(&self, s: &mut Stream) {
        s.append_slice(&[*self as u8]);
    }

    fn serialized_size(&self) -> usize {
        1
    }
}

impl Deserializable for bool {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let mut byte = [0u8; 1];
        reader.read_slice(&mut byte)?;
        match byte[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::MalformedData),
        }
    }
}

impl Serializable for u8 {
    fn serialize(&self, s: &mut Stream) {
        s.append_slice(&[*self]);
    }

    fn serialized_size(&self) -> usize {
        1
    }
}

impl Deserializable for u8 {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let mut byte = [0u8; 1];
        reader.read_slice(&mut byte)?;
        Ok(byte[0])
    }
}

impl Serializable for u32 {
    fn serialize(&self, s: &mut Stream) {
        let mut buffer = [0u8; 4];
        (&mut buffer[..])
            .write_u32::<LittleEndian>(*self)
            .expect("writing to a fixed buffer of sufficient size never fails; qed");
        s.append_slice(&buffer);
    }

    fn serialized_size(&self) -> usize {
        4
    }
}

impl Deserializable for u32 {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let mut buffer = [0u8; 4];
        reader.read_slice(&mut buffer)?;
        Ok((&buffer[..])
            .read_u32::<LittleEndian>()
            .expect("reading from a fixed buffer of sufficient size never fails; qed"))
    }
}

impl Serializable for u64 {
    fn serialize(&self, s: &mut Stream) {
        let mut buffer = [0u8; 8];
        (&mut buffer[..])
            .write_u64::<LittleEndian>(*self)
            .expect("writing to a fixed buffer of sufficient size never fails; qed");
        s.append_slice(&buffer);
    }

    fn serialized_size(&self) -> usize {
        8
    }
}

impl Deserializable for u64 {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let mut buffer = [0u8; 8];
        reader.read_slice(&mut buffer)?;
        Ok((&buffer[..])
            .read_u64::<LittleEndian>()
            .expect("reading from a fixed buffer of sufficient size never fails; qed"))
    }
}

impl Serializable for H256 {
    fn serialize(&self, s: &mut Stream) {
        s.append_slice(self.as_bytes());
    }

    fn serialized_size(&self) -> usize {
        32
    }
}

impl Deserializable for H256 {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let mut buffer = [0u8; 32];
        reader.read_slice(&mut buffer)?;
        Ok(H256::from(buffer))
    }
}

impl Serializable for Bytes {
    fn serialize(&self, s: &mut Stream) {
        s.append(&(self.len() as u64)).append_slice(self);
    }

    fn serialized_size(&self) -> usize {
        8 + self.len()
    }
}

impl Deserializable for Bytes {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, Error>
    where
        T: io::Read,
    {
        let len: u64 = reader.read()?;
        if len > MAX_ITEM_LEN {
            return Err(Error::MalformedData);
        }

        let mut bytes = Bytes::new_with_len(len as usize);
        reader.read_slice(&mut bytes)?;
        Ok(bytes)
    }
}
