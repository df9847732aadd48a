use primitives::bigint::U256;
use ser::{Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use std::{fmt, io, ops};

/// Number of base units in one coin.
const COIN_DECIMALS: u32 = 24;

/// Unsigned currency amount.
///
/// Amounts are encoded as an 8-byte length followed by that many big-endian
/// bytes with no leading zero, so the representation of every value is
/// unique.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Currency(U256);

impl Currency {
    pub fn zero() -> Self {
        Currency(U256::from(0u64))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == U256::from(0u64)
    }

    /// Whole coins, scaled to base units.
    pub fn from_coins(coins: u64) -> Self {
        let mut precision = U256::from(1u64);
        for _ in 0..COIN_DECIMALS {
            precision = precision * U256::from(10u64);
        }
        Currency(U256::from(coins) * precision)
    }

    pub fn checked_add(&self, other: &Currency) -> Option<Currency> {
        let (result, overflow) = self.0.overflowing_add(other.0);
        if overflow {
            None
        } else {
            Some(Currency(result))
        }
    }

    pub fn checked_sub(&self, other: &Currency) -> Option<Currency> {
        if other.0 > self.0 {
            None
        } else {
            Some(Currency(self.0 - other.0))
        }
    }

    /// Minimal big-endian representation. Empty for zero.
    fn to_minimal_be(&self) -> Vec<u8> {
        let mut buffer = [0u8; 32];
        self.0.to_big_endian(&mut buffer);
        let first = buffer.iter().position(|b| *b != 0).unwrap_or(32);
        buffer[first..].to_vec()
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::zero()
    }
}

impl From<u64> for Currency {
    fn from(v: u64) -> Self {
        Currency(U256::from(v))
    }
}

impl ops::Add for Currency {
    type Output = Currency;

    fn add(self, rhs: Currency) -> Currency {
        Currency(self.0 + rhs.0)
    }
}

impl ops::Sub for Currency {
    type Output = Currency;

    fn sub(self, rhs: Currency) -> Currency {
        Currency(self.0 - rhs.0)
    }
}

impl ops::Mul<u64> for Currency {
    type Output = Currency;

    fn mul(self, rhs: u64) -> Currency {
        Currency(self.0 * U256::from(rhs))
    }
}

impl ops::Mul for Currency {
    type Output = Currency;

    fn mul(self, rhs: Currency) -> Currency {
        Currency(self.0 * rhs.0)
    }
}

impl ops::Div<u64> for Currency {
    type Output = Currency;

    fn div(self, rhs: u64) -> Currency {
        Currency(self.0 / U256::from(rhs))
    }
}

impl ops::Rem<u64> for Currency {
    type Output = Currency;

    fn rem(self, rhs: u64) -> Currency {
        Currency(self.0 % U256::from(rhs))
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serializable for Currency {
    fn serialize(&self, stream: &mut Stream) {
        let bytes = self.to_minimal_be();
        stream.append(&(bytes.len() as u64)).append_slice(&bytes);
    }

    fn serialized_size(&self) -> usize {
        8 + self.to_minimal_be().len()
    }
}

impl Deserializable for Currency {
    fn deserialize<T>(reader: &mut Reader<T>) -> Result<Self, ReaderError>
    where
        T: io::Read,
    {
        let len: u64 = reader.read()?;
        if len > 32 {
            return Err(ReaderError::MalformedData);
        }

        let mut bytes = vec![0u8; len as usize];
        reader.read_slice(&mut bytes)?;
        if bytes.first() == Some(&0) {
            // a leading zero would give the same value a second encoding
            return Err(ReaderError::MalformedData);
        }

        Ok(Currency(U256::from(&bytes[..])))
    }
}

#[cfg(test)]
mod tests {
    use super::Currency;
    use ser::{deserialize, serialize};

    #[test]
    fn test_currency_encoding_is_minimal_big_endian() {
        assert_eq!(serialize(&Currency::zero()), vec![0u8; 8].into());
        assert_eq!(
            serialize(&Currency::from(0x0102u64)),
            vec![2, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x02].into()
        );
    }

    #[test]
    fn test_currency_rejects_padded_encoding() {
        let padded = vec![2u8, 0, 0, 0, 0, 0, 0, 0, 0x00, 0x02];
        assert!(deserialize::<Currency>(&padded[..]).is_err());
        let minimal = vec![1u8, 0, 0, 0, 0, 0, 0, 0, 0x02];
        assert_eq!(
            deserialize::<Currency>(&minimal[..]).unwrap(),
            Currency::from(2u64)
        );
    }

    #[test]
    fn test_currency_checked_arithmetic() {
        let five = Currency::from(5u64);
        let three = Currency::from(3u64);
        assert_eq!(five.checked_sub(&three), Some(Currency::from(2u64)));
        assert_eq!(three.checked_sub(&five), None);
        assert_eq!(three.checked_add(&five), Some(Currency::from(8u64)));
    }

    #[test]
    fn test_from_coins_scales() {
        assert_eq!(
            Currency::from_coins(2),
            Currency::from_coins(1) + Currency::from_coins(1)
        );
        assert!(Currency::from_coins(1) > Currency::from(u64::max_value()));
    }
}
