//! Positive numeric ids, prefixed string ids and version-4 UUIDs.

use uuid::Uuid;

use crate::error::{require, Error, Result};
use crate::randomly::Randomly;
use crate::text::TextRandomly;

pub struct IdRandomly<'r> {
    randomly: &'r mut Randomly,
}

impl<'r> IdRandomly<'r> {
    pub fn new(randomly: &'r mut Randomly) -> Self {
        Self { randomly }
    }

    /// Random version-4 UUID built from 32 hex-digit draws.
    ///
    /// Digit 12 is forced to `4`; digit 16 keeps its low two bits and gets
    /// `0b10` on top, so the variant reads `8`, `9`, `a` or `b`.
    pub fn uuid(&mut self) -> Result<Uuid> {
        let mut digits = TextRandomly::new(self.randomly).hex(32)?.into_bytes();
        digits[12] = b'4';
        digits[16] = variant_digit(digits[16])?;
        let hex = String::from_utf8(digits)
            .map_err(|err| Error::invalid(format!("non-hex uuid digits: {err}")))?;
        Uuid::try_parse(&hex).map_err(|err| Error::invalid(format!("malformed uuid {hex}: {err}")))
    }

    /// Id in `[1, i64::MAX]`.
    pub fn long_id(&mut self) -> Result<i64> {
        self.randomly.long_between(1, i64::MAX)
    }

    pub fn long_id_between(&mut self, min: i64, max: i64) -> Result<i64> {
        require!(min >= 1, "min must be >= 1 for ids but was {min}");
        self.randomly.long_between(min, max)
    }

    /// Id in `[1, i32::MAX]`.
    pub fn int_id(&mut self) -> Result<i32> {
        self.randomly.int_between(1, i32::MAX)
    }

    pub fn int_id_between(&mut self, min: i32, max: i32) -> Result<i32> {
        require!(min >= 1, "min must be >= 1 for ids but was {min}");
        self.randomly.int_between(min, max)
    }

    /// `prefix` padded with alphanumerics to exactly `total_length` chars.
    pub fn prefixed_id(&mut self, prefix: &str, total_length: usize) -> Result<String> {
        TextRandomly::new(self.randomly).prefixed_alpha_numeric(prefix, total_length)
    }
}

fn variant_digit(digit: u8) -> Result<u8> {
    let nibble = (digit as char)
        .to_digit(16)
        .ok_or_else(|| Error::invalid(format!("not a hex digit: {:?}", digit as char)))?;
    let variant = 0x8 | (nibble & 0x3);
    char::from_digit(variant, 16)
        .map(|c| c as u8)
        .ok_or_else(|| Error::invalid(format!("variant nibble out of range: {variant}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::randomly::SeedContext;
    use std::collections::HashSet;
    use uuid::{Variant, Version};

    fn randomly(scope: &str) -> Randomly {
        SeedContext::new(Settings {
            seed: Some(77),
            ..Settings::default()
        })
        .scoped(scope)
        .unwrap()
    }

    #[test]
    fn uuids_are_rfc4122_version_4() {
        let mut r = randomly("id#uuid");
        let mut ids = r.id();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let uuid = ids.uuid().unwrap();
            assert_eq!(uuid.get_version(), Some(Version::Random));
            assert_eq!(uuid.get_variant(), Variant::RFC4122);
            assert!(seen.insert(uuid));
        }
    }

    #[test]
    fn uuid_is_reproducible() {
        let mut a = randomly("id#repeat");
        let mut b = randomly("id#repeat");
        assert_eq!(a.id().uuid().unwrap(), b.id().uuid().unwrap());
    }

    #[test]
    fn variant_digit_keeps_low_bits() {
        assert_eq!(variant_digit(b'0').unwrap(), b'8');
        assert_eq!(variant_digit(b'7').unwrap(), b'b');
        assert_eq!(variant_digit(b'e').unwrap(), b'a');
        assert!(variant_digit(b'z').is_err());
    }

    #[test]
    fn numeric_ids_are_positive() {
        let mut r = randomly("id#numeric");
        let mut ids = r.id();
        for _ in 0..1_000 {
            assert!(ids.long_id().unwrap() >= 1);
            assert!(ids.int_id().unwrap() >= 1);
            assert!((10..=20).contains(&ids.int_id_between(10, 20).unwrap()));
            assert!((5..=6).contains(&ids.long_id_between(5, 6).unwrap()));
        }
        assert!(ids.int_id_between(0, 5).is_err());
        assert!(ids.long_id_between(-3, 5).is_err());
        assert!(ids.long_id_between(9, 5).is_err());
    }

    #[test]
    fn prefixed_ids_have_exact_length() {
        let mut r = randomly("id#prefixed");
        let id = r.id().prefixed_id("CUST-", 16).unwrap();
        assert_eq!(id.len(), 16);
        assert!(id.starts_with("CUST-"));
        assert!(id[5..].chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
