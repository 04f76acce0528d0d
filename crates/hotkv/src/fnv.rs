//! Fowler–Noll–Vo (FNV-1a) string hashing
//!
//! `hash = offset; for each byte: hash = (hash ^ byte) * prime`, with
//! wrapping multiplication at the chosen width.

const FNV_OFFSET_32: u32 = 2_166_136_261;
const FNV_PRIME_32: u32 = 16_777_619;
const FNV_OFFSET_64: u64 = 14_695_981_039_346_656_037;
const FNV_PRIME_64: u64 = 1_099_511_628_211;

/// 32-bit FNV-1a over raw bytes
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_32, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME_32)
    })
}

/// 64-bit FNV-1a over raw bytes
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_64, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME_64)
    })
}

/// Which FNV variant a table hashes keys with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashWidth {
    /// 32-bit FNV-1a
    #[default]
    Bits32,
    /// 64-bit FNV-1a
    Bits64,
}

impl HashWidth {
    /// Hash `bytes` at this width, widened to `u64`
    pub fn hash(self, bytes: &[u8]) -> u64 {
        match self {
            HashWidth::Bits32 => u64::from(fnv1a_32(bytes)),
            HashWidth::Bits64 => fnv1a_64(bytes),
        }
    }

    /// Bucket index for `bytes` in a table of `capacity` buckets
    pub fn bucket(self, bytes: &[u8], capacity: usize) -> usize {
        (self.hash(bytes) % capacity as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_offset() {
        assert_eq!(fnv1a_32(b""), FNV_OFFSET_32);
        assert_eq!(fnv1a_64(b""), FNV_OFFSET_64);
    }

    #[test]
    fn test_known_vectors() {
        // Published FNV-1a test vectors
        assert_eq!(fnv1a_32(b"a"), 0xe40c292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9cf968);
        assert_eq!(fnv1a_64(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_utf8_bytes_are_hashed() {
        assert_eq!(fnv1a_32("é".as_bytes()), fnv1a_32(&[0xc3, 0xa9]));
    }

    #[test]
    fn test_bucket_in_range() {
        for capacity in [1usize, 16, 17, 1024] {
            for key in ["", "0", "one", "collision_42", "key_9999"] {
                assert!(HashWidth::Bits32.bucket(key.as_bytes(), capacity) < capacity);
                assert!(HashWidth::Bits64.bucket(key.as_bytes(), capacity) < capacity);
            }
        }
    }

    #[test]
    fn test_default_width_is_32() {
        assert_eq!(HashWidth::default(), HashWidth::Bits32);
        assert_eq!(
            HashWidth::Bits32.hash(b"one"),
            u64::from(fnv1a_32(b"one"))
        );
    }
}
