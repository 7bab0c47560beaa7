//! KeyHash: the hashing capability a key type must supply.
//!
//! Hashes are plain signed 32-bit integers and must be deterministic for
//! the lifetime of the key while it is stored. Small integers hash to
//! themselves, so bucket placement is predictable: at capacity 16 the keys
//! `1` and `17` share bucket 1.

/// Deterministic hash and absent-key detection for map keys.
pub trait KeyHash {
    /// Hash of the key, treated as a signed 32-bit value.
    fn key_hash(&self) -> i32;

    /// Whether this key is the absent sentinel that the map refuses.
    #[inline]
    fn is_absent(&self) -> bool {
        false
    }
}

macro_rules! identity_key_hash {
    ($($t:ty),*) => {
        $(
            impl KeyHash for $t {
                #[inline]
                fn key_hash(&self) -> i32 {
                    *self as i32
                }
            }
        )*
    };
}

macro_rules! folded_key_hash {
    ($($t:ty),*) => {
        $(
            impl KeyHash for $t {
                #[inline]
                fn key_hash(&self) -> i32 {
                    let v = *self as u64;
                    (v ^ (v >> 32)) as i32
                }
            }
        )*
    };
}

identity_key_hash!(i8, i16, i32, u8, u16, char);
folded_key_hash!(u32, i64, u64, isize, usize);

impl KeyHash for bool {
    #[inline]
    fn key_hash(&self) -> i32 {
        if *self {
            1231
        } else {
            1237
        }
    }
}

impl KeyHash for str {
    fn key_hash(&self) -> i32 {
        self.bytes()
            .fold(0i32, |h, b| h.wrapping_mul(31).wrapping_add(b as i32))
    }
}

impl KeyHash for String {
    #[inline]
    fn key_hash(&self) -> i32 {
        self.as_str().key_hash()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for &T {
    #[inline]
    fn key_hash(&self) -> i32 {
        (**self).key_hash()
    }
    #[inline]
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

impl<T: KeyHash + ?Sized> KeyHash for Box<T> {
    #[inline]
    fn key_hash(&self) -> i32 {
        (**self).key_hash()
    }
    #[inline]
    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }
}

/// `None` is the absent key.
impl<T: KeyHash> KeyHash for Option<T> {
    #[inline]
    fn key_hash(&self) -> i32 {
        match self {
            Some(t) => t.key_hash(),
            None => 0,
        }
    }
    #[inline]
    fn is_absent(&self) -> bool {
        match self {
            Some(t) => t.is_absent(),
            None => true,
        }
    }
}

impl<A: KeyHash, B: KeyHash> KeyHash for (A, B) {
    fn key_hash(&self) -> i32 {
        self.0.key_hash().wrapping_mul(31).wrapping_add(self.1.key_hash())
    }
    fn is_absent(&self) -> bool {
        self.0.is_absent() || self.1.is_absent()
    }
}

impl<A: KeyHash, B: KeyHash, C: KeyHash> KeyHash for (A, B, C) {
    fn key_hash(&self) -> i32 {
        let h = self.0.key_hash().wrapping_mul(31).wrapping_add(self.1.key_hash());
        h.wrapping_mul(31).wrapping_add(self.2.key_hash())
    }
    fn is_absent(&self) -> bool {
        self.0.is_absent() || self.1.is_absent() || self.2.is_absent()
    }
}
