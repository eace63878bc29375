//! Key hashing strategies.
//!
//! A `KeyHasher<K>` pairs a 32-bit digest with an equality test. The map
//! assumes `equals(a, b)` implies `hash(a) == hash(b)`; a hasher that breaks
//! this makes lookups miss entries or admit duplicates. Nothing checks it.
//!
//! Digests are `i32` and every arithmetic step wraps, so the default
//! strategy produces the same numbers on every platform.

use core::fmt::{self, Write};
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;
use std::rc::Rc;
use std::sync::Arc;

pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K) -> i32;
    fn equals(&self, a: &K, b: &K) -> bool;
}

impl<K: ?Sized, H: KeyHasher<K> + ?Sized> KeyHasher<K> for &H {
    #[inline]
    fn hash(&self, key: &K) -> i32 {
        (**self).hash(key)
    }
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
}

/// Lets several maps share one stateful hasher (e.g. one identity table).
impl<K: ?Sized, H: KeyHasher<K> + ?Sized> KeyHasher<K> for Rc<H> {
    #[inline]
    fn hash(&self, key: &K) -> i32 {
        (**self).hash(key)
    }
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
}

/// Polynomial rolling hash over UTF-16 code units: `h = h * 31 + unit`,
/// wrapping at 32 bits. Implements `fmt::Write` so formatted output can be
/// hashed without building a `String`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringHash(i32);

impl StringHash {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn push_str(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.0 = self.0.wrapping_mul(31).wrapping_add(unit as i32);
        }
    }

    pub fn finish(&self) -> i32 {
        self.0
    }
}

impl Write for StringHash {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

pub fn string_hash(s: &str) -> i32 {
    let mut h = StringHash::new();
    h.push_str(s);
    h.finish()
}

/// A key that can render itself as `"<type tag>:<repr>"` for `ValueHasher`.
///
/// Two keys that compare equal must render identically.
pub trait CanonicalKey {
    fn type_tag(&self) -> &'static str;
    fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result;
}

macro_rules! canonical_integer {
    ($($t:ty),*) => {$(
        impl CanonicalKey for $t {
            fn type_tag(&self) -> &'static str {
                "number"
            }
            fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
                write!(out, "{}", self)
            }
        }
    )*};
}

canonical_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! canonical_float {
    ($($t:ty),*) => {$(
        impl CanonicalKey for $t {
            fn type_tag(&self) -> &'static str {
                "number"
            }
            fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
                if *self == 0.0 {
                    // -0.0 == 0.0, so both must hash alike.
                    out.write_char('0')
                } else if self.is_infinite() {
                    out.write_str(if *self > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    write!(out, "{}", self)
                }
            }
        }
    )*};
}

canonical_float!(f32, f64);

impl CanonicalKey for bool {
    fn type_tag(&self) -> &'static str {
        "boolean"
    }
    fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(if *self { "true" } else { "false" })
    }
}

impl CanonicalKey for char {
    fn type_tag(&self) -> &'static str {
        "string"
    }
    fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char(*self)
    }
}

impl CanonicalKey for str {
    fn type_tag(&self) -> &'static str {
        "string"
    }
    fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self)
    }
}

impl CanonicalKey for String {
    fn type_tag(&self) -> &'static str {
        "string"
    }
    fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_str(self)
    }
}

macro_rules! canonical_forward {
    ($($ptr:ty),*) => {$(
        impl<T: CanonicalKey + ?Sized> CanonicalKey for $ptr {
            fn type_tag(&self) -> &'static str {
                (**self).type_tag()
            }
            fn write_repr<W: Write>(&self, out: &mut W) -> fmt::Result {
                (**self).write_repr(out)
            }
        }
    )*};
}

canonical_forward!(&T, Box<T>, Rc<T>, Arc<T>);

/// Default strategy for primitive and string keys: hashes the canonical
/// `"<type tag>:<repr>"` string and compares with `==`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueHasher;

impl<K> KeyHasher<K> for ValueHasher
where
    K: CanonicalKey + PartialEq + ?Sized,
{
    fn hash(&self, key: &K) -> i32 {
        let mut h = StringHash::new();
        h.push_str(key.type_tag());
        h.push_str(":");
        // StringHash never fails a write; a key's own Err only truncates
        // the digest, and it truncates it the same way every time.
        let _ = key.write_repr(&mut h);
        h.finish()
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Bridges any `Hash + Eq` key through a `BuildHasher`, folding the 64-bit
/// digest down to 32 bits.
#[derive(Debug, Clone, Default)]
pub struct BuildHasherAdapter<S = RandomState> {
    build: S,
}

impl<S> BuildHasherAdapter<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<K, S> KeyHasher<K> for BuildHasherAdapter<S>
where
    K: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    fn hash(&self, key: &K) -> i32 {
        let h = self.build.hash_one(key);
        (h ^ (h >> 32)) as u32 as i32
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}
