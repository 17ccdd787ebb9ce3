//! Stable 32-bit error identity.
//!
//! The identity of an error is the FNV-1a 32-bit hash of
//! `code ++ tag ++ interpolated text`. Identical content hashes identically no
//! matter where the error was created, which lets log pipelines group
//! logically identical errors without comparing strings.
//!
//! Not collision resistant. Do not use it as a security boundary.
//!
//! ```rust
//! use tagged_errors::identity::identity;
//!
//! let a = identity("h1", "email", "email#h1: invalid hostname");
//! let b = identity("h1", "email", "email#h1: invalid hostname");
//! assert_eq!(a, b);
//! ```

use std::hash::Hasher;

/// FNV-1a 32-bit offset basis.
pub const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV32_PRIME: u32 = 0x0100_0193;

/// Streaming FNV-1a 32-bit hasher.
///
/// Each identity uses a fresh instance; there is no shared hashing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a32(u32);

impl Fnv1a32 {
    /// Start a new hash at the offset basis.
    #[inline]
    pub const fn new() -> Self {
        Self(FNV32_OFFSET_BASIS)
    }

    /// Feed bytes into the hash.
    #[inline]
    pub const fn update(mut self, bytes: &[u8]) -> Self {
        let mut i = 0;
        while i < bytes.len() {
            self.0 ^= bytes[i] as u32;
            self.0 = self.0.wrapping_mul(FNV32_PRIME);
            i += 1;
        }
        self
    }

    /// Current 32-bit digest.
    #[inline]
    pub const fn digest(self) -> u32 {
        self.0
    }
}

impl Default for Fnv1a32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1a32 {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        *self = self.update(bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.0)
    }
}

/// Identity of an error's content.
#[inline]
pub fn identity(code: &str, tag: &str, text: &str) -> u32 {
    Fnv1a32::new()
        .update(code.as_bytes())
        .update(tag.as_bytes())
        .update(text.as_bytes())
        .digest()
}
