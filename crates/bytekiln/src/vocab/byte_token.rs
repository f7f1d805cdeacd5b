//! # Byte Tokens

use core::{fmt::Debug, ops::Deref};
use std::sync::Arc;

/// An immutable byte string; one unit of a segmentation.
///
/// Equality, hashing and ordering are by content; ordering is
/// byte-lexicographic. Clones share the underlying buffer.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteToken(Arc<[u8]>);

/// A learned merge rule: the left and right tokens, in that order.
pub type Merge = (ByteToken, ByteToken);

impl ByteToken {
    /// Build the single-byte token for `byte`.
    pub fn from_byte(byte: u8) -> Self {
        Self(Arc::from([byte].as_slice()))
    }

    /// Build the concatenation `self ++ other`.
    pub fn concat(
        &self,
        other: &ByteToken,
    ) -> Self {
        let mut buf = Vec::with_capacity(self.len() + other.len());
        buf.extend_from_slice(self);
        buf.extend_from_slice(other);
        Self(buf.into())
    }

    /// View the token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy the token bytes out.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl Deref for ByteToken {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ByteToken {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for ByteToken {
    fn from(bytes: &[u8; N]) -> Self {
        Self(Arc::from(bytes.as_slice()))
    }
}

impl From<Vec<u8>> for ByteToken {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl From<&str> for ByteToken {
    fn from(text: &str) -> Self {
        Self(Arc::from(text.as_bytes()))
    }
}

impl Debug for ByteToken {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "b\"{}\"", self.0.escape_ascii())
    }
}
