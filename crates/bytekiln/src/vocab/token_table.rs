//! # Symbol Interning Table

use crate::{
    errors::{BpeError, BpeResult},
    types::{CommonHashMap, TokenType},
    vocab::ByteToken,
};

/// The number of single-byte symbols.
pub const U8_SIZE: usize = 256;

/// Interns [`ByteToken`] contents as dense `T` symbols.
///
/// Symbols ``0..=255`` are the single bytes. Every further distinct
/// content gets the next symbol; re-interning known content returns
/// its existing symbol, so equal bytes always share one symbol.
#[derive(Debug, Clone)]
pub struct TokenTable<T: TokenType> {
    tokens: Vec<ByteToken>,
    index: CommonHashMap<ByteToken, T>,
}

impl<T: TokenType> TokenTable<T> {
    /// Build a table holding the 256 single-byte symbols.
    ///
    /// ## Errors
    /// [`BpeError::Input`] if `T` cannot represent 256 symbols.
    pub fn new() -> BpeResult<Self> {
        let mut table = Self {
            tokens: Vec::with_capacity(U8_SIZE),
            index: CommonHashMap::with_capacity(U8_SIZE),
        };
        for byte in 0..=u8::MAX {
            table.intern(ByteToken::from_byte(byte))?;
        }
        Ok(table)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The symbol for a single byte.
    #[inline(always)]
    pub fn byte_symbol(
        &self,
        byte: u8,
    ) -> T {
        // Single bytes are interned first, in order.
        T::from_u8(byte).unwrap_or_default()
    }

    /// Get the symbol for the given content, interning it if new.
    ///
    /// ## Errors
    /// [`BpeError::Input`] if the next symbol overflows `T`.
    pub fn intern(
        &mut self,
        token: ByteToken,
    ) -> BpeResult<T> {
        if let Some(&symbol) = self.index.get(&token) {
            return Ok(symbol);
        }
        let symbol = T::from_usize(self.tokens.len()).ok_or_else(|| {
            BpeError::Input(format!(
                "symbol count ({}) exceeds token type capacity",
                self.tokens.len() + 1
            ))
        })?;
        self.tokens.push(token.clone());
        self.index.insert(token, symbol);
        Ok(symbol)
    }

    /// Look up the content of a symbol.
    ///
    /// ## Panics
    /// If `symbol` was not produced by this table.
    #[inline(always)]
    pub fn token(
        &self,
        symbol: T,
    ) -> &ByteToken {
        &self.tokens[symbol.to_usize().unwrap_or(usize::MAX)]
    }

    /// Look up the symbol of known content.
    pub fn symbol(
        &self,
        token: &ByteToken,
    ) -> Option<T> {
        self.index.get(token).copied()
    }

    /// Translate bytes to their single-byte symbols.
    pub fn symbols_for_bytes(
        &self,
        bytes: &[u8],
    ) -> Vec<T> {
        bytes.iter().map(|&b| self.byte_symbol(b)).collect()
    }
}
