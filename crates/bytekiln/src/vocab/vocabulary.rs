//! # Vocabulary

use std::collections::BTreeMap;

use crate::{
    errors::{BpeError, BpeResult},
    types::CommonHashSet,
    vocab::{ByteToken, token_table::U8_SIZE},
};

/// Contiguous ``{ id -> ByteToken }`` vocabulary.
///
/// Layout:
/// * ``0..256`` - the single bytes, id `i` is byte `i`;
/// * ``256..256 + k`` - the `k` special tokens, in input order;
/// * then one entry per accepted merge, in creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<ByteToken>,
    num_specials: usize,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            tokens: (0..=u8::MAX).map(ByteToken::from_byte).collect(),
            num_specials: 0,
        }
    }
}

impl Vocabulary {
    /// Bootstrap a vocabulary from the byte tokens and the special tokens.
    ///
    /// ## Arguments
    /// * `special_tokens` - the special tokens, in id order.
    ///
    /// ## Errors
    /// [`BpeError::Input`] if a special token is empty or repeated.
    pub fn with_specials<S: AsRef<str>>(special_tokens: &[S]) -> BpeResult<Self> {
        validate_special_tokens(special_tokens)?;

        let mut vocab = Self::default();
        vocab.tokens.reserve(special_tokens.len());
        for special in special_tokens {
            vocab.tokens.push(special.as_ref().into());
        }
        vocab.num_specials = special_tokens.len();

        log::debug!(
            "Initial vocabulary: {} byte tokens, {} special tokens",
            U8_SIZE,
            vocab.num_specials
        );
        Ok(vocab)
    }

    /// Number of entries; ids are ``0..len()``.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the vocabulary empty? Never true for a bootstrapped vocabulary.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Size of the vocabulary before any merges.
    pub fn base_len(&self) -> usize {
        U8_SIZE + self.num_specials
    }

    /// Number of special tokens.
    pub fn num_specials(&self) -> usize {
        self.num_specials
    }

    /// The special tokens, in id order.
    pub fn special_tokens(&self) -> &[ByteToken] {
        &self.tokens[U8_SIZE..self.base_len()]
    }

    /// Get the token for an id.
    pub fn get(
        &self,
        id: usize,
    ) -> Option<&ByteToken> {
        self.tokens.get(id)
    }

    /// Append a token, returning its id.
    pub fn push(
        &mut self,
        token: ByteToken,
    ) -> usize {
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    /// Iterate ``(id, token)`` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ByteToken)> {
        self.tokens.iter().enumerate()
    }

    /// Export as an ordered ``{ id -> bytes }`` map.
    pub fn to_map(&self) -> BTreeMap<usize, Vec<u8>> {
        self.iter().map(|(id, token)| (id, token.to_vec())).collect()
    }
}

/// Check that special tokens are non-empty and distinct.
///
/// ## Errors
/// [`BpeError::Input`] naming the offending token.
pub fn validate_special_tokens<S: AsRef<str>>(special_tokens: &[S]) -> BpeResult<()> {
    let mut seen: CommonHashSet<&str> = CommonHashSet::with_capacity(special_tokens.len());
    for special in special_tokens {
        let special = special.as_ref();
        if special.is_empty() {
            return Err(BpeError::Input(
                "special tokens must not be empty".to_string(),
            ));
        }
        if !seen.insert(special) {
            return Err(BpeError::Input(format!(
                "duplicate special token: {special:?}"
            )));
        }
    }
    Ok(())
}
