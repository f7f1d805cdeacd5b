//! # Frequency Table

use crate::{
    training::utility::TokenSpanBuf,
    types::{CommonHashMap, CountType, StringChunkType, TokenType},
    vocab::TokenTable,
};

/// The distinct pretokens and their counts.
///
/// ``spans[i]`` occurs ``counts[i]`` times in the corpus. Spans are built in
/// sorted pretoken order, so indices are reproducible across runs; they are
/// rewritten in place as merges are applied, and never reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<T: TokenType, C: CountType> {
    /// The distinct pretokens, as symbol spans.
    pub spans: Vec<TokenSpanBuf<T>>,

    /// ``counts[i]`` is the count of ``spans[i]``.
    pub counts: Vec<C>,
}

impl<T: TokenType, C: CountType> Default for FrequencyTable<T, C> {
    fn default() -> Self {
        Self {
            spans: Vec::new(),
            counts: Vec::new(),
        }
    }
}

impl<T: TokenType, C: CountType> FrequencyTable<T, C> {
    /// Build a table from pretoken counts.
    ///
    /// Zero counts are skipped.
    ///
    /// ## Arguments
    /// * `word_counts` - ``{ pretoken -> count }``.
    /// * `table` - the symbol table for the byte symbols.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(word_counts, table)))]
    pub fn from_word_counts<K: StringChunkType>(
        word_counts: &CommonHashMap<K, C>,
        table: &TokenTable<T>,
    ) -> Self {
        let zero = C::zero();
        let mut words: Vec<(&K, C)> = word_counts
            .iter()
            .filter(|&(_, &c)| c != zero)
            .map(|(k, &c)| (k, c))
            .collect();
        words.sort_unstable_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

        words
            .into_iter()
            .map(|(k, c)| (TokenSpanBuf::from_string(k, table), c))
            .collect()
    }

    /// Number of distinct pretokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total number of pretokens.
    pub fn total_count(&self) -> C {
        self.counts.iter().fold(C::zero(), |acc, &c| acc + c)
    }

    /// Iterate ``(span, count)`` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&TokenSpanBuf<T>, C)> {
        self.spans.iter().zip(self.counts.iter().copied())
    }
}

impl<T: TokenType, C: CountType> FromIterator<(TokenSpanBuf<T>, C)> for FrequencyTable<T, C> {
    fn from_iter<I: IntoIterator<Item = (TokenSpanBuf<T>, C)>>(iter: I) -> Self {
        let (spans, counts) = iter.into_iter().unzip();
        Self { spans, counts }
    }
}
