//! # Token Span Buffer

use core::hash::Hash;

use crate::{
    types::{Pair, TokenType},
    vocab::{ByteToken, TokenTable},
};

/// A mutable span of symbols; one distinct pretoken.
///
/// Iteratively rewritten during BPE vocabulary training.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenSpanBuf<T: TokenType> {
    tokens: Vec<T>,
}

impl<T: TokenType, S: AsRef<[T]>> From<S> for TokenSpanBuf<T> {
    fn from(tokens: S) -> Self {
        Self::from_tokens(tokens)
    }
}

impl<T: TokenType> TokenSpanBuf<T> {
    /// Build a span from symbols.
    pub fn from_tokens<S>(tokens: S) -> Self
    where
        S: AsRef<[T]>,
    {
        Self {
            tokens: tokens.as_ref().to_vec(),
        }
    }

    /// Build a span of single-byte symbols.
    ///
    /// ## Arguments
    /// * `bytes` - the pretoken bytes.
    /// * `table` - the symbol table; byte symbols are always present.
    pub fn from_bytes<B: AsRef<[u8]>>(
        bytes: B,
        table: &TokenTable<T>,
    ) -> Self {
        Self {
            tokens: table.symbols_for_bytes(bytes.as_ref()),
        }
    }

    /// Build a span of single-byte symbols from the UTF-8 bytes of `text`.
    pub fn from_string<S: AsRef<str>>(
        text: S,
        table: &TokenTable<T>,
    ) -> Self {
        Self::from_bytes(text.as_ref().as_bytes(), table)
    }

    /// The current symbols.
    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    /// Resolve the symbols through `table`.
    pub fn to_byte_tokens(
        &self,
        table: &TokenTable<T>,
    ) -> Vec<ByteToken> {
        self.tokens
            .iter()
            .map(|&symbol| table.token(symbol).clone())
            .collect()
    }

    /// The number of symbols.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Does the span hold no symbols?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The adjacent pairs, left to right, repeats included.
    pub fn pairs(&self) -> impl Iterator<Item = Pair<T>> + '_ {
        self.tokens.windows(2).map(|w| (w[0], w[1]))
    }

    /// Is `pair` adjacent anywhere in the span?
    pub fn contains_pair(
        &self,
        pair: Pair<T>,
    ) -> bool {
        self.pairs().any(|p| p == pair)
    }

    /// Rewrite every occurrence of `pair` as `replacement`, in place.
    ///
    /// Occurrences are taken greedily from the left, so a run `x x x`
    /// merging `(x, x)` becomes `xx x`.
    ///
    /// ## Arguments
    /// * `pair` - the pair to merge.
    /// * `replacement` - the merged symbol.
    /// * `on_delta` - called with `(window, -1)` for each adjacency that
    ///   disappears and `(window, +1)` for each one that appears.
    ///
    /// A window may be removed and re-added within one call; only the
    /// per-pair sum of the deltas is meaningful.
    pub fn merge_pair_cb<F>(
        &mut self,
        pair: Pair<T>,
        replacement: T,
        on_delta: &mut F,
    ) where
        F: FnMut(Pair<T>, i32),
    {
        let (a, b) = pair;
        let tokens = &mut self.tokens;
        let n = tokens.len();

        // `write <= read`; `tokens[..write]` is the rewritten prefix.
        let mut read = 0;
        let mut write = 0;
        while read < n {
            if read + 1 < n && tokens[read] == a && tokens[read + 1] == b {
                if write > 0 {
                    let prev = tokens[write - 1];
                    on_delta((prev, a), -1);
                    on_delta((prev, replacement), 1);
                }
                on_delta(pair, -1);
                if let Some(&next) = tokens.get(read + 2) {
                    on_delta((b, next), -1);
                    on_delta((replacement, next), 1);
                }
                tokens[write] = replacement;
                read += 2;
            } else {
                tokens[write] = tokens[read];
                read += 1;
            }
            write += 1;
        }
        tokens.truncate(write);
    }

    /// As [`TokenSpanBuf::merge_pair_cb`], collecting the deltas.
    pub fn merge_pair(
        &mut self,
        pair: Pair<T>,
        replacement: T,
    ) -> Vec<(Pair<T>, i32)> {
        let mut deltas = Vec::new();
        self.merge_pair_cb(pair, replacement, &mut |p, d| deltas.push((p, d)));
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_span() {
        let span: TokenSpanBuf<u32> = vec![1, 2, 3].into();
        assert_eq!(span.tokens(), &[1, 2, 3]);
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());

        let span: TokenSpanBuf<u32> = (&[1, 2, 3]).into();
        assert_eq!(span.tokens(), &[1, 2, 3]);
    }

    #[test]
    fn test_span_from_str() {
        let table: TokenTable<u16> = TokenTable::new().unwrap();

        let span = TokenSpanBuf::from_string("hello", &table);
        assert_eq!(span.tokens(), &[104, 101, 108, 108, 111]);
        assert_eq!(
            span.to_byte_tokens(&table),
            vec![
                ByteToken::from("h"),
                "e".into(),
                "l".into(),
                "l".into(),
                "o".into()
            ]
        );
    }

    #[test]
    fn test_span_pairs() {
        let span: TokenSpanBuf<u32> = TokenSpanBuf::from_tokens(vec![1, 2, 3]);
        assert_eq!(span.pairs().collect::<Vec<_>>(), vec![(1, 2), (2, 3)]);
        assert!(span.contains_pair((2, 3)));
        assert!(!span.contains_pair((3, 2)));
    }

    #[test]
    fn test_span_merge_pair() {
        let mut span: TokenSpanBuf<u32> = TokenSpanBuf::from_tokens(vec![1, 2, 3, 1, 2, 2, 1]);

        let deltas = span.merge_pair((1, 2), 9);
        assert_eq!(span.tokens(), &[9, 3, 9, 2, 1]);

        assert_eq!(
            deltas,
            vec![
                // [1 2] 3
                ((1, 2), -1),
                ((2, 3), -1),
                ((9, 3), 1),
                // 3 [1 2] 2
                ((3, 1), -1),
                ((3, 9), 1),
                ((1, 2), -1),
                ((2, 2), -1),
                ((9, 2), 1),
            ]
        );
    }

    #[test]
    fn test_span_merge_overlapping_run() {
        // "aaaa" merges greedily as [aa][aa].
        let mut span: TokenSpanBuf<u32> = TokenSpanBuf::from_tokens(vec![1, 1, 1, 1]);
        let mut net: Vec<((u32, u32), i32)> = Vec::new();
        span.merge_pair_cb((1, 1), 7, &mut |p, d| {
            match net.iter_mut().find(|(q, _)| *q == p) {
                Some((_, n)) => *n += d,
                None => net.push((p, d)),
            }
        });

        assert_eq!(span.tokens(), &[7, 7]);
        net.retain(|(_, d)| *d != 0);
        net.sort();
        assert_eq!(net, vec![((1, 1), -3), ((7, 7), 1)]);

        // "aaa" leaves a trailing single.
        let mut span: TokenSpanBuf<u32> = TokenSpanBuf::from_tokens(vec![1, 1, 1]);
        span.merge_pair((1, 1), 7);
        assert_eq!(span.tokens(), &[7, 1]);
    }

    #[test]
    fn test_span_merge_short() {
        let mut span: TokenSpanBuf<u32> = TokenSpanBuf::from_tokens(vec![1]);
        assert!(span.merge_pair((1, 1), 7).is_empty());
        assert_eq!(span.tokens(), &[1]);
    }
}
