//! # `PairIndex` Builder

use crate::{
    errors::{BpeError, BpeResult},
    training::utility::{FrequencyTable, TokenSpanBuf},
    types::{CommonHashMap, CommonHashSet, CountType, Pair, TokenType},
};

/// A map from [`Pair`] to its occurrence count.
pub type PairCountMap<T, C> = CommonHashMap<Pair<T>, C>;

/// A map from [`Pair`] to indices over ``spans``.
pub type PairIndexMap<T> = CommonHashMap<Pair<T>, CommonHashSet<usize>>;

/// An index of ``(T, T)`` pair information relative to a ``&[TokenSpanBuf<T>]``.
///
/// Both maps only hold live pairs: a pair is present iff its count is
/// non-zero, and its owner set is exactly the spans containing it.
#[derive(Debug, Clone, Default)]
pub struct PairSpanIndex<T: TokenType, C: CountType> {
    /// A map from [`Pair`] to its occurrence count.
    ///
    /// ``sum(spans[i].windows_equal_to(pair) * counts[i]) for all i``
    pub pair_counts: PairCountMap<T, C>,

    /// A map from [`Pair`] to the indices of the spans containing it.
    pub pair_index: PairIndexMap<T>,
}

impl<T: TokenType, C: CountType> PairSpanIndex<T, C> {
    /// Build a [`PairSpanIndex`] from a slice of [`TokenSpanBuf`]s, using a count table.
    ///
    /// ## Arguments
    /// * `spans` - a sequence of text spans; assumed to be unique.
    /// * `counts` - `counts[i]` is the count of `spans[i]`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(spans, counts)))]
    pub fn from_span_count_table(
        spans: &[TokenSpanBuf<T>],
        counts: &[C],
    ) -> Self {
        let size_hint = spans.len() / 8;

        let mut index = PairSpanIndex {
            pair_counts: PairCountMap::with_capacity(size_hint),
            pair_index: PairIndexMap::with_capacity(size_hint),
        };

        let zero = C::zero();

        for (idx, (span, &count)) in spans.iter().zip(counts).enumerate() {
            if count != zero && span.len() >= 2 {
                for p in span.pairs() {
                    *index.pair_counts.entry(p).or_default() += count;
                    index.pair_index.entry(p).or_default().insert(idx);
                }
            }
        }

        index
    }

    /// Build a [`PairSpanIndex`] with a full scan of a [`FrequencyTable`].
    pub fn from_frequency_table(freq: &FrequencyTable<T, C>) -> Self {
        Self::from_span_count_table(&freq.spans, &freq.counts)
    }

    /// Number of live pairs.
    pub fn len(&self) -> usize {
        self.pair_counts.len()
    }

    /// Are there no live pairs?
    pub fn is_empty(&self) -> bool {
        self.pair_counts.is_empty()
    }

    /// The current count of `pair`; zero if absent.
    pub fn count(
        &self,
        pair: &Pair<T>,
    ) -> C {
        self.pair_counts.get(pair).copied().unwrap_or_default()
    }

    /// Add `amount` to the count of `pair`.
    ///
    /// ## Errors
    /// [`BpeError::Consistency`] on counter overflow.
    pub fn increment(
        &mut self,
        pair: Pair<T>,
        amount: C,
    ) -> BpeResult<()> {
        let count = self.pair_counts.entry(pair).or_default();
        let total = num_traits::CheckedAdd::checked_add(&*count, &amount).ok_or_else(|| {
            BpeError::Consistency(format!("count overflow for pair {pair:?}"))
        })?;
        *count = total;
        Ok(())
    }

    /// Subtract `amount` from the count of `pair`; drop the pair at zero.
    ///
    /// ## Errors
    /// [`BpeError::Consistency`] if the pair is absent or the count would go
    /// negative.
    pub fn decrement(
        &mut self,
        pair: Pair<T>,
        amount: C,
    ) -> BpeResult<()> {
        let Some(count) = self.pair_counts.get_mut(&pair) else {
            return Err(BpeError::Consistency(format!(
                "decrement of absent pair {pair:?}"
            )));
        };
        let remaining = num_traits::CheckedSub::checked_sub(&*count, &amount).ok_or_else(|| {
            BpeError::Consistency(format!(
                "negative count for pair {pair:?}: {count} - {amount}"
            ))
        })?;
        if remaining.is_zero() {
            self.pair_counts.remove(&pair);
        } else {
            *count = remaining;
        }
        Ok(())
    }

    /// Record span `idx` as an owner of `pair`.
    pub fn add_owner(
        &mut self,
        pair: Pair<T>,
        idx: usize,
    ) {
        self.pair_index.entry(pair).or_default().insert(idx);
    }

    /// Drop span `idx` from the owners of `pair`.
    pub fn remove_owner(
        &mut self,
        pair: &Pair<T>,
        idx: usize,
    ) {
        if let Some(owners) = self.pair_index.get_mut(pair) {
            owners.remove(&idx);
            if owners.is_empty() {
                self.pair_index.remove(pair);
            }
        }
    }

    /// Remove and return the owners of `pair`, in ascending order.
    pub fn take_owners(
        &mut self,
        pair: &Pair<T>,
    ) -> Vec<usize> {
        let mut owners: Vec<usize> = self
            .pair_index
            .remove(pair)
            .map(|s| s.into_iter().collect())
            .unwrap_or_default();
        owners.sort_unstable();
        owners
    }

    /// Check this index against a reference recount.
    ///
    /// ## Errors
    /// [`BpeError::Consistency`] describing the first disagreement found.
    pub fn check_matches(
        &self,
        expected: &Self,
    ) -> BpeResult<()> {
        if self.pair_counts.len() != expected.pair_counts.len() {
            return Err(BpeError::Consistency(format!(
                "{} live pairs, recount has {}",
                self.pair_counts.len(),
                expected.pair_counts.len()
            )));
        }
        for (pair, &count) in &expected.pair_counts {
            let actual = self.count(pair);
            if actual != count {
                return Err(BpeError::Consistency(format!(
                    "pair {pair:?} has count {actual}, recount has {count}"
                )));
            }
        }

        if self.pair_index.len() != expected.pair_index.len() {
            return Err(BpeError::Consistency(format!(
                "{} owned pairs, recount has {}",
                self.pair_index.len(),
                expected.pair_index.len()
            )));
        }
        for (pair, owners) in &expected.pair_index {
            if self.pair_index.get(pair) != Some(owners) {
                return Err(BpeError::Consistency(format!(
                    "owners of pair {pair:?} differ from recount"
                )));
            }
        }
        Ok(())
    }
}
