//! # Merge Engine
//!
//! The BPE merge loop, as an explicit state machine:
//!
//! ```text
//! Ready -> Selecting -> Applying -> Ready -> ... -> Done
//! ```
//!
//! Each [`MergeEngine::step`] selects the most frequent live pair, appends
//! its concatenation to the vocabulary, and rewrites the spans that own it.
//! Pair counts and owners are updated incrementally; candidate pairs live in
//! a max-heap whose entries are refreshed lazily against the live counts.

use core::cmp::Ordering;

use dary_heap::OctonaryHeap;

use crate::{
    errors::{BpeError, BpeResult},
    training::{
        TrainResults,
        utility::{FrequencyTable, PairSpanIndex},
    },
    types::{CommonHashMap, CommonHashSet, CountType, Pair, TokenType},
    vocab::{ByteToken, Merge, TokenTable, Vocabulary},
};

/// The lifecycle state of a [`MergeEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Tables are consistent; the next step may begin.
    Ready,

    /// Choosing the next pair.
    Selecting,

    /// Rewriting spans for the chosen pair.
    ///
    /// An engine observed in this state between steps was interrupted by an
    /// error, and its tables are no longer trustworthy.
    Applying,

    /// Terminal; no more merges will be produced.
    Done,
}

/// Info about a [`Pair`] that could be merged.
#[derive(Debug, Clone, Eq)]
pub struct MergeJob<T: TokenType, C: CountType> {
    /// The count of this pair when the job was queued.
    pub count: C,

    /// The left token.
    pub left: ByteToken,

    /// The right token.
    pub right: ByteToken,

    /// The pair, as symbols.
    pub pair: Pair<T>,
}

impl<T: TokenType, C: CountType> MergeJob<T, C> {
    /// The job key.
    ///
    /// Max-heap by count; ties go to the greater ``(left, right)`` bytes.
    pub fn heap_key(&self) -> (C, &ByteToken, &ByteToken) {
        (self.count, &self.left, &self.right)
    }
}

impl<T: TokenType, C: CountType> PartialEq for MergeJob<T, C> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl<T: TokenType, C: CountType> PartialOrd for MergeJob<T, C> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TokenType, C: CountType> Ord for MergeJob<T, C> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// The incremental BPE merge loop.
///
/// The engine owns its tables for its whole lifetime; they are dropped with
/// it when [`MergeEngine::finish`] returns the results.
///
/// # Parameters
/// * `T` - the symbol type; must represent every distinct token content.
/// * `C` - the count type.
pub struct MergeEngine<T: TokenType, C: CountType> {
    table: TokenTable<T>,
    freq: FrequencyTable<T, C>,
    index: PairSpanIndex<T, C>,
    heap: OctonaryHeap<MergeJob<T, C>>,

    vocab: Vocabulary,
    merges: Vec<Merge>,
    num_merges: usize,

    state: EngineState,
    verify: bool,
    last_log_percent: usize,
}

impl<T: TokenType, C: CountType> MergeEngine<T, C> {
    /// Build an engine over a frequency table.
    ///
    /// ## Arguments
    /// * `table` - the symbol table `freq` was built with.
    /// * `freq` - the distinct pretokens and their counts.
    /// * `vocab` - the bootstrapped vocabulary.
    /// * `vocab_size` - the target vocabulary size; at most
    ///   ``vocab_size - vocab.len()`` merges are performed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(table, freq, vocab)))]
    pub fn new(
        table: TokenTable<T>,
        freq: FrequencyTable<T, C>,
        vocab: Vocabulary,
        vocab_size: usize,
    ) -> Self {
        let num_merges = vocab_size.saturating_sub(vocab.len());

        log::info!("Building pair index over {} distinct pretokens", freq.len());
        let index = PairSpanIndex::from_frequency_table(&freq);

        log::info!("Building heap with {} unique pairs", index.len());
        let mut heap = OctonaryHeap::with_capacity(index.len());
        for (&pair, &count) in &index.pair_counts {
            heap.push(MergeJob {
                count,
                left: table.token(pair.0).clone(),
                right: table.token(pair.1).clone(),
                pair,
            });
        }

        let merges_capacity = num_merges.min(index.len());

        Self {
            table,
            freq,
            index,
            heap,
            vocab,
            // `num_merges` may be far beyond what the corpus can yield.
            merges: Vec::with_capacity(merges_capacity),
            num_merges,
            state: EngineState::Ready,
            verify: false,
            last_log_percent: 0,
        }
    }

    /// Enable a full index recount after every step.
    pub fn with_verify_index(
        self,
        verify: bool,
    ) -> Self {
        Self { verify, ..self }
    }

    /// The current state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The number of merges requested.
    pub fn num_merges(&self) -> usize {
        self.num_merges
    }

    /// The vocabulary built so far.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The merges accepted so far, earliest first.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// The current frequency table.
    pub fn frequency_table(&self) -> &FrequencyTable<T, C> {
        &self.freq
    }

    /// The symbol table.
    pub fn token_table(&self) -> &TokenTable<T> {
        &self.table
    }

    /// The incrementally maintained pair index.
    pub fn pair_index(&self) -> &PairSpanIndex<T, C> {
        &self.index
    }

    /// Snapshot the vocabulary and merges accepted so far.
    pub fn checkpoint(&self) -> TrainResults {
        TrainResults {
            vocab: self.vocab.clone(),
            merges: self.merges.clone(),
        }
    }

    /// Recount the pair index from the frequency table and compare.
    ///
    /// ## Errors
    /// [`BpeError::Consistency`] if the incremental index has drifted.
    pub fn verify_index(&self) -> BpeResult<()> {
        let recount = PairSpanIndex::from_frequency_table(&self.freq);
        self.index.check_matches(&recount)
    }

    /// Perform one merge.
    ///
    /// ## Returns
    /// The accepted merge; or `None` once the engine is [`EngineState::Done`].
    ///
    /// ## Errors
    /// [`BpeError::Consistency`] if bookkeeping fails; the engine is then
    /// left in [`EngineState::Applying`] and every later call fails.
    pub fn step(&mut self) -> BpeResult<Option<Merge>> {
        match self.state {
            EngineState::Ready => {}
            EngineState::Done => return Ok(None),
            EngineState::Selecting | EngineState::Applying => {
                return Err(BpeError::Consistency(
                    "engine was interrupted during a merge step".to_string(),
                ));
            }
        }

        if self.merges.len() >= self.num_merges {
            self.finish_loop();
            return Ok(None);
        }

        self.state = EngineState::Selecting;
        let Some(job) = self.select() else {
            self.finish_loop();
            return Ok(None);
        };

        self.state = EngineState::Applying;
        let merge = self.apply(&job)?;
        if self.verify {
            self.verify_index()?;
        }
        self.state = EngineState::Ready;

        self.log_progress(&job);
        Ok(Some(merge))
    }

    /// Run the loop to completion.
    pub fn run(mut self) -> BpeResult<TrainResults> {
        log::info!("Starting merge loop: {} merges to compute", self.num_merges);
        while self.step()?.is_some() {}
        Ok(self.finish())
    }

    /// Consume the engine, returning the vocabulary and merges.
    pub fn finish(self) -> TrainResults {
        TrainResults {
            vocab: self.vocab,
            merges: self.merges,
        }
    }

    fn finish_loop(&mut self) {
        self.state = EngineState::Done;
        log::info!(
            "Finished training: {} of {} merges completed",
            self.merges.len(),
            self.num_merges
        );
    }

    /// Pop the best live job, refreshing stale entries.
    fn select(&mut self) -> Option<MergeJob<T, C>> {
        while let Some(mut job) = self.heap.pop() {
            let current = self.index.count(&job.pair);
            if current.is_zero() {
                continue;
            }
            if current != job.count {
                job.count = current;
                self.heap.push(job);
                continue;
            }
            return Some(job);
        }
        None
    }

    /// Apply the merge of `job` to every span that owns its pair.
    fn apply(
        &mut self,
        job: &MergeJob<T, C>,
    ) -> BpeResult<Merge> {
        let merged = job.left.concat(&job.right);
        let replacement = self.table.intern(merged.clone())?;
        self.vocab.push(merged);
        let merge: Merge = (job.left.clone(), job.right.clone());
        self.merges.push(merge.clone());

        let mut net: CommonHashMap<Pair<T>, i64> = CommonHashMap::with_capacity(8);
        let mut grown: CommonHashSet<Pair<T>> = CommonHashSet::with_capacity(16);

        for idx in self.index.take_owners(&job.pair) {
            let (Some(span), Some(&count)) = (self.freq.spans.get_mut(idx), self.freq.counts.get(idx))
            else {
                return Err(BpeError::Consistency(format!(
                    "owner {idx} of pair {:?} is outside the frequency table",
                    job.pair
                )));
            };

            net.clear();
            span.merge_pair_cb(job.pair, replacement, &mut |p, d| {
                *net.entry(p).or_default() += i64::from(d);
            });

            // Removals first, so no count passes through zero mid-update.
            for (&p, &d) in net.iter().filter(|&(_, &d)| d < 0) {
                self.index.decrement(p, weighted(count, -d)?)?;
                if !span.contains_pair(p) {
                    self.index.remove_owner(&p, idx);
                }
            }
            for (&p, &d) in net.iter().filter(|&(_, &d)| d > 0) {
                self.index.increment(p, weighted(count, d)?)?;
                self.index.add_owner(p, idx);
                grown.insert(p);
            }
        }

        let leftover = self.index.count(&job.pair);
        if !leftover.is_zero() {
            return Err(BpeError::Consistency(format!(
                "merged pair {:?} still has count {leftover}",
                job.pair
            )));
        }

        for pair in grown {
            let count = self.index.count(&pair);
            if !count.is_zero() {
                self.heap.push(MergeJob {
                    count,
                    left: self.table.token(pair.0).clone(),
                    right: self.table.token(pair.1).clone(),
                    pair,
                });
            }
        }

        log::debug!(
            "merge {}: {:?} + {:?} (count {})",
            self.merges.len(),
            job.left,
            job.right,
            job.count
        );
        Ok(merge)
    }

    fn log_progress(
        &mut self,
        job: &MergeJob<T, C>,
    ) {
        let merges_done = self.merges.len();
        let current_percent = (merges_done * 100) / self.num_merges.max(1);
        if current_percent > self.last_log_percent {
            log::info!(
                "Progress: {}% ({}/{} merges) - Last merge: {:?} + {:?} (frequency: {})",
                current_percent,
                merges_done,
                self.num_merges,
                job.left,
                job.right,
                job.count
            );
            self.last_log_percent = current_percent;
        }
    }
}

/// `count * delta`, as a count.
fn weighted<C: CountType>(
    count: C,
    delta: i64,
) -> BpeResult<C> {
    C::from_i64(delta)
        .and_then(|d| num_traits::CheckedMul::checked_mul(&count, &d))
        .ok_or_else(|| BpeError::Consistency(format!("count overflow: {count} * {delta}")))
}
