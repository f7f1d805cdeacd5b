//! # Pretoken Counter

use crate::{
    errors::BpeResult,
    segmentation::{
        TextSegmentor,
        parallel::{count_pretokens_parallel, sum_counts},
    },
    training::utility::FrequencyTable,
    types::{CommonHashMap, CountType, StringChunkType, TokenType},
    vocab::TokenTable,
};

/// Accumulates ``{ pretoken -> count }`` over streamed input.
pub struct PretokenCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// The segmentor.
    pub segmentor: TextSegmentor,

    /// The pretoken counts.
    pub word_counts: CommonHashMap<K, C>,
}

impl<K, C> PretokenCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Create a new, empty counter.
    pub fn new(segmentor: TextSegmentor) -> Self {
        Self {
            segmentor,
            word_counts: CommonHashMap::with_capacity(4096),
        }
    }

    /// Release the pretoken counts and return them.
    pub fn release(self) -> CommonHashMap<K, C> {
        self.word_counts
    }

    /// Update counts inplace from text.
    pub fn update_from_text<S: AsRef<str>>(
        &mut self,
        text: S,
    ) -> BpeResult<()> {
        self.segmentor
            .count_pretokens_into(text.as_ref(), &mut self.word_counts)
    }

    /// Update counts inplace from a sample iterator.
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) -> BpeResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for sample in samples {
            self.update_from_text(sample)?;
        }
        Ok(())
    }

    /// Update counts inplace from raw UTF-8 bytes.
    ///
    /// ## Arguments
    /// * `bytes` - the corpus bytes.
    /// * `worker_count` - ``1`` segments in place; more uses the parallel driver.
    ///
    /// ## Errors
    /// * [`crate::BpeError::Encoding`] for invalid UTF-8 in sequential mode.
    /// * [`crate::BpeError::WorkerFailure`] for any worker error in parallel mode.
    pub fn update_from_bytes(
        &mut self,
        bytes: &[u8],
        worker_count: usize,
    ) -> BpeResult<()> {
        if worker_count <= 1 {
            return self
                .segmentor
                .count_pretoken_bytes_into(bytes, 0, &mut self.word_counts);
        }

        let counts: CommonHashMap<K, C> =
            count_pretokens_parallel(&self.segmentor, bytes, worker_count)?;
        if self.word_counts.is_empty() {
            self.word_counts = counts;
        } else {
            let current = core::mem::take(&mut self.word_counts);
            self.word_counts = sum_counts([current, counts]);
        }
        Ok(())
    }

    /// Build the [`FrequencyTable`] of the counted pretokens.
    pub fn to_frequency_table<T: TokenType>(
        &self,
        table: &TokenTable<T>,
    ) -> FrequencyTable<T, C> {
        FrequencyTable::from_word_counts(&self.word_counts, table)
    }
}
