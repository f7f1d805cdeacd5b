//! # Vocab Trainer

use compact_str::CompactString;

use crate::{
    errors::{BpeError, BpeResult},
    regex::{GPT2_PRETOKEN_PATTERN, RegexWrapperPattern},
    segmentation::TextSegmentor,
    training::{MergeEngine, utility::PretokenCounter},
    types::{CountType, StringChunkType, TokenType},
    vocab::{Merge, TokenTable, U8_SIZE, Vocabulary},
};

/// Options for [`BpeTrainer`].
#[derive(Debug, Clone)]
pub struct BpeTrainerOptions {
    /// The regex pattern used for text splitting.
    pub pattern: RegexWrapperPattern,

    /// The target vocab size, including bytes and special tokens.
    pub vocab_size: usize,

    /// The special tokens, in id order.
    pub special_tokens: Vec<String>,

    /// The number of segmentation workers for byte input.
    pub worker_count: usize,

    /// Recount the pair index after every merge.
    pub verify_index: bool,
}

impl BpeTrainerOptions {
    /// Create new options.
    ///
    /// The defaults are the GPT-2 split pattern, no special tokens and a
    /// single worker.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            pattern: GPT2_PRETOKEN_PATTERN.into(),
            vocab_size,
            special_tokens: Vec::new(),
            worker_count: 1,
            verify_index: false,
        }
    }

    /// Sets the vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the regex pattern used for text splitting.
    ///
    /// The pattern is compiled by [`BpeTrainerOptions::init`].
    pub fn with_pattern<P: Into<RegexWrapperPattern>>(
        self,
        pattern: P,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            ..self
        }
    }

    /// Sets the special tokens.
    ///
    /// ## Arguments
    /// * `special_tokens` - the special tokens; their ids follow the 256 byte
    ///   ids, in this order.
    pub fn with_special_tokens<S: AsRef<str>>(
        self,
        special_tokens: &[S],
    ) -> Self {
        Self {
            special_tokens: special_tokens
                .iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            ..self
        }
    }

    /// Sets the number of segmentation workers; must be at least 1.
    pub fn with_worker_count(
        self,
        worker_count: usize,
    ) -> Self {
        Self {
            worker_count,
            ..self
        }
    }

    /// Enables a full pair index recount after every merge.
    pub fn with_verify_index(
        self,
        verify_index: bool,
    ) -> Self {
        Self {
            verify_index,
            ..self
        }
    }

    /// Initializes a [`BpeTrainer`] from these options.
    ///
    /// ## Errors
    /// * [`BpeError::Input`] for a zero worker count or bad special tokens.
    /// * [`BpeError::Pattern`] if the pattern does not compile.
    pub fn init<K, C>(self) -> BpeResult<BpeTrainer<K, C>>
    where
        K: StringChunkType,
        C: CountType,
    {
        BpeTrainer::new(self)
    }
}

/// The results of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainResults {
    /// The contiguous vocabulary.
    pub vocab: Vocabulary,

    /// The merges, earliest first; ``merges[i]`` created vocab id
    /// ``vocab.base_len() + i``.
    pub merges: Vec<Merge>,
}

/// Trainer for learning byte-level BPE vocabularies.
///
/// # Parameters
/// * `K` - the type used to store pretokens in the counts.
/// * `C` - the type used to store counts.
pub struct BpeTrainer<K = CompactString, C = u64>
where
    K: StringChunkType,
    C: CountType,
{
    /// Trainer options.
    pub options: BpeTrainerOptions,

    /// The pretoken counter.
    pub counter: PretokenCounter<K, C>,
}

impl<K, C> BpeTrainer<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Initializes a [`BpeTrainer`].
    ///
    /// ## Errors
    /// See [`BpeTrainerOptions::init`].
    pub fn new(options: BpeTrainerOptions) -> BpeResult<Self> {
        if options.worker_count == 0 {
            return Err(BpeError::Input(
                "worker count must be at least 1".to_string(),
            ));
        }
        let segmentor = TextSegmentor::from_patterns(options.pattern.clone(), &options.special_tokens)?;

        Ok(Self {
            options,
            counter: PretokenCounter::new(segmentor),
        })
    }

    /// Update pretoken counts from a sample iterator.
    ///
    /// ## Arguments
    /// * `samples` - An iterator over string-like samples.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, samples)))]
    pub fn update_from_samples<I>(
        &mut self,
        samples: I,
    ) -> BpeResult<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.counter.update_from_samples(samples)
    }

    /// Update pretoken counts from one text.
    pub fn update_from_text<S: AsRef<str>>(
        &mut self,
        text: S,
    ) -> BpeResult<()> {
        self.counter.update_from_text(text)
    }

    /// Update pretoken counts from raw UTF-8 bytes, using the configured
    /// number of workers.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, bytes)))]
    pub fn update_from_bytes(
        &mut self,
        bytes: &[u8],
    ) -> BpeResult<()> {
        self.counter
            .update_from_bytes(bytes, self.options.worker_count)
    }

    /// Build the [`MergeEngine`] for the counted pretokens.
    ///
    /// Use this to drive training step by step; [`BpeTrainer::train`]
    /// runs it to completion.
    pub fn into_engine<T: TokenType>(self) -> BpeResult<MergeEngine<T, C>> {
        let vocab = Vocabulary::with_specials(&self.options.special_tokens)?;
        let table: TokenTable<T> = TokenTable::new()?;

        let requested = self.options.vocab_size.saturating_sub(vocab.len());
        // The largest symbol the table can need.
        if T::from_usize(U8_SIZE + requested - 1).is_none() {
            return Err(BpeError::Input(format!(
                "vocab size {} exceeds the symbol type capacity",
                self.options.vocab_size
            )));
        }

        let freq = self.counter.to_frequency_table(&table);
        log::info!(
            "Counted {} pretokens ({} distinct)",
            freq.total_count(),
            freq.len()
        );

        Ok(
            MergeEngine::new(table, freq, vocab, self.options.vocab_size)
                .with_verify_index(self.options.verify_index),
        )
    }

    /// Train the vocabulary.
    ///
    /// ## Returns
    /// The vocabulary and merges. Fewer merges than requested are returned
    /// when the corpus runs out of pairs.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn train<T: TokenType>(self) -> BpeResult<TrainResults> {
        self.into_engine::<T>()?.run()
    }
}

/// Train a byte-level BPE vocabulary on a text corpus.
///
/// ## Arguments
/// * `corpus` - the training text.
/// * `vocab_size` - the target vocabulary size; at most
///   ``vocab_size - 256 - special_tokens.len()`` merges are learned.
/// * `special_tokens` - never merged across; assigned the ids after the bytes.
/// * `worker_count` - ``1`` segments sequentially; more shards the corpus.
///
/// ## Errors
/// See [`BpeError`]; no partial results are returned.
pub fn train_bpe<S: AsRef<str>>(
    corpus: &str,
    vocab_size: usize,
    special_tokens: &[S],
    worker_count: usize,
) -> BpeResult<TrainResults> {
    train_bpe_bytes(corpus.as_bytes(), vocab_size, special_tokens, worker_count)
}

/// Train a byte-level BPE vocabulary on a UTF-8 byte corpus.
///
/// As [`train_bpe`]; invalid UTF-8 is reported as an
/// [`BpeError::Encoding`] error, or as a [`BpeError::WorkerFailure`]
/// wrapping one when `worker_count > 1`.
pub fn train_bpe_bytes<S: AsRef<str>>(
    corpus: &[u8],
    vocab_size: usize,
    special_tokens: &[S],
    worker_count: usize,
) -> BpeResult<TrainResults> {
    let mut trainer: BpeTrainer = BpeTrainerOptions::new(vocab_size)
        .with_special_tokens(special_tokens)
        .with_worker_count(worker_count)
        .init()?;
    trainer.update_from_bytes(corpus)?;
    trainer.train::<u32>()
}
