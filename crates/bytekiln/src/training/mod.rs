//! # Vocabulary Training
//!
//! Training requires:
//! * a vocab size, counting the 256 byte tokens and the special tokens;
//! * optional special tokens, which are never merged across;
//! * a corpus, streamed in as samples, text, or raw UTF-8 bytes.
//!
//! ## Training Example
//!
//! ```rust
//! use bytekiln::training::{BpeTrainer, BpeTrainerOptions};
//!
//! # fn main() -> bytekiln::BpeResult<()> {
//! let mut trainer: BpeTrainer = BpeTrainerOptions::new(300)
//!     .with_special_tokens(&["<|endoftext|>"])
//!     .init()?;
//!
//! trainer.update_from_samples(["low lower lowest", "new newer newest"])?;
//! trainer.update_from_bytes(b"<|endoftext|>wide wider widest")?;
//!
//! let results = trainer.train::<u32>()?;
//! assert_eq!(results.vocab.len(), 257 + results.merges.len());
//! # Ok(())
//! # }
//! ```
//!
//! For checkpointing, build the [`MergeEngine`] with
//! [`BpeTrainer::into_engine`] and drive it with [`MergeEngine::step`].

pub mod utility;

mod bpe_trainer;
mod merge_engine;
mod replay;

#[doc(inline)]
pub use bpe_trainer::{BpeTrainer, BpeTrainerOptions, TrainResults, train_bpe, train_bpe_bytes};
#[doc(inline)]
pub use merge_engine::{EngineState, MergeEngine, MergeJob};
#[doc(inline)]
pub use replay::replay_merges;
#[doc(inline)]
pub use utility::{FrequencyTable, PairSpanIndex};
