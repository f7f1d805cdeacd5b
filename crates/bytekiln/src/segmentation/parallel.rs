//! # Parallel Segmentation Driver

use core::ops::Range;

use crate::{
    errors::{BpeError, BpeResult},
    segmentation::{TextSegmentor, chunking::find_chunk_boundaries},
    types::{CommonHashMap, CountType, StringChunkType},
};

/// Count the pretokens of a corpus with `worker_count` workers.
///
/// The corpus is cut by [`find_chunk_boundaries`]; every chunk is decoded and
/// segmented by an independent worker into a local count map. After all
/// workers join, the maps are summed. The result equals sequential
/// segmentation of the whole corpus.
///
/// ## Arguments
/// * `segmentor` - the segmentor; shared read-only by the workers.
/// * `corpus` - the raw corpus bytes.
/// * `worker_count` - the number of workers; the most chunks cut.
///
/// ## Errors
/// * [`BpeError::WorkerFailure`] wrapping the first failed chunk's error.
/// * [`BpeError::ThreadPool`] if the worker pool cannot be built.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(segmentor, corpus)))]
pub fn count_pretokens_parallel<K, C>(
    segmentor: &TextSegmentor,
    corpus: &[u8],
    worker_count: usize,
) -> BpeResult<CommonHashMap<K, C>>
where
    K: StringChunkType,
    C: CountType,
{
    let chunks = find_chunk_boundaries(corpus, worker_count, segmentor.cut_points());
    log::info!(
        "Segmenting {} bytes as {} chunks on {} workers",
        corpus.len(),
        chunks.len(),
        worker_count
    );

    let count_chunk = |(worker, range): (usize, &Range<usize>)| -> BpeResult<CommonHashMap<K, C>> {
        let mut counts: CommonHashMap<K, C> = CommonHashMap::new();
        segmentor
            .count_pretoken_bytes_into(&corpus[range.clone()], range.start, &mut counts)
            .map_err(|e| BpeError::WorkerFailure {
                worker,
                source: Box::new(e),
            })?;
        log::debug!("chunk {worker}: {} distinct pretokens", counts.len());
        Ok(counts)
    };

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            use rayon::prelude::*;

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(worker_count)
                .build()?;
            let partials: Vec<CommonHashMap<K, C>> = pool.install(|| {
                chunks
                    .par_iter()
                    .enumerate()
                    .map(count_chunk)
                    .collect::<BpeResult<Vec<_>>>()
            })?;
        } else {
            let partials: Vec<CommonHashMap<K, C>> = chunks
                .iter()
                .enumerate()
                .map(count_chunk)
                .collect::<BpeResult<Vec<_>>>()?;
        }
    }

    Ok(sum_counts(partials))
}

/// Sum count maps into one.
pub fn sum_counts<K, C, I>(partials: I) -> CommonHashMap<K, C>
where
    K: StringChunkType,
    C: CountType,
    I: IntoIterator<Item = CommonHashMap<K, C>>,
{
    let mut partials = partials.into_iter();
    let mut total = partials.next().unwrap_or_default();
    for partial in partials {
        for (k, v) in partial {
            *total.entry(k).or_default() += v;
        }
    }
    total
}
