//! # Corpus Chunking
//!
//! Cuts a corpus into independently segmentable byte ranges.
//!
//! A cut is only placed where sequential segmentation also has a pretoken
//! boundary, so the pretoken counts of the chunks sum to the counts of the
//! whole corpus:
//! * with special tokens, at the start of an occurrence of the first special
//!   token, as found by the segmentor's own special matcher;
//! * without, and only for the GPT-2 pattern, at an ASCII space directly
//!   preceded by a printable non-space ASCII byte. No alternative of that
//!   pattern extends a match from a non-space symbol into a following space;
//! * otherwise nowhere: an arbitrary pattern may match across any byte.

use aho_corasick::AhoCorasick;
use core::ops::Range;

/// Where a corpus may be cut without changing its segmentation.
#[derive(Debug, Clone, Copy)]
pub enum CutPoints<'a> {
    /// At starts of the first special token of this matcher.
    Specials(&'a AhoCorasick),

    /// At a space following a printable non-space ASCII byte.
    Spaces,

    /// No safe cuts; the corpus stays whole.
    Whole,
}

/// Find chunk ranges covering `corpus`.
///
/// ## Arguments
/// * `corpus` - the raw corpus bytes.
/// * `desired_chunks` - the maximum number of chunks; fewer are returned when
///   there are not enough safe cut points.
/// * `cuts` - the cut points the segmentor allows.
///
/// ## Returns
/// Contiguous, non-empty ranges in order; a single ``0..0`` range for an
/// empty corpus.
pub fn find_chunk_boundaries(
    corpus: &[u8],
    desired_chunks: usize,
    cuts: CutPoints<'_>,
) -> Vec<Range<usize>> {
    let len = corpus.len();
    if desired_chunks <= 1 || len == 0 || matches!(cuts, CutPoints::Whole) {
        return vec![0..len];
    }

    let chunk_size = len.div_ceil(desired_chunks);
    let mut starts: Vec<usize> = Vec::with_capacity(desired_chunks);
    starts.push(0);

    let mut target = chunk_size;
    let accept = |cut: usize, starts: &mut Vec<usize>, target: &mut usize| {
        if cut < len && starts.last().is_some_and(|&last| cut > last) {
            starts.push(cut);
            while *target <= cut {
                *target += chunk_size;
            }
        }
    };

    match cuts {
        CutPoints::Specials(ac) => {
            for m in ac.find_iter(corpus) {
                if target >= len {
                    break;
                }
                if m.pattern().as_usize() == 0 && m.start() >= target {
                    accept(m.start(), &mut starts, &mut target);
                }
            }
        }
        CutPoints::Spaces => {
            while target < len {
                match next_space_boundary(corpus, target) {
                    Some(cut) => accept(cut, &mut starts, &mut target),
                    None => break,
                }
            }
        }
        CutPoints::Whole => {}
    }

    let mut ranges: Vec<Range<usize>> = starts.windows(2).map(|w| w[0]..w[1]).collect();
    if let Some(&last) = starts.last() {
        ranges.push(last..len);
    }
    ranges
}

/// Find the first safe whitespace cut at or after `from`.
fn next_space_boundary(
    corpus: &[u8],
    from: usize,
) -> Option<usize> {
    (from.max(1)..corpus.len()).find(|&i| corpus[i] == b' ' && corpus[i - 1].is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use aho_corasick::MatchKind;

    use super::*;

    fn check_cover(
        corpus: &[u8],
        ranges: &[Range<usize>],
    ) {
        assert_eq!(ranges.first().unwrap().start, 0);
        assert_eq!(ranges.last().unwrap().end, corpus.len());
        for w in ranges.windows(2) {
            assert_eq!(w[0].end, w[1].start);
            assert!(!w[0].is_empty());
        }
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(find_chunk_boundaries(b"hello world", 1, CutPoints::Spaces), vec![0..11]);
        assert_eq!(find_chunk_boundaries(b"", 4, CutPoints::Spaces), vec![0..0]);
    }

    #[test]
    fn test_space_boundaries() {
        let corpus = b"aaaa bbbb cccc dddd";
        let ranges = find_chunk_boundaries(corpus, 4, CutPoints::Spaces);
        check_cover(corpus, &ranges);
        assert_eq!(ranges, vec![0..9, 9..14, 14..19]);

        for r in &ranges[1..] {
            assert_eq!(corpus[r.start], b' ');
            assert!(corpus[r.start - 1].is_ascii_graphic());
        }
    }

    #[test]
    fn test_whole_corpus() {
        let corpus = b"aaaa bbbb cccc dddd";
        assert_eq!(
            find_chunk_boundaries(corpus, 4, CutPoints::Whole),
            vec![0..corpus.len()]
        );
    }

    #[test]
    fn test_no_cut_inside_whitespace_runs() {
        let corpus = b"a      \n\n     b";
        let ranges = find_chunk_boundaries(corpus, 8, CutPoints::Spaces);
        assert_eq!(ranges, vec![0..corpus.len()]);
    }

    #[test]
    fn test_special_boundaries() {
        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(["<|eot|>", "<|pad|>"])
            .unwrap();

        let corpus = b"one<|eot|>two<|pad|>three<|eot|>four<|eot|>five";
        let ranges = find_chunk_boundaries(corpus, 3, CutPoints::Specials(&ac));
        check_cover(corpus, &ranges);

        // Only the first special token is used as a cut point.
        for r in &ranges[1..] {
            assert!(corpus[r.start..].starts_with(b"<|eot|>"));
        }
        assert_eq!(ranges.len(), 3);
    }

    #[test]
    fn test_special_never_cut_inside_longer_special() {
        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(["b|>", "<|b|>"])
            .unwrap();

        let corpus = b"xxxxxxxx<|b|>yyyyyyyy<|b|>zzzzzzzz";
        let ranges = find_chunk_boundaries(corpus, 4, CutPoints::Specials(&ac));
        assert_eq!(ranges, vec![0..corpus.len()]);
    }
}
