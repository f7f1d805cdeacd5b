//! # Text Segmentor

use aho_corasick::{AhoCorasick, MatchKind};
use core::ops::Range;

use crate::{
    errors::{BpeError, BpeResult},
    regex::{GPT2_PRETOKEN_PATTERN, RegexWrapper, RegexWrapperPattern},
    segmentation::chunking::CutPoints,
    types::{CommonHashMap, CountType, StringChunkType},
    vocab::validate_special_tokens,
};

/// Word Split + Special Words Segmentor
///
/// Text is first cut on every special token (the special token itself is
/// dropped); each remaining piece is split into pretokens by the word regex.
/// No pretoken ever spans a special token.
#[derive(Debug, Clone)]
pub struct TextSegmentor {
    /// Regex for splitting words.
    word_re: RegexWrapper,

    /// Leftmost-longest matcher over the special tokens, in input order.
    special_ac: Option<AhoCorasick>,
}

impl TextSegmentor {
    /// Create a segmentor with the default pattern and no special tokens.
    pub fn gpt2() -> BpeResult<Self> {
        Self::from_patterns::<_, &str>(GPT2_PRETOKEN_PATTERN, &[])
    }

    /// Create a new text segmentor with the given regex pattern and special words.
    ///
    /// ## Arguments
    /// * `word_pattern` - The word split pattern.
    /// * `specials` - The special word strings; when several match at one
    ///   position, the longest wins.
    ///
    /// ## Errors
    /// * [`BpeError::Pattern`] if the word pattern does not compile.
    /// * [`BpeError::Input`] if a special word is empty or repeated.
    pub fn from_patterns<P, S>(
        word_pattern: P,
        specials: &[S],
    ) -> BpeResult<Self>
    where
        P: Into<RegexWrapperPattern>,
        S: AsRef<str>,
    {
        let word_re = word_pattern.into().compile()?;

        validate_special_tokens(specials)?;
        let special_ac = if specials.is_empty() {
            None
        } else {
            let ac = AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(specials.iter().map(|s| s.as_ref()))
                .map_err(|e| BpeError::Input(format!("special token matcher: {e}")))?;
            Some(ac)
        };

        Ok(Self {
            word_re,
            special_ac,
        })
    }

    /// Get the word split regex.
    pub fn word_regex(&self) -> &RegexWrapper {
        &self.word_re
    }

    /// Get the special token matcher, if there are special tokens.
    ///
    /// Pattern ids follow the order the special tokens were given in.
    pub fn special_matcher(&self) -> Option<&AhoCorasick> {
        self.special_ac.as_ref()
    }

    /// Where a corpus may be cut for parallel segmentation.
    ///
    /// Special tokens are always safe cuts. Without them, only the GPT-2
    /// pattern is known to break at spaces after a visible byte.
    pub fn cut_points(&self) -> CutPoints<'_> {
        match &self.special_ac {
            Some(ac) => CutPoints::Specials(ac),
            None if self.word_re.as_str() == GPT2_PRETOKEN_PATTERN.as_str() => CutPoints::Spaces,
            None => CutPoints::Whole,
        }
    }

    /// Visit each text piece delimited by special tokens.
    ///
    /// ## Arguments
    /// * `text` - the text to cut.
    /// * `f` - called with ``(offset, piece)`` for every piece, including
    ///   empty pieces between adjacent special tokens.
    pub fn for_each_piece<'t, F>(
        &self,
        text: &'t str,
        f: &mut F,
    ) -> BpeResult<()>
    where
        F: FnMut(usize, &'t str) -> BpeResult<()>,
    {
        let mut last = 0;
        if let Some(ac) = &self.special_ac {
            for m in ac.find_iter(text) {
                f(last, &text[last..m.start()])?;
                last = m.end();
            }
        }
        f(last, &text[last..])
    }

    /// Visit each pretoken in the text.
    ///
    /// ## Errors
    /// [`BpeError::Encoding`] if the word regex fails at run time.
    pub fn for_each_pretoken<'t, F>(
        &self,
        text: &'t str,
        f: &mut F,
    ) -> BpeResult<()>
    where
        F: FnMut(&'t str),
    {
        self.for_each_piece(text, &mut |offset, piece| {
            for m in self.word_re.find_ranges(piece) {
                let Range { start, end } = m.map_err(|e| BpeError::Encoding {
                    offset,
                    message: e.to_string(),
                })?;
                f(&piece[start..end]);
            }
            Ok(())
        })
    }

    /// Split text into pretokens.
    pub fn pretokens<'t>(
        &self,
        text: &'t str,
    ) -> BpeResult<Vec<&'t str>> {
        let mut words = Vec::new();
        self.for_each_pretoken(text, &mut |w| words.push(w))?;
        Ok(words)
    }

    /// Count the pretokens of `text` into `counts`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text, counts)))]
    pub fn count_pretokens_into<K, C>(
        &self,
        text: &str,
        counts: &mut CommonHashMap<K, C>,
    ) -> BpeResult<()>
    where
        K: StringChunkType,
        C: CountType,
    {
        self.for_each_pretoken(text, &mut |w| {
            *counts.entry(K::from(w)).or_default() += C::one();
        })
    }

    /// Count the pretokens of UTF-8 `bytes` into `counts`.
    ///
    /// ## Arguments
    /// * `bytes` - the raw input.
    /// * `offset` - the offset of `bytes` in the larger corpus; used for errors.
    ///
    /// ## Errors
    /// [`BpeError::Encoding`] if `bytes` is not valid UTF-8.
    pub fn count_pretoken_bytes_into<K, C>(
        &self,
        bytes: &[u8],
        offset: usize,
        counts: &mut CommonHashMap<K, C>,
    ) -> BpeResult<()>
    where
        K: StringChunkType,
        C: CountType,
    {
        let text =
            core::str::from_utf8(bytes).map_err(|e| BpeError::from_utf8_error(e, offset))?;
        self.count_pretokens_into(text, counts).map_err(|e| match e {
            BpeError::Encoding {
                offset: local,
                message,
            } => BpeError::Encoding {
                offset: offset + local,
                message,
            },
            e => e,
        })
    }
}
