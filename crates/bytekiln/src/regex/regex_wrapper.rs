//! # Regex Wrapper
//!
//! Pretokenization patterns may target either `regex` or `fancy_regex`;
//! these types let the segmentor hold and run either one.

use core::ops::Range;

/// A pattern compile or match failure, from either regex engine.
#[non_exhaustive]
#[derive(Clone, Debug, thiserror::Error)]
pub enum ErrorWrapper {
    /// Error from `regex`.
    #[error(transparent)]
    Basic(#[from] regex::Error),

    /// Error from `fancy_regex`.
    #[error(transparent)]
    Fancy(#[from] fancy_regex::Error),
}

/// A pattern known at compile time, labeled with its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConstRegexWrapperPattern {
    /// Runs on `regex`.
    Basic(&'static str),

    /// Runs on `fancy_regex`.
    Fancy(&'static str),
}

impl ConstRegexWrapperPattern {
    /// The pattern source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic(pattern) | Self::Fancy(pattern) => pattern,
        }
    }

    /// Compile on the labeled engine.
    pub fn compile(&self) -> Result<RegexWrapper, ErrorWrapper> {
        RegexWrapperPattern::from(*self).compile()
    }
}

impl From<ConstRegexWrapperPattern> for RegexWrapperPattern {
    fn from(pattern: ConstRegexWrapperPattern) -> Self {
        match pattern {
            ConstRegexWrapperPattern::Basic(p) => Self::Basic(p.to_string()),
            ConstRegexWrapperPattern::Fancy(p) => Self::Fancy(p.to_string()),
        }
    }
}

/// An owned pattern, labeled with the engine it should compile on.
///
/// Plain strings convert to [`RegexWrapperPattern::Adaptive`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RegexWrapperPattern {
    /// Runs on `regex`.
    Basic(String),

    /// Runs on `fancy_regex`.
    Fancy(String),

    /// Tries `regex` first; falls back to `fancy_regex` when the pattern
    /// needs look-around or back-references.
    Adaptive(String),
}

impl<S: AsRef<str>> From<S> for RegexWrapperPattern {
    fn from(pattern: S) -> Self {
        Self::Adaptive(pattern.as_ref().to_string())
    }
}

impl RegexWrapperPattern {
    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(pattern) | Self::Fancy(pattern) | Self::Adaptive(pattern) => pattern,
        }
    }

    /// Compile the pattern.
    ///
    /// ## Errors
    /// For `Adaptive` patterns, the `fancy_regex` error is reported when
    /// both engines reject the pattern.
    pub fn compile(&self) -> Result<RegexWrapper, ErrorWrapper> {
        Ok(match self {
            Self::Basic(pattern) => regex::Regex::new(pattern)?.into(),
            Self::Fancy(pattern) => fancy_regex::Regex::new(pattern)?.into(),
            Self::Adaptive(pattern) => match regex::Regex::new(pattern) {
                Ok(re) => re.into(),
                Err(_) => fancy_regex::Regex::new(pattern)?.into(),
            },
        })
    }
}

/// A compiled pretokenization regex.
#[derive(Debug, Clone)]
pub enum RegexWrapper {
    /// A `regex::Regex`.
    Basic(regex::Regex),

    /// A `fancy_regex::Regex`.
    Fancy(fancy_regex::Regex),
}

impl From<regex::Regex> for RegexWrapper {
    fn from(regex: regex::Regex) -> Self {
        Self::Basic(regex)
    }
}

impl From<fancy_regex::Regex> for RegexWrapper {
    fn from(regex: fancy_regex::Regex) -> Self {
        Self::Fancy(regex)
    }
}

impl RegexWrapper {
    /// Does this run on `fancy_regex`?
    pub fn is_fancy(&self) -> bool {
        matches!(self, Self::Fancy(_))
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic(regex) => regex.as_str(),
            Self::Fancy(regex) => regex.as_str(),
        }
    }

    /// Iterate the byte ranges of non-overlapping matches in `haystack`.
    ///
    /// `fancy_regex` run-time failures, such as exceeding the backtrack
    /// limit, are yielded as `Err`.
    pub fn find_ranges<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> MatchRanges<'r, 'h> {
        match self {
            Self::Basic(regex) => MatchRanges::Basic(regex.find_iter(haystack)),
            Self::Fancy(regex) => MatchRanges::Fancy(regex.find_iter(haystack)),
        }
    }
}

/// Iterator returned by [`RegexWrapper::find_ranges`].
pub enum MatchRanges<'r, 'h> {
    /// Matches from `regex`.
    Basic(regex::Matches<'r, 'h>),

    /// Matches from `fancy_regex`.
    Fancy(fancy_regex::Matches<'r, 'h>),
}

impl Iterator for MatchRanges<'_, '_> {
    type Item = Result<Range<usize>, ErrorWrapper>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Basic(matches) => matches.next().map(|m| Ok(m.range())),
            Self::Fancy(matches) => matches
                .next()
                .map(|m| m.map(|m| m.range()).map_err(ErrorWrapper::from)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_prefers_basic() {
        let re = RegexWrapperPattern::from(r"\w+").compile().unwrap();
        assert!(!re.is_fancy());
        assert_eq!(re.as_str(), r"\w+");
    }

    #[test]
    fn test_adaptive_falls_back_to_fancy() {
        // Look-around is not supported by `regex`.
        let re = RegexWrapperPattern::from(r"\s+(?!\S)").compile().unwrap();
        assert!(re.is_fancy());
    }

    #[test]
    fn test_bad_pattern() {
        assert!(RegexWrapperPattern::Basic("(".to_string()).compile().is_err());
        assert!(RegexWrapperPattern::Fancy("(".to_string()).compile().is_err());
        assert!(matches!(
            RegexWrapperPattern::from("(").compile(),
            Err(ErrorWrapper::Fancy(_))
        ));
    }

    #[test]
    fn test_find_ranges() {
        let text = "ab cd  ef";
        for re in [
            RegexWrapperPattern::Basic(r"\w+".to_string()).compile().unwrap(),
            RegexWrapperPattern::Fancy(r"\w+".to_string()).compile().unwrap(),
        ] {
            let ranges = re
                .find_ranges(text)
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            assert_eq!(ranges, vec![0..2, 3..5, 7..9]);
        }
    }
}
