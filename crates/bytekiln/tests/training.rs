#![allow(missing_docs)]

use bytekiln::{
    BpeError,
    ByteToken,
    Merge,
    TrainResults,
    segmentation::TextSegmentor,
    train_bpe,
    train_bpe_bytes,
    training::{BpeTrainer, BpeTrainerOptions, EngineState, replay_merges},
};

const SPECIAL: &str = "<|endoftext|>";

const LOW_CORPUS: &str =
    "low low low lower lower newest newest newest newest newest widest widest widest";

fn merge(
    left: &str,
    right: &str,
) -> Merge {
    (left.into(), right.into())
}

fn check_contiguous(results: &TrainResults) {
    let map = results.vocab.to_map();
    assert_eq!(map.len(), results.vocab.len());
    assert_eq!(
        map.keys().copied().collect::<Vec<_>>(),
        (0..results.vocab.len()).collect::<Vec<_>>()
    );
    for i in 0..256 {
        assert_eq!(map[&i], vec![i as u8]);
    }

    let base = results.vocab.base_len();
    assert_eq!(results.vocab.len(), base + results.merges.len());
    for (i, (left, right)) in results.merges.iter().enumerate() {
        assert_eq!(results.vocab.get(base + i), Some(&left.concat(right)));
    }
}

#[test]
fn test_example_repeated_runs() {
    let results = train_bpe::<&str>("aaabdaaabac", 256 + 3, &[], 1).unwrap();

    assert_eq!(
        results.merges,
        vec![merge("a", "a"), merge("aa", "a"), merge("aaa", "b")]
    );
    assert_eq!(results.vocab.get(256), Some(&ByteToken::from("aa")));
    assert_eq!(results.vocab.get(257), Some(&ByteToken::from("aaa")));
    assert_eq!(results.vocab.get(258), Some(&ByteToken::from("aaab")));
    check_contiguous(&results);
}

#[test]
fn test_example_low_lower_newest_widest() {
    let results = train_bpe::<&str>(LOW_CORPUS, 256 + 6, &[], 1).unwrap();

    // (e, s) and (s, t) both occur 8 times; the greater pair wins.
    assert_eq!(
        results.merges,
        vec![
            merge("s", "t"),
            merge("e", "st"),
            merge("w", "est"),
            merge("o", "w"),
            merge("n", "e"),
            merge("ne", "west"),
        ]
    );
    check_contiguous(&results);
}

#[test]
fn test_example_special_split() {
    let segmentor = TextSegmentor::from_patterns(
        bytekiln::regex::GPT2_PRETOKEN_PATTERN,
        &[SPECIAL],
    )
    .unwrap();
    assert_eq!(
        segmentor.pretokens("hello<|endoftext|>world").unwrap(),
        vec!["hello", "world"]
    );

    let results = train_bpe("hello<|endoftext|>world", 1000, &[SPECIAL], 1).unwrap();
    assert_eq!(results.vocab.get(256), Some(&ByteToken::from(SPECIAL)));
    for (left, right) in &results.merges {
        let merged = left.concat(right);
        assert!(
            b"hello".windows(merged.len()).any(|w| w == merged.as_bytes())
                || b"world".windows(merged.len()).any(|w| w == merged.as_bytes()),
            "merge crosses a special token: {merged:?}"
        );
    }
    assert_eq!(results.merges.len(), 8);
}

#[test]
fn test_example_no_room_for_merges() {
    let results = train_bpe("hello hello hello", 256, &[SPECIAL], 1).unwrap();
    assert!(results.merges.is_empty());
    assert_eq!(results.vocab.len(), 257);
    check_contiguous(&results);

    let results = train_bpe("hello hello hello", 0, &[SPECIAL], 1).unwrap();
    assert!(results.merges.is_empty());
    assert_eq!(results.vocab.len(), 257);
}

#[test]
fn test_merge_count_law() {
    // Plenty of room: the run ends when pairs are exhausted.
    let results = train_bpe::<&str>("ab ab cd", 10_000, &[], 1).unwrap();
    // "ab", " ab" and " cd" each collapse to a single token.
    assert_eq!(results.merges.len(), 4);

    // Requested merges bind first.
    let results = train_bpe::<&str>(LOW_CORPUS, 256 + 2, &[], 1).unwrap();
    assert_eq!(results.merges.len(), 2);

    // Empty corpus.
    let results = train_bpe::<&str>("", 300, &[], 1).unwrap();
    assert!(results.merges.is_empty());
}

#[test]
fn test_vocab_size_far_beyond_corpus() {
    let results = train_bpe::<&str>("ab ab", 4_000_000_000, &[], 1).unwrap();
    assert_eq!(results.merges, vec![merge("a", "b"), merge(" ", "ab")]);
    check_contiguous(&results);
}

#[test]
fn test_determinism() {
    let corpus = format!("{LOW_CORPUS}{SPECIAL}{LOW_CORPUS} it's 2024, isn't it?");
    for workers in [1, 3] {
        let a = train_bpe(&corpus, 320, &[SPECIAL], workers).unwrap();
        let b = train_bpe(&corpus, 320, &[SPECIAL], workers).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let corpus = format!("{LOW_CORPUS}{SPECIAL}").repeat(12);

    let sequential = train_bpe(&corpus, 300, &[SPECIAL], 1).unwrap();
    for workers in [2, 4, 7] {
        let parallel = train_bpe(&corpus, 300, &[SPECIAL], workers).unwrap();
        assert_eq!(parallel, sequential, "workers: {workers}");
    }

    // Without specials, the corpus is cut on whitespace.
    let sequential = train_bpe::<&str>(LOW_CORPUS, 280, &[], 1).unwrap();
    let parallel = train_bpe::<&str>(LOW_CORPUS, 280, &[], 4).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_parallel_matches_sequential_custom_pattern() {
    let corpus = "aaaa bbbb cccc dddd eeee ffff gggg hhhh";
    let train = |workers| {
        let mut trainer: BpeTrainer = BpeTrainerOptions::new(400)
            .with_pattern("[a-z ]+")
            .with_worker_count(workers)
            .init()
            .unwrap();
        trainer.update_from_bytes(corpus.as_bytes()).unwrap();
        trainer.train::<u32>().unwrap()
    };

    let sequential = train(1);
    for workers in [2, 4] {
        assert_eq!(train(workers), sequential, "workers: {workers}");
    }
}

#[test]
fn test_input_errors() {
    assert!(matches!(
        train_bpe::<&str>("abc", 300, &[], 0),
        Err(BpeError::Input(_))
    ));
    assert!(matches!(
        train_bpe("abc", 300, &["<a>", "<a>"], 1),
        Err(BpeError::Input(_))
    ));
    assert!(matches!(
        train_bpe("abc", 300, &[""], 1),
        Err(BpeError::Input(_))
    ));
}

#[test]
fn test_invalid_utf8() {
    let mut corpus = b"hello world ".repeat(4);
    let bad_offset = corpus.len();
    corpus.extend_from_slice(b"\xf0\x28\x8c\x28 tail");

    match train_bpe_bytes::<&str>(&corpus, 300, &[], 1) {
        Err(BpeError::Encoding { offset, .. }) => assert_eq!(offset, bad_offset),
        other => panic!("unexpected result: {other:?}"),
    }

    match train_bpe_bytes::<&str>(&corpus, 300, &[], 3) {
        Err(BpeError::WorkerFailure { source, .. }) => match *source {
            BpeError::Encoding { offset, .. } => assert_eq!(offset, bad_offset),
            other => panic!("unexpected source: {other:?}"),
        },
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_stepwise_checkpoints() {
    let mut trainer: BpeTrainer = BpeTrainerOptions::new(256 + 6)
        .with_verify_index(true)
        .init()
        .unwrap();
    trainer.update_from_text(LOW_CORPUS).unwrap();

    let mut engine = trainer.into_engine::<u32>().unwrap();
    let mut checkpoints = Vec::new();
    while let Some(merge) = engine.step().unwrap() {
        checkpoints.push(engine.checkpoint());
        assert_eq!(checkpoints.last().unwrap().merges.last(), Some(&merge));
    }
    assert_eq!(engine.state(), EngineState::Done);

    let results = engine.finish();
    assert_eq!(checkpoints.len(), 6);
    for (i, checkpoint) in checkpoints.iter().enumerate() {
        assert_eq!(checkpoint.merges, results.merges[..=i]);
        assert_eq!(checkpoint.vocab.len(), 257 + i);
    }
}

#[test]
fn test_replay_reproduces_segmentation() {
    let mut trainer: BpeTrainer = BpeTrainerOptions::new(290).init().unwrap();
    trainer.update_from_text(LOW_CORPUS).unwrap();

    let mut engine = trainer.into_engine::<u32>().unwrap();
    while engine.step().unwrap().is_some() {}

    let table = engine.token_table();
    let freq = engine.frequency_table();
    for (span, _) in freq.iter() {
        let tokens = span.to_byte_tokens(table);
        let bytes: Vec<u8> = tokens.iter().flat_map(|t| t.to_vec()).collect();
        assert_eq!(replay_merges(&bytes, engine.merges()), tokens);
    }
}
