use std::io::Write;

use bytekiln::{
    TrainResults,
    training::{BpeTrainer, BpeTrainerOptions},
};

use crate::{LogArgs, input_output::OutputArgs};

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Input files; each is read whole and must be UTF-8.
    files: Vec<String>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Target vocab size, counting the 256 bytes and the special tokens.
    #[arg(long, default_value = "1000")]
    vocab_size: usize,

    /// Special token; never merged across. May be repeated.
    #[arg(long = "special-token")]
    special_tokens: Vec<String>,

    /// Segmentation workers per file.
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Recount the pair index after every merge; slow.
    #[arg(long)]
    verify_index: bool,

    /// Word span regex; defaults to the GPT-2 pattern.
    #[arg(long)]
    regex: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

impl TrainArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let mut trainer: BpeTrainer = self.options().init()?;

        // Decode everything up front; a bad file fails before any training.
        log::info!("Reading files:");
        let mut texts = Vec::with_capacity(self.files.len());
        for (idx, path) in self.files.iter().enumerate() {
            log::info!("{idx}: {path}");
            texts.push(read_text_file(path)?);
        }

        for text in &texts {
            trainer.update_from_bytes(text.as_bytes())?;
        }
        drop(texts);

        log::info!("Training...");
        let results = trainer.train::<u32>()?;

        log::info!(
            "Vocabulary size: {} ({} merges)",
            results.vocab.len(),
            results.merges.len()
        );
        if results.vocab.len() < self.vocab_size {
            log::warn!(
                "Corpus ran out of pairs before reaching vocab size {}",
                self.vocab_size
            );
        }

        if let Some(path) = self.output.path() {
            log::info!("output: {path}");
        }
        let mut writer = self.output.open_writer()?;
        write_merges(&results, &mut writer)?;
        writer.flush()?;

        Ok(())
    }

    fn options(&self) -> BpeTrainerOptions {
        let options = BpeTrainerOptions::new(self.vocab_size)
            .with_special_tokens(self.special_tokens.as_slice())
            .with_worker_count(self.workers)
            .with_verify_index(self.verify_index);

        match &self.regex {
            Some(regex) => options.with_pattern(regex.as_str()),
            None => options,
        }
    }
}

/// Read a whole file as UTF-8 text.
fn read_text_file(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|err| {
        format!(
            "{path}: invalid UTF-8 at byte {}",
            err.utf8_error().valid_up_to()
        )
        .into()
    })
}

/// Write one ``id<TAB>left<TAB>right`` line per merge.
///
/// Token bytes are ASCII-escaped, so tabs and newlines in tokens
/// cannot break the layout.
fn write_merges<W: Write + ?Sized>(
    results: &TrainResults,
    writer: &mut W,
) -> std::io::Result<()> {
    let base = results.vocab.base_len();
    for (idx, (left, right)) in results.merges.iter().enumerate() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            base + idx,
            left.escape_ascii(),
            right.escape_ascii()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempdir::TempDir;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct Wrapper {
        #[clap(flatten)]
        train: TrainArgs,
    }

    #[test]
    fn test_parse_args() {
        let args = Wrapper::parse_from([
            "bytekiln",
            "a.txt",
            "b.txt",
            "--vocab-size",
            "300",
            "--special-token",
            "<|endoftext|>",
            "--special-token",
            "<|pad|>",
            "--workers",
            "4",
            "--output",
            "merges.txt",
        ])
        .train;

        assert_eq!(args.files, vec!["a.txt", "b.txt"]);
        assert_eq!(args.vocab_size, 300);
        assert_eq!(args.special_tokens, vec!["<|endoftext|>", "<|pad|>"]);
        assert_eq!(args.workers, 4);
        assert!(!args.verify_index);
        assert_eq!(args.output.path(), Some("merges.txt"));

        let options = args.options();
        assert_eq!(options.vocab_size, 300);
        assert_eq!(options.worker_count, 4);
        assert_eq!(options.special_tokens.len(), 2);
    }

    #[test]
    fn test_write_merges() {
        let mut trainer: BpeTrainer = BpeTrainerOptions::new(256 + 1 + 2)
            .with_special_tokens(&["<s>"])
            .init()
            .unwrap();
        trainer.update_from_text("\t\t\t\t").unwrap();
        let results = trainer.train::<u32>().unwrap();

        let mut buf = Vec::new();
        write_merges(&results, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "257\t\\t\t\\t\n258\t\\t\\t\t\\t\\t\n"
        );
    }

    #[test]
    fn test_read_text_file() {
        let dir = TempDir::new("bytekiln-cli").unwrap();

        let good = dir.path().join("good.txt");
        std::fs::write(&good, "low lower").unwrap();
        assert_eq!(read_text_file(good.to_str().unwrap()).unwrap(), "low lower");

        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, b"abc\xff").unwrap();
        let err = read_text_file(bad.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8 at byte 3"));

        let missing = dir.path().join("missing.txt");
        assert!(read_text_file(missing.to_str().unwrap()).is_err());
    }
}
