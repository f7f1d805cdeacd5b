use stderrlog::Timestamp;

/// Logging setup arg group.
#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Silence log messages.
    #[clap(short, long)]
    pub quiet: bool,

    /// Raise the log level (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Enable timestamped logging.
    #[clap(long)]
    pub ts: bool,
}

impl LogArgs {
    /// The stderr log level: `default`, raised once per `-v`.
    pub fn log_level(
        &self,
        default: u8,
    ) -> stderrlog::LogLevelNum {
        match default.saturating_add(self.verbose) {
            0 => stderrlog::LogLevelNum::Off,
            1 => stderrlog::LogLevelNum::Error,
            2 => stderrlog::LogLevelNum::Warn,
            3 => stderrlog::LogLevelNum::Info,
            4 => stderrlog::LogLevelNum::Debug,
            _ => stderrlog::LogLevelNum::Trace,
        }
    }

    /// Install the stderr logger.
    pub fn setup_logging(
        &self,
        default: u8,
    ) -> Result<(), Box<dyn std::error::Error>> {
        stderrlog::new()
            .quiet(self.quiet)
            .verbosity(self.log_level(default))
            .timestamp(if self.ts {
                Timestamp::Second
            } else {
                Timestamp::Off
            })
            .init()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct Wrapper {
        #[clap(flatten)]
        logging: LogArgs,
    }

    #[test]
    fn test_log_level() {
        let args = Wrapper::parse_from(["bytekiln"]);
        assert!(!args.logging.quiet);
        assert!(matches!(
            args.logging.log_level(3),
            stderrlog::LogLevelNum::Info
        ));

        let args = Wrapper::parse_from(["bytekiln", "-vv", "--ts"]);
        assert!(args.logging.ts);
        assert!(matches!(
            args.logging.log_level(3),
            stderrlog::LogLevelNum::Trace
        ));

        let args = Wrapper::parse_from(["bytekiln", "-v"]);
        assert!(matches!(
            args.logging.log_level(3),
            stderrlog::LogLevelNum::Debug
        ));
    }
}
