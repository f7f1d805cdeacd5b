mod train;

/// Subcommands for bytekiln
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Train a byte-level BPE vocabulary.
    Train(train::TrainArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Train(cmd) => cmd.run(),
        }
    }
}
