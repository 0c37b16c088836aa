use clap::Parser;

/// IEC 61850 Bridge - forwards unsolicited device reports to the platform
#[derive(Debug, Parser)]
#[clap(author, version)]
pub struct Options {
    /// Config file to read
    #[clap(short = 'c', long = "config", default_value = "config.yaml")]
    pub config_file: String,

    /// JSON-lines capture to replay, overrides replay_file from the config
    #[clap(short = 'r', long = "replay")]
    pub replay_file: Option<String>,

    /// Optional runtime limit in seconds
    #[clap(short = 't', long = "time")]
    pub runtime: Option<u64>,
}

impl Options {
    pub fn new() -> Self {
        Self::parse()
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}
