//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// voxbridge - live speech transcription and translation client.
#[derive(Debug, Parser)]
#[command(name = "voxbridge", version, about = "Live speech transcription and translation client")]
pub struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the source languages the server accepts
    Languages,

    /// List the translation targets available for a source language
    Targets {
        /// Source language code
        source: String,
    },

    /// Store the API key in the config file and on the server
    SaveKey {
        key: String,

        /// Only write the config file
        #[arg(long)]
        local_only: bool,
    },

    /// Run a live translation session
    Live(LiveArgs),

    /// Translate a whole audio file in one request
    TranslateFile {
        path: PathBuf,

        #[command(flatten)]
        languages: LanguageArgs,
    },

    /// Upload an audio file into a running session
    Upload {
        path: PathBuf,

        /// Session to upload into
        #[arg(long, value_name = "ID")]
        session: String,
    },
}

#[derive(Debug, Args)]
pub struct LanguageArgs {
    /// Source language code
    #[arg(short, long)]
    pub source: String,

    /// Target language code (repeatable)
    #[arg(short, long = "target", required = true, value_name = "CODE")]
    pub targets: Vec<String>,
}

#[derive(Debug, Args)]
pub struct LiveArgs {
    #[command(flatten)]
    pub languages: LanguageArgs,

    /// Upload this file instead of capturing the microphone
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// File mode without a file yet; use `upload` later
    #[arg(long, conflicts_with = "file")]
    pub file_mode: bool,

    /// Directory for transcript exports (default from config)
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn live_with_targets() {
        let cli = parse(&[
            "voxbridge", "live", "-s", "zh", "-t", "en", "-t", "ja", "--file", "talk.wav",
        ]);
        match cli.command {
            Command::Live(args) => {
                assert_eq!(args.languages.source, "zh");
                assert_eq!(args.languages.targets, ["en", "ja"]);
                assert_eq!(args.file, Some(PathBuf::from("talk.wav")));
                assert!(!args.file_mode);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn live_requires_a_target() {
        assert!(Cli::try_parse_from(["voxbridge", "live", "-s", "zh"]).is_err());
    }

    #[test]
    fn file_and_file_mode_conflict() {
        assert!(
            Cli::try_parse_from([
                "voxbridge", "live", "-s", "zh", "-t", "en", "--file", "a.wav", "--file-mode",
            ])
            .is_err()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["voxbridge", "languages", "--server", "http://host:8000", "-v"]);
        assert_eq!(cli.server.as_deref(), Some("http://host:8000"));
        assert!(cli.verbose);
    }

    #[test]
    fn upload_needs_session() {
        assert!(Cli::try_parse_from(["voxbridge", "upload", "a.wav"]).is_err());
        let cli = parse(&["voxbridge", "upload", "a.wav", "--session", "s-9"]);
        assert!(matches!(cli.command, Command::Upload { session, .. } if session == "s-9"));
    }

    #[test]
    fn save_key_local_only() {
        let cli = parse(&["voxbridge", "save-key", "sk-1", "--local-only"]);
        assert!(matches!(
            cli.command,
            Command::SaveKey { key, local_only: true } if key == "sk-1"
        ));
    }
}
