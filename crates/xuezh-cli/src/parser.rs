//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the xuezh voice toolkit.
#[derive(Parser)]
#[command(name = "xuezh")]
#[command(about = "Mandarin pronunciation practice: convert, speak, transcribe and assess audio")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AudioCommands;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_voice_args() {
        let cli = Cli::parse_from([
            "xuezh",
            "-v",
            "audio",
            "process-voice",
            "--in",
            "~/take.m4a",
            "--ref-text",
            "你好",
            "--item-id",
            "hsk1-1",
        ]);
        assert!(cli.verbose);
        let Commands::Audio {
            command:
                AudioCommands::ProcessVoice {
                    input,
                    ref_text,
                    backend,
                    item_id,
                },
        } = cli.command
        else {
            panic!("expected process-voice");
        };
        assert_eq!(input.as_deref(), Some("~/take.m4a"));
        assert_eq!(ref_text.as_deref(), Some("你好"));
        assert_eq!(backend, None);
        assert_eq!(item_id.as_deref(), Some("hsk1-1"));
    }

    #[test]
    fn test_tts_voice_default() {
        let cli = Cli::parse_from(["xuezh", "audio", "tts", "--text", "你好", "--out", "a.ogg"]);
        let Commands::Audio {
            command: AudioCommands::Tts { voice, .. },
        } = cli.command
        else {
            panic!("expected tts");
        };
        assert_eq!(voice, "XiaoxiaoNeural");
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::parse_from(["xuezh", "audio", "stt", "--max-bytes", "500"]);
        assert_eq!(cli.command.name(), "audio.stt");
        assert_eq!(Cli::parse_from(["xuezh", "doctor"]).command.name(), "doctor");
    }
}
