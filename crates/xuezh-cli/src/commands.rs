//! Main commands enum and audio subcommands.
//!
//! Required inputs are optional at the parser level so a missing value is
//! reported in the JSON envelope rather than as a usage error.

use clap::Subcommand;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audio conversion, speech synthesis, transcription and assessment
    Audio {
        #[command(subcommand)]
        command: AudioCommands,
    },

    /// Check the workspace, database, tools and credentials
    Doctor,

    /// Print the version
    Version,
}

/// Audio subcommands.
#[derive(Subcommand, Debug)]
pub enum AudioCommands {
    /// Convert an audio file to wav, ogg or mp3
    Convert {
        /// Input file (may live outside the workspace)
        #[arg(long = "in")]
        input: Option<String>,
        /// Output path inside the workspace
        #[arg(long)]
        out: Option<String>,
        /// Target format: wav, ogg or mp3
        #[arg(long)]
        format: Option<String>,
        /// Conversion backend
        #[arg(long)]
        backend: Option<String>,
    },

    /// Synthesize speech from text
    Tts {
        #[arg(long)]
        text: Option<String>,
        /// Output path inside the workspace; the extension picks the format
        #[arg(long)]
        out: Option<String>,
        /// Voice name or alias
        #[arg(long, default_value = "XiaoxiaoNeural")]
        voice: String,
        #[arg(long)]
        backend: Option<String>,
    },

    /// Transcribe a recording
    Stt {
        #[arg(long = "in")]
        input: Option<String>,
        #[arg(long)]
        backend: Option<String>,
        /// Inline payload budget in bytes
        #[arg(long = "max-bytes")]
        max_bytes: Option<usize>,
    },

    /// Assess a recording against reference text and produce feedback audio
    ProcessVoice {
        #[arg(long = "in")]
        input: Option<String>,
        /// Text the learner was asked to read
        #[arg(long = "ref-text")]
        ref_text: Option<String>,
        /// `local` or `azure.speech`
        #[arg(long)]
        backend: Option<String>,
        /// Study item the attempt belongs to
        #[arg(long = "item-id")]
        item_id: Option<String>,
    },
}

impl Commands {
    /// Command name reported in the envelope.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Audio { command } => command.name(),
            Self::Doctor => "doctor",
            Self::Version => "version",
        }
    }
}

impl AudioCommands {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Convert { .. } => "audio.convert",
            Self::Tts { .. } => "audio.tts",
            Self::Stt { .. } => "audio.stt",
            Self::ProcessVoice { .. } => "audio.process-voice",
        }
    }
}
