//! Core services that orchestrate ports.

mod voice_pipeline;

pub use voice_pipeline::{
    FEEDBACK_VOICE, VoiceAssessmentData, VoiceAssessmentPipeline, VoiceAssessmentResult,
    VoiceLimits, VoicePorts, VoiceRequest,
};
