use std::borrow::Cow;

/// Errors raised while planning or starting a launch.
#[vtl_derive::vtl_error]
pub enum LaunchError {
    /// A fallback group was fully set but one value does not parse.
    #[error("Invalid value for {variable}: '{value}' is not a valid {expected}")]
    InvalidEnv { variable: &'static str, value: String, expected: &'static str },

    /// A factor of the accumulation formula is zero or the device product overflows.
    #[error("Invalid batch layout: {message}")]
    InvalidBatch { message: Cow<'static, str> },

    /// The global batch is not a multiple of devices times the local batch.
    #[error(
        "Global batch size {global} is not divisible by {devices} devices x {local} per device \
         ({global} / {per_step} leaves {remainder})"
    )]
    InexactAccumulation { global: u32, devices: u32, local: u32, per_step: u32, remainder: u32 },

    /// The launcher program could not be started.
    #[error("Failed to start launcher{}: {source}", format_context(.context))]
    Spawn { source: std::io::Error, context: Option<Cow<'static, str>> },
}
