//! Voice output
//!
//! Speech is synthesized to a file by a [`SpeechSynthesizer`] and handed
//! to an [`AudioPlayer`], which runs an external player process.

mod playback;
mod tts;

pub(crate) use playback::remove_if_present;
pub use playback::{AfterPlayback, AudioPlayer, CommandPlayer};
pub use tts::{ElevenLabsTts, SpeechSynthesizer, Voice};
