//! Clients for the external intent classifier and speech-to-text service.

pub mod classifier;
pub mod transcriber;

pub use classifier::{IntentClassifier, RasaClassifier};
pub use transcriber::{HttpTranscriber, Transcriber};
