pub mod recorder;

pub use recorder::{Recorder, RecorderError, RecordingHandle};
