//! Thin playback engine over the rodio decoder/mixer.
//!
//! The lifecycle machinery treats audio as an external collaborator:
//! load a file, play it N times or loop forever, report busy/idle.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::error::{PlayerError, Result};

/// Handle to the default audio output device.
///
/// The output stream must outlive every sink created from it and cannot
/// move across threads; the worker keeps it on its single runtime thread.
pub struct AudioEngine {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl AudioEngine {
    /// Opens the default output device.
    pub fn open() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlayerError::audio_init(format!("cannot open audio output: {}", e)))?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Starts playing `path`, `repeat` times or forever when 0.
    ///
    /// Returns the sink driving playback; poll [`Sink::empty`] to observe
    /// natural completion and call [`Sink::stop`] to cancel.
    pub fn play_file(&self, path: &Path, repeat: u32) -> Result<Sink> {
        let sink = Sink::try_new(&self.handle)
            .map_err(|e| PlayerError::audio_init(format!("cannot create playback sink: {}", e)))?;

        if repeat == 0 {
            sink.append(decode(path)?.repeat_infinite());
        } else {
            // The decoder is consumed per play, so queue one per repetition.
            for _ in 0..repeat {
                sink.append(decode(path)?);
            }
        }

        Ok(sink)
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path).map_err(|e| PlayerError::io(e, path.display().to_string()))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| PlayerError::audio_decode(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn decode_missing_file_is_io_error() {
        let err = match decode(Path::new("/nonexistent/cue.ogg")) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert_eq!(err.code, ErrorCode::Io);
    }

    #[test]
    fn decode_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.ogg");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let err = match decode(&path) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert_eq!(err.code, ErrorCode::AudioDecode);
    }
}
