use super::{ClockEvent, PlaybackClock, clamp_to};
use crate::domain::{FileType, TrackInfo};
use anyhow::{Result, anyhow};
use rodio::decoder::builder::SeekMode;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

/// `PlaybackClock` over a rodio sink on the default output device.
///
/// The sink drops a source once it has been played out, so a seek after
/// the end of the stream reopens the file before seeking.
pub struct RodioBackend {
    sink: Sink,
    _stream: OutputStream,
    path: Option<PathBuf>,
    duration: Duration,
    ended_reported: bool,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        Ok(Self {
            sink,
            _stream: stream,
            path: None,
            duration: Duration::ZERO,
            ended_reported: false,
        })
    }

    fn append(&mut self, path: &Path) -> Result<Option<Duration>> {
        let source = decode(path)?;
        let total = source.total_duration();

        self.sink.clear();
        self.sink.append(source);
        self.ended_reported = false;

        Ok(total)
    }

    fn drained(&self) -> bool {
        self.path.is_some() && self.sink.empty()
    }
}

impl PlaybackClock for RodioBackend {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.unload();

        let total = self.append(path)?;
        self.duration = match total {
            Some(d) => d,
            // Some containers cannot report a length up front
            None => TrackInfo::read(path)
                .duration
                .ok_or_else(|| anyhow!("Unknown duration: {}", path.display()))?,
        };
        self.path = Some(path.to_path_buf());

        Ok(())
    }

    fn unload(&mut self) {
        // clearing also pauses the sink
        self.sink.clear();
        self.path = None;
        self.duration = Duration::ZERO;
        self.ended_reported = false;
    }

    fn is_loaded(&self) -> bool {
        self.path.is_some()
    }

    fn play(&mut self) {
        if self.drained() {
            self.seek(Duration::ZERO);
        }
        if self.is_loaded() {
            self.sink.play();
        }
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, position: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };

        if self.sink.empty() {
            let paused = self.sink.is_paused();
            if let Err(e) = self.append(&path) {
                tracing::error!(path = %path.display(), error = %e, "Failed to reopen source");
                return;
            }
            if !paused {
                self.sink.play();
            }
        }

        let target = clamp_to(position, self.duration);
        if let Err(e) = self.sink.try_seek(target) {
            tracing::warn!(?target, error = %e, "Seek failed");
        }
        self.ended_reported = false;
    }

    fn position(&self) -> Duration {
        match self.drained() {
            true => self.duration,
            false => clamp_to(self.sink.get_pos(), self.duration),
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.is_loaded() && !self.sink.empty() && !self.sink.is_paused()
    }

    fn poll_event(&mut self) -> Option<ClockEvent> {
        if self.drained() {
            if self.ended_reported {
                return None;
            }
            self.ended_reported = true;
            return Some(ClockEvent::Ended);
        }

        match self.is_playing() {
            true => Some(ClockEvent::Tick(self.position())),
            false => None,
        }
    }
}

fn decode(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut builder = Decoder::builder()
        .with_data(BufReader::new(file))
        .with_byte_len(len)
        .with_seek_mode(SeekMode::Fastest)
        .with_seekable(true);

    if let Some(hint) = FileType::from(path).decoder_hint() {
        builder = builder.with_hint(hint);
    }

    Ok(builder.build()?)
}
