use crate::{DurationStyle, format_bitrate, format_sample_rate, get_readable_duration};
use anyhow::Result;
use lofty::{
    file::{AudioFile, TaggedFileExt},
    tag::{Accessor, ItemKey},
};
use std::{fmt::Display, path::Path, time::Duration};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Embedded cover art. Owned by the `TrackInfo` of the loaded source and
/// dropped along with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub genre: Option<String>,
    pub year: Option<u32>,
    pub track_no: Option<u32>,
    pub track_total: Option<u32>,
    pub disc_no: Option<u32>,
    pub disc_total: Option<u32>,
    pub duration: Option<Duration>,
    /// kbps
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub thumbnail: Option<Thumbnail>,
}

impl TrackInfo {
    /// Read tags and audio properties. Never fails: anything lofty cannot
    /// make sense of falls back to a record built from the file name.
    pub fn read<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::read_tags(path) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Metadata extraction failed");
                Self::fallback(path)
            }
        }
    }

    pub fn fallback(path: &Path) -> Self {
        TrackInfo {
            title: title_from_path(path),
            artist: UNKNOWN_ARTIST.to_string(),
            ..Default::default()
        }
    }

    fn read_tags(path: &Path) -> Result<Self> {
        let tagged = lofty::read_from_path(path)?;
        let props = tagged.properties();

        let mut info = TrackInfo {
            duration: Some(props.duration()).filter(|d| !d.is_zero()),
            bitrate: props.audio_bitrate(),
            sample_rate: props.sample_rate(),
            ..Self::fallback(path)
        };

        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(info);
        };

        if let Some(title) = tag.title().filter(|t| !t.trim().is_empty()) {
            info.title = title.into_owned();
        }
        if let Some(artist) = tag.artist().filter(|a| !a.trim().is_empty()) {
            info.artist = artist.into_owned();
        }

        info.album = tag.album().map(|a| a.into_owned());
        info.album_artist = tag.get_string(&ItemKey::AlbumArtist).map(String::from);
        info.genre = tag.genre().map(|g| g.into_owned());
        info.year = tag
            .get_string(&ItemKey::RecordingDate)
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok());
        info.track_no = tag.track();
        info.track_total = tag.track_total();
        info.disc_no = tag.disk();
        info.disc_total = tag.disk_total();
        info.thumbnail = tag.pictures().first().map(|pic| Thumbnail {
            mime_type: pic.mime_type().map(|m| m.as_str().to_string()),
            data: pic.data().to_vec(),
        });

        Ok(info)
    }
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Display for TrackInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} - {}", self.artist, self.title)?;
        if let Some(album) = &self.album {
            match self.year {
                Some(year) => writeln!(f, "  album:       {album} ({year})")?,
                None => writeln!(f, "  album:       {album}")?,
            }
        }
        if let Some(aa) = &self.album_artist {
            writeln!(f, "  albumartist: {aa}")?;
        }
        if let Some(genre) = &self.genre {
            writeln!(f, "  genre:       {genre}")?;
        }
        if let Some(no) = self.track_no {
            match self.track_total {
                Some(of) => writeln!(f, "  track:       {no}/{of}")?,
                None => writeln!(f, "  track:       {no}")?,
            }
        }
        if let Some(no) = self.disc_no {
            match self.disc_total {
                Some(of) => writeln!(f, "  disc:        {no}/{of}")?,
                None => writeln!(f, "  disc:        {no}")?,
            }
        }
        if let Some(d) = self.duration {
            writeln!(f, "  duration:    {}", get_readable_duration(d, DurationStyle::Long))?;
        }
        if let Some(b) = self.bitrate {
            writeln!(f, "  bitrate:     {}", format_bitrate(b))?;
        }
        if let Some(sr) = self.sample_rate {
            writeln!(f, "  sample rate: {}", format_sample_rate(sr))?;
        }
        if let Some(thumb) = &self.thumbnail {
            writeln!(
                f,
                "  artwork:     {} bytes ({})",
                thumb.data.len(),
                thumb.mime_type.as_deref().unwrap_or("unknown")
            )?;
        }
        Ok(())
    }
}
