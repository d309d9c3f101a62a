use crate::{DurationStyle, get_readable_duration};
use std::{fmt::Display, time::Duration};

pub type SectionId = u64;

pub const PALETTE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub rgb: (u8, u8, u8),
}

impl PaletteColor {
    /// A block in this color for 24-bit terminals.
    pub fn swatch(&self) -> String {
        let (r, g, b) = self.rgb;
        format!("\x1b[38;2;{r};{g};{b}m\u{25A0}\x1b[0m")
    }
}

const fn color(name: &'static str, r: u8, g: u8, b: u8) -> PaletteColor {
    PaletteColor { name, rgb: (r, g, b) }
}

pub const PALETTE: [PaletteColor; PALETTE_SIZE] = [
    color("Red", 239, 68, 68),
    color("Orange", 249, 115, 22),
    color("Amber", 245, 158, 11),
    color("Yellow", 234, 179, 8),
    color("Lime", 132, 204, 22),
    color("Green", 34, 197, 94),
    color("Emerald", 16, 185, 129),
    color("Teal", 20, 184, 166),
    color("Cyan", 6, 182, 212),
    color("Sky", 14, 165, 233),
    color("Blue", 59, 130, 246),
    color("Indigo", 99, 102, 241),
    color("Violet", 139, 92, 246),
    color("Purple", 168, 85, 247),
    color("Fuchsia", 217, 70, 239),
    color("Pink", 236, 72, 153),
];

/// A named range over the loaded track.
///
/// Sections are only built by the `SectionStore`, which checks the range
/// before handing one out. Nothing can change a section afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    id: SectionId,
    name: String,
    start: Duration,
    end: Duration,
    color_index: usize,
}

impl Section {
    pub(crate) fn new(
        id: SectionId,
        name: String,
        start: Duration,
        end: Duration,
        color_index: usize,
    ) -> Self {
        Section {
            id,
            name,
            start,
            end,
            color_index,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn end(&self) -> Duration {
        self.end
    }

    pub fn len(&self) -> Duration {
        self.end - self.start
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn color(&self) -> PaletteColor {
        PALETTE[self.color_index % PALETTE_SIZE]
    }

    /// True once playback has reached or passed the end of the section.
    pub fn is_past_end(&self, position: Duration) -> bool {
        position >= self.end
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {} - {} ({})",
            self.id,
            self.name,
            get_readable_duration(self.start, DurationStyle::CompactMillis),
            get_readable_duration(self.end, DurationStyle::CompactMillis),
            self.color().name,
        )
    }
}
