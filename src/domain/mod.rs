mod filetype;
mod section;
mod track_info;

pub use filetype::FileType;
pub use section::{PALETTE, PALETTE_SIZE, PaletteColor, Section, SectionId};
pub use track_info::{Thumbnail, TrackInfo, UNKNOWN_ARTIST};
