use crate::{
    DurationStyle, Settings, get_readable_duration,
    domain::{Section, TrackInfo},
    key_handler::{self, Action, HELP},
    library::{Library, default_music_directories},
    looper::{LoopEvent, LoopHandle},
    player::PlaybackState,
};
use anyhow::{Result, anyhow};
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};

pub struct Reprise {
    settings: Settings,
    looper: LoopHandle,
    library: Library,
    track: Option<TrackInfo>,
    quit: bool,
}

impl Reprise {
    pub fn new(settings: Settings, looper: LoopHandle) -> Self {
        Reprise {
            settings,
            looper,
            library: Library::new(),
            track: None,
            quit: false,
        }
    }

    pub fn run(&mut self, initial: Option<PathBuf>) -> Result<()> {
        if let Some(path) = initial {
            self.looper.load(path)?;
        }

        let input = key_handler::spawn_stdin_reader();
        println!("reprise - type `help` for commands");

        // MAIN ROUTINE
        while !self.quit {
            self.select_shortcut(&input);
        }

        self.looper.stop()?;
        Ok(())
    }

    pub fn scan_on_start(&mut self, dir: PathBuf) -> Result<()> {
        self.scan(Some(dir))
    }

    pub(super) fn handle_input(&mut self, line: &str) {
        let result = key_handler::parse_line(line).and_then(|action| match action {
            Some(action) => self.handle_action(action),
            None => Ok(()),
        });

        if let Err(e) = result {
            println!("! {e}");
        }
    }

    pub(super) fn looper_events(&self) -> Receiver<LoopEvent> {
        self.looper.events().clone()
    }

    pub(super) fn request_quit(&mut self) {
        self.quit = true;
    }
}

impl Reprise {
    #[rustfmt::skip]
    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            // Source
            Action::Open(path)      => self.open(&path)?,
            Action::Unload          => self.looper.unload()?,
            Action::Scan(dir)       => self.scan(dir)?,
            Action::Files(query)    => self.list_files(&query),
            Action::Pick(idx)       => self.pick(idx)?,
            Action::Forget(idx)     => self.forget(idx)?,
            Action::Info            => self.print_info(),

            // Sections
            Action::MarkStart       => self.looper.mark_start()?,
            Action::MarkEnd         => self.looper.mark_end()?,
            Action::Commit(name)    => self.looper.commit(&name)?,
            Action::AddSection { name, start, end } => self.looper.add_section(&name, start, end)?,
            Action::Delete(id)      => self.looper.delete_section(id)?,
            Action::ListSections    => self.looper.list_sections()?,

            // Player
            Action::PlaySection(id) => self.looper.play_section(id)?,
            Action::Stop            => self.looper.stop()?,
            Action::TogglePause     => self.looper.toggle_playback()?,
            Action::Seek(t)         => self.looper.seek(t)?,
            Action::SeekForward     => self.looper.seek_forward(self.settings.seek_step())?,
            Action::SeekBack        => self.looper.seek_back(self.settings.seek_step())?,
            Action::Status          => self.print_status(),

            Action::Help            => println!("{HELP}"),
            Action::QUIT            => self.request_quit(),
        }
        Ok(())
    }

    pub(super) fn handle_loop_event(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::SourceLoaded { path, duration, info } => {
                println!(
                    "Loaded {} ({})",
                    path.display(),
                    get_readable_duration(duration, DurationStyle::Long)
                );
                println!("{} - {}", info.artist, info.title);
                self.track = Some(*info);
            }
            LoopEvent::SourceUnavailable { path, reason } => {
                self.track = None;
                println!("! Cannot play {}: {reason}", path.display());
            }
            LoopEvent::SourceReleased => {
                self.track = None;
                println!("Closed");
            }
            LoopEvent::Marked { start, end } => println!(
                "Staged {} - {}",
                get_readable_duration(start, DurationStyle::CompactMillis),
                get_readable_duration(end, DurationStyle::CompactMillis)
            ),
            LoopEvent::SectionAdded(section) => println!("+ {section}"),
            LoopEvent::SectionDeleted { id, loop_cleared } => match loop_cleared {
                true => println!("- [{id}] (loop stopped)"),
                false => println!("- [{id}]"),
            },
            LoopEvent::SectionStarted(section) => println!("Looping {section}"),
            LoopEvent::Rewound(_) => (),
            LoopEvent::Stopped => println!("Stopped"),
            LoopEvent::StreamEnded => println!("End of track"),
            LoopEvent::PlaybackToggled(state) => match state {
                PlaybackState::Playing => println!("Playing"),
                _ => println!("Paused"),
            },
            LoopEvent::Seeked(pos) => {
                println!("@ {}", get_readable_duration(pos, DurationStyle::CompactMillis))
            }
            LoopEvent::Sections(sections) => print_sections(&sections, self.looper.active_section()),
            LoopEvent::Error(e) => println!("! {e}"),
        }
    }
}

impl Reprise {
    fn open(&mut self, path: &Path) -> Result<()> {
        let path = crate::expand_tilde(path)?;
        self.looper.load(path)
    }

    fn scan(&mut self, dir: Option<PathBuf>) -> Result<()> {
        let dirs = match dir {
            Some(d) => vec![crate::expand_tilde(d)?],
            None => default_music_directories()
                .into_iter()
                .chain(self.settings.library_dirs.iter().cloned())
                .collect(),
        };

        let mut added = 0;
        for dir in &dirs {
            match self.library.scan(dir) {
                Ok(n) => added += n,
                Err(e) => println!("! {e}"),
            }
        }

        tracing::info!(dirs = dirs.len(), added, total = self.library.len(), "Library scan finished");
        match self.library.is_empty() {
            true => println!("No audio files found"),
            false => println!("{added} new file(s), {} total", self.library.len()),
        }
        Ok(())
    }

    fn list_files(&self, query: &str) {
        for (idx, file) in self.library.search(query) {
            println!("{idx:>4}  {}  ({} KiB)", file.name, file.size / 1024);
        }
    }

    fn pick(&mut self, idx: usize) -> Result<()> {
        let file = self
            .library
            .get(idx)
            .ok_or_else(|| anyhow!("No file at {idx}, run `files` to list them"))?;
        self.looper.load(file.path.clone())
    }

    fn forget(&mut self, idx: Option<usize>) -> Result<()> {
        match idx {
            Some(idx) => {
                let file = self
                    .library
                    .forget(idx)
                    .ok_or_else(|| anyhow!("No file at {idx}, run `files` to list them"))?;
                println!("Forgot {}", file.name);
            }
            None => {
                self.library.clear();
                println!("File list cleared");
            }
        }
        Ok(())
    }

    fn print_info(&self) {
        match &self.track {
            Some(info) => print!("{info}"),
            None => println!("Nothing loaded"),
        }
    }

    fn print_status(&self) {
        let metrics = self.looper.metrics();
        let state = match metrics.get_state() {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
        };

        print!(
            "{state} {} / {}",
            get_readable_duration(metrics.get_elapsed(), DurationStyle::CompactMillis),
            get_readable_duration(metrics.get_duration(), DurationStyle::Long),
        );
        match metrics.active_section() {
            Some(id) => println!("  looping [{id}], {} repeat(s)", metrics.rewinds()),
            None => println!(),
        }
    }
}

fn print_sections(sections: &[Section], active: Option<crate::domain::SectionId>) {
    if sections.is_empty() {
        println!("No sections");
        return;
    }
    for section in sections {
        let marker = match active == Some(section.id()) {
            true => '>',
            false => ' ',
        };
        println!("{marker} {} {section}", section.color().swatch());
    }
}
