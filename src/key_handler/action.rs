use super::Action;
use crate::parse_timestamp;
use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, unbounded};
use std::{io::BufRead, path::PathBuf, thread};

pub const HELP: &str = "\
open <path>              load an audio file
close                    release the loaded file
scan [dir]               add audio files from a directory (default: music folders)
files [query]            list scanned files, optionally filtered
pick <n>                 load file number n from the list
forget [n]               drop file n from the list, or all of them
info                     show track metadata
start | end              mark section start/end at the current position
add <name>               save the marked range as a section
add <name> <from> <to>   save an explicit range (seconds or m:ss)
rm <id>                  delete a section
ls                       list sections
loop <id>                loop a section
stop                     stop and rewind to 0:00
p                        play/pause
seek <t> | ff | rw       jump to t, or step forward/back
status                   show position and loop state
help | q";

/// Turn one line of input into an action. Blank lines are `None`.
pub fn parse_line(line: &str) -> Result<Option<Action>> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let action = match cmd {
        "" => return Ok(None),

        "open" | "o" => Action::Open(PathBuf::from(required(rest, "open <path>")?)),
        "close" => Action::Unload,
        "scan" => Action::Scan(Some(rest).filter(|r| !r.is_empty()).map(PathBuf::from)),
        "files" | "f" => Action::Files(rest.to_string()),
        "pick" => Action::Pick(required(rest, "pick <n>")?.parse()?),
        "forget" => match rest.is_empty() {
            true => Action::Forget(None),
            false => Action::Forget(Some(rest.parse()?)),
        },
        "info" | "i" => Action::Info,

        "start" | "[" => Action::MarkStart,
        "end" | "]" => Action::MarkEnd,
        "add" | "a" => parse_add(required(rest, "add <name> [<from> <to>]")?),
        "rm" | "del" => Action::Delete(required(rest, "rm <id>")?.parse()?),
        "ls" | "sections" => Action::ListSections,

        "loop" | "l" => Action::PlaySection(required(rest, "loop <id>")?.parse()?),
        "stop" | "s" => Action::Stop,
        "p" | "play" | "pause" => Action::TogglePause,
        "seek" => Action::Seek(parse_timestamp(required(rest, "seek <t>")?)?),
        "ff" => Action::SeekForward,
        "rw" => Action::SeekBack,
        "status" | "." => Action::Status,

        "help" | "h" | "?" => Action::Help,
        "q" | "quit" | "exit" => Action::QUIT,

        other => return Err(anyhow!("Unknown command `{other}`, try `help`")),
    };

    Ok(Some(action))
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    match rest.is_empty() {
        true => Err(anyhow!("Usage: {usage}")),
        false => Ok(rest),
    }
}

/// `add Verse 1 0:10 0:20` is an explicit range, `add Verse 1` commits
/// whatever was marked.
fn parse_add(rest: &str) -> Action {
    let words: Vec<&str> = rest.split_whitespace().collect();

    if let [name @ .., from, to] = words.as_slice() {
        if !name.is_empty() {
            if let (Ok(start), Ok(end)) = (parse_timestamp(from), parse_timestamp(to)) {
                return Action::AddSection {
                    name: name.join(" "),
                    start,
                    end,
                };
            }
        }
    }

    Action::Commit(rest.to_string())
}

/// Read stdin on its own thread so the app loop can `select!` on it.
/// The channel closes at end of input.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();

    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break;
                }
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(line: &str) -> Action {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("stop"), Action::Stop);
        assert_eq!(parse("  p "), Action::TogglePause);
        assert_eq!(parse("["), Action::MarkStart);
        assert_eq!(parse("end"), Action::MarkEnd);
        assert_eq!(parse("loop 3"), Action::PlaySection(3));
        assert_eq!(parse("rm 12"), Action::Delete(12));
        assert_eq!(parse("q"), Action::QUIT);
        assert_eq!(parse("forget 2"), Action::Forget(Some(2)));
        assert_eq!(parse("forget"), Action::Forget(None));
    }

    #[test]
    fn add_commits_marked_range() {
        assert_eq!(parse("add Guitar solo"), Action::Commit("Guitar solo".into()));
        assert_eq!(parse("add Part 2"), Action::Commit("Part 2".into()));
    }

    #[test]
    fn add_with_explicit_range() {
        assert_eq!(
            parse("add Verse 1 0:10 20.5"),
            Action::AddSection {
                name: "Verse 1".into(),
                start: Duration::from_secs(10),
                end: Duration::from_millis(20_500),
            }
        );
    }

    #[test]
    fn add_with_numbers_only_is_a_name() {
        // no name left once the range is taken out
        assert_eq!(parse("add 10 20"), Action::Commit("10 20".into()));
    }

    #[test]
    fn paths_keep_spaces() {
        assert_eq!(
            parse("open /music/My Song.flac"),
            Action::Open(PathBuf::from("/music/My Song.flac"))
        );
        assert_eq!(parse("scan"), Action::Scan(None));
        assert_eq!(
            parse("scan ~/Music"),
            Action::Scan(Some(PathBuf::from("~/Music")))
        );
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(parse_line("loop").is_err());
        assert!(parse_line("loop abc").is_err());
        assert!(parse_line("seek -4").is_err());
        assert!(parse_line("dance").is_err());
    }
}
