//! Journal directory watching and file tailing.
//!
//! A background thread keeps following the newest `Journal*.log` file in
//! the journal directory, reads appended lines, parses them, and hands
//! the resulting events to the GUI thread over an mpsc channel in file
//! order. The thread never mutates UI state itself; it only wakes the
//! egui context after delivering a batch.
//!
//! Every failure mode degrades to "log, sleep, retry": a missing
//! directory, a vanished file, or a malformed line never stops the
//! watcher.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::{debug, info, warn};

use super::journal::{self, JournalEvent};

/// Sleep between polls of the followed file.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between rescans of the directory for a newer journal file.
const RESCAN_INTERVAL: Duration = Duration::from_secs(1);

/// Journal file name pattern: `Journal.<timestamp>.log`.
const JOURNAL_PREFIX: &str = "Journal";
const JOURNAL_SUFFIX: &str = ".log";

/// Handle to the background watcher thread.
///
/// Dropping the handle (or calling [`JournalWatcher::stop`]) requests a
/// cooperative shutdown; the thread observes the flag within one poll
/// interval and exits.
pub struct JournalWatcher {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl JournalWatcher {
    /// Spawn the watcher thread over `directory`.
    ///
    /// Parsed events are sent through `sender` in the order read from
    /// the file; `ctx` is woken whenever a batch was delivered so the
    /// GUI repaints promptly.
    pub fn spawn(directory: PathBuf, sender: Sender<JournalEvent>, ctx: egui::Context) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name("journal-watcher".to_string())
            .spawn(move || watch_loop(&directory, &sender, &ctx, &flag))
            .expect("failed to spawn journal watcher thread");
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Request shutdown and wait for the thread to finish.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for JournalWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Main loop of the watcher thread.
fn watch_loop(
    directory: &Path,
    sender: &Sender<JournalEvent>,
    ctx: &egui::Context,
    shutdown: &AtomicBool,
) {
    info!(directory = %directory.display(), "watching journal directory");
    let mut tail: Option<JournalTail> = None;
    let mut followed_any = false;

    while !shutdown.load(Ordering::Relaxed) {
        follow_newest(directory, &mut tail, &mut followed_any);

        let rescan_at = Instant::now() + RESCAN_INTERVAL;
        while !shutdown.load(Ordering::Relaxed) && Instant::now() < rescan_at {
            if let Some(t) = tail.as_mut() {
                match t.poll_new_lines() {
                    Ok(lines) => {
                        if !lines.is_empty() {
                            let delivered = deliver_lines(&lines, sender);
                            if delivered > 0 {
                                ctx.request_repaint();
                            }
                        }
                    }
                    Err(e) => {
                        // File vanished or became unreadable; fall back to
                        // the directory scan.
                        warn!(error = %e, "journal file unreadable, rescanning directory");
                        tail = None;
                    }
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
    debug!("journal watcher shut down");
}

/// Point `tail` at the newest journal file if it is not already there.
///
/// The first file of a session is tailed from its end (only new scans
/// matter); every journal discovered after that is read from the start
/// so nothing is missed. `followed_any` remembers that a file has been
/// followed before, so a failed open of a newer file does not downgrade
/// the retry to tail-from-end.
fn follow_newest(directory: &Path, tail: &mut Option<JournalTail>, followed_any: &mut bool) {
    match newest_journal(directory) {
        Ok(Some(path)) => {
            if tail.as_ref().is_some_and(|t| t.path() == path) {
                return;
            }
            info!(path = %path.display(), "following journal file");
            match JournalTail::open(path, *followed_any) {
                Ok(t) => {
                    *tail = Some(t);
                    *followed_any = true;
                }
                Err(e) => {
                    warn!(error = %e, "failed to open journal file, will retry");
                    *tail = None;
                }
            }
        }
        Ok(None) => debug!("no journal files in directory yet"),
        Err(e) => warn!(error = %e, "failed to scan journal directory, will retry"),
    }
}

/// Parse a batch of raw lines and send the tracked events in order.
///
/// Malformed lines are logged with their content and skipped; the rest
/// of the batch is still processed. Returns the number of events sent.
fn deliver_lines(lines: &[String], sender: &Sender<JournalEvent>) -> usize {
    let mut delivered = 0;
    for line in lines {
        match journal::parse_line(line) {
            Ok(Some(event)) => {
                if sender.send(event).is_err() {
                    // Receiver gone, the GUI is shutting down.
                    return delivered;
                }
                delivered += 1;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, line = %line, "skipping malformed journal line"),
        }
    }
    delivered
}

/// Find the most recently modified journal file in `directory`.
fn newest_journal(directory: &Path) -> io::Result<Option<PathBuf>> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.starts_with(JOURNAL_PREFIX) || !name.ends_with(JOURNAL_SUFFIX) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().is_none_or(|(when, _)| modified > *when) {
            newest = Some((modified, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Tails one journal file, returning only the lines appended since the
/// previous poll.
struct JournalTail {
    path: PathBuf,
    offset: u64,
}

impl JournalTail {
    /// Start tailing `path`. With `from_start` false the offset is set
    /// to the current end of file, so only future lines are reported.
    fn open(path: PathBuf, from_start: bool) -> io::Result<Self> {
        let offset = if from_start {
            0
        } else {
            fs::metadata(&path)?.len()
        };
        Ok(Self { path, offset })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Read any complete lines appended since the last poll.
    ///
    /// The offset only advances past the last newline read, so a line
    /// the game is still writing stays in the file for the next poll
    /// instead of being split across two reads. Bytes that are not
    /// valid UTF-8 are replaced per line; one bad line never hides the
    /// lines after it.
    fn poll_new_lines(&mut self) -> io::Result<Vec<String>> {
        let mut file = File::open(&self.path)?;
        let size = file.metadata()?.len();

        if size < self.offset {
            warn!(path = %self.path.display(), "journal file shrank, re-reading from start");
            self.offset = 0;
        }
        if size == self.offset {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut buf = Vec::with_capacity((size - self.offset) as usize);
        file.take(size - self.offset).read_to_end(&mut buf)?;

        let Some(last_newline) = buf.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };
        self.offset += (last_newline + 1) as u64;

        let lines = buf[..=last_newline]
            .split(|&b| b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.is_empty())
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect();
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::mpsc;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_newest_journal_picks_latest_modified() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "Journal.2024-01-01T000000.log", "old\n");
        thread::sleep(Duration::from_millis(20));
        let newer = write_file(dir.path(), "Journal.2024-06-01T000000.log", "new\n");

        assert_eq!(newest_journal(dir.path()).unwrap(), Some(newer));
    }

    #[test]
    fn test_newest_journal_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "notes.txt", "x\n");
        write_file(dir.path(), "Journal.backup", "x\n");
        assert_eq!(newest_journal(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_newest_journal_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(newest_journal(&missing).is_err());
    }

    #[test]
    fn test_tail_from_end_skips_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Journal.1.log", "line one\nline two\n");

        let mut tail = JournalTail::open(path.clone(), false).unwrap();
        assert!(tail.poll_new_lines().unwrap().is_empty());

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "line three").unwrap();

        assert_eq!(tail.poll_new_lines().unwrap(), vec!["line three"]);
        assert!(tail.poll_new_lines().unwrap().is_empty());
    }

    #[test]
    fn test_tail_from_start_reads_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Journal.1.log", "a\nb\n");
        let mut tail = JournalTail::open(path, true).unwrap();
        assert_eq!(tail.poll_new_lines().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_tail_truncation_resets_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Journal.1.log", "some long journal content\n");
        let mut tail = JournalTail::open(path.clone(), false).unwrap();

        fs::write(&path, "short\n").unwrap();
        assert_eq!(tail.poll_new_lines().unwrap(), vec!["short"]);
    }

    #[test]
    fn test_tail_holds_partial_trailing_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "Journal.1.log", "");
        let mut tail = JournalTail::open(path.clone(), true).unwrap();

        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "first half").unwrap();
        assert!(tail.poll_new_lines().unwrap().is_empty());

        writeln!(file, " second half").unwrap();
        assert_eq!(tail.poll_new_lines().unwrap(), vec!["first half second half"]);
    }

    #[test]
    fn test_tail_invalid_utf8_does_not_hide_later_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Journal.1.log");
        fs::write(&path, b"good one\n\xff\xfe\xfd\ngood two\n").unwrap();

        let mut tail = JournalTail::open(path, true).unwrap();
        let lines = tail.poll_new_lines().unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "good one");
        assert_eq!(lines[2], "good two");
        // Offset advanced past the whole batch.
        assert!(tail.poll_new_lines().unwrap().is_empty());
    }

    #[test]
    fn test_follow_newest_reads_new_file_from_start() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "Journal.1.log", "old session\n");

        let mut tail = None;
        let mut followed_any = false;
        follow_newest(dir.path(), &mut tail, &mut followed_any);
        assert!(followed_any);
        // First file of the session tails from the end.
        assert!(tail.as_mut().unwrap().poll_new_lines().unwrap().is_empty());

        // A newer journal appears but the follower lost its tail in the
        // meantime (e.g. a transient read failure); the retry must still
        // pick up the new file's existing content.
        thread::sleep(Duration::from_millis(20));
        write_file(dir.path(), "Journal.2.log", "new session\n");
        tail = None;
        follow_newest(dir.path(), &mut tail, &mut followed_any);
        assert_eq!(
            tail.as_mut().unwrap().poll_new_lines().unwrap(),
            vec!["new session"]
        );
    }

    #[test]
    fn test_deliver_skips_malformed_line() {
        let (sender, receiver) = mpsc::channel();
        let lines = vec![
            r#"{"event":"Scan","BodyID":1,"BodyName":"Star A","StarType":"K"}"#.to_string(),
            "not valid json".to_string(),
            r#"{"event":"Scan","BodyID":2,"BodyName":"Planet B","Parents":[{"Star":1}]}"#
                .to_string(),
        ];

        let delivered = deliver_lines(&lines, &sender);
        assert_eq!(delivered, 2);
        assert!(matches!(receiver.try_recv(), Ok(JournalEvent::Scan(_))));
        assert!(matches!(receiver.try_recv(), Ok(JournalEvent::Scan(_))));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_deliver_preserves_file_order() {
        let (sender, receiver) = mpsc::channel();
        let lines: Vec<String> = (1..=5)
            .map(|id| format!(r#"{{"event":"Scan","BodyID":{id},"BodyName":"B{id}"}}"#))
            .collect();

        assert_eq!(deliver_lines(&lines, &sender), 5);
        for expected in 1..=5 {
            match receiver.try_recv().unwrap() {
                JournalEvent::Scan(scan) => assert_eq!(scan.body_id, expected),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }

    #[test]
    fn test_watcher_stops_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, _receiver) = mpsc::channel();
        let mut watcher = JournalWatcher::spawn(
            dir.path().to_path_buf(),
            sender,
            egui::Context::default(),
        );
        watcher.stop();
    }
}
