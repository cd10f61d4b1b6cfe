//! Commit journals.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use brewline_core::{Commit, CommitListener, CommitSeq};
use parking_lot::Mutex;
use tracing::{error, warn};

use crate::error::{JournalError, JournalResult};

/// A commit log that can be read back for recovery.
pub trait Journal: CommitListener {
    /// Every recorded commit, in commit order.
    fn commits(&self) -> JournalResult<Vec<Commit>>;
}

// ==================== Memory ====================

/// In-memory journal for testing and simple use cases.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<Commit>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit.
    pub fn append(&self, commit: Commit) {
        self.entries.lock().push(commit);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Commits after `seq`.
    pub fn since(&self, seq: CommitSeq) -> Vec<Commit> {
        self.entries
            .lock()
            .iter()
            .filter(|c| c.seq > seq)
            .cloned()
            .collect()
    }

    /// Sequence number of the last recorded commit.
    pub fn last_seq(&self) -> Option<CommitSeq> {
        self.entries.lock().last().map(|c| c.seq)
    }

    /// Clear the journal (for testing).
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl CommitListener for MemoryJournal {
    fn on_commit(&self, commit: &Commit) {
        self.append(commit.clone());
    }
}

impl Journal for MemoryJournal {
    fn commits(&self) -> JournalResult<Vec<Commit>> {
        Ok(self.entries.lock().clone())
    }
}

// ==================== File ====================

/// File-based journal: one JSON-encoded commit per line.
pub struct FileJournal {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    /// Commits that could not be written from the listener.
    failures: AtomicU64,
}

impl FileJournal {
    /// Open or create a journal file for appending.
    pub fn open(path: impl AsRef<Path>) -> JournalResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
            failures: AtomicU64::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a commit and flush it to the file.
    pub fn append(&self, commit: &Commit) -> JournalResult<()> {
        let line = serde_json::to_string(commit)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    /// Number of commits the listener failed to write.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Read every commit in the file.
    ///
    /// A torn final line (a crash mid-write) is skipped; a bad line
    /// anywhere else is an error.
    pub fn load(path: impl AsRef<Path>) -> JournalResult<Vec<Commit>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(path)?;
        Ok(Self::parse(path, &bytes)?.0)
    }

    /// Read every commit and cut a torn final line off the file, so that
    /// later appends start on a fresh line.
    pub fn recover(path: impl AsRef<Path>) -> JournalResult<Vec<Commit>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(path)?;
        let (commits, durable) = Self::parse(path, &bytes)?;

        if durable < bytes.len() {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(durable as u64)?;
            file.sync_all()?;
            warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() - durable,
                "truncated torn journal tail"
            );
        }
        // A final commit written without its newline is kept
        if durable > 0 && bytes[durable - 1] != b'\n' {
            let mut file = OpenOptions::new().append(true).open(path)?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }
        Ok(commits)
    }

    /// Parse commit lines. Also returns the length of the prefix that ends
    /// with the last good commit.
    fn parse(path: &Path, bytes: &[u8]) -> JournalResult<(Vec<Commit>, usize)> {
        let lines: Vec<&[u8]> = bytes.split_inclusive(|b| *b == b'\n').collect();
        let last = lines.iter().rposition(|l| !is_blank(l));

        let mut commits = Vec::with_capacity(lines.len());
        let mut offset = 0;
        let mut durable = 0;
        for (index, line) in lines.iter().enumerate() {
            offset += line.len();
            if is_blank(line) {
                continue;
            }
            match serde_json::from_slice::<Commit>(line) {
                Ok(commit) => {
                    commits.push(commit);
                    durable = offset;
                }
                Err(e) if Some(index) == last => {
                    warn!(path = %path.display(), line = index + 1, error = %e, "skipping torn journal tail");
                }
                Err(e) => return Err(JournalError::invalid_format(index + 1, e.to_string())),
            }
        }
        Ok((commits, durable))
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

impl CommitListener for FileJournal {
    fn on_commit(&self, commit: &Commit) {
        if let Err(e) = self.append(commit) {
            self.failures.fetch_add(1, Ordering::Relaxed);
            error!(path = %self.path.display(), seq = %commit.seq, error = %e, "journal write failed");
        }
    }
}

impl Journal for FileJournal {
    fn commits(&self) -> JournalResult<Vec<Commit>> {
        self.writer.lock().flush()?;
        Self::load(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::{fields, Record, RecordId};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn commit(seq: u64, id: &str) -> Commit {
        let record = Record::new(RecordId::new(id), "Todo", fields! { "content" => "grind" }, Utc::now());
        Commit::created(CommitSeq::new(seq), record, Utc::now())
    }

    #[test]
    fn test_memory_journal_records_commits() {
        // GIVEN
        let journal = MemoryJournal::new();

        // WHEN
        journal.on_commit(&commit(1, "t1"));
        journal.on_commit(&commit(2, "t2"));

        // THEN
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.last_seq(), Some(CommitSeq::new(2)));
        let later = journal.since(CommitSeq::new(1));
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].id.as_str(), "t2");
    }

    #[test]
    fn test_file_journal_round_trip() {
        // GIVEN a journal file with two commits
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        let journal = FileJournal::open(&path).unwrap();
        let first = commit(1, "t1");
        journal.on_commit(&first);
        journal.on_commit(&commit(2, "t2"));

        // WHEN read back
        let commits = journal.commits().unwrap();

        // THEN
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].seq, first.seq);
        assert_eq!(commits[0].id, first.id);
        assert_eq!(journal.failures(), 0);
    }

    #[test]
    fn test_file_journal_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        FileJournal::open(&path).unwrap().append(&commit(1, "t1")).unwrap();

        let reopened = FileJournal::open(&path).unwrap();
        reopened.append(&commit(2, "t2")).unwrap();

        assert_eq!(FileJournal::load(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_skips_torn_tail() {
        // GIVEN a file whose last line was cut short
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        let good = serde_json::to_string(&commit(1, "t1")).unwrap();
        std::fs::write(&path, format!("{}\n{{\"seq\":2,\"ki", good)).unwrap();

        // WHEN
        let commits = FileJournal::load(&path).unwrap();

        // THEN
        assert_eq!(commits.len(), 1);
    }

    #[test]
    fn test_recover_truncates_torn_tail() {
        // GIVEN a file whose last line was cut short
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        let good = serde_json::to_string(&commit(1, "t1")).unwrap();
        std::fs::write(&path, format!("{}\n{{\"seq\":2,\"ki", good)).unwrap();

        // WHEN recovered and appended to twice
        let commits = FileJournal::recover(&path).unwrap();
        let journal = FileJournal::open(&path).unwrap();
        journal.append(&commit(2, "t2")).unwrap();
        journal.append(&commit(3, "t3")).unwrap();

        // THEN the fragment is gone and every commit reads back
        assert_eq!(commits.len(), 1);
        let ids: Vec<String> = FileJournal::load(&path)
            .unwrap()
            .iter()
            .map(|c| c.id.as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_recover_terminates_unfinished_last_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        let good = serde_json::to_string(&commit(1, "t1")).unwrap();
        std::fs::write(&path, &good).unwrap();

        assert_eq!(FileJournal::recover(&path).unwrap().len(), 1);
        FileJournal::open(&path).unwrap().append(&commit(2, "t2")).unwrap();

        assert_eq!(FileJournal::load(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_load_rejects_corrupt_middle_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("commits.jsonl");
        let good = serde_json::to_string(&commit(2, "t2")).unwrap();
        std::fs::write(&path, format!("not json\n{}\n", good)).unwrap();

        let result = FileJournal::load(&path);

        assert!(matches!(result, Err(JournalError::InvalidFormat { line: 1, .. })));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let commits = FileJournal::load(dir.path().join("absent.jsonl")).unwrap();
        assert!(commits.is_empty());
    }
}
