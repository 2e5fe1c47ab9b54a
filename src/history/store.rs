use crate::history::record::HistoryEntry;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Record an opened document as the most recent history entry.
///
/// An older entry for the same path is replaced, and only the `limit` most
/// recent entries are kept. Returns the number of entries now stored.
pub fn record(store_path: &Path, entry: HistoryEntry, limit: usize) -> Result<usize, String> {
    let mut entries = read_entries(store_path)?;
    entries.retain(|existing| existing.path != entry.path);
    entries.push(entry);

    let limit = limit.max(1);
    if entries.len() > limit {
        let excess = entries.len() - limit;
        entries.drain(..excess);
    }

    write_entries(store_path, &entries)?;
    Ok(entries.len())
}

/// All entries, most recent first.
pub fn list(store_path: &Path) -> Result<Vec<HistoryEntry>, String> {
    let mut entries = read_entries(store_path)?;
    entries.reverse();
    Ok(entries)
}

/// Entry by 1-based position in [`list`] order.
pub fn get(store_path: &Path, index: usize) -> Result<Option<HistoryEntry>, String> {
    if index == 0 {
        return Err("history index starts at 1".to_owned());
    }
    Ok(list(store_path)?.into_iter().nth(index - 1))
}

/// The most recently opened entry.
pub fn last(store_path: &Path) -> Result<Option<HistoryEntry>, String> {
    Ok(read_entries(store_path)?.pop())
}

pub fn count(store_path: &Path) -> Result<u64, String> {
    Ok(read_entries(store_path)?.len() as u64)
}

/// Remove every entry. Returns how many were removed.
pub fn clear(store_path: &Path) -> Result<u64, String> {
    let removed = count(store_path)?;
    match fs::remove_file(store_path) {
        Ok(()) => Ok(removed),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(0),
        Err(error) => Err(format!(
            "failed to clear history '{}': {error}",
            store_path.display()
        )),
    }
}

fn read_entries(store_path: &Path) -> Result<Vec<HistoryEntry>, String> {
    let file = match File::open(store_path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => {
            return Err(format!(
                "failed to open history '{}': {error}",
                store_path.display()
            ));
        }
    };

    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_index, line_result) in reader.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line_result.map_err(|error| {
            format!(
                "failed to read history '{}' at line {}: {error}",
                store_path.display(),
                line_number
            )
        })?;

        if line.trim().is_empty() {
            continue;
        }

        let entry = serde_json::from_str::<HistoryEntry>(&line).map_err(|error| {
            format!(
                "invalid history entry at '{}' line {}: {error}",
                store_path.display(),
                line_number
            )
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

fn write_entries(store_path: &Path, entries: &[HistoryEntry]) -> Result<(), String> {
    if let Some(parent) = store_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "failed to create history directory '{}': {error}",
                parent.display()
            )
        })?;
    }

    let temp_path = temp_path_for(store_path);
    let mut file = File::create(&temp_path).map_err(|error| {
        format!(
            "failed to create history file '{}': {error}",
            temp_path.display()
        )
    })?;
    for entry in entries {
        file.write_all(entry.to_jsonl()?.as_bytes())
            .map_err(|error| {
                format!(
                    "failed to write history file '{}': {error}",
                    temp_path.display()
                )
            })?;
    }
    file.sync_all().map_err(|error| {
        format!(
            "failed to flush history file '{}': {error}",
            temp_path.display()
        )
    })?;
    drop(file);

    fs::rename(&temp_path, store_path).map_err(|error| {
        format!(
            "failed to replace history '{}': {error}",
            store_path.display()
        )
    })
}

fn temp_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "history.jsonl".into());
    name.push(".tmp");
    store_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    fn entry(path: &str, opened_at: &str) -> HistoryEntry {
        HistoryEntry::new(
            path,
            DocumentFormat::Text,
            10,
            "blake3:hash",
            "preview",
            opened_at,
        )
        .expect("build history entry")
    }

    fn paths(entries: &[HistoryEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.path.as_str()).collect()
    }

    #[test]
    fn missing_store_reads_as_empty() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("missing.jsonl");

        assert!(list(&store).expect("list missing store").is_empty());
        assert_eq!(last(&store).expect("last missing store"), None);
        assert_eq!(count(&store).expect("count missing store"), 0);
        assert_eq!(clear(&store).expect("clear missing store"), 0);
    }

    #[test]
    fn record_creates_parent_dirs_and_lists_most_recent_first() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("nested").join("history.jsonl");

        record(&store, entry("/a.txt", "2026-10-17T09:00:00Z"), 20).expect("record a");
        record(&store, entry("/b.txt", "2026-10-17T09:01:00Z"), 20).expect("record b");

        let entries = list(&store).expect("list history");
        assert_eq!(paths(&entries), vec!["/b.txt", "/a.txt"]);
        assert_eq!(
            last(&store).expect("last entry").map(|entry| entry.path),
            Some("/b.txt".to_owned())
        );
        assert!(!temp_path_for(&store).exists());
    }

    #[test]
    fn reopening_moves_entry_to_front_without_duplicates() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");

        record(&store, entry("/a.txt", "t1"), 20).expect("record a");
        record(&store, entry("/b.txt", "t2"), 20).expect("record b");
        let stored = record(&store, entry("/a.txt", "t3"), 20).expect("record a again");

        assert_eq!(stored, 2);
        let entries = list(&store).expect("list history");
        assert_eq!(paths(&entries), vec!["/a.txt", "/b.txt"]);
        assert_eq!(entries[0].opened_at, "t3");
    }

    #[test]
    fn record_keeps_only_the_most_recent_entries() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");

        for index in 0..5 {
            record(&store, entry(&format!("/{index}.txt"), "t"), 3).expect("record entry");
        }

        let entries = list(&store).expect("list history");
        assert_eq!(paths(&entries), vec!["/4.txt", "/3.txt", "/2.txt"]);
    }

    #[test]
    fn get_uses_one_based_recent_first_index() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");
        record(&store, entry("/a.txt", "t1"), 20).expect("record a");
        record(&store, entry("/b.txt", "t2"), 20).expect("record b");

        let first = get(&store, 1).expect("get 1").expect("entry 1 exists");
        let second = get(&store, 2).expect("get 2").expect("entry 2 exists");
        assert_eq!(first.path, "/b.txt");
        assert_eq!(second.path, "/a.txt");
        assert_eq!(get(&store, 3).expect("get 3"), None);
        assert!(get(&store, 0).is_err());
    }

    #[test]
    fn clear_removes_all_entries() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");
        record(&store, entry("/a.txt", "t1"), 20).expect("record a");
        record(&store, entry("/b.txt", "t2"), 20).expect("record b");

        assert_eq!(clear(&store).expect("clear history"), 2);
        assert_eq!(count(&store).expect("count history"), 0);
    }

    #[test]
    fn invalid_line_reports_line_number() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");
        let valid = entry("/a.txt", "t1").to_jsonl().expect("serialize entry");
        fs::write(&store, format!("{valid}not-json\n")).expect("write store");

        let error = list(&store).expect_err("list should fail");
        assert!(error.contains("line 2"));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let store = tempdir.path().join("history.jsonl");
        let valid = entry("/a.txt", "t1").to_jsonl().expect("serialize entry");
        fs::write(&store, format!("\n{valid}\n")).expect("write store");

        assert_eq!(count(&store).expect("count history"), 1);
    }
}
