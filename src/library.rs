/*
 * The contents of this file are subject to the terms of the
 * Common Development and Distribution License, Version 1.0 only
 * (the "License").  You may not use this file except in compliance
 * with the License.
 *
 * See the file LICENSE in this distribution for details.
 * A copy of the CDDL is also available via the Internet at
 * http://www.opensource.org/licenses/cddl1.txt
 *
 * When distributing Covered Code, include this CDDL HEADER in each
 * file and include the contents of the LICENSE file from this
 * distribution.
 */

// listentothis
// - library.rs file -

// Downloaded media lives directly in the library directory. Next to it,
// .history maps feed item identifiers to the URL they were fetched from.

use crate::downloader::{DownloadError, Downloader};
use crate::extract::Download;

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const HISTORY_FILE: &str = ".history";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("HOME environment variable not set")]
    NoHome,
    #[error("could not create library {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not open ledger {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("ledger error: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("already downloaded {0:?}")]
    AlreadyDownloaded(String),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("ledger error: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: String,
    pub url: String,
}

// $HOME/Music/listentothis
pub fn default_path() -> Result<PathBuf, LibraryError> {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join("Music").join("listentothis")),
        _ => Err(LibraryError::NoHome),
    }
}

pub struct Library {
    path: PathBuf,
    db: Connection,
}

impl Library {
    // Creates the directory and the ledger as needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LibraryError> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|source| LibraryError::Create {
            path: path.clone(),
            source,
        })?;

        let dbpath = path.join(HISTORY_FILE);
        let db = Connection::open(&dbpath).map_err(|source| LibraryError::Open {
            path: dbpath.clone(),
            source,
        })?;
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS downloaded (
                id  TEXT PRIMARY KEY NOT NULL,
                url TEXT NOT NULL
            ) WITHOUT ROWID;",
        )?;

        tracing::debug!(path = %path.display(), "opened library");
        Ok(Self { path, db })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, download: &Download) -> Result<bool, LibraryError> {
        Ok(lookup(&self.db, download.id())?.is_some())
    }

    pub fn get(&self, id: &str) -> Result<Option<String>, LibraryError> {
        Ok(lookup(&self.db, id)?)
    }

    pub fn entries(&self) -> Result<Vec<LedgerEntry>, LibraryError> {
        let mut stmt = self
            .db
            .prepare("SELECT id, url FROM downloaded ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(LedgerEntry {
                    id: row.get(0)?,
                    url: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    // One write transaction: other writers wait until the downloader has
    // finished and the entry is committed. A failed download records nothing.
    pub fn archive(
        &mut self,
        download: &Download,
        downloader: &dyn Downloader,
    ) -> Result<(), ArchiveError> {
        let id = download.id();
        let tx = self
            .db
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if lookup(&tx, id)?.is_some() {
            return Err(ArchiveError::AlreadyDownloaded(id.to_string()));
        }

        downloader.download(&download.url, &self.path)?;

        // Guard the insert on its own; a duplicate must never overwrite.
        if lookup(&tx, id)?.is_some() {
            return Err(ArchiveError::AlreadyDownloaded(id.to_string()));
        }
        tx.execute(
            "INSERT INTO downloaded (id, url) VALUES (?1, ?2)",
            params![id, download.url.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

fn lookup(db: &Connection, id: &str) -> rusqlite::Result<Option<String>> {
    db.query_row(
        "SELECT url FROM downloaded WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::testing::Recorder;
    use crate::feed::FeedItem;
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::tempdir;
    use url::Url;

    // While "downloading", a second handle on the same ledger tries to
    // archive the same item.
    struct Rival {
        library: RefCell<Library>,
        download: Download,
        outcome: RefCell<Option<Result<(), ArchiveError>>>,
    }

    impl Downloader for Rival {
        fn download(&self, _url: &Url, _dir: &Path) -> Result<(), DownloadError> {
            let outcome = self
                .library
                .borrow_mut()
                .archive(&self.download, &Recorder::default());
            *self.outcome.borrow_mut() = Some(outcome);
            Ok(())
        }
    }

    fn download(id: &str, url: &str) -> Download {
        Download {
            item: FeedItem {
                id: id.to_string(),
                link: None,
                content: String::new(),
            },
            url: Url::parse(url).unwrap(),
        }
    }

    #[test]
    fn open_creates_directory_and_ledger() {
        let root = tempdir().unwrap();
        let path = root.path().join("Music").join("listentothis");

        let library = Library::open(&path).unwrap();
        assert_eq!(library.path(), path.as_path());
        assert!(path.join(HISTORY_FILE).is_file());
        assert!(library.entries().unwrap().is_empty());
    }

    #[test]
    fn archive_records_the_source_url() {
        let root = tempdir().unwrap();
        let mut library = Library::open(root.path()).unwrap();
        let recorder = Recorder::default();

        let dl = download("t3_abc", "https://youtu.be/xyz");
        assert!(!library.contains(&dl).unwrap());
        library.archive(&dl, &recorder).unwrap();

        assert!(library.contains(&dl).unwrap());
        assert_eq!(
            library.get("t3_abc").unwrap().as_deref(),
            Some("https://youtu.be/xyz")
        );
        assert_eq!(recorder.urls(), vec!["https://youtu.be/xyz"]);
        assert!(root.path().join("xyz.m4a").is_file());
    }

    #[test]
    fn same_id_is_archived_once() {
        let root = tempdir().unwrap();
        let mut library = Library::open(root.path()).unwrap();
        let recorder = Recorder::default();

        library
            .archive(&download("t3_abc", "https://youtu.be/xyz"), &recorder)
            .unwrap();
        let err = library
            .archive(&download("t3_abc", "https://youtu.be/other"), &recorder)
            .unwrap_err();

        assert!(matches!(err, ArchiveError::AlreadyDownloaded(ref id) if id == "t3_abc"));
        assert_eq!(err.to_string(), r#"already downloaded "t3_abc""#);
        assert_eq!(
            library.entries().unwrap(),
            vec![LedgerEntry {
                id: "t3_abc".to_string(),
                url: "https://youtu.be/xyz".to_string(),
            }]
        );
        // Duplicates are refused before anything is fetched.
        assert_eq!(recorder.urls().len(), 1);
    }

    #[test]
    fn failed_download_leaves_no_entry() {
        let root = tempdir().unwrap();
        let mut library = Library::open(root.path()).unwrap();
        let dl = download("t3_abc", "https://youtu.be/xyz");

        let err = library.archive(&dl, &Recorder::failing()).unwrap_err();
        assert!(matches!(err, ArchiveError::Download(_)));
        assert!(!library.contains(&dl).unwrap());

        // Retrying later is fine.
        library.archive(&dl, &Recorder::default()).unwrap();
        assert!(library.contains(&dl).unwrap());
    }

    #[test]
    fn ledger_survives_reopening() {
        let root = tempdir().unwrap();
        {
            let mut library = Library::open(root.path()).unwrap();
            library
                .archive(&download("t3_abc", "https://youtu.be/xyz"), &Recorder::default())
                .unwrap();
        }

        let mut library = Library::open(root.path()).unwrap();
        let recorder = Recorder::default();
        let err = library
            .archive(&download("t3_abc", "https://youtu.be/xyz"), &recorder)
            .unwrap_err();
        assert!(matches!(err, ArchiveError::AlreadyDownloaded(_)));
        assert!(recorder.urls().is_empty());
    }

    #[test]
    fn concurrent_archives_record_one_entry() {
        let root = tempdir().unwrap();
        let mut library = Library::open(root.path()).unwrap();
        let rival_library = Library::open(root.path()).unwrap();
        rival_library
            .db
            .busy_timeout(Duration::from_millis(50))
            .unwrap();

        let dl = download("t3_abc", "https://youtu.be/xyz");
        let rival = Rival {
            library: RefCell::new(rival_library),
            download: download("t3_abc", "https://youtu.be/other"),
            outcome: RefCell::new(None),
        };

        library.archive(&dl, &rival).unwrap();

        let outcome = rival.outcome.into_inner().expect("rival ran");
        assert!(
            matches!(outcome, Err(ArchiveError::Store(_))),
            "{outcome:?}"
        );
        assert_eq!(
            library.entries().unwrap(),
            vec![LedgerEntry {
                id: "t3_abc".to_string(),
                url: "https://youtu.be/xyz".to_string(),
            }]
        );
    }

    #[test]
    fn entries_are_sorted_by_id() {
        let root = tempdir().unwrap();
        let mut library = Library::open(root.path()).unwrap();
        let recorder = Recorder::default();
        for (id, url) in [
            ("t3_c", "https://youtu.be/c"),
            ("t3_a", "https://youtu.be/a"),
            ("t3_b", "https://youtu.be/b"),
        ] {
            library.archive(&download(id, url), &recorder).unwrap();
        }

        let ids: Vec<_> = library.entries().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["t3_a", "t3_b", "t3_c"]);
    }
}
