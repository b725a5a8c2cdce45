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
// - archiver.rs file -

use crate::definitions::DownloadFilter;
use crate::downloader::Downloader;
use crate::extract::{parse_download, Download};
use crate::feed::FeedItem;
use crate::library::{ArchiveError, Library};

use tracing::{debug, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub already_archived: usize,
    pub failed: usize,
}

// Items we cannot make sense of are logged and left behind.
pub fn select_downloads(items: &[FeedItem], filter: &dyn DownloadFilter) -> Vec<Download> {
    items
        .iter()
        .filter_map(|item| match parse_download(item, filter) {
            Ok(download) => Some(download),
            Err(e) => {
                warn!(id = %item.id, error = %e, "don't know how to download");
                None
            }
        })
        .collect()
}

// A failing item never stops the batch.
pub fn archive_all(
    library: &mut Library,
    downloads: &[Download],
    downloader: &dyn Downloader,
) -> Summary {
    let mut summary = Summary::default();

    for download in downloads {
        match library.archive(download, downloader) {
            Ok(()) => {
                info!(id = %download.id(), url = %download.url, "downloaded");
                summary.downloaded += 1;
            }
            Err(ArchiveError::AlreadyDownloaded(id)) => {
                debug!(%id, "already archived");
                summary.already_archived += 1;
            }
            Err(e) => {
                warn!(id = %download.id(), error = %e, "failed to archive");
                summary.failed += 1;
            }
        }
    }

    summary
}
