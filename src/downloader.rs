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
// - downloader.rs file -

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use url::Url;

// It makes very little sense to reimplement youtube-dl.
// Just use the system's one (or a compatible fork such as yt-dlp).

pub const DEFAULT_PROGRAM: &str = "youtube-dl";
pub const DEFAULT_AUDIO_FORMAT: &str = "m4a";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not run {program:?}: {source}")]
    Spawn {
        program: OsString,
        #[source]
        source: io::Error,
    },
    #[error("{program:?} failed for {url}: {status}")]
    Failed {
        program: OsString,
        url: String,
        status: ExitStatus,
    },
}

pub trait Downloader {
    // Fetches <url> into <dir>, blocking until done.
    fn download(&self, url: &Url, dir: &Path) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone)]
pub struct YoutubeDl {
    program: OsString,
    audio_format: String,
}

impl YoutubeDl {
    pub fn new(program: impl Into<OsString>, audio_format: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            audio_format: audio_format.into(),
        }
    }
}

impl Default for YoutubeDl {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_AUDIO_FORMAT)
    }
}

impl Downloader for YoutubeDl {
    fn download(&self, url: &Url, dir: &Path) -> Result<(), DownloadError> {
        tracing::debug!(program = ?self.program, %url, dir = %dir.display(), "spawning downloader");

        let status = Command::new(&self.program)
            .arg("-x") // Audio only.
            .arg("--audio-format")
            .arg(&self.audio_format)
            .arg(url.as_str())
            .current_dir(dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| DownloadError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(DownloadError::Failed {
                program: self.program.clone(),
                url: url.to_string(),
                status,
            });
        }

        Ok(())
    }
}
