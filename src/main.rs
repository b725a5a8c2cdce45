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
// - main.rs file -

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ltt::{
    archiver, definitions::DownloadFilter, downloader, downloader::YoutubeDl, feed, handlers,
    library, library::Library, logging,
};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(version, about = "Archives the music posted to a subreddit", long_about = None)]
struct Args {
    #[clap(help = "Sets the subreddit path to poll", index = 1, default_value = feed::DEFAULT_PATH)]
    path: String,

    #[clap(
        help = "Appends a query string to the feed URL (e.g. \"?limit=100\")",
        index = 2
    )]
    query: Option<String>,

    #[clap(
        long,
        short = 'l',
        env = "LTT_LIBRARY",
        help = "Sets the library directory [default: $HOME/Music/listentothis]"
    )]
    library: Option<PathBuf>,

    #[clap(
        long,
        short = 'f',
        help = "Only downloads links accepted by this filter (\"youtube\" or \"any\") [default: youtube]"
    )]
    filter: Option<String>,

    #[clap(
        long,
        help = "Sets the youtube-dl compatible program to run",
        default_value = downloader::DEFAULT_PROGRAM
    )]
    downloader: String,

    #[clap(
        long = "audio-format",
        short = 'a',
        help = "Sets the audio format to extract",
        default_value = downloader::DEFAULT_AUDIO_FORMAT
    )]
    audioformat: String,

    #[clap(long, help = "Lists everything downloaded so far and exits")]
    history: bool,

    #[clap(long, short = 'v', help = "Talks more while the feed is processed")]
    verbose: bool,
}

fn main() -> Result<()> {
    // Argument parsing:
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    let path = match args.library {
        Some(path) => path,
        None => library::default_path()?,
    };

    if args.history {
        let library = Library::open(&path)?;
        for entry in library.entries()? {
            println!("{}\t{}", entry.id, entry.url);
        }
        return Ok(());
    }

    let filter: &dyn DownloadFilter = match args.filter.as_deref() {
        None => handlers::default_filter(),
        Some(name) => handlers::filter_by_name(name).ok_or_else(|| {
            let known: Vec<_> = handlers::filters().map(|f| f.name()).collect();
            anyhow!("unknown filter {:?} (known: {})", name, known.join(", "))
        })?,
    };

    let url = feed::feed_url(&args.path, args.query.as_deref())?;
    let items = feed::fetch(&url).with_context(|| format!("could not poll {}", url))?;
    tracing::info!(%url, items = items.len(), "polled feed");

    let downloads = archiver::select_downloads(&items, filter);

    let mut library = Library::open(&path)?;
    let downloader = YoutubeDl::new(args.downloader, args.audioformat);
    let summary = archiver::archive_all(&mut library, &downloads, &downloader);

    tracing::info!(
        downloaded = summary.downloaded,
        already_archived = summary.already_archived,
        failed = summary.failed,
        "done"
    );

    Ok(())
}
