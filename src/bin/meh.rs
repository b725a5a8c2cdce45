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
// - meh: the playback service -

use anyhow::{Context, Result};
use clap::Parser;
use ltt::{library, logging, playback};
use rand::{rngs::StdRng, SeedableRng};
use std::{net::SocketAddr, path::PathBuf};

#[derive(Parser)]
#[clap(version, about = "Plays the library in a browser, one song at a time", long_about = None)]
struct Args {
    #[clap(
        long,
        short = 'l',
        env = "LTT_LIBRARY",
        help = "Sets the library directory [default: $HOME/Music/listentothis]"
    )]
    library: Option<PathBuf>,

    #[clap(long, help = "Sets the address to listen on", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    #[clap(
        long,
        short = 'e',
        help = "Only plays files with this extension",
        default_value = playback::DEFAULT_EXTENSION
    )]
    extension: String,

    #[clap(long, short = 'v', help = "Talks more while serving")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    let path = match args.library {
        Some(path) => path,
        None => library::default_path()?,
    };

    let state = playback::AppState::new(&path, &args.extension, StdRng::from_entropy())?;
    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("could not listen on {}", args.listen))?;

    tracing::info!(addr = %args.listen, library = %path.display(), "serving");
    axum::serve(listener, playback::router(state)).await?;

    Ok(())
}
