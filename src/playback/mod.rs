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
// - playback service -

// Songs are sorted by moving them into keep/ (POST) or trash/ (DELETE,
// or POST with action=trash since HTML forms can't send DELETE).

use crate::library::HISTORY_FILE;

use axum::{
    extract::{Path as UrlPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{any, get},
    Router,
};
use rand::{rngs::StdRng, seq::SliceRandom};
use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};
use upon::{Engine, Template};

pub const DEFAULT_EXTENSION: &str = "ogg";
pub const KEEP_DIR: &str = "keep";
pub const TRASH_DIR: &str = "trash";

const PLAYER: &str = include_str!("player.html");

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("missing required filename parameter")]
    MissingFilename,
    #[error("invalid filename {0:?}")]
    InvalidFilename(String),
    #[error("unknown action {0:?}")]
    InvalidAction(String),
    #[error("no files found")]
    NoFiles,
    #[error("{0:?} not found")]
    NotFound(String),
    #[error("{0:?} was already sorted there")]
    Conflict(String),
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to render template: {0}")]
    Template(#[from] upon::Error),
}

impl IntoResponse for PlaybackError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingFilename | Self::InvalidFilename(_) | Self::InvalidAction(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NoFiles | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Io(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, %status, "request refused");
        }

        (status, self.to_string()).into_response()
    }
}

// Where a song goes once it has been listened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    Keep,
    Trash,
}

impl Bin {
    pub fn dir(self) -> &'static str {
        match self {
            Self::Keep => KEEP_DIR,
            Self::Trash => TRASH_DIR,
        }
    }

    fn from_action(action: Option<&str>) -> Result<Self, PlaybackError> {
        match action {
            None | Some("keep") => Ok(Self::Keep),
            Some("trash") | Some("delete") => Ok(Self::Trash),
            Some(other) => Err(PlaybackError::InvalidAction(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct AppState(Arc<Inner>);

struct Inner {
    library: PathBuf,
    extension: String,
    rng: Mutex<StdRng>,
    engine: Engine<'static>,
    player: Template<'static>,
}

impl AppState {
    // <extension> selects which files count as songs ("ogg" matches *.ogg).
    pub fn new(
        library: impl Into<PathBuf>,
        extension: &str,
        rng: StdRng,
    ) -> Result<Self, PlaybackError> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let player = engine.compile(PLAYER)?;

        Ok(Self(Arc::new(Inner {
            library: library.into(),
            extension: extension.trim().trim_start_matches('.').to_string(),
            rng: Mutex::new(rng),
            engine,
            player,
        })))
    }

    pub fn library(&self) -> &Path {
        &self.0.library
    }

    // Songs at the top level of the library, sorted by name.
    pub async fn songs(&self) -> Result<Vec<String>, PlaybackError> {
        let mut songs = Vec::new();
        let mut dir = tokio::fs::read_dir(self.library()).await?;

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.is_song(name) || !is_file(&entry.path()).await {
                continue;
            }
            songs.push(name.to_string());
        }

        songs.sort_unstable();
        Ok(songs)
    }

    pub async fn random_song(&self) -> Result<String, PlaybackError> {
        let songs = self.songs().await?;
        let mut rng = self.0.rng.lock().unwrap_or_else(PoisonError::into_inner);
        songs
            .choose(&mut *rng)
            .cloned()
            .ok_or(PlaybackError::NoFiles)
    }

    pub fn render(&self, filename: &str) -> Result<String, PlaybackError> {
        let page = self
            .0
            .player
            .render(
                &self.0.engine,
                upon::value! {
                    filename: filename,
                    format: media_format(&self.0.extension),
                },
            )
            .to_string()?;
        Ok(page)
    }

    // Moves <filename> out of the top level into the given bin.
    pub async fn sort(&self, filename: &str, bin: Bin) -> Result<PathBuf, PlaybackError> {
        let from = self.library().join(filename);
        if !self.is_song(filename) || !is_file(&from).await {
            return Err(PlaybackError::NotFound(filename.to_string()));
        }

        let dir = self.library().join(bin.dir());
        tokio::fs::create_dir_all(&dir).await?;
        let to = dir.join(filename);
        // rename() would silently replace an earlier song of the same name.
        if tokio::fs::try_exists(&to).await? {
            return Err(PlaybackError::Conflict(filename.to_string()));
        }
        tokio::fs::rename(&from, &to).await?;

        info!(song = filename, bin = bin.dir(), "sorted");
        Ok(to)
    }

    // Visible files with the library's extension. Never the ledger.
    fn is_song(&self, name: &str) -> bool {
        name != HISTORY_FILE
            && !name.starts_with('.')
            && checked(name).is_ok()
            && Path::new(name)
                .extension()
                .is_some_and(|ext| ext == self.0.extension.as_str())
    }
}

pub fn router(state: AppState) -> Router {
    let files = Router::new()
        .nest_service("/files", ServeDir::new(state.library()))
        .layer(middleware::from_fn(hide_dotfiles));

    Router::new()
        .route("/", get(index))
        .route("/song", any(missing_filename))
        .route("/song/", any(missing_filename))
        .route("/song/:filename", get(song).post(keep_or_trash).delete(trash))
        .with_state(state)
        .merge(files)
}

// The ledger and other dotfiles stay private, however they are spelled.
async fn hide_dotfiles(request: Request, next: Next) -> Response {
    let hidden = request.uri().path().split('/').any(|segment| {
        urlencoding::decode(segment)
            .map(|s| s.starts_with('.'))
            .unwrap_or(true)
    });
    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, PlaybackError> {
    let filename = state.random_song().await?;
    Ok(Html(state.render(&filename)?))
}

async fn song(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Html<String>, PlaybackError> {
    let filename = checked(&filename)?;
    if !state.is_song(filename) || !is_file(&state.library().join(filename)).await {
        return Err(PlaybackError::NotFound(filename.to_string()));
    }
    Ok(Html(state.render(filename)?))
}

async fn keep_or_trash(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
    form: String,
) -> Result<Redirect, PlaybackError> {
    let filename = checked(&filename)?;
    let action = url::form_urlencoded::parse(form.as_bytes())
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value.into_owned());

    let bin = Bin::from_action(action.as_deref())?;
    state.sort(filename, bin).await?;
    Ok(Redirect::to("/"))
}

async fn trash(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Result<Redirect, PlaybackError> {
    let filename = checked(&filename)?;
    state.sort(filename, Bin::Trash).await?;
    Ok(Redirect::to("/"))
}

async fn missing_filename() -> PlaybackError {
    PlaybackError::MissingFilename
}

// Only plain names at the top level of the library.
fn checked(filename: &str) -> Result<&str, PlaybackError> {
    if filename.is_empty() {
        return Err(PlaybackError::MissingFilename);
    }
    if filename.contains(&['/', '\\'][..]) || filename == "." || filename == ".." {
        return Err(PlaybackError::InvalidFilename(filename.to_string()));
    }
    Ok(filename)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

// jPlayer names its media formats slightly differently from file extensions.
fn media_format(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mp3" => "mp3",
        "m4a" | "mp4" | "aac" => "m4a",
        "webm" | "weba" => "webma",
        "wav" => "wav",
        "flac" => "flac",
        _ => "oga",
    }
}

// Template formatters for the player page.
mod addons {
    use std::fmt::Write;
    use upon::{fmt as upon_fmt, Engine, Value};

    fn html(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '<' => f.write_str("&lt;")?,
                        '>' => f.write_str("&gt;")?,
                        '"' => f.write_str("&quot;")?,
                        '\'' => f.write_str("&#39;")?,
                        c => f.write_char(c)?,
                    }
                }
            }
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    // For values inside a double-quoted JavaScript string.
    fn js(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                for c in s.chars() {
                    match c {
                        '\\' => f.write_str("\\\\")?,
                        '"' => f.write_str("\\\"")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '<' => f.write_str("\\u003c")?,
                        '>' => f.write_str("\\u003e")?,
                        '&' => f.write_str("\\u0026")?,
                        '\u{2028}' => f.write_str("\\u2028")?,
                        '\u{2029}' => f.write_str("\\u2029")?,
                        c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
                        c => f.write_char(c)?,
                    }
                }
            }
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    fn url(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", urlencoding::encode(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("html", html);
        engine.add_formatter("js", js);
        engine.add_formatter("url", url);
    }
}
