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
// - feed.rs file -

use crate::agent::{AgentBase, LttAgent};

use std::io::{self, Read};
use thiserror::Error;
use url::Url;

pub const DEFAULT_PATH: &str = "r/listentothis";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub link: Option<String>,
    // HTML body of the post.
    pub content: String,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid feed URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not fetch feed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("could not read feed: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

// <query> ("?limit=100") is appended verbatim.
pub fn feed_url(path: &str, query: Option<&str>) -> Result<Url, FeedError> {
    let path = path.trim_matches('/');
    let query = query.unwrap_or_default();
    Ok(Url::parse(&format!(
        "https://www.reddit.com/{}/.rss{}",
        path, query
    ))?)
}

pub fn fetch(url: &Url) -> Result<Vec<FeedItem>, FeedError> {
    let agent = LttAgent::init(url);

    tracing::debug!(%url, "fetching feed");
    let response = agent.get(url.as_str()).call().map_err(Box::new)?;

    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;

    parse(&body)
}

// Plain RSS items only have a <description>; Atom puts the HTML in <content>.
pub fn parse(document: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    let feed = feed_rs::parser::parse(document)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let content = entry
                .content
                .and_then(|c| c.body)
                .or_else(|| entry.summary.map(|s| s.content))
                .unwrap_or_default();
            FeedItem {
                id: entry.id,
                link: entry.links.into_iter().next().map(|l| l.href),
                content,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(count = items.len(), "parsed feed");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTENTOTHIS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <id>/r/listentothis/.rss</id>
  <title>listentothis</title>
  <updated>2024-05-01T12:00:00+00:00</updated>
  <entry>
    <id>t3_abc</id>
    <title>Artist -- Song [rock] (2024)</title>
    <updated>2024-05-01T11:00:00+00:00</updated>
    <link href="https://www.reddit.com/r/listentothis/comments/abc/artist_song/" />
    <content type="html">&lt;table&gt;&lt;tr&gt;&lt;td&gt; submitted by &lt;a href=&quot;https://www.reddit.com/user/someone&quot;&gt; /u/someone &lt;/a&gt; &lt;br/&gt; &lt;span&gt;&lt;a href=&quot;https://youtu.be/xyz&quot;&gt;[link]&lt;/a&gt;&lt;/span&gt; &lt;span&gt;&lt;a href=&quot;https://www.reddit.com/r/listentothis/comments/abc/artist_song/&quot;&gt;[comments]&lt;/a&gt;&lt;/span&gt; &lt;/td&gt;&lt;/tr&gt;&lt;/table&gt;</content>
  </entry>
  <entry>
    <id>t3_def</id>
    <title>Another -- Tune [jazz] (1969)</title>
    <updated>2024-05-01T10:00:00+00:00</updated>
    <link href="https://www.reddit.com/r/listentothis/comments/def/another_tune/" />
    <content type="html">&lt;a href=&quot;https://bandcamp.com/track/tune&quot;&gt;[link]&lt;/a&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn builds_reddit_urls() {
        let url = feed_url(DEFAULT_PATH, None).unwrap();
        assert_eq!(url.as_str(), "https://www.reddit.com/r/listentothis/.rss");

        let url = feed_url("/r/listentothis/top/", Some("?t=week")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/listentothis/top/.rss?t=week"
        );
    }

    #[test]
    fn parses_reddit_atom() {
        let items = parse(LISTENTOTHIS.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].id, "t3_abc");
        assert_eq!(
            items[0].link.as_deref(),
            Some("https://www.reddit.com/r/listentothis/comments/abc/artist_song/")
        );
        assert!(items[0].content.contains("https://youtu.be/xyz"));
        assert!(items[0].content.contains("[link]"));

        assert_eq!(items[1].id, "t3_def");
    }

    #[test]
    fn falls_back_to_rss_description() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>songs</title>
    <link>https://example.com/</link>
    <description>songs</description>
    <item>
      <guid>song-1</guid>
      <link>https://example.com/song-1</link>
      <description>&lt;a href="https://youtu.be/one"&gt;[link]&lt;/a&gt;</description>
    </item>
  </channel>
</rss>"#;
        let items = parse(rss.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "song-1");
        assert!(items[0].content.contains("https://youtu.be/one"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse(b"this is not a feed"),
            Err(FeedError::Parse(_))
        ));
    }
}
