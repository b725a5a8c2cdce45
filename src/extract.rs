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
// - extract.rs file -

use crate::definitions::DownloadFilter;
use crate::feed::FeedItem;

use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

// Reddit renders the submitted URL as an anchor with this text.
pub const LINK_MARKER: &str = "[link]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub item: FeedItem,
    pub url: Url,
}

impl Download {
    pub fn id(&self) -> &str {
        &self.item.id
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("download link not found")]
    LinkNotFound,
    #[error("missing expected 'href' attribute in element")]
    MissingHref,
    #[error("invalid download URL {href:?}: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported download URL: {0}")]
    Unsupported(Url),
}

pub fn parse_download(
    item: &FeedItem,
    filter: &dyn DownloadFilter,
) -> Result<Download, ExtractError> {
    let fragment = Html::parse_fragment(&item.content);
    let anchors = Selector::parse("a").expect("static selector");

    let anchor = fragment
        .select(&anchors)
        .find(|a| a.text().collect::<String>().contains(LINK_MARKER))
        .ok_or(ExtractError::LinkNotFound)?;

    let href = anchor
        .value()
        .attr("href")
        .ok_or(ExtractError::MissingHref)?;

    let url = Url::parse(href.trim()).map_err(|source| ExtractError::InvalidUrl {
        href: href.to_string(),
        source,
    })?;

    if !filter.is_supported(&url) {
        return Err(ExtractError::Unsupported(url));
    }

    Ok(Download {
        item: item.clone(),
        url,
    })
}
