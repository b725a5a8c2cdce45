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
// - accept-all filter -

use crate::definitions::DownloadFilter;

use url::Url;

// Hands every link to the downloader and lets it decide.
pub struct AnyUrl;
impl DownloadFilter for AnyUrl {
    fn name(&self) -> &'static str {
        "any"
    }

    fn is_supported(&self, _url: &Url) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_anything_that_parsed() {
        for url in [
            "https://example.com/x",
            "https://bandcamp.com/track/song",
            "file:///tmp/song.ogg",
        ] {
            assert!(AnyUrl.is_supported(&Url::parse(url).unwrap()), "{url}");
        }
    }
}
