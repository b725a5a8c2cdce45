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
// - YouTube filter -

use crate::definitions::DownloadFilter;

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn non_letters() -> &'static Regex {
    static NON_LETTERS: OnceLock<Regex> = OnceLock::new();
    NON_LETTERS.get_or_init(|| Regex::new(r"\P{L}+").expect("static pattern"))
}

// Accepts URLs whose host, reduced to its letters, mentions YouTube.
// "youtu.be" collapses to "youtube", so short links pass as well.
pub struct YouTube;
impl DownloadFilter for YouTube {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn is_supported(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => non_letters()
                .replace_all(&host.to_lowercase(), "")
                .contains("youtube"),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://www.youtube.com/watch?v=dQw4w9WgXcQ", true)]
    #[case("https://m.youtube.com/watch?v=X", true)]
    #[case("https://youtu.be/xyz", true)]
    #[case("https://music.youtube.com/watch?v=abc", true)]
    #[case("https://example.com/x", false)]
    #[case("https://example.com/youtube", false)]
    #[case("https://soundcloud.com/artist/track", false)]
    #[case("mailto:someone@youtube.com", false)]
    fn matches_on_host_letters(#[case] url: &str, #[case] supported: bool) {
        assert_eq!(YouTube.is_supported(&Url::parse(url).unwrap()), supported);
    }
}
