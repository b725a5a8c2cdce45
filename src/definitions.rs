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
// - definitions.rs file -

use url::Url;

// Define the public interface for download filters:
pub trait DownloadFilter: Sync {
    // the name used to pick this filter on the command line (e.g. "youtube").
    fn name(&self) -> &'static str;

    // true, if ltt is willing to hand <url> to the downloader.
    fn is_supported(&self, url: &Url) -> bool;
}
