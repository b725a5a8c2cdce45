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
// - download filters -

use crate::definitions::DownloadFilter;

mod any;
mod youtube;

pub use any::AnyUrl;
pub use youtube::YouTube;

// Every filter ltt knows about. The first one is the default.
static FILTERS: &[&dyn DownloadFilter] = &[&YouTube, &AnyUrl];

pub fn filters() -> impl Iterator<Item = &'static dyn DownloadFilter> {
    FILTERS.iter().copied()
}

pub fn default_filter() -> &'static dyn DownloadFilter {
    FILTERS[0]
}

pub fn filter_by_name(name: &str) -> Option<&'static dyn DownloadFilter> {
    filters().find(|f| f.name().eq_ignore_ascii_case(name.trim()))
}
