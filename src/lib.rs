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
// - lib.rs file -

pub mod agent;
pub mod archiver;
pub mod definitions;
pub mod downloader;
pub mod extract;
pub mod feed;
pub mod handlers;
pub mod library;
pub mod logging;
pub mod playback;
