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
// - agent.rs file -

use ureq::{Agent, AgentBuilder, Proxy};
use url::Url;

// Reddit throttles anonymous clients without a descriptive user agent.
pub const USER_AGENT: &str = concat!("ltt/", env!("CARGO_PKG_VERSION"), " (listentothis archiver)");

pub trait AgentBase {
    fn init(url: &Url) -> Agent;
}

pub struct LttAgent;
impl AgentBase for LttAgent {
    // Default HTTP agent for ltt. Sets a proxy or not.
    fn init(url: &Url) -> Agent {
        let mut builder = AgentBuilder::new().user_agent(USER_AGENT);

        if let Some((host, port)) = env_proxy::for_url(url).host_port() {
            // Use a proxy:
            match Proxy::new(format!("{}:{}", host, port)) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(%host, port, error = %e, "ignoring unusable proxy"),
            }
        }

        builder.build()
    }
}
