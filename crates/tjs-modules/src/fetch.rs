// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Remote module transport

use crate::error::FetchFailure;
use tracing::debug;

/// A blocking `fetch(url) -> (status, body)` transport
pub trait Fetcher {
    /// GET `url`, returning the response status and body
    fn fetch(&self, url: &str) -> std::result::Result<(u16, Vec<u8>), FetchFailure>;
}

/// HTTP(S) transport backed by `reqwest`'s blocking client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a default client
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<(u16, Vec<u8>), FetchFailure> {
        let parsed = url::Url::parse(url).map_err(|e| FetchFailure::Transport(e.to_string()))?;

        debug!(url = %parsed, "fetching module");

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        debug!(url, status, bytes = body.len(), "fetched module");
        Ok((status, body.to_vec()))
    }
}
