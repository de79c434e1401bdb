// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Despacho queries.

use std::time::Duration;

use tracing::warn;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{Despacho, Identifier};

/// Delay before re-issuing a failed read.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct DespachoService {
    client: ApiClient,
    retries: u32,
    retry_delay: Duration,
}

impl DespachoService {
    /// `retries` extra attempts are made for failed reads.
    pub fn new(client: ApiClient, retries: u32) -> Self {
        Self {
            client,
            retries,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// All despachos assigned to `user_id`.
    ///
    /// An empty (`204`) or `null` body is an empty list.
    pub async fn list_for_user(&self, user_id: &Identifier) -> Result<Vec<Despacho>, ApiError> {
        let endpoint = format!("/despacho/user/{user_id}");
        let mut attempt = 0;

        loop {
            let result = match self.client.get(&endpoint).await {
                Ok(response) => response.json::<Option<Vec<Despacho>>>(),
                Err(e) => Err(e),
            };

            match result {
                Ok(list) => return Ok(list.unwrap_or_default()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        status = e.status,
                        error = %e,
                        "Despacho query failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
