#![allow(dead_code)]
// Shared fixtures so tests can `use helpers::*;`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sluice_core::{Clock, HttpClient, HttpError, HttpRequest, HttpResponse, TimeWindow};

/// `2024-03-01T12:05:00.123Z`, the instant every test request is signed at.
pub fn signing_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap() + Duration::milliseconds(123)
}

pub fn fixed_clock() -> Clock {
    Arc::new(signing_time)
}

/// `[12:00, 12:05)` on 2024-03-01.
pub fn window() -> TimeWindow {
    TimeWindow::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap(),
    )
    .unwrap()
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct ScriptedHttp {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttp {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn json(bodies: &[&str]) -> Arc<Self> {
        Self::new(
            bodies
                .iter()
                .map(|b| Ok(HttpResponse::ok_json(*b)))
                .collect(),
        )
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response left")))
    }
}
