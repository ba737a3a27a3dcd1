//! Fixtures shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    ApiRequest, ApiResponse, ChallengeJson, EndpointJson, Instance, InstanceJson, Scheduler,
    TickHandle, TimeJson, Transport, WidgetError,
};

pub enum Reply {
    Answer(ApiResponse),
    Offline,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Answer(ApiResponse {
            status,
            body: body.to_string(),
        })
    }
}

/// Answers requests from a queue and records what was sent.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into_iter().collect()),
            requests: RefCell::default(),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, WidgetError> {
        self.requests.borrow_mut().push(request);
        match self.replies.borrow_mut().pop_front() {
            Some(Reply::Answer(response)) => Ok(response),
            Some(Reply::Offline) => Err(WidgetError::Network("connection refused".to_string())),
            None => panic!("unexpected request, no reply queued"),
        }
    }
}

/// Hands out handles and keeps count of the ones not yet cancelled.
#[derive(Default, Clone)]
pub struct CountingScheduler {
    active: Rc<Cell<usize>>,
    started: Rc<Cell<usize>>,
}

impl CountingScheduler {
    pub fn active(&self) -> usize {
        self.active.get()
    }

    pub fn started(&self) -> usize {
        self.started.get()
    }
}

#[derive(Debug)]
pub struct CountingHandle {
    active: Rc<Cell<usize>>,
}

impl Scheduler for CountingScheduler {
    type Handle = CountingHandle;

    fn start(&self, period: Duration) -> CountingHandle {
        assert_eq!(period, Duration::from_secs(1));
        self.active.set(self.active.get() + 1);
        self.started.set(self.started.get() + 1);
        CountingHandle {
            active: Rc::clone(&self.active),
        }
    }
}

impl TickHandle for CountingHandle {
    fn cancel(self) {
        self.active.set(self.active.get() - 1);
    }
}

pub fn challenge_json(
    created_at: DateTime<Utc>,
    duration: u64,
    owner: &str,
    endpoints: usize,
) -> ChallengeJson {
    ChallengeJson {
        instance: InstanceJson {
            owner: owner.to_string(),
            name: Some("chall-abc1234".to_string()),
            problem: Some("chall".to_string()),
            id: Some("abc1234".to_string()),
        },
        time: TimeJson {
            created_at,
            duration,
        },
        endpoints: (0..endpoints)
            .map(|i| EndpointJson {
                connection: format!("nc {i}.chall.example 31337"),
                name: Some(format!("port-{i}")),
                protocol: Some("TCP".to_string()),
                host: Some(format!("{i}.chall.example")),
                port: Some(31337),
            })
            .collect(),
    }
}

pub fn instance_created_at(
    created_at: DateTime<Utc>,
    duration: u64,
    owner: &str,
    endpoints: usize,
) -> Instance {
    challenge_json(created_at, duration, owner, endpoints).into()
}

/// A server body the way the API sends it, with an RFC 3339 timestamp.
pub fn body(created_at: DateTime<Utc>, duration: u64, owner: &str, endpoints: usize) -> String {
    let mut json = serde_json::to_value(challenge_json(created_at, duration, owner, endpoints))
        .expect("fixture serializes");
    json["time"]["created_at"] = created_at
        .to_rfc3339_opts(SecondsFormat::Micros, false)
        .into();
    json.to_string()
}
