//! Scripted page fetcher shared by unit tests

use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::PageNumber;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Clone)]
enum Reply {
    Page(Value),
    Fail { status: u16, body: String },
}

/// Serves canned JSON pages; unscripted pages come back empty
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    replies: HashMap<PageNumber, Reply>,
    waits: HashMap<PageNumber, Arc<Notify>>,
    signals: HashMap<PageNumber, Arc<Notify>>,
    calls: Mutex<Vec<(PageNumber, u32)>>,
    completed: Mutex<Vec<PageNumber>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `items` for `page` without a total page count
    pub(crate) fn page(mut self, page: PageNumber, items: Vec<Value>) -> Self {
        self.replies.insert(
            page,
            Reply::Page(json!({"responseObject": {"items": items}})),
        );
        self
    }

    /// Serve `items` for `page` along with `totalPages`
    pub(crate) fn page_with_total(mut self, page: PageNumber, items: Vec<Value>, total: u32) -> Self {
        self.replies.insert(
            page,
            Reply::Page(json!({"responseObject": {"items": items, "totalPages": total}})),
        );
        self
    }

    /// Fail `page` with an HTTP status error
    pub(crate) fn fail(mut self, page: PageNumber, status: u16, body: &str) -> Self {
        self.replies.insert(
            page,
            Reply::Fail {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Hold `page` until `gate` is notified
    pub(crate) fn wait_for(mut self, page: PageNumber, gate: Arc<Notify>) -> Self {
        self.waits.insert(page, gate);
        self
    }

    /// Notify `gate` once `page` has completed
    pub(crate) fn signal_after(mut self, page: PageNumber, gate: Arc<Notify>) -> Self {
        self.signals.insert(page, gate);
        self
    }

    /// Pages requested, in call order
    pub(crate) fn calls(&self) -> Vec<PageNumber> {
        self.calls.lock().unwrap().iter().map(|(page, _)| *page).collect()
    }

    /// Limits requested, in call order
    pub(crate) fn limits(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(_, limit)| *limit).collect()
    }

    /// Pages in completion order
    pub(crate) fn completed(&self) -> Vec<PageNumber> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher<Value> for ScriptedFetcher {
    async fn fetch(&self, page: PageNumber, limit: u32) -> Result<Value> {
        self.calls.lock().unwrap().push((page, limit));

        if let Some(gate) = self.waits.get(&page) {
            gate.notified().await;
        }

        let reply = self
            .replies
            .get(&page)
            .cloned()
            .unwrap_or_else(|| Reply::Page(json!({"responseObject": {"items": []}})));

        self.completed.lock().unwrap().push(page);
        if let Some(gate) = self.signals.get(&page) {
            gate.notify_one();
        }

        match reply {
            Reply::Page(body) => Ok(body),
            Reply::Fail { status, body } => Err(Error::http_status(status, body)),
        }
    }
}

/// Items `{"id": n}` for each n in `ids`
pub(crate) fn items(ids: impl IntoIterator<Item = u64>) -> Vec<Value> {
    ids.into_iter().map(|id| json!({ "id": id })).collect()
}
