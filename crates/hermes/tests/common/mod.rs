//! Helpers shared by the end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;

use hermes::prelude::*;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One captured log entry.
#[derive(Debug, Clone)]
pub struct Entry {
    pub request_id: RequestId,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl Entry {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Logger that records every entry it receives.
#[derive(Debug, Clone, Default)]
pub struct CapturingLogger(Arc<Mutex<Vec<Entry>>>);

impl CapturingLogger {
    pub fn entries(&self) -> Vec<Entry> {
        self.0.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.lock().iter().map(|e| e.message.clone()).collect()
    }
}

impl ErrorLogger for CapturingLogger {
    fn log_error(&self, ctx: &RequestContext, message: &str, fields: &[Field<'_>]) {
        self.0.lock().push(Entry {
            request_id: ctx.request_id(),
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|f| (f.key.to_string(), f.value.to_string()))
                .collect(),
        });
    }
}

/// A typed application error with a serializable body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
