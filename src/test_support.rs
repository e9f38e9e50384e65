use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    sync::{Mutex, MutexGuard},
};

use serde_json::Value;

use crate::usecases::{
    contracts::{ApiCaller, ApiParams, RtmConnection},
    error::TransportError,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

/// In-memory transport replaying scripted handshakes, reads and responses.
///
/// Exhausted handshake scripts succeed and exhausted read scripts yield empty
/// batches.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    connects: VecDeque<bool>,
    reads: VecDeque<Result<Vec<Value>, TransportError>>,
    responses: HashMap<(String, Option<String>), Value>,
    calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
    connect_count: usize,
    read_count: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connects(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.connects.extend(outcomes);
        self
    }

    pub fn with_read(mut self, outcome: Result<Vec<Value>, TransportError>) -> Self {
        self.reads.push_back(outcome);
        self
    }

    /// Answers every call of `method` with `response`.
    pub fn respond(mut self, method: &str, response: Value) -> Self {
        self.responses.insert((method.to_owned(), None), response);
        self
    }

    /// Answers calls of `method` carrying a parameter equal to `param` with `response`.
    pub fn respond_for(mut self, method: &str, param: &str, response: Value) -> Self {
        self.responses
            .insert((method.to_owned(), Some(param.to_owned())), response);
        self
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(called, _)| called == method)
            .count()
    }

    pub fn last_params(&self, method: &str) -> Option<Vec<(String, String)>> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(called, _)| called == method)
            .map(|(_, params)| params.clone())
    }

    pub fn connect_count(&self) -> usize {
        self.connect_count
    }

    pub fn read_count(&self) -> usize {
        self.read_count
    }
}

impl ApiCaller for ScriptedTransport {
    fn call(&self, method: &str, params: &ApiParams<'_>) -> Result<Value, TransportError> {
        self.calls.borrow_mut().push((
            method.to_owned(),
            params
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
        ));

        params
            .iter()
            .find_map(|(_, value)| {
                self.responses
                    .get(&(method.to_owned(), Some((*value).to_owned())))
            })
            .or_else(|| self.responses.get(&(method.to_owned(), None)))
            .cloned()
            .ok_or_else(|| TransportError::Request(format!("no scripted response for {method}")))
    }
}

impl RtmConnection for ScriptedTransport {
    fn connect(&mut self) -> bool {
        self.connect_count += 1;
        self.connects.pop_front().unwrap_or(true)
    }

    fn read(&mut self) -> Result<Vec<Value>, TransportError> {
        self.read_count += 1;
        self.reads.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}
