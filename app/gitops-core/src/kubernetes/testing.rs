//! In-memory [`ClusterClient`] used by the test suites of the workspace.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Mutex,
};

use kube::core::ErrorResponse;
use serde_json::Value;

use super::{
    client::{ClusterClient, ClusterResource},
    ResourceKey,
};

type ObjectId = (String, ResourceKey);

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_owned(),
        message: format!("{reason} (fake cluster)"),
        reason: reason.to_owned(),
        code,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Create(String, ResourceKey),
    Delete(String, ResourceKey),
}

/// A canned answer for a single `get` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Missing,
    Present(Value),
    Error(u16, String),
}

impl Scripted {
    pub fn present<K: ClusterResource>(resource: &K) -> Self {
        Self::Present(serde_json::to_value(resource).unwrap())
    }
}

#[derive(Default)]
struct State {
    objects: BTreeMap<ObjectId, Value>,
    scripted: HashMap<ObjectId, VecDeque<Scripted>>,
    get_failures: HashMap<String, (u16, String)>,
    create_failures: HashMap<String, (u16, String)>,
    delete_failures: HashMap<String, (u16, String)>,
    writes: Vec<Write>,
    reads: Vec<ObjectId>,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

fn kind_of<K: ClusterResource>() -> String {
    K::kind(&()).to_string()
}

impl FakeCluster {
    pub fn insert<K: ClusterResource>(&self, resource: &K) {
        let key = ResourceKey::of(resource).unwrap();
        let value = serde_json::to_value(resource).unwrap();

        self.state
            .lock()
            .unwrap()
            .objects
            .insert((kind_of::<K>(), key), value);
    }

    pub fn remove<K: ClusterResource>(&self, key: &ResourceKey) {
        self.state
            .lock()
            .unwrap()
            .objects
            .remove(&(kind_of::<K>(), key.clone()));
    }

    pub fn object<K: ClusterResource>(&self, key: &ResourceKey) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(kind_of::<K>(), key.clone()))
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    pub fn count<K: ClusterResource>(&self) -> usize {
        let kind = kind_of::<K>();

        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(object_kind, _)| object_kind == &kind)
            .count()
    }

    /// Answers upcoming `get` calls for `key` in order, then falls back to the stored objects.
    pub fn script_get<K: ClusterResource>(&self, key: &ResourceKey, answers: Vec<Scripted>) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .insert((kind_of::<K>(), key.clone()), answers.into());
    }

    pub fn fail_get<K: ClusterResource>(&self, code: u16, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .get_failures
            .insert(kind_of::<K>(), (code, reason.to_owned()));
    }

    pub fn fail_create<K: ClusterResource>(&self, code: u16, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .insert(kind_of::<K>(), (code, reason.to_owned()));
    }

    pub fn fail_delete<K: ClusterResource>(&self, code: u16, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .delete_failures
            .insert(kind_of::<K>(), (code, reason.to_owned()));
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn reads<K: ClusterResource>(&self, key: &ResourceKey) -> usize {
        let id = (kind_of::<K>(), key.clone());

        self.state
            .lock()
            .unwrap()
            .reads
            .iter()
            .filter(|read| **read == id)
            .count()
    }
}

impl ClusterClient for FakeCluster {
    async fn get<K: ClusterResource>(&self, key: &ResourceKey) -> kube::Result<K> {
        let id = (kind_of::<K>(), key.clone());
        let mut state = self.state.lock().unwrap();
        state.reads.push(id.clone());

        if let Some((code, reason)) = state.get_failures.get(&id.0) {
            return Err(api_error(*code, reason));
        }

        let scripted = state
            .scripted
            .get_mut(&id)
            .and_then(|answers| answers.pop_front());

        let value = match scripted {
            Some(Scripted::Missing) => None,
            Some(Scripted::Present(value)) => Some(value),
            Some(Scripted::Error(code, reason)) => return Err(api_error(code, &reason)),
            None => state.objects.get(&id).cloned(),
        };

        match value {
            Some(value) => serde_json::from_value(value).map_err(kube::Error::SerdeError),
            None => Err(api_error(404, "NotFound")),
        }
    }

    async fn create<K: ClusterResource>(&self, resource: &K) -> kube::Result<K> {
        let key = ResourceKey::of(resource).ok_or_else(|| api_error(422, "Invalid"))?;
        let id = (kind_of::<K>(), key);
        let mut state = self.state.lock().unwrap();

        if let Some((code, reason)) = state.create_failures.get(&id.0) {
            return Err(api_error(*code, reason));
        }

        if state.objects.contains_key(&id) {
            return Err(api_error(409, "AlreadyExists"));
        }

        let value = serde_json::to_value(resource).map_err(kube::Error::SerdeError)?;
        state.objects.insert(id.clone(), value);
        state.writes.push(Write::Create(id.0, id.1));

        Ok(resource.clone())
    }

    async fn delete<K: ClusterResource>(&self, key: &ResourceKey) -> kube::Result<()> {
        let id = (kind_of::<K>(), key.clone());
        let mut state = self.state.lock().unwrap();

        if let Some((code, reason)) = state.delete_failures.get(&id.0) {
            return Err(api_error(*code, reason));
        }

        match state.objects.remove(&id) {
            Some(_) => {
                state.writes.push(Write::Delete(id.0, id.1));
                Ok(())
            }
            None => Err(api_error(404, "NotFound")),
        }
    }
}
