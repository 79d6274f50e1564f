use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use rustc_hash::FxHashMap;

use crate::assets::prefab::Prefab;
use crate::errors::{GroveError, Result};
use crate::scene::attach_queue::AttachId;

/// Identifies an external asset (a path, URL or library key).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetSource {
    uri: Cow<'static, str>,
}

impl AssetSource {
    #[must_use]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self { uri: uri.into() }
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl From<&'static str> for AssetSource {
    fn from(uri: &'static str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for AssetSource {
    fn from(uri: String) -> Self {
        Self::new(uri)
    }
}

pub type LoadResult = Result<Prefab>;

/// One-shot completion token for a single load request.
///
/// Consumed by [`LoadCompletion::complete`], so a request resolves at most
/// once. Dropping the token without completing leaves the request pending.
/// The token is `Send`: loaders may complete from any thread, the result is
/// only applied when the frame thread drains the attach queue.
pub struct LoadCompletion {
    id: AttachId,
    tx: flume::Sender<(AttachId, LoadResult)>,
}

impl LoadCompletion {
    pub(crate) fn new(id: AttachId, tx: flume::Sender<(AttachId, LoadResult)>) -> Self {
        Self { id, tx }
    }

    #[must_use]
    pub fn id(&self) -> AttachId {
        self.id
    }

    /// Delivers the load result. Returns `false` if the queue is gone.
    pub fn complete(self, result: LoadResult) -> bool {
        self.tx.send((self.id, result)).is_ok()
    }
}

impl fmt::Debug for LoadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompletion").field("id", &self.id).finish()
    }
}

/// The external asset loader seam.
///
/// `load` must return without blocking; the result travels back through
/// `completion`, possibly from another thread and in any order.
pub trait AssetLoader {
    fn load(&self, source: &AssetSource, completion: LoadCompletion);
}

/// In-process loader over a fixed set of prefabs. Completes synchronously:
/// the result is queued and committed at the next drain.
#[derive(Default)]
pub struct PrefabLibrary {
    prefabs: FxHashMap<String, Prefab>,
}

impl PrefabLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, prefab: Prefab) {
        self.prefabs.insert(uri.into(), prefab);
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, prefab: Prefab) -> Self {
        self.insert(uri, prefab);
        self
    }
}

impl AssetLoader for PrefabLibrary {
    fn load(&self, source: &AssetSource, completion: LoadCompletion) {
        let result = self
            .prefabs
            .get(source.uri())
            .cloned()
            .ok_or_else(|| GroveError::asset_load(source.uri(), "not in prefab library"));
        completion.complete(result);
    }
}

type FetchFn = dyn Fn(AssetSource) -> BoxFuture<'static, LoadResult> + Send + Sync;

/// Loader that resolves on a tokio runtime.
///
/// Each request spawns a task running the user-supplied fetch future; the
/// frame thread never waits on it.
#[derive(Clone)]
pub struct TokioLoader {
    runtime: tokio::runtime::Handle,
    fetch: Arc<FetchFn>,
}

impl TokioLoader {
    pub fn new<F, Fut>(runtime: tokio::runtime::Handle, fetch: F) -> Self
    where
        F: Fn(AssetSource) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LoadResult> + Send + 'static,
    {
        Self {
            runtime,
            fetch: Arc::new(move |source| fetch(source).boxed()),
        }
    }
}

impl AssetLoader for TokioLoader {
    fn load(&self, source: &AssetSource, completion: LoadCompletion) {
        let fut = (self.fetch)(source.clone());
        self.runtime.spawn(async move {
            let result = fut.await;
            if !completion.complete(result) {
                log::debug!("Attach queue dropped before load finished");
            }
        });
    }
}
