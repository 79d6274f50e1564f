use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use std::sync::Arc;
use uuid::Uuid;

pub struct StorageInner<H: Key, T> {
    pub map: SlotMap<H, Arc<T>>,
    pub lookup: FxHashMap<Uuid, H>,
}

impl<H: Key, T> Default for StorageInner<H, T> {
    fn default() -> Self {
        Self {
            map: SlotMap::default(),
            lookup: FxHashMap::default(),
        }
    }
}

/// Thread-safe handle-keyed asset container.
///
/// Shared by the frame thread and loader threads; all methods take `&self`.
pub struct AssetStorage<H: Key, T> {
    inner: RwLock<StorageInner<H, T>>,
}

impl<H: Key, T> Default for AssetStorage<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Key, T> AssetStorage<H, T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::default(),
        }
    }

    pub fn add(&self, asset: impl Into<T>) -> H {
        self.inner.write().map.insert(Arc::new(asset.into()))
    }

    /// Adds an asset keyed by `uuid`; a second add with the same uuid returns
    /// the existing handle and drops the new value.
    pub fn add_with_uuid(&self, uuid: Uuid, asset: impl Into<T>) -> H {
        let mut guard = self.inner.write();
        if let Some(&handle) = guard.lookup.get(&uuid) {
            return handle;
        }
        let handle = guard.map.insert(Arc::new(asset.into()));
        guard.lookup.insert(uuid, handle);
        handle
    }

    #[must_use]
    pub fn get(&self, handle: H) -> Option<Arc<T>> {
        self.inner.read().map.get(handle).cloned()
    }

    #[must_use]
    pub fn get_handle_by_uuid(&self, uuid: &Uuid) -> Option<H> {
        self.inner.read().lookup.get(uuid).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Batch read access for the render loop.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, StorageInner<H, T>> {
        self.inner.read()
    }
}

impl<H: Key, T: Clone> AssetStorage<H, T> {
    /// Mutates an asset in place (copy-on-write if a reader still holds the
    /// previous `Arc`). Returns `false` for a stale handle.
    pub fn update(&self, handle: H, f: impl FnOnce(&mut T)) -> bool {
        let mut guard = self.inner.write();
        let Some(slot) = guard.map.get_mut(handle) else {
            return false;
        };
        f(Arc::make_mut(slot));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::new_key_type;

    new_key_type! { struct TestHandle; }

    #[test]
    fn uuid_deduplicates() {
        let storage = AssetStorage::<TestHandle, String>::new();
        let uuid = Uuid::new_v4();
        let h1 = storage.add_with_uuid(uuid, "first".to_string());
        let h2 = storage.add_with_uuid(uuid, "second".to_string());
        assert_eq!(h1, h2);
        assert_eq!(&*storage.get(h1).unwrap(), "first");
        assert_eq!(storage.get_handle_by_uuid(&uuid), Some(h1));
    }

    #[test]
    fn update_is_copy_on_write() {
        let storage = AssetStorage::<TestHandle, i32>::new();
        let handle = storage.add(10);
        let before = storage.get(handle).unwrap();

        assert!(storage.update(handle, |v| *v += 5));
        assert_eq!(*before, 10);
        assert_eq!(*storage.get(handle).unwrap(), 15);
    }
}
