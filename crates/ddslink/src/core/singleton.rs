// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide weak singleton registry.
//!
//! `instance()` hands out a shared `Arc<T>` while one is alive anywhere in
//! the process; once every holder drops it, the next call builds a new one.

use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock, Weak};

type Registry = Mutex<HashMap<TypeId, Weak<dyn Any + Send + Sync>>>;

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Shared instance of `T`, kept alive only by its users.
pub struct SharedSingleton<T>(PhantomData<fn() -> T>);

impl<T: Any + Send + Sync> SharedSingleton<T> {
    /// The live instance, or a new one from `make`.
    ///
    /// `make` runs under the registry lock; it must not call `instance()`.
    pub fn instance(make: impl FnOnce() -> T) -> Arc<T> {
        let mut map = registry().lock();
        let key = TypeId::of::<T>();
        if let Some(live) = map
            .get(&key)
            .and_then(Weak::upgrade)
            .and_then(|any| any.downcast::<T>().ok())
        {
            return live;
        }
        let fresh = Arc::new(make());
        let erased: Arc<dyn Any + Send + Sync> = fresh.clone();
        map.insert(key, Arc::downgrade(&erased));
        log::debug!(
            "[SINGLETON] Created shared {}",
            std::any::type_name::<T>()
        );
        fresh
    }

    /// The live instance, if any.
    pub fn get() -> Option<Arc<T>> {
        registry()
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(Weak::upgrade)
            .and_then(|any| any.downcast::<T>().ok())
    }
}
