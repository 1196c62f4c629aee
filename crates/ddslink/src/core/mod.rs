// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Synchronization primitives and identities shared by readers, writers and
//! the device watcher.

pub mod guid;
pub mod matched;
pub mod queue;
pub mod singleton;
pub mod time;

pub use guid::Guid;
pub use matched::MatchedCounter;
pub use queue::WaitQueue;
pub use singleton::SharedSingleton;
