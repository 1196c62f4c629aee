// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DeviceWatcher
//!
//! Discovers devices from their announcements on the device-info topic and
//! forgets them when the announcing writer leaves.
//!
//! ```rust,no_run
//! use ddslink::{DeviceWatcher, LoopbackBus, Result};
//!
//! fn main() -> Result<()> {
//!     let watcher = DeviceWatcher::new(LoopbackBus::shared().participant("host"))?;
//!     watcher.on_device_added(|device| println!("+ {}", device.name()));
//!     watcher.on_device_removed(|device| println!("- {}", device.name()));
//!     watcher.start()?;
//!     Ok(())
//! }
//! ```

mod device;
mod runtime;

pub use device::Device;
pub use runtime::DeviceWatcher;
