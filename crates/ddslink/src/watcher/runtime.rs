// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::device::Device;
use crate::config::LinkConfig;
use crate::core::Guid;
use crate::error::{Error, Result};
use crate::reader::{ReaderBuilder, Sample, TopicReader};
use crate::topics::{DeviceInfo, Message};
use crate::transport::{ListenerId, Participant, ParticipantListener};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;

type DeviceCallback = Arc<dyn Fn(Arc<Device>) + Send + Sync>;

/// Device table plus user callbacks, shared with the transport.
struct WatcherShared {
    /// `false` once stopped; late discoveries are dropped.
    active: Mutex<bool>,
    devices: Mutex<BTreeMap<Guid, Arc<Device>>>,
    on_added: RwLock<Option<DeviceCallback>>,
    on_removed: RwLock<Option<DeviceCallback>>,
}

impl WatcherShared {
    fn discovered(&self, sample: Sample<DeviceInfo>) {
        let guid = sample.info.publication_handle;
        let info = sample.msg;
        if !info.is_valid() {
            return;
        }
        log::debug!(
            "[WATCHER] Device ({}) detected: name={} serial={} product-line={} topic-root={} locked={}",
            guid,
            info.name,
            info.serial,
            info.product_line,
            info.topic_root,
            if info.locked { "yes" } else { "no" }
        );
        let device = Arc::new(Device::new(guid, info));
        {
            let active = self.active.lock();
            if !*active {
                return;
            }
            self.devices.lock().insert(guid, device.clone());
        }
        let callback = self.on_added.read().clone();
        if let Some(callback) = callback {
            callback(device);
        }
    }

    fn clear(&self) -> usize {
        let mut active = self.active.lock();
        *active = false;
        let mut devices = self.devices.lock();
        let n = devices.len();
        devices.clear();
        n
    }
}

impl ParticipantListener for WatcherShared {
    fn on_writer_removed(&self, writer: Guid, _topic: &str) {
        let Some(device) = self.devices.lock().remove(&writer) else {
            return;
        };
        let callback = self.on_removed.read().clone();
        let builder = std::thread::Builder::new().name("ddslink-device-removed".to_string());
        notify_removed_detached(builder, device, callback);
    }
}

/// Hand `device` to `callback` on a thread spawned from `builder`; the
/// device is released there, after the callback.
///
/// If the thread cannot be spawned, the callback runs and the device is
/// released on the calling thread.
pub(super) fn notify_removed_detached(
    builder: std::thread::Builder,
    device: Arc<Device>,
    callback: Option<DeviceCallback>,
) {
    let removal = Arc::new(Mutex::new(Some((device, callback))));
    let job = removal.clone();
    let spawned = builder.spawn(move || {
        let pending = job.lock().take();
        if let Some((device, callback)) = pending {
            notify_removed(device, callback);
        }
    });
    if let Err(e) = spawned {
        log::error!(
            "[WATCHER] Failed to spawn removal thread ({}), notifying inline",
            e
        );
        let pending = removal.lock().take();
        if let Some((device, callback)) = pending {
            notify_removed(device, callback);
        }
    }
}

fn notify_removed(device: Arc<Device>, callback: Option<DeviceCallback>) {
    if let Some(callback) = callback {
        callback(device);
    }
}

struct Running {
    _reader: TopicReader<DeviceInfo>,
    listener: ListenerId,
}

/// Tracks devices announcing themselves on the device-info topic.
///
/// A device is added when its announcement arrives and removed when the
/// writer that announced it leaves the bus. Removal callbacks run on a
/// short-lived thread of their own.
pub struct DeviceWatcher {
    participant: Arc<dyn Participant>,
    config: LinkConfig,
    shared: Arc<WatcherShared>,
    running: Mutex<Option<Running>>,
}

impl DeviceWatcher {
    pub fn new(participant: Arc<dyn Participant>) -> Result<Self> {
        Self::with_config(participant, &LinkConfig::default())
    }

    /// A watcher on `config.device_info_topic`.
    pub fn with_config(participant: Arc<dyn Participant>, config: &LinkConfig) -> Result<Self> {
        if !participant.is_valid() {
            return Err(Error::InvalidConstruction(format!(
                "participant '{}' was not initialized",
                participant.name()
            )));
        }
        Ok(Self {
            participant,
            config: config.clone(),
            shared: Arc::new(WatcherShared {
                active: Mutex::new(false),
                devices: Mutex::new(BTreeMap::new()),
                on_added: RwLock::new(None),
                on_removed: RwLock::new(None),
            }),
            running: Mutex::new(None),
        })
    }

    /// Called with each newly discovered device. The last registration wins.
    pub fn on_device_added(&self, callback: impl Fn(Arc<Device>) + Send + Sync + 'static) {
        *self.shared.on_added.write() = Some(Arc::new(callback));
    }

    /// Called, on its own thread, with each device whose writer left.
    pub fn on_device_removed(&self, callback: impl Fn(Arc<Device>) + Send + Sync + 'static) {
        *self.shared.on_removed.write() = Some(Arc::new(callback));
    }

    /// Start watching. A running watcher is stopped and restarted.
    pub fn start(&self) -> Result<()> {
        let mut running = self.running.lock();
        self.stop_locked(&mut running);

        *self.shared.active.lock() = true;
        let listener: Arc<dyn ParticipantListener> = self.shared.clone();
        let listener = self.participant.add_listener(listener);

        let sink = self.shared.clone();
        let reader = ReaderBuilder::<DeviceInfo>::new(&self.config.device_info_topic)
            .config(&self.config)
            .on_data(move |sample| sink.discovered(sample))
            .open(self.participant.clone());
        let reader = match reader {
            Ok(reader) => reader,
            Err(e) => {
                self.participant.remove_listener(listener);
                self.shared.clear();
                return Err(e);
            }
        };

        *running = Some(Running {
            _reader: reader,
            listener,
        });
        log::debug!(
            "[WATCHER] Started on '{}'",
            self.config.device_info_topic
        );
        Ok(())
    }

    /// Stop watching and forget every device without notifying anyone.
    /// No-op when already stopped.
    pub fn stop(&self) {
        let mut running = self.running.lock();
        self.stop_locked(&mut running);
    }

    fn stop_locked(&self, running: &mut Option<Running>) {
        let Some(run) = running.take() else {
            return;
        };
        self.participant.remove_listener(run.listener);
        drop(run);
        let forgotten = self.shared.clear();
        log::debug!("[WATCHER] Stopped, forgot {} devices", forgotten);
    }

    pub fn is_stopped(&self) -> bool {
        self.running.lock().is_none()
    }

    pub fn device_count(&self) -> usize {
        self.shared.devices.lock().len()
    }

    /// Visit known devices in GUID order, under the device lock.
    ///
    /// Stops at the first `false` from `visitor` and returns `false`;
    /// returns `true` if every device was visited. `visitor` must not call
    /// back into the watcher.
    pub fn for_each_device(&self, mut visitor: impl FnMut(&Arc<Device>) -> bool) -> bool {
        let devices = self.shared.devices.lock();
        devices.values().all(|device| visitor(device))
    }
}

impl Drop for DeviceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
