use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use dashmap::DashMap;

use hotpad_gamepad::{Device, Haptic, InputContext, InstanceId};
use hotpad_mappings::{
    load_or_default, normalize_guid, resolve, save, upsert, ButtonBinding,
    CommunityDb, DeviceIdentity, DeviceProfile, RoleMapping,
};

use crate::detector::{ComboDetector, DetectorPool, Retrigger};
use crate::haptics;
use crate::service::{HotkeyCallback, Shared};
use crate::{print_debug, print_error, print_info, print_warning};

const POOL_CAPACITY: usize = 10;

/// Runtime record of one opened device.
pub(crate) struct Session {
    pub identity: DeviceIdentity,
    pub device: Device,
    pub haptic: Option<Haptic>,
    pub mapping: Option<RoleMapping>,
    pub detector: ComboDetector,
}

/// Owns every open device session and the persisted mapping list.
///
/// The session table is shared between the poll tick and the cleanup tick;
/// the mapping list has a single owner here so auto-population and lookups
/// stay serialized.
pub(crate) struct Registry {
    sessions: DashMap<InstanceId, Session>,
    profiles: Vec<DeviceProfile>,
    community: CommunityDb,
    store_path: PathBuf,
    pool: DetectorPool,
    rescan_needed: bool,
    shared: Arc<Shared>,
}

impl Registry {
    pub fn new(
        store_path: PathBuf,
        community: CommunityDb,
        shared: Arc<Shared>,
    ) -> Self {
        let profiles = load_or_default(&store_path);
        print_info!(
            "loaded {} persisted device mappings, {} community records",
            profiles.len(),
            community.len()
        );
        Self {
            sessions: DashMap::new(),
            profiles,
            community,
            store_path,
            pool: DetectorPool::new(POOL_CAPACITY),
            rescan_needed: false,
            shared,
        }
    }

    /// Opens every visible device that is not yet a session.
    ///
    /// Scanning is skipped while the visible count matches the session
    /// count; a cleanup pass that removed sessions forces the next scan, so
    /// a simultaneous unplug+replug is re-admitted without waiting for the
    /// counts to diverge.
    pub fn scan(&mut self, ctx: &InputContext) {
        let visible = ctx.num_devices();
        if !should_scan(visible as usize, self.sessions.len(), self.rescan_needed)
        {
            return;
        }
        self.rescan_needed = false;
        for index in 0..visible {
            let device = match ctx.open(index) {
                Ok(d) => d,
                Err(e) => {
                    print_debug!("open failed for device {index}: {e}");
                    continue;
                }
            };
            let id = device.instance_id();
            // Re-opening an already held device is refcounted by the
            // backend, so dropping this probe handle is safe.
            if self.sessions.contains_key(&id) {
                continue;
            }
            self.admit(ctx, id, device);
        }
    }

    fn admit(&mut self, ctx: &InputContext, id: InstanceId, device: Device) {
        let identity = DeviceIdentity {
            name: device.name(),
            guid: device.guid(),
        };
        let mapping =
            self.resolve_or_assign(&identity, device.is_standardized());
        if mapping.is_none() {
            print_warning!(
                "no role mapping for {} ({}); it is polled but never triggers",
                identity.name,
                identity.guid
            );
        }
        let haptic = if !device.is_standardized() && device.has_rumble() {
            ctx.open_haptic(id).ok()
        } else {
            None
        };
        print_info!(
            "device connected - {} id={id} style={} buttons={}",
            identity.name,
            if device.is_standardized() { "gamepad" } else { "joystick" },
            device.num_buttons()
        );
        if let Ok(mut map) = self.shared.devices.write() {
            map.insert(id, identity.clone());
        }
        self.sessions.insert(
            id,
            Session {
                identity,
                device,
                haptic,
                mapping,
                detector: self.pool.get(),
            },
        );
    }

    fn resolve_or_assign(
        &mut self,
        identity: &DeviceIdentity,
        standardized: bool,
    ) -> Option<RoleMapping> {
        let known = resolve(&self.profiles, identity).is_some();
        let mapping = resolve_or_assign_in(
            &mut self.profiles,
            &self.community,
            identity,
            standardized,
        );
        if !known && mapping.is_some() {
            self.persist();
        }
        mapping
    }

    // Save failures keep in-memory state; the next mutation retries.
    fn persist(&self) {
        if let Err(e) = save(&self.store_path, &self.profiles) {
            print_error!(
                "failed to save mappings to {}: {e}",
                self.store_path.display()
            );
        }
    }

    /// One poll tick: reads both mapped buttons of every session and fires
    /// the callback on a detected combo. A read failure skips that device
    /// for this tick only.
    pub fn poll_tick(
        &self,
        callback: &HotkeyCallback,
        retrigger: Retrigger,
        vibration: bool,
    ) {
        for mut entry in self.sessions.iter_mut() {
            let session = entry.value_mut();
            let Some(mapping) = session.mapping else {
                continue;
            };
            let hotkey = match read_binding(&session.device, mapping.hotkey) {
                Ok(pressed) => pressed,
                Err(e) => {
                    print_debug!(
                        "read failed for {}: {e}",
                        session.identity.name
                    );
                    continue;
                }
            };
            let start = match read_binding(&session.device, mapping.start) {
                Ok(pressed) => pressed,
                Err(e) => {
                    print_debug!(
                        "read failed for {}: {e}",
                        session.identity.name
                    );
                    continue;
                }
            };
            if session.detector.evaluate(hotkey, start, retrigger) {
                print_debug!("combo pressed on {}", session.identity.name);
                callback();
                if vibration {
                    haptics::vibrate(session);
                }
            }
        }
    }

    /// Drops every session whose liveness check fails and returns its
    /// pooled detector buffer.
    pub fn cleanup(&mut self) {
        let dead: Vec<InstanceId> = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().device.attached())
            .map(|entry| *entry.key())
            .collect();
        let pool = &mut self.pool;
        let shared = &self.shared;
        let removed = drain_sessions(&self.sessions, &dead, |id, session| {
            print_info!(
                "device disconnected - {} id={id}",
                session.identity.name
            );
            pool.put(session.detector);
            if let Ok(mut map) = shared.devices.write() {
                map.remove(&id);
            }
        });
        if removed > 0 {
            self.rescan_needed = true;
        }
    }

    /// Rearms every edge detector, so resuming after a stop cannot fire
    /// from stale held state.
    pub fn reset_combo_state(&self) {
        for mut entry in self.sessions.iter_mut() {
            entry.value_mut().detector.reset();
        }
    }

    pub fn close_all(&mut self) {
        let ids: Vec<InstanceId> =
            self.sessions.iter().map(|entry| *entry.key()).collect();
        let pool = &mut self.pool;
        drain_sessions(&self.sessions, &ids, |_, session| {
            pool.put(session.detector);
        });
        if let Ok(mut map) = self.shared.devices.write() {
            map.clear();
        }
        print_info!("all devices closed");
    }
}

/// Enumeration runs when the visible count diverges from the open-session
/// count, or when the previous cleanup pass removed sessions (a device swap
/// keeps the counts equal and would otherwise sit out the throttle).
fn should_scan(visible: usize, open: usize, rescan_needed: bool) -> bool {
    rescan_needed || visible != open
}

/// Removes each listed id from the table, handing the owned value to
/// `on_removed`. Absent ids are skipped, so a value listed twice is
/// surrendered at most once.
fn drain_sessions<T>(
    table: &DashMap<InstanceId, T>,
    ids: &[InstanceId],
    mut on_removed: impl FnMut(InstanceId, T),
) -> usize {
    let mut removed = 0;
    for &id in ids {
        if let Some((_, value)) = table.remove(&id) {
            on_removed(id, value);
            removed += 1;
        }
    }
    removed
}

/// Reads one button binding from a device. Named bindings only match on
/// standardized pads; on raw joysticks they read as not pressed.
fn read_binding(
    device: &Device,
    binding: ButtonBinding,
) -> hotpad_gamepad::Result<bool> {
    match binding {
        ButtonBinding::Named(button) => Ok(device.named_button(button)),
        ButtonBinding::Index(index) => device.button_by_index(index),
    }
}

/// Resolution order for a freshly seen device: persisted profile first, then
/// the standardized-pad default, then the community database by normalized
/// GUID and finally by name. Newly assigned mappings are upserted so the
/// list never grows duplicate identities.
fn resolve_or_assign_in(
    profiles: &mut Vec<DeviceProfile>,
    community: &CommunityDb,
    identity: &DeviceIdentity,
    standardized: bool,
) -> Option<RoleMapping> {
    if let Some(mapping) = resolve(profiles, identity) {
        return Some(mapping);
    }
    let assigned = if standardized {
        Some(RoleMapping::standardized_default())
    } else {
        let normalized = normalize_guid(&identity.guid);
        community
            .find_by_guid(&normalized)
            .or_else(|| community.find_by_name(&identity.name))
            .map(|record| RoleMapping::indexed(record.back, record.start))
    };
    if let Some(mapping) = assigned {
        upsert(profiles, identity.clone(), mapping);
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;

    const XBOX_DB: &str =
        "030000005e0400008e02000010010000,Xbox 360 Controller,back:b6,start:b7,a:b0";

    fn identity(name: &str, guid: &str) -> DeviceIdentity {
        DeviceIdentity {
            name: name.to_string(),
            guid: guid.to_string(),
        }
    }

    #[test]
    fn standardized_pad_gets_default_mapping_persisted() {
        let mut profiles = Vec::new();
        let db = CommunityDb::parse_str("");
        let id = identity("Xbox Wireless Controller", "0300000000aa");
        let mapping = resolve_or_assign_in(&mut profiles, &db, &id, true);
        assert_eq!(mapping, Some(RoleMapping::standardized_default()));
        assert_eq!(profiles.len(), 1);
        assert_eq!(resolve(&profiles, &id), mapping);
    }

    #[test]
    fn raw_joystick_resolves_through_community_db_by_windows_guid() {
        let mut profiles = Vec::new();
        let db = CommunityDb::parse_str(XBOX_DB);
        let id = identity(
            "Xbox 360 Controller",
            "8e02045e-0000-0001-0010-000000000000",
        );
        let mapping = resolve_or_assign_in(&mut profiles, &db, &id, false);
        assert_eq!(mapping, Some(RoleMapping::indexed(6, 7)));
        assert_eq!(profiles.len(), 1);
    }

    #[test]
    fn raw_joystick_falls_back_to_name_lookup() {
        let mut profiles = Vec::new();
        let db = CommunityDb::parse_str(XBOX_DB);
        let id = identity("Xbox 360 Controller", "ffffffffffffffffffffffffffffffff");
        let mapping = resolve_or_assign_in(&mut profiles, &db, &id, false);
        assert_eq!(mapping, Some(RoleMapping::indexed(6, 7)));
    }

    #[test]
    fn unknown_raw_joystick_stays_unmapped() {
        let mut profiles = Vec::new();
        let db = CommunityDb::parse_str(XBOX_DB);
        let id = identity("Mystery Stick", "ffffffffffffffffffffffffffffffff");
        assert_eq!(resolve_or_assign_in(&mut profiles, &db, &id, false), None);
        assert!(profiles.is_empty());
    }

    #[test]
    fn persisted_profile_wins_over_auto_assignment() {
        let db = CommunityDb::parse_str(XBOX_DB);
        let id = identity(
            "Xbox 360 Controller",
            "030000005e0400008e02000010010000",
        );
        let mut profiles = Vec::new();
        upsert(&mut profiles, id.clone(), RoleMapping::indexed(2, 3));
        let mapping = resolve_or_assign_in(&mut profiles, &db, &id, true);
        assert_eq!(mapping, Some(RoleMapping::indexed(2, 3)));
        assert_eq!(profiles.len(), 1);
    }

    #[test]
    fn scan_runs_on_count_change_or_forced_rescan() {
        assert!(!should_scan(2, 2, false));
        assert!(should_scan(3, 2, false));
        assert!(should_scan(1, 2, false));
        assert!(should_scan(2, 2, true));
        assert!(should_scan(0, 0, true));
    }

    #[test]
    fn draining_returns_each_buffer_exactly_once() {
        let table: DashMap<InstanceId, ComboDetector> = DashMap::new();
        table.insert(7, ComboDetector::default());
        table.insert(9, ComboDetector::default());
        let mut pool = DetectorPool::new(POOL_CAPACITY);
        let removed =
            drain_sessions(&table, &[7, 7, 11], |_, detector| pool.put(detector));
        assert_eq!(removed, 1);
        assert_eq!(pool.available(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn repeated_sightings_never_duplicate_profiles() {
        let mut profiles = Vec::new();
        let db = CommunityDb::parse_str("");
        let id = identity("Pad", "0300000000bb");
        for _ in 0..3 {
            resolve_or_assign_in(&mut profiles, &db, &id, true);
        }
        assert_eq!(profiles.len(), 1);
    }
}
