use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::role::RoleMapping;
use crate::Result;

/// Stable identity of a logical controller. Two devices are the same
/// controller iff both fields match exactly; the GUID is kept in the raw
/// form reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub guid: String,
}

/// One persisted per-device entry of the mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub identity: DeviceIdentity,
    pub mapping: RoleMapping,
}

#[derive(Debug, Serialize, Deserialize)]
struct MappingFile {
    #[serde(rename = "Controllers", default)]
    controllers: Vec<RawProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawProfile {
    #[serde(rename = "JoystickName")]
    name: String,
    #[serde(rename = "DeviceGuid")]
    guid: String,
    #[serde(rename = "Mappings")]
    mappings: RawRoles,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRoles {
    #[serde(rename = "Hotkey")]
    hotkey: String,
    #[serde(rename = "StartButton")]
    start: String,
}

/// Loads the mapping file. A missing or corrupt file yields an empty list;
/// the store is repopulated as devices are seen again.
pub fn load_or_default(path: &Path) -> Vec<DeviceProfile> {
    let Ok(text) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let Ok(file) = serde_json::from_str::<MappingFile>(&text) else {
        return Vec::new();
    };
    file.controllers
        .into_iter()
        .filter_map(|raw| {
            let mapping = RoleMapping {
                hotkey: raw.mappings.hotkey.parse().ok()?,
                start: raw.mappings.start.parse().ok()?,
            };
            Some(DeviceProfile {
                identity: DeviceIdentity {
                    name: raw.name,
                    guid: raw.guid,
                },
                mapping,
            })
        })
        .collect()
}

/// Saves all profiles, overwriting the file in place.
pub fn save(path: &Path, profiles: &[DeviceProfile]) -> Result<()> {
    let file = MappingFile {
        controllers: profiles
            .iter()
            .map(|p| RawProfile {
                name: p.identity.name.clone(),
                guid: p.identity.guid.clone(),
                mappings: RawRoles {
                    hotkey: p.mapping.hotkey.to_string(),
                    start: p.mapping.start.to_string(),
                },
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json)?;
    Ok(())
}

/// Replaces the profile matching `identity` or appends a new one, keeping
/// the list free of duplicate identities.
pub fn upsert(
    profiles: &mut Vec<DeviceProfile>,
    identity: DeviceIdentity,
    mapping: RoleMapping,
) {
    if let Some(existing) =
        profiles.iter_mut().find(|p| p.identity == identity)
    {
        existing.mapping = mapping;
    } else {
        profiles.push(DeviceProfile { identity, mapping });
    }
}

/// Finds the persisted mapping for a device, if any.
pub fn resolve(
    profiles: &[DeviceProfile],
    identity: &DeviceIdentity,
) -> Option<RoleMapping> {
    profiles
        .iter()
        .find(|p| &p.identity == identity)
        .map(|p| p.mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::ButtonBinding;
    use hotpad_gamepad::PadButton;

    fn sample_profiles() -> Vec<DeviceProfile> {
        vec![
            DeviceProfile {
                identity: DeviceIdentity {
                    name: "Xbox 360 Controller".to_string(),
                    guid: "030000005e0400008e02000010010000".to_string(),
                },
                mapping: RoleMapping::standardized_default(),
            },
            DeviceProfile {
                identity: DeviceIdentity {
                    name: "Generic USB Joystick".to_string(),
                    guid: "03000000790000000600000000000000".to_string(),
                },
                mapping: RoleMapping::indexed(8, 9),
            },
        ]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("controllers.json");
        let profiles = sample_profiles();
        save(&path, &profiles).expect("save");
        assert_eq!(load_or_default(&path), profiles);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_or_default(&dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("controllers.json");
        std::fs::write(&path, "{not json").expect("write");
        assert!(load_or_default(&path).is_empty());
    }

    #[test]
    fn saved_document_uses_stable_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("controllers.json");
        save(&path, &sample_profiles()[..1]).expect("save");
        let text = std::fs::read_to_string(&path).expect("read");
        for field in
            ["Controllers", "JoystickName", "DeviceGuid", "Mappings", "Hotkey", "StartButton"]
        {
            assert!(text.contains(field), "missing {field}");
        }
        assert!(text.contains("\"Back\""));
        assert!(text.contains("\"Start\""));
    }

    #[test]
    fn upsert_replaces_instead_of_duplicating() {
        let mut profiles = sample_profiles();
        let identity = profiles[0].identity.clone();
        upsert(&mut profiles, identity.clone(), RoleMapping::indexed(1, 2));
        assert_eq!(profiles.len(), 2);
        assert_eq!(
            resolve(&profiles, &identity),
            Some(RoleMapping::indexed(1, 2))
        );
    }

    #[test]
    fn identity_match_is_exact_on_both_fields() {
        let profiles = sample_profiles();
        let wrong_name = DeviceIdentity {
            name: "xbox 360 controller".to_string(),
            guid: profiles[0].identity.guid.clone(),
        };
        assert_eq!(resolve(&profiles, &wrong_name), None);
    }

    #[test]
    fn resolved_indexed_mapping_keeps_indices() {
        let profiles = sample_profiles();
        let mapping =
            resolve(&profiles, &profiles[1].identity).expect("mapping");
        assert_eq!(mapping.hotkey, ButtonBinding::Index(8));
        assert_eq!(mapping.start, ButtonBinding::Index(9));
        assert_ne!(mapping.hotkey, ButtonBinding::Named(PadButton::Back));
    }
}
