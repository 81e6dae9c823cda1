use std::fs;
use std::path::Path;

use ahash::AHashMap;

use crate::{MappingError, Result};

/// A community database record reduced to the two roles combo detection
/// needs. Records missing either role are dropped at parse time, so both
/// indices are always present here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMapping {
    pub guid: String,
    pub name: String,
    pub back: u32,
    pub start: u32,
}

/// Parsed community mapping database, keyed by GUID.
///
/// The database is a text file with one record per line:
/// `GUID,Name,role1:value1,role2:value2,...` where button values look like
/// `bN`. Everything except the `back` and `start` roles is discarded.
#[derive(Debug, Default)]
pub struct CommunityDb {
    records: Vec<CommunityMapping>,
    by_guid: AHashMap<String, usize>,
}

impl CommunityDb {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MappingError::FileNotFound(path.display().to_string())
            } else {
                MappingError::Io(e)
            }
        })?;
        Ok(Self::parse_str(&text))
    }

    /// Parses database text. Unusable lines are skipped, never an error.
    pub fn parse_str(text: &str) -> Self {
        let mut db = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(record) = parse_record(line) {
                db.insert(record);
            }
        }
        db
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Duplicate GUIDs: last occurrence wins.
    fn insert(&mut self, record: CommunityMapping) {
        if let Some(&i) = self.by_guid.get(&record.guid) {
            self.records[i] = record;
        } else {
            self.by_guid.insert(record.guid.clone(), self.records.len());
            self.records.push(record);
        }
    }

    /// Looks a record up by GUID: exact match first, then case-insensitive.
    pub fn find_by_guid(&self, guid: &str) -> Option<&CommunityMapping> {
        if let Some(&i) = self.by_guid.get(guid) {
            return Some(&self.records[i]);
        }
        self.records
            .iter()
            .find(|r| r.guid.eq_ignore_ascii_case(guid))
    }

    /// Looks a record up by device name: exact match first, then
    /// case-insensitive substring in either direction. Only used when GUID
    /// lookup fails; similar names can match unintended devices.
    pub fn find_by_name(&self, name: &str) -> Option<&CommunityMapping> {
        if let Some(record) = self.records.iter().find(|r| r.name == name) {
            return Some(record);
        }
        let needle = name.to_ascii_lowercase();
        self.records.iter().find(|r| {
            let candidate = r.name.to_ascii_lowercase();
            candidate.contains(&needle) || needle.contains(&candidate)
        })
    }
}

fn parse_record(line: &str) -> Option<CommunityMapping> {
    let mut fields = line.split(',');
    let guid = fields.next()?.trim();
    let name = fields.next()?.trim();
    if guid.is_empty() || name.is_empty() {
        return None;
    }

    let mut back = None;
    let mut start = None;
    for field in fields {
        let Some((role, value)) = field.split_once(':') else {
            continue;
        };
        let index = parse_button_value(value.trim());
        match role.trim() {
            "back" => back = index,
            "start" => start = index,
            _ => {}
        }
    }

    Some(CommunityMapping {
        guid: guid.to_string(),
        name: name.to_string(),
        back: back?,
        start: start?,
    })
}

// Only plain button references (`bN`) are usable; hats and axes are not.
fn parse_button_value(value: &str) -> Option<u32> {
    value.strip_prefix('b')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const XBOX_LINE: &str =
        "030000005e0400008e02000010010000,Xbox 360 Controller,back:b6,start:b7,a:b0";

    #[test]
    fn parses_back_and_start_roles() {
        let db = CommunityDb::parse_str(XBOX_LINE);
        assert_eq!(db.len(), 1);
        let record = db
            .find_by_guid("030000005e0400008e02000010010000")
            .expect("record");
        assert_eq!(record.name, "Xbox 360 Controller");
        assert_eq!(record.back, 6);
        assert_eq!(record.start, 7);
    }

    #[test]
    fn record_missing_start_is_dropped() {
        let db = CommunityDb::parse_str("03000000aa,Some Pad,a:b0,back:b6");
        assert!(db.is_empty());
    }

    #[test]
    fn record_with_non_button_value_is_dropped() {
        let db = CommunityDb::parse_str("03000000aa,Some Pad,back:h0.4,start:b7");
        assert!(db.is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let text = format!("# Windows\n\n{XBOX_LINE}\n");
        let db = CommunityDb::parse_str(&text);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn duplicate_guid_last_occurrence_wins() {
        let text = "03000000aa,First,back:b1,start:b2\n\
                    03000000aa,Second,back:b3,start:b4\n";
        let db = CommunityDb::parse_str(text);
        assert_eq!(db.len(), 1);
        let record = db.find_by_guid("03000000aa").expect("record");
        assert_eq!(record.name, "Second");
        assert_eq!(record.back, 3);
    }

    #[test]
    fn guid_lookup_is_case_insensitive_as_fallback() {
        let db = CommunityDb::parse_str(XBOX_LINE);
        assert!(db.find_by_guid("030000005E0400008E02000010010000").is_some());
    }

    #[test]
    fn name_lookup_matches_substrings_both_ways() {
        let db = CommunityDb::parse_str(XBOX_LINE);
        assert!(db.find_by_name("Xbox 360 Controller").is_some());
        assert!(db.find_by_name("xbox 360").is_some());
        assert!(db
            .find_by_name("XInput Xbox 360 Controller for Windows")
            .is_some());
        assert!(db.find_by_name("DualShock 4").is_none());
    }
}
