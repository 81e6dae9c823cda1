/// Normalizes a device GUID to the canonical 32-hex-char form used by the
/// community database.
///
/// Already-canonical GUIDs pass through unchanged. Dashed Windows-style
/// product GUIDs are translated with a best-effort heuristic: the bus type is
/// fixed to USB (`03000000`), vendor and version words are byte-swapped into
/// little-endian and the CRC/driver words are zeroed. The translation is
/// lossy and only approximates what the backend would report for the same
/// hardware; it is kept in this one pure function so callers never depend on
/// its details.
pub fn normalize_guid(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if is_hex32(&lower) {
        return lower;
    }
    if let Some(sdl) = windows_guid_to_sdl(&lower) {
        return sdl;
    }
    lower.chars().filter(|c| *c != '-').collect()
}

fn is_hex32(s: &str) -> bool {
    s.len() == 32 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Translates a dashed `pppp vvvv`-style Windows product GUID
/// (`8-4-4-4-12` groups) into an SDL-style GUID.
fn windows_guid_to_sdl(s: &str) -> Option<String> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 5 {
        return None;
    }
    let expected = [8, 4, 4, 4, 12];
    for (part, len) in parts.iter().zip(expected) {
        if part.len() != len || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
    }
    // First dword packs product (high word) and vendor (low word); the
    // fourth group carries the version.
    let product = &parts[0][0..4];
    let vendor = swap16(&parts[0][4..8]);
    let version = swap16(parts[3]);
    Some(format!("03000000{vendor}0000{product}0000{version}0000"))
}

fn swap16(word: &str) -> String {
    format!("{}{}", &word[2..4], &word[0..2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_guid_is_unchanged() {
        let guid = "030000005e0400008e02000010010000";
        assert_eq!(normalize_guid(guid), guid);
    }

    #[test]
    fn normalization_is_idempotent() {
        let windows = "8e02045e-0000-0001-0010-000000000000";
        let once = normalize_guid(windows);
        assert_eq!(normalize_guid(&once), once);
    }

    #[test]
    fn windows_guid_translates_to_sdl_form() {
        // Xbox 360 pad: vendor 045e, product 028e, version 0110.
        assert_eq!(
            normalize_guid("8e02045e-0000-0001-0010-000000000000"),
            "030000005e0400008e02000010010000"
        );
    }

    #[test]
    fn uppercase_input_is_lowercased() {
        assert_eq!(
            normalize_guid("030000005E0400008E02000010010000"),
            "030000005e0400008e02000010010000"
        );
    }

    #[test]
    fn malformed_input_falls_back_to_stripping_dashes() {
        assert_eq!(normalize_guid("ab-cd"), "abcd");
    }
}
