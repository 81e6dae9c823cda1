use colored::Colorize;

use crate::print_debug;
use crate::registry::Session;

// Reference feedback: a short fixed-strength buzz.
const RUMBLE_STRENGTH: f32 = 0.75;
const RUMBLE_MS: u32 = 500;

/// Fires a timed rumble on the session's device.
///
/// Standardized pads rumble through their controller handle, raw joysticks
/// through the haptic handle cached at open time. Both calls return
/// immediately; playback runs in the backend, so the poll loop never waits
/// on it. Failures are logged and swallowed.
pub(crate) fn vibrate(session: &mut Session) {
    if session.device.is_standardized() {
        let magnitude = (RUMBLE_STRENGTH * f32::from(u16::MAX)) as u16;
        if let Err(e) =
            session.device.set_rumble(magnitude, magnitude, RUMBLE_MS)
        {
            print_debug!("rumble failed for {}: {e}", session.identity.name);
        }
    } else if let Some(haptic) = session.haptic.as_mut() {
        haptic.rumble_play(RUMBLE_STRENGTH, RUMBLE_MS);
    }
}
