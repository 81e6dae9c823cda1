use sdl2::haptic::Haptic;
use sdl2::{EventPump, GameControllerSubsystem, HapticSubsystem, JoystickSubsystem, Sdl};

use crate::device::{Device, InstanceId};
use crate::{GamepadError, Result};

/// Owner of the process-wide SDL input state.
///
/// SDL must live entirely within one thread, so the context is created and
/// used from the thread that drives polling. Dropping it shuts the backend
/// down.
pub struct InputContext {
    _sdl: Sdl,
    controller: GameControllerSubsystem,
    joystick: JoystickSubsystem,
    haptic: HapticSubsystem,
    event_pump: EventPump,
}

impl InputContext {
    /// Initializes SDL and the joystick, game-controller and haptic
    /// subsystems. Fails hard if the backend is unavailable.
    pub fn init() -> Result<Self> {
        let sdl = sdl2::init().map_err(GamepadError::Init)?;
        let controller = sdl.game_controller().map_err(GamepadError::Init)?;
        let joystick = sdl.joystick().map_err(GamepadError::Init)?;
        let haptic = sdl.haptic().map_err(GamepadError::Init)?;
        let event_pump = sdl.event_pump().map_err(GamepadError::Init)?;
        Ok(Self {
            _sdl: sdl,
            controller,
            joystick,
            haptic,
            event_pump,
        })
    }

    /// Refreshes device state. Must be called once per poll tick so that
    /// button queries observe current hardware state.
    pub fn pump(&mut self) {
        self.event_pump.pump_events();
    }

    /// Number of input devices currently visible to the backend.
    pub fn num_devices(&self) -> u32 {
        self.joystick.num_joysticks().unwrap_or(0)
    }

    /// Opens the device at `index`, probing once whether it presents as a
    /// standardized gamepad (named buttons) or a raw joystick (indexed
    /// buttons only).
    pub fn open(&self, index: u32) -> Result<Device> {
        if index >= self.num_devices() {
            return Err(GamepadError::NotFound(index));
        }
        let joystick = self
            .joystick
            .open(index)
            .map_err(|e| GamepadError::Native(e.to_string()))?;
        if self.controller.is_game_controller(index) {
            let controller = self
                .controller
                .open(index)
                .map_err(|e| GamepadError::Native(e.to_string()))?;
            Ok(Device::Standardized {
                controller,
                joystick,
            })
        } else {
            Ok(Device::Raw { joystick })
        }
    }

    /// Opens a haptic handle for the device with the given instance id.
    pub fn open_haptic(&self, id: InstanceId) -> Result<Haptic> {
        self.haptic
            .open_from_joystick_id(id)
            .map_err(|_| GamepadError::Unsupported)
    }
}
