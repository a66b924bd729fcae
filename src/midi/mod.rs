use crossbeam::channel::{Receiver, Sender, bounded};
use log::{debug, error, info, warn};
use midir::{MidiInput, MidiInputConnection};
use serde::{Deserialize, Serialize};
use std::thread;

use crate::host::{EffectHostHandle, MAX_PARAMS};

/// Routes a MIDI CC to one of the host's knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MidiMapping {
    /// The MIDI channel (0-15)
    pub channel: u8,
    /// The MIDI control number
    pub control: u8,
    /// Knob index driven by this controller
    pub knob: usize,
    /// Human-readable description of this mapping
    pub description: String,
}

impl MidiMapping {
    pub fn new(channel: u8, control: u8, knob: usize) -> Self {
        Self {
            channel,
            control,
            knob,
            description: format!("Ch{} CC {} -> knob {}", channel + 1, control, knob),
        }
    }

    /// Check if this mapping matches the given MIDI message
    pub const fn matches(&self, channel: u8, control: u8) -> bool {
        self.channel == channel && self.control == control
    }
}

/// Represents a detected MIDI input
#[derive(Debug, Clone)]
pub struct MidiInputEvent {
    pub channel: u8,
    pub message_type: MidiMessageType,
    pub control: u8,
    pub value: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessageType {
    ControlChange,
    ProgramChange,
    Other,
}

impl std::fmt::Display for MidiMessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlChange => write!(f, "CC"),
            Self::ProgramChange => write!(f, "Program"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::fmt::Display for MidiInputEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ch{} {} #{} val={}",
            self.channel + 1,
            self.message_type,
            self.control,
            self.value
        )
    }
}

/// What a MIDI event asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiAction {
    SetKnob { knob: usize, value: f32 },
    SelectEffect(usize),
}

/// Messages sent from the MIDI thread to the main application
#[derive(Debug, Clone)]
pub enum MidiEvent {
    /// A MIDI input was received
    Input(MidiInputEvent),
    /// Error occurred
    Error(String),
}

/// Commands sent from the main application to the MIDI manager
pub enum MidiCommand {
    /// Connect to a specific device
    Connect(String),
    /// Shutdown the MIDI thread
    Shutdown,
}

/// Handle for communicating with the MIDI manager from the control thread
pub struct MidiHandle {
    command_sender: Sender<MidiCommand>,
    event_receiver: Receiver<MidiEvent>,
    mappings: Vec<MidiMapping>,
    program_change: bool,
}

impl MidiHandle {
    pub fn connect(&self, device_name: &str) {
        if let Err(e) = self
            .command_sender
            .try_send(MidiCommand::Connect(device_name.to_string()))
        {
            error!("Failed to send connect command: {e}");
        }
    }

    pub fn try_recv(&self) -> Option<MidiEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Translate an event into a host action, if it maps to one.
    pub fn resolve(&self, event: &MidiInputEvent) -> Option<MidiAction> {
        resolve_event(&self.mappings, self.program_change, event)
    }

    /// Apply an event to the host. Returns `true` if it changed anything.
    pub fn dispatch(&self, event: &MidiInputEvent, host: &EffectHostHandle) -> bool {
        match self.resolve(event) {
            Some(MidiAction::SetKnob { knob, value }) => host.set_knob(knob, value),
            Some(MidiAction::SelectEffect(index)) => {
                // Out-of-range selections would fault the audio thread; a
                // stray program change is user input, not a build error.
                let count = host.registry().count();
                if index >= count {
                    warn!("Ignoring program change {index}: only {count} effects registered");
                    return false;
                }
                host.request_swap(index);
                true
            }
            None => false,
        }
    }
}

fn resolve_event(
    mappings: &[MidiMapping],
    program_change: bool,
    event: &MidiInputEvent,
) -> Option<MidiAction> {
    match event.message_type {
        MidiMessageType::ControlChange => mappings
            .iter()
            .find(|m| m.matches(event.channel, event.control) && m.knob < MAX_PARAMS)
            .map(|m| MidiAction::SetKnob {
                knob: m.knob,
                value: f32::from(event.value) / 127.0,
            }),
        MidiMessageType::ProgramChange if program_change => {
            Some(MidiAction::SelectEffect(usize::from(event.control)))
        }
        _ => None,
    }
}

impl Drop for MidiHandle {
    fn drop(&mut self) {
        let _ = self.command_sender.try_send(MidiCommand::Shutdown);
    }
}

/// The MIDI manager runs in a separate thread and handles device connections
pub struct MidiManager {
    command_receiver: Receiver<MidiCommand>,
    event_sender: Sender<MidiEvent>,
    connection: Option<MidiInputConnection<()>>,
}

impl MidiManager {
    /// Create a new MIDI manager and its handle
    pub fn new(mappings: Vec<MidiMapping>, program_change: bool) -> (Self, MidiHandle) {
        let (command_sender, command_receiver) = bounded(10);
        let (event_sender, event_receiver) = bounded(100);

        (
            Self {
                command_receiver,
                event_sender,
                connection: None,
            },
            MidiHandle {
                command_sender,
                event_receiver,
                mappings,
                program_change,
            },
        )
    }

    /// Get a list of available MIDI input devices
    pub fn list_devices() -> Vec<String> {
        match MidiInput::new("fxslot-scan") {
            Ok(midi_in) => midi_in
                .ports()
                .iter()
                .filter_map(|p| midi_in.port_name(p).ok())
                .collect(),
            Err(e) => {
                error!("Failed to create MIDI input for scanning: {e}");
                Vec::new()
            }
        }
    }

    /// Run the MIDI manager (blocking, should be called from a dedicated thread)
    pub fn run(mut self) {
        debug!("MIDI manager started");

        loop {
            match self.command_receiver.recv() {
                Ok(MidiCommand::Connect(device_name)) => {
                    self.handle_connect(&device_name);
                }
                Ok(MidiCommand::Shutdown) | Err(_) => {
                    debug!("MIDI manager shutting down");
                    self.handle_disconnect();
                    break;
                }
            }
        }
    }

    fn report_error(&self, message: String) {
        error!("{message}");
        let _ = self.event_sender.try_send(MidiEvent::Error(message));
    }

    fn handle_connect(&mut self, device_name: &str) {
        // Disconnect existing connection first
        self.handle_disconnect();

        let midi_in = match MidiInput::new("fxslot") {
            Ok(m) => m,
            Err(e) => {
                self.report_error(format!("Failed to create MIDI input: {e}"));
                return;
            }
        };

        let port = midi_in.ports().into_iter().find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n == device_name)
                .unwrap_or(false)
        });

        let Some(port) = port else {
            self.report_error(format!("MIDI device not found: {device_name}"));
            return;
        };

        let sender = self.event_sender.clone();

        let connection = match midi_in.connect(
            &port,
            "fxslot-input",
            move |_timestamp, message, ()| {
                let Some(event) = parse_midi_message(message) else {
                    return;
                };

                if let Err(e) = sender.try_send(MidiEvent::Input(event)) {
                    warn!("Failed to send MIDI event: {e}");
                }
            },
            (),
        ) {
            Ok(c) => c,
            Err(e) => {
                self.report_error(format!("Failed to connect to MIDI device: {e}"));
                return;
            }
        };

        info!("Connected to MIDI device: {device_name}");
        self.connection = Some(connection);
    }

    fn handle_disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            info!("Disconnected from MIDI device");
        }
    }
}

/// Parse raw MIDI bytes into a MidiInputEvent
fn parse_midi_message(message: &[u8]) -> Option<MidiInputEvent> {
    let (&status, data) = message.split_first()?;
    let channel = status & 0x0F;

    let (message_type, control, value) = match status & 0xF0 {
        0xB0 if data.len() >= 2 => (MidiMessageType::ControlChange, data[0], data[1]),
        0xC0 if !data.is_empty() => (MidiMessageType::ProgramChange, data[0], 0),
        0xB0 | 0xC0 => return None,
        _ => (
            MidiMessageType::Other,
            data.first().copied().unwrap_or(0),
            data.get(1).copied().unwrap_or(0),
        ),
    };

    Some(MidiInputEvent {
        channel,
        message_type,
        control,
        value,
    })
}

/// Start the MIDI manager in a background thread
pub fn start_midi_manager(mappings: Vec<MidiMapping>, program_change: bool) -> MidiHandle {
    let (manager, handle) = MidiManager::new(mappings, program_change);

    thread::Builder::new()
        .name("midi-manager".to_string())
        .spawn(move || {
            manager.run();
        })
        .expect("Failed to spawn MIDI manager thread");

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectRegistry;
    use crate::effect::units::register_builtin;
    use crate::host::EffectHost;
    use std::sync::Arc;

    fn cc(channel: u8, control: u8, value: u8) -> MidiInputEvent {
        parse_midi_message(&[0xB0 | channel, control, value]).unwrap()
    }

    #[test]
    fn test_parse_control_change() {
        let event = cc(1, 7, 64);
        assert_eq!(event.channel, 1);
        assert_eq!(event.message_type, MidiMessageType::ControlChange);
        assert_eq!(event.control, 7);
        assert_eq!(event.value, 64);
    }

    #[test]
    fn test_parse_program_change() {
        let event = parse_midi_message(&[0xC2, 5]).unwrap();
        assert_eq!(event.channel, 2);
        assert_eq!(event.message_type, MidiMessageType::ProgramChange);
        assert_eq!(event.control, 5);
    }

    #[test]
    fn test_parse_rejects_truncated_messages() {
        assert!(parse_midi_message(&[]).is_none());
        assert!(parse_midi_message(&[0xB0, 7]).is_none());
        assert!(parse_midi_message(&[0xC0]).is_none());
    }

    #[test]
    fn test_midi_mapping_matches() {
        let mapping = MidiMapping::new(0, 60, 2);
        assert!(mapping.matches(0, 60));
        assert!(!mapping.matches(1, 60));
        assert!(!mapping.matches(0, 61));
    }

    #[test]
    fn test_resolve_cc_to_knob() {
        let mappings = [MidiMapping::new(0, 20, 3)];
        let action = resolve_event(&mappings, true, &cc(0, 20, 127));
        assert_eq!(action, Some(MidiAction::SetKnob { knob: 3, value: 1.0 }));

        assert_eq!(resolve_event(&mappings, true, &cc(0, 21, 127)), None);
    }

    #[test]
    fn test_resolve_ignores_mappings_past_bank() {
        let mappings = [MidiMapping::new(0, 20, MAX_PARAMS)];
        assert_eq!(resolve_event(&mappings, true, &cc(0, 20, 64)), None);
    }

    #[test]
    fn test_program_change_can_be_disabled() {
        let event = parse_midi_message(&[0xC0, 1]).unwrap();
        assert_eq!(
            resolve_event(&[], true, &event),
            Some(MidiAction::SelectEffect(1))
        );
        assert_eq!(resolve_event(&[], false, &event), None);
    }

    #[test]
    fn test_dispatch_drives_host() {
        let mut registry = EffectRegistry::new();
        register_builtin(&mut registry).unwrap();
        let (_host, host_handle) = EffectHost::new(Arc::new(registry), 0, 48_000.0).unwrap();
        let (_manager, midi) = MidiManager::new(vec![MidiMapping::new(0, 20, 0)], true);

        assert!(midi.dispatch(&cc(0, 20, 0), &host_handle));
        assert_eq!(host_handle.knob(0), Some(0.0));

        let program = parse_midi_message(&[0xC0, 2]).unwrap();
        assert!(midi.dispatch(&program, &host_handle));
        assert!(host_handle.is_swap_pending());

        let out_of_range = parse_midi_message(&[0xC0, 99]).unwrap();
        assert!(!midi.dispatch(&out_of_range, &host_handle));
    }
}
