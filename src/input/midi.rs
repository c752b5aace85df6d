use super::ControlEvent;
use crate::notch::{Note, ParamId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info, warn};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use std::error::Error;
use std::io::{stdin, stdout, Write};

/// Controller numbers mapped onto parameters (mod wheel and channel volume).
const CC_Q: u8 = 1;
const CC_MIX: u8 = 7;

pub struct MidiHandler {
    /// Holds the connection to keep it alive
    #[allow(dead_code)]
    connection: Option<MidiInputConnection<()>>,
    receiver: Option<Receiver<(u8, u8, u8)>>, // (status, data1, data2)
    event_sender: Sender<ControlEvent>,
}

impl MidiHandler {
    pub fn new(event_sender: Sender<ControlEvent>) -> Self {
        match Self::try_new(event_sender.clone()) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(
                    "Failed to initialize MIDI: {}. MIDI functionality will be disabled.",
                    e
                );
                Self {
                    connection: None,
                    receiver: None,
                    event_sender,
                }
            }
        }
    }

    fn try_new(event_sender: Sender<ControlEvent>) -> Result<Self, Box<dyn Error>> {
        let midi_in = MidiInput::new("ColourComb Input")?;
        let port = Self::select_input_port(&midi_in)?;
        let port_name = midi_in.port_name(&port)?;

        let (sender, receiver) = unbounded();

        let connection = midi_in.connect(
            &port,
            "midir-read-input",
            move |_, message, _| {
                if message.len() >= 3 {
                    let _ = sender.send((message[0], message[1], message[2]));
                }
            },
            (),
        )?;

        info!("Opened MIDI port: {}", port_name);

        Ok(Self {
            connection: Some(connection),
            receiver: Some(receiver),
            event_sender,
        })
    }

    fn select_input_port(midi_in: &MidiInput) -> Result<MidiInputPort, Box<dyn Error>> {
        let in_ports = midi_in.ports();
        if in_ports.is_empty() {
            return Err("No MIDI input ports found".into());
        }

        println!("Available MIDI input ports:");
        for (i, port) in in_ports.iter().enumerate() {
            println!("{}: {}", i, midi_in.port_name(port)?);
        }

        print!("Select MIDI input port: ");
        stdout().flush()?;
        let mut input = String::new();
        stdin().read_line(&mut input)?;
        let selection = input.trim().parse::<usize>().unwrap_or(0);

        let port = in_ports
            .get(selection)
            .ok_or("Invalid MIDI port selection")?
            .clone();

        Ok(port)
    }

    /// Translate one raw message. Note-on presses the key of that pitch class.
    pub fn translate(status: u8, data1: u8, data2: u8) -> Option<ControlEvent> {
        match status & 0xF0 {
            0x90 if data2 > 0 => Some(ControlEvent::PressKey(Note::from_midi(data1))),
            0xB0 => {
                let amount = data2.min(127) as f32 / 127.0;
                match data1 {
                    CC_Q => {
                        let spec = ParamId::Q.spec();
                        let value = spec.min + amount * (spec.max - spec.min);
                        Some(ControlEvent::SetParameter(ParamId::Q, value))
                    }
                    CC_MIX => Some(ControlEvent::SetParameter(ParamId::Mix, amount * 100.0)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn update(&mut self) {
        if let Some(receiver) = &self.receiver {
            while let Ok((status, data1, data2)) = receiver.try_recv() {
                if let Some(event) = Self::translate(status, data1, data2) {
                    if let Err(e) = self.event_sender.send(event) {
                        error!("Failed to send MIDI control event: {}", e);
                    }
                }
            }
        }
    }
}
