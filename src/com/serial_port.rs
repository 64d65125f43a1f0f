use std::io::{self, Read, Write};

use serial::prelude::*;

use super::{Com, ComError, ComResult};
use crate::config::Config;

/// Serial line to the cartridge: 8 data bits, no parity, one stop bit, no
/// flow control. Reads are bounded by the configured deadline.
pub struct SerialCom {
    port: serial::SystemPort,
}

impl SerialCom {
    pub fn open(config: &Config) -> ComResult<Self> {
        let mut port = serial::open(&config.device).map_err(into_io)?;
        port.reconfigure(&|settings| {
            settings.set_baud_rate(serial::BaudRate::from_speed(config.baud_rate))?;
            settings.set_char_size(serial::CharSize::Bits8);
            settings.set_parity(serial::Parity::ParityNone);
            settings.set_stop_bits(serial::StopBits::Stop1);
            settings.set_flow_control(serial::FlowControl::FlowNone);
            Ok(())
        })
        .map_err(into_io)?;
        port.set_timeout(config.read_timeout).map_err(into_io)?;
        Ok(Self { port })
    }
}

fn into_io(err: serial::Error) -> ComError {
    ComError::Io(io::Error::new(io::ErrorKind::Other, err))
}

impl Com for SerialCom {
    fn get_name(&self) -> &'static str {
        "serial"
    }

    fn send(&mut self, buf: &[u8]) -> ComResult<usize> {
        match self.port.write(buf) {
            Ok(n) => Ok(n),
            // EAGAIN and a write poll running out both mean a full device
            // buffer here, not a dead link.
            Err(err) if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Err(ComError::Busy)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn read_data(&mut self) -> ComResult<Option<Vec<u8>>> {
        let mut buf = [0; 256];
        match self.port.read(&mut buf) {
            Ok(0) => Err(ComError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "serial device closed",
            ))),
            Ok(size) => Ok(Some(buf[..size].to_vec())),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
