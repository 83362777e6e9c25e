#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

pub const PACKET_LEN: usize = 188;

/// 6-byte PCR/OPCR encoding with reserved bits set.
pub fn clock(base: u64, extension: u16) -> [u8; 6] {
    [
        (base >> 25) as u8,
        (base >> 17) as u8,
        (base >> 9) as u8,
        (base >> 1) as u8,
        ((base & 0x01) as u8) << 7 | 0x7e | (extension >> 8) as u8,
        extension as u8,
    ]
}

pub struct Packet {
    pub pid: u16,
    pub counter: u8,
    pub unit_start: bool,
    pub scrambling: u8,
    /// Flag byte followed by optional fields; `None` for no adaptation field.
    pub adaptation: Option<Vec<u8>>,
}

impl Packet {
    pub fn new(pid: u16, counter: u8) -> Self {
        Self {
            pid,
            counter,
            unit_start: false,
            scrambling: 0,
            adaptation: None,
        }
    }

    pub fn unit_start(mut self) -> Self {
        self.unit_start = true;
        self
    }

    pub fn scrambled(mut self, control: u8) -> Self {
        self.scrambling = control;
        self
    }

    pub fn adaptation(mut self, flags: u8, fields: &[u8]) -> Self {
        let mut body = vec![flags];
        body.extend_from_slice(fields);
        self.adaptation = Some(body);
        self
    }

    pub fn bytes(&self) -> [u8; PACKET_LEN] {
        let mut data = [0xffu8; PACKET_LEN];
        data[0] = 0x47;
        data[1] = (self.pid >> 8) as u8 & 0x1f;
        if self.unit_start {
            data[1] |= 0x40;
        }
        data[2] = self.pid as u8;
        data[3] = 0x10 | (self.scrambling & 0x03) << 6 | (self.counter & 0x0f);
        if let Some(body) = &self.adaptation {
            data[3] |= 0x20;
            data[4] = body.len() as u8;
            data[5..5 + body.len()].copy_from_slice(body);
        }
        data
    }
}

pub fn stream(packets: &[Packet]) -> Vec<u8> {
    packets.iter().flat_map(|packet| packet.bytes()).collect()
}

pub fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
