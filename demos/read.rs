use std::io::Read;
use std::time::Duration;

use tinywire::crc::Crc8;
use tinywire::frame::{frame_buffer_len, Framer, ReadStatus};

const PORT_NAME: &'static str = "/dev/ttyUSB0";
const MAX_PAYLOAD: usize = 256;

fn main() {
    let port = serialport::new(PORT_NAME, 9_600)
        .timeout(Duration::from_millis(10))
        .open();

    let mut framer = Framer::<Crc8, MAX_PAYLOAD, { frame_buffer_len(MAX_PAYLOAD, 1) }>::new();

    match port {
        Ok(mut port) => {
            let mut serial_buf: Vec<u8> = vec![0; 1000];
            loop {
                match port.read(serial_buf.as_mut_slice()) {
                    Ok(t) => {
                        for &byte in &serial_buf[..t] {
                            match framer.read_frame_byte(byte) {
                                Ok(ReadStatus::NotReady) => (),
                                Ok(ReadStatus::Decoded(payload)) => {
                                    println!("received frame = {}", base16::encode_lower(payload));
                                }
                                Err(e) => eprintln!("frame error = {:?}", e),
                            }
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => (),
                    Err(e) => eprintln!("{:?}", e),
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
