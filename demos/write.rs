use std::io::Write;
use std::time::Duration;
use std::{thread, time};

use tinywire::buffer::Buffer;
use tinywire::codec::{self, Encode};
use tinywire::crc::Crc8;
use tinywire::frame::{frame_buffer_len, Framer};

const PORT_NAME: &'static str = "/dev/ttyUSB0";
const MAX_PAYLOAD: usize = 256;

fn main() {
    let port = serialport::new(PORT_NAME, 9_600)
        .timeout(Duration::from_millis(10))
        .open();

    match port {
        Ok(mut port) => {
            let mut framer =
                Framer::<Crc8, MAX_PAYLOAD, { frame_buffer_len(MAX_PAYLOAD, 1) }>::new();

            // pack a small status record: sequence number, uptime, node name
            let mut buf = Buffer::new(framer.write_buffer());
            1u16.encode(&mut buf).unwrap();
            3600u32.encode(&mut buf).unwrap();
            codec::write_cstr(&mut buf, b"node-1").unwrap();
            let len = buf.pos();

            let frame = framer.encode_frame(len).unwrap();
            println!("sending frame = {}", base16::encode_lower(frame));
            port.write_all(frame).unwrap();
            thread::sleep(time::Duration::from_millis(250));
        }
        Err(e) => {
            eprintln!("Failed to open \"{}\". Error: {}", PORT_NAME, e);
            ::std::process::exit(1);
        }
    }
}
