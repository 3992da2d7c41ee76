//! Decode a simulated ventilator stream
//!
//! Builds a byte stream the way the device firmware frames it, sprinkles in
//! line noise and a corrupted frame, then runs a short acquisition over it.
//!
//! Usage:
//!   cargo run --example simulate [-- <output.bin>]
//!
//! When an output path is given the raw stream is also written there so it
//! can be replayed with `lcv-cli --replay <output.bin>`.

use lcv_decoder::{
    encode_frame, Acquisition, AcquisitionConfig, MemorySource, Reading, RecordDecoder, Schema,
};
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let schema = Schema::ThreeField;
    let mut stream = Vec::new();

    // One breath: ramp up to 20 cmH2O and back down
    for i in 0..50 {
        let setpoint = if i < 25 { 20 } else { 5 };
        let pressure = if i < 25 { i * 20 / 25 } else { 20 - (i - 25) * 15 / 25 };
        let output = (setpoint - pressure) as f32 * 0.1;

        let payload = RecordDecoder::encode(&Reading::with_output(pressure, setpoint, output), schema);
        let mut frame = encode_frame(&payload);

        if i == 30 {
            // Flip a payload bit so the checksum no longer matches
            frame[2] ^= 0x40;
        }
        if i % 10 == 0 {
            stream.extend_from_slice(&[0x00, 0xFF, 0x13]);
        }
        stream.extend(frame);
    }

    if let Some(path) = env::args().nth(1) {
        match std::fs::write(&path, &stream) {
            Ok(()) => println!("Wrote {} bytes to {}", stream.len(), path),
            Err(e) => eprintln!("Failed to write {}: {}", path, e),
        }
    }

    let config = AcquisitionConfig::new()
        .with_schema(schema)
        .with_run_duration_secs(0.5);
    let acquisition = match Acquisition::new(config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let series = acquisition.run(&mut MemorySource::new(stream));

    println!("\n=== DECODED SERIES ===");
    for m in &series {
        println!(
            "  {:>8.4}s  pressure={:>3}  setpoint={:>3}  output={:>6.2}",
            m.seconds(),
            m.pressure,
            m.setpoint,
            m.output.unwrap_or_default()
        );
    }

    println!("\nMeasurements:      {}", series.len());
    println!("Checksum failures: {}", series.stats.checksum_failures);
    println!("Discarded bytes:   {}", series.stats.discarded_bytes);
}
