//! This example captures one waveform from a DSO5000 series oscilloscope connected via RS-232,
//! e.g., through a USB to serial adapter, and prints a summary of the capture. The channel and
//! record length are validated before the serial port is opened.

use clap::Parser;

use agilent_dso5000::{AcquisitionRequest, Dso5000, SerialInterfaceDso5000};

/// Capture a waveform from an Agilent DSO5000 series oscilloscope over RS-232.
#[derive(Parser)]
struct Args {
    /// Serial port the scope is connected to.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,
    /// Serial baud rate.
    #[arg(short, long, default_value_t = 57600)]
    baud: u32,
    /// Probe channel to capture from (1 or 2).
    #[arg(short, long, default_value_t = 1)]
    channel: u8,
    /// Number of samples (100, 250, 500, 1000, 2000, or MAXimum).
    #[arg(short = 'l', long, default_value = "1000")]
    length: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    // Validate the request before touching the port.
    let request = match AcquisitionRequest::try_from_raw(args.channel, &args.length) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let interface = SerialInterfaceDso5000::with_baud(&args.port, args.baud)
        .expect("Failed to open serial port");
    let mut scope = Dso5000::new(interface);

    let capture = scope.acquire(request).expect("Acquisition failed");

    println!("Oscilloscope mode: {}", capture.mode);
    println!("Data points: {}", capture.points.len());
    println!("Min (V): {}", capture.min_voltage.as_volts());
    println!("Max (V): {}", capture.max_voltage.as_volts());
}
