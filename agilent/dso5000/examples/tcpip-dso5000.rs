//! This example captures one waveform from a DSO5000 series oscilloscope that is reachable over
//! the network, e.g., through an ethernet-to-serial bridge in front of the scope's RS-232 module.

use agilent_dso5000::{AcquisitionRequest, Dso5000};
use scopers::TcpIpInterface;

fn main() {
    env_logger::init();

    // Define the interface using TcpIpInterface.
    let interface = TcpIpInterface::try_new("192.168.127.42:4001").unwrap();
    let mut scope = Dso5000::new(interface);

    // Capture 500 points from channel 2.
    let request = AcquisitionRequest::try_from_raw(2, "500").unwrap();
    let capture = scope.acquire(request).unwrap();

    println!("Oscilloscope mode: {}", capture.mode);
    println!("Data points: {}", capture.points.len());
    for point in capture.points.iter().take(5) {
        println!("t = {:.9} s, U = {}", point.time, point.voltage);
    }
    println!("Min: {}, Max: {}", capture.min_voltage, capture.max_voltage);
}
