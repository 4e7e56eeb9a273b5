//! Hardware-in-the-loop checks for a flashed antenna switch.
//!
//! Point it at UART0 (USB serial, 115200) or UART2 (9600). Every check
//! leaves the switch with both radios disconnected.

mod device;
mod protocol;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use device::{resolve_port, DeviceClient};

#[derive(Parser)]
#[command(name = "integration-tests")]
#[command(about = "Exercise the 6x2 antenna switch line protocol on real hardware")]
struct Args {
    /// Serial port, or "auto" to search for a switch answering `?`
    #[arg(short, long, default_value = "auto")]
    port: String,

    /// Baud rate (115200 for UART0, 9600 for UART2)
    #[arg(short, long, default_value_t = 115_200)]
    baud: u32,

    /// Time to let boot output settle before the first command
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Per-reply timeout
    #[arg(long, default_value_t = 2000)]
    timeout_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let port = resolve_port(&args.port, args.baud)?;

    println!("{}", "Antenna Switch Integration Tests".bold());
    println!("{} @ {} baud\n", port, args.baud);

    let mut device = DeviceClient::new(&port, args.baud)?;
    device.set_timeout(Duration::from_millis(args.timeout_ms));

    std::thread::sleep(Duration::from_millis(args.settle_ms));
    device.drain_buffer()?;

    let results = tests::run_all_tests(&mut device);
    tests::print_results(&results);

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}
