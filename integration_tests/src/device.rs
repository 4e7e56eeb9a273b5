//! Device communication client.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use serialport::SerialPort;

use crate::protocol::{Reply, IDENTIFICATION};

/// Find serial ports that answer `?` with the switch identification.
pub fn find_switch_ports(baud_rate: u32) -> Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    let mut found = Vec::new();

    for port_info in ports {
        if let Ok(mut client) = DeviceClient::new(&port_info.port_name, baud_rate) {
            // Short timeout for probing
            client.set_timeout(Duration::from_millis(500));
            if let Ok(Reply::Text(text)) = client.send_line("?") {
                if text == IDENTIFICATION {
                    found.push(port_info.port_name.clone());
                }
            }
        }
    }

    Ok(found)
}

/// Resolve a port argument - returns the port path if not "auto", otherwise auto-detects.
pub fn resolve_port(port_arg: &str, baud_rate: u32) -> Result<String> {
    if port_arg != "auto" {
        return Ok(port_arg.to_string());
    }
    match find_switch_ports(baud_rate)?.into_iter().next() {
        Some(port) => Ok(port),
        None => anyhow::bail!("No antenna switch found - ensure device is connected"),
    }
}

/// Client for talking to the antenna switch.
pub struct DeviceClient {
    port: Box<dyn SerialPort>,
    timeout: Duration,
    pending: Vec<u8>,
}

impl DeviceClient {
    /// Create a new device client.
    pub fn new(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()?;

        Ok(Self {
            port,
            timeout: Duration::from_secs(2),
            pending: Vec::new(),
        })
    }

    /// Set the reply timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Discard anything received so far (boot messages, log lines).
    pub fn drain_buffer(&mut self) -> Result<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        self.pending.clear();

        let mut buf = [0u8; 256];
        loop {
            match self.port.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Send a command line and wait for its reply.
    pub fn send_line(&mut self, line: &str) -> Result<Reply> {
        self.write_line(line)?;
        self.read_reply()
    }

    /// Send a command line that produces no reply.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(b"\r\n")?;
        self.port.flush()?;
        Ok(())
    }

    /// `set <radio> <antenna>`
    pub fn set(&mut self, radio: u8, antenna: u8) -> Result<Reply> {
        self.send_line(&format!("set {} {}", radio, antenna))
    }

    /// `get <radio>`, as an antenna number
    pub fn get(&mut self, radio: u8) -> Result<u8> {
        let reply = self.send_line(&format!("get {}", radio))?;
        reply
            .antenna()
            .ok_or_else(|| anyhow::anyhow!("Expected antenna number, got {:?}", reply))
    }

    /// Read the next reply line, skipping firmware log output.
    pub fn read_reply(&mut self) -> Result<Reply> {
        let start = Instant::now();
        let mut buf = [0u8; 64];

        while start.elapsed() < self.timeout {
            if let Some(line) = self.take_line() {
                return Ok(Reply::parse(&line));
            }
            match self.port.read(&mut buf) {
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e.into()),
            }
        }

        anyhow::bail!(
            "Timeout waiting for reply, got {} bytes: {:?}",
            self.pending.len(),
            String::from_utf8_lossy(&self.pending)
        );
    }

    /// Remove the first non-empty line from the receive buffer.
    fn take_line(&mut self) -> Option<String> {
        loop {
            let end = self.pending.iter().position(|&b| b == b'\n')?;
            let raw: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw).trim().to_string();
            if !line.is_empty() && !is_log_line(&line) {
                return Some(line);
            }
        }
    }
}

/// Log records share UART0 with replies (`INFO - ...`).
fn is_log_line(line: &str) -> bool {
    ["TRACE - ", "DEBUG - ", "INFO - ", "WARN - ", "ERROR - "]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}
