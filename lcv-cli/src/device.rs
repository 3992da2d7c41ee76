//! Serial device discovery
//!
//! The ventilator enumerates as a USB CDC port whose description carries the
//! firmware framework name ("ASF"). The first matching port wins.

use anyhow::{bail, Result};
use serialport::{available_ports, SerialPortInfo, SerialPortType};

/// Human readable description of a port, used for matching and listing
pub fn describe(port: &SerialPortInfo) -> String {
    match &port.port_type {
        SerialPortType::UsbPort(info) => {
            let mut parts = vec![format!("vid={:04x} pid={:04x}", info.vid, info.pid)];
            if let Some(manufacturer) = &info.manufacturer {
                parts.push(manufacturer.clone());
            }
            if let Some(product) = &info.product {
                parts.push(product.clone());
            }
            parts.join(" ")
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        _ => String::new(),
    }
}

/// Pick the first port whose description contains `needle`
pub fn select_port<'a>(ports: &'a [SerialPortInfo], needle: &str) -> Option<&'a SerialPortInfo> {
    ports.iter().find(|p| describe(p).contains(needle))
}

/// Enumerate ports and find the ventilator
pub fn find_ventilator_port(needle: &str) -> Result<String> {
    let ports = available_ports()?;
    log::debug!("Found {} serial ports", ports.len());

    match select_port(&ports, needle) {
        Some(port) => {
            log::info!("Using {} ({})", port.port_name, describe(port));
            Ok(port.port_name.clone())
        }
        None => bail!("no serial port description contains {:?}", needle),
    }
}

/// Print all serial ports with their descriptions
pub fn list_ports() -> Result<()> {
    let ports = available_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
        return Ok(());
    }

    for port in &ports {
        println!("  {}  {}", port.port_name, describe(port));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    fn usb_port(name: &str, product: &str) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_string(),
            port_type: SerialPortType::UsbPort(UsbPortInfo {
                vid: 0x03EB,
                pid: 0x2404,
                serial_number: None,
                manufacturer: Some("ATMEL ASF".to_string()),
                product: Some(product.to_string()),
            }),
        }
    }

    #[test]
    fn test_select_matching_port() {
        let ports = vec![
            SerialPortInfo {
                port_name: "/dev/ttyS0".to_string(),
                port_type: SerialPortType::Unknown,
            },
            usb_port("/dev/ttyACM0", "Communication Device Class ASF example"),
        ];

        let selected = select_port(&ports, "ASF").unwrap();
        assert_eq!(selected.port_name, "/dev/ttyACM0");
    }

    #[test]
    fn test_no_matching_port() {
        let ports = vec![SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::PciPort,
        }];

        assert!(select_port(&ports, "ASF").is_none());
    }
}
