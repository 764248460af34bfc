//! The main DHCP message module.

use std::{fmt, net::Ipv4Addr};

use eui48::MacAddress;

use crate::{
    hardware_type::HardwareType,
    operation_code::OperationCode,
    options::{OptionTable, OptionTag, RawOption},
};

/// DHCP message.
#[derive(Debug, Clone)]
pub struct Message {
    pub operation_code: OperationCode,
    pub hardware_type: HardwareType,
    pub hardware_address_length: u8,
    pub hardware_options: u8,
    pub transaction_id: u32,
    pub seconds: u16,
    pub is_broadcast: bool,
    pub client_ip_address: Ipv4Addr,
    pub your_ip_address: Ipv4Addr,
    pub server_ip_address: Ipv4Addr,
    pub gateway_ip_address: Ipv4Addr,
    pub client_hardware_address: MacAddress,
    pub server_name: Vec<u8>,
    pub boot_filename: Vec<u8>,
    /// In wire order, duplicates included.
    pub options: Vec<RawOption>,
}

impl Message {
    /// Builds a fresh lookup table over the message options.
    pub fn option_table(&self) -> OptionTable {
        OptionTable::new(&self.options)
    }
}

/// Trims the trailing zero padding of a fixed-size header field.
fn trimmed(field: &[u8]) -> &[u8] {
    let end = field.iter().rposition(|byte| *byte != 0).map_or(0, |i| i + 1);
    &field[..end]
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}HEADER{}", "_".repeat(30), "_".repeat(39))?;
        writeln!(f, "{:32} | {}", "Operation code", self.operation_code)?;
        writeln!(f, "{:32} | {}", "Hardware type", self.hardware_type)?;
        writeln!(
            f,
            "{:32} | {}",
            "Hardware address length", self.hardware_address_length
        )?;
        writeln!(f, "{:32} | {}", "Hardware options", self.hardware_options)?;
        writeln!(f, "{:32} | {:#010x}", "Transaction ID", self.transaction_id)?;
        writeln!(f, "{:32} | {}", "Seconds", self.seconds)?;
        writeln!(f, "{:32} | {}", "Broadcast flag", self.is_broadcast)?;
        writeln!(f, "{:32} | {}", "Client IP address", self.client_ip_address)?;
        writeln!(f, "{:32} | {}", "Your IP address", self.your_ip_address)?;
        writeln!(f, "{:32} | {}", "Server IP address", self.server_ip_address)?;
        writeln!(
            f,
            "{:32} | {}",
            "Gateway IP address", self.gateway_ip_address
        )?;
        writeln!(
            f,
            "{:32} | {}",
            "Client hardware address",
            self.client_hardware_address.to_hex_string()
        )?;
        writeln!(f, "{:32} | {:?}", "Server name", trimmed(&self.server_name))?;
        writeln!(
            f,
            "{:32} | {:?}",
            "Boot filename",
            trimmed(&self.boot_filename)
        )?;

        writeln!(f, "{}OPTIONS{}", "_".repeat(30), "_".repeat(38))?;
        for option in self.options.iter() {
            writeln!(f, "{:32} | {:?}", OptionTag::from(option.tag), option.data)?;
        }
        writeln!(f, "{}", "_".repeat(75))?;
        Ok(())
    }
}
