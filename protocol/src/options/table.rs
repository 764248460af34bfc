//! The reply option table.

use std::{mem, net::Ipv4Addr};

use super::{MessageType, OptionTag, RawOption};
use crate::error::Error;

/// The number of distinct option codes.
const TABLE_SIZE: usize = 256;

/// Direct-indexed view of a message's options.
///
/// Slot `N` holds the data of the last option with code `N`, so a code
/// repeated in one reply resolves to its last occurrence. The table borrows
/// from the message and is meant to be rebuilt for every reply.
pub struct OptionTable<'a> {
    slots: [Option<&'a [u8]>; TABLE_SIZE],
}

impl<'a> OptionTable<'a> {
    /// Indexes `options` by their codes.
    pub fn new(options: &'a [RawOption]) -> Self {
        let mut slots = [None; TABLE_SIZE];
        for option in options.iter() {
            slots[option.tag as usize] = Some(option.data.as_slice());
        }
        OptionTable { slots }
    }

    /// The data of the option, if the reply contained it.
    pub fn get<T: Into<u8>>(&self, tag: T) -> Option<&'a [u8]> {
        self.slots[tag.into() as usize]
    }

    /// The data of a mandatory option at least `length` bytes long.
    ///
    /// # Errors
    /// `Error::MissingOption` if absent, `Error::ShortOption` if too short.
    pub fn require(&self, tag: OptionTag, length: usize) -> Result<&'a [u8], Error> {
        let data = self.get(tag).ok_or(Error::MissingOption(tag))?;
        if data.len() < length {
            return Err(Error::ShortOption {
                tag,
                expected: length,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// The `DHCP Message Type` option value.
    pub fn message_type(&self) -> Result<MessageType, Error> {
        let data = self.require(OptionTag::DhcpMessageType, mem::size_of::<u8>())?;
        Ok(MessageType::from(data[0]))
    }

    /// An option holding a single IPv4 address.
    pub fn ipv4(&self, tag: OptionTag) -> Result<Ipv4Addr, Error> {
        let data = self.require(tag, mem::size_of::<u32>())?;
        Ok(Ipv4Addr::new(data[0], data[1], data[2], data[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_occurrence_wins() {
        let options = vec![
            RawOption::message_type(MessageType::DhcpOffer),
            RawOption::dhcp_server_id(&[10, 0, 0, 1]),
            RawOption::message_type(MessageType::DhcpAck),
        ];
        let table = OptionTable::new(&options);

        assert_eq!(table.message_type(), Ok(MessageType::DhcpAck));
        assert_eq!(table.get(OptionTag::DhcpServerId), Some(&[10, 0, 0, 1][..]));
    }

    #[test]
    fn message_type_found_anywhere() {
        let options = vec![
            RawOption::dhcp_server_id(&[10, 0, 0, 1]),
            RawOption::new(OptionTag::Unknown(51), vec![0, 0, 14, 16]),
            RawOption::message_type(MessageType::DhcpNak),
        ];
        let table = OptionTable::new(&options);

        assert_eq!(table.message_type(), Ok(MessageType::DhcpNak));
    }

    #[test]
    fn missing_option_is_reported() {
        let options = vec![RawOption::dhcp_server_id(&[10, 0, 0, 1])];
        let table = OptionTable::new(&options);

        assert_eq!(
            table.message_type(),
            Err(Error::MissingOption(OptionTag::DhcpMessageType))
        );
    }

    #[test]
    fn short_option_is_reported() {
        let options = vec![
            RawOption::new(OptionTag::DhcpMessageType, Vec::new()),
            RawOption::dhcp_server_id(&[10, 0]),
        ];
        let table = OptionTable::new(&options);

        assert!(table.message_type().is_err());
        assert_eq!(
            table.ipv4(OptionTag::DhcpServerId),
            Err(Error::ShortOption {
                tag: OptionTag::DhcpServerId,
                expected: 4,
                actual: 2,
            })
        );
    }
}
