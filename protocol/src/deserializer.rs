//! DHCP message deserialization module.

use std::{io, mem, net::Ipv4Addr};

use bytes::Buf;
use eui48::{MacAddress, EUI48LEN};

use super::{
    constants::*,
    options::{OptionTable, OptionTag, Overload, RawOption},
    Message,
};

/// Checks if there is enough space in buffer to get a value.
macro_rules! check_remaining(
    ($cursor:expr, $length:expr) => (
        if $cursor.remaining() < $length {
            return Err(
                io::Error::new(io::ErrorKind::UnexpectedEof,
                "Buffer is too small or packet has invalid length octets",
            ));
        }
    );
);

impl Message {
    /// DHCP message deserialization.
    ///
    /// Options overloaded into the `file` and `sname` fields are appended
    /// after the ones from the options area, `file` first.
    ///
    /// # Errors
    /// `io::Error` if the packet is abrupted, too small or contains invalid length octets.
    pub fn from_bytes(src: &[u8]) -> io::Result<Self> {
        let mut cursor = src;
        check_remaining!(cursor, OFFSET_OPTIONS);

        let mut message = Message {
            operation_code: cursor.get_u8().into(),
            hardware_type: cursor.get_u8().into(),
            hardware_address_length: cursor.get_u8(),
            hardware_options: cursor.get_u8(),
            transaction_id: cursor.get_u32(),
            seconds: cursor.get_u16(),
            // https://tools.ietf.org/html/rfc2131#section-2
            // Leftmost bit (0 bit) is most significant
            is_broadcast: cursor.get_u16() & FLAG_BROADCAST != 0,
            client_ip_address: Ipv4Addr::from(cursor.get_u32()),
            your_ip_address: Ipv4Addr::from(cursor.get_u32()),
            server_ip_address: Ipv4Addr::from(cursor.get_u32()),
            gateway_ip_address: Ipv4Addr::from(cursor.get_u32()),
            client_hardware_address: {
                let mut address = [0u8; EUI48LEN];
                cursor.copy_to_slice(&mut address);
                cursor.advance(SIZE_HARDWARE_ADDRESS - EUI48LEN);
                MacAddress::new(address)
            },
            server_name: {
                let vec = cursor[..SIZE_SERVER_NAME].to_vec();
                cursor.advance(SIZE_SERVER_NAME);
                vec
            },
            boot_filename: {
                let vec = cursor[..SIZE_BOOT_FILENAME].to_vec();
                cursor.advance(SIZE_BOOT_FILENAME);
                vec
            },
            options: Vec::new(),
        };

        if cursor.get_u32() != MAGIC_COOKIE {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "MAGIC_COOKIE"));
        }

        Self::append_options(cursor, &mut message.options)?;

        let overload = OptionTable::new(&message.options)
            .get(OptionTag::Overload)
            .and_then(|data| data.first().cloned())
            .map(Overload::from);
        if let Some(overload) = overload {
            if overload.file() {
                Self::append_options(
                    &src[OFFSET_BOOT_FILENAME..OFFSET_MAGIC_COOKIE],
                    &mut message.options,
                )?;
            }
            if overload.sname() {
                Self::append_options(
                    &src[OFFSET_SERVER_NAME..OFFSET_BOOT_FILENAME],
                    &mut message.options,
                )?;
            }
        }

        Ok(message)
    }

    /// Reads `tag, length, data` triplets until `End` or the end of the area.
    fn append_options(mut cursor: &[u8], options: &mut Vec<RawOption>) -> io::Result<()> {
        while cursor.has_remaining() {
            let tag = cursor.get_u8();
            match OptionTag::from(tag) {
                OptionTag::Pad => continue,
                OptionTag::End => break,
                _ => {}
            }
            check_remaining!(cursor, mem::size_of::<u8>());
            let len = cursor.get_u8() as usize;
            check_remaining!(cursor, len);
            options.push(RawOption {
                tag,
                data: cursor[..len].to_vec(),
            });
            cursor.advance(len);
        }
        Ok(())
    }
}
