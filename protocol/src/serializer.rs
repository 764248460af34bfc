//! DHCP message serialization module.

use std::io;

use bytes::BufMut;

use super::{
    constants::*,
    options::{OptionTag, RawOption},
    Message,
};

/// The BOOTP minimum, shorter messages are padded with zeros (RFC 1542 §2.1).
const SIZE_MESSAGE_BOOTP: usize = 300;

/// Checks if there is enough space in buffer to put a value.
macro_rules! check_remaining(
    ($cursor:expr, $distance:expr) => (
        if $cursor.remaining_mut() < $distance {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Buffer is too small"));
        }
    )
);

impl Message {
    /// DHCP message serialization.
    ///
    /// Options are written in the given order and always terminated by `End`.
    ///
    /// # Errors
    /// `io::Error` if the buffer is too small or a field does not fit its wire size.
    pub fn to_bytes(&self, dst: &mut [u8]) -> io::Result<usize> {
        if self.server_name.len() > SIZE_SERVER_NAME
            || self.boot_filename.len() > SIZE_BOOT_FILENAME
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Server name or boot filename is too long",
            ));
        }

        let capacity = dst.len();
        let mut cursor = &mut dst[..];
        check_remaining!(cursor, OFFSET_OPTIONS);
        cursor.put_u8(self.operation_code.into());
        cursor.put_u8(self.hardware_type.into());
        cursor.put_u8(self.hardware_address_length);
        cursor.put_u8(self.hardware_options);
        cursor.put_u32(self.transaction_id);
        cursor.put_u16(self.seconds);
        cursor.put_u16(if self.is_broadcast { FLAG_BROADCAST } else { 0x0000 });
        cursor.put_u32(u32::from(self.client_ip_address));
        cursor.put_u32(u32::from(self.your_ip_address));
        cursor.put_u32(u32::from(self.server_ip_address));
        cursor.put_u32(u32::from(self.gateway_ip_address));
        let hardware_address = self.client_hardware_address.as_bytes();
        cursor.put_slice(hardware_address); // 6 byte MAC-48
        cursor.put_bytes(0, SIZE_HARDWARE_ADDRESS - hardware_address.len()); // 10 byte padding
        cursor.put_slice(&self.server_name);
        cursor.put_bytes(0, SIZE_SERVER_NAME - self.server_name.len());
        cursor.put_slice(&self.boot_filename);
        cursor.put_bytes(0, SIZE_BOOT_FILENAME - self.boot_filename.len());
        cursor.put_u32(MAGIC_COOKIE);

        for option in self.options.iter() {
            match OptionTag::from(option.tag) {
                OptionTag::End => break,
                OptionTag::Pad => {
                    check_remaining!(cursor, 1);
                    cursor.put_u8(option.tag);
                }
                _ => Self::put_option(&mut cursor, option)?,
            }
        }
        check_remaining!(cursor, 1);
        cursor.put_u8(OptionTag::End.into());

        let mut amount = capacity - cursor.remaining_mut();
        if amount < SIZE_MESSAGE_BOOTP {
            let padding = SIZE_MESSAGE_BOOTP - amount;
            check_remaining!(cursor, padding);
            cursor.put_bytes(0, padding);
            amount += padding;
        }
        Ok(amount)
    }

    fn put_option(cursor: &mut &mut [u8], option: &RawOption) -> io::Result<()> {
        if option.data.len() > u8::max_value() as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Option data exceeds 255 bytes",
            ));
        }
        check_remaining!(cursor, SIZE_OPTION_PREFIX + option.data.len());
        cursor.put_u8(option.tag);
        cursor.put_u8(option.data.len() as u8);
        cursor.put_slice(&option.data);
        Ok(())
    }
}
