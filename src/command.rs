//! S-Link commands and the in-flight transmission cursor.
//!
//! A command is a short sequence of byte "fields": the device id followed by
//! one to three command ids. [`Command`] is the validated value a caller hands
//! to the driver; [`PendingCommand`] is the driver's copy of it together with
//! the field and bit cursors the encoder advances while transmitting.

use heapless::Vec;

use crate::consts::{SLINK_FIRST_BIT, SLINK_MAX_FIELDS};
use crate::error::CommandError;

/// A validated command of two to four fields.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Command {
    fields: Vec<u8, SLINK_MAX_FIELDS>,
}

impl Command {
    /// Builds a command from a device id and up to three command ids.
    ///
    /// # Errors
    /// [`CommandError::MissingField`] if `command_id3` is given without `command_id2`.
    pub fn new(
        device_id: u8,
        command_id1: u8,
        command_id2: Option<u8>,
        command_id3: Option<u8>,
    ) -> Result<Self, CommandError> {
        let mut fields = Vec::new();
        let _ = fields.push(device_id);
        let _ = fields.push(command_id1);
        match (command_id2, command_id3) {
            (None, Some(_)) => return Err(CommandError::MissingField),
            (Some(second), third) => {
                let _ = fields.push(second);
                if let Some(third) = third {
                    let _ = fields.push(third);
                }
            }
            (None, None) => {}
        }
        Ok(Self { fields })
    }

    /// Builds a command where optional ids are raw integers and any negative
    /// value means "absent" (see [`SLINK_FIELD_ABSENT`](crate::consts::SLINK_FIELD_ABSENT)).
    ///
    /// # Errors
    /// - [`CommandError::FieldOutOfRange`] if a present id is larger than `0xFF`
    /// - [`CommandError::MissingField`] if only the third id is present
    pub fn from_raw(
        device_id: u8,
        command_id1: u8,
        command_id2: i16,
        command_id3: i16,
    ) -> Result<Self, CommandError> {
        Self::new(
            device_id,
            command_id1,
            raw_field(command_id2)?,
            raw_field(command_id3)?,
        )
    }

    /// The fields in transmission order.
    pub fn fields(&self) -> &[u8] {
        &self.fields
    }

    /// Number of fields, between 2 and 4.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; a command has at least two fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn raw_field(value: i16) -> Result<Option<u8>, CommandError> {
    if value < 0 {
        Ok(None)
    } else {
        u8::try_from(value)
            .map(Some)
            .map_err(|_| CommandError::FieldOutOfRange { value })
    }
}

/// The command currently being transmitted and the encoder's position in it.
///
/// Fields are sent in order, each most-significant bit first, so the bit
/// cursor counts down from 7 to 0 before the field cursor moves on.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct PendingCommand {
    fields: Vec<u8, SLINK_MAX_FIELDS>,
    field_index: u8,
    bit_index: u8,
}

impl PendingCommand {
    /// Copies `command` in and rewinds both cursors.
    pub fn load(&mut self, command: &Command) {
        self.fields.clone_from(&command.fields);
        self.field_index = 0;
        self.bit_index = SLINK_FIRST_BIT;
    }

    /// The loaded fields.
    pub fn fields(&self) -> &[u8] {
        &self.fields
    }

    /// Index of the field being transmitted.
    pub fn field_index(&self) -> u8 {
        self.field_index
    }

    /// Index of the bit being transmitted within the current field, 7 down to 0.
    pub fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// `true` once every field has been consumed.
    pub fn is_finished(&self) -> bool {
        self.field_index as usize >= self.fields.len()
    }

    /// The bit under the cursor, or `None` when finished.
    pub fn current_bit(&self) -> Option<bool> {
        let field = self.fields.get(self.field_index as usize)?;
        Some(field & (1 << self.bit_index) != 0)
    }

    /// Moves the cursor to the next bit, rolling over to the next field after bit 0.
    pub fn advance(&mut self) {
        if self.bit_index == 0 {
            self.field_index += 1;
            self.bit_index = SLINK_FIRST_BIT;
        } else {
            self.bit_index -= 1;
        }
    }

    /// Puts the bit cursor back at the start of a field.
    pub fn rewind_bit(&mut self) {
        self.bit_index = SLINK_FIRST_BIT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SLINK_FIELD_ABSENT;

    #[test]
    fn test_field_count_follows_present_ids() {
        assert_eq!(Command::new(0x90, 0x00, None, None).unwrap().len(), 2);
        assert_eq!(Command::new(0x90, 0x00, Some(0x01), None).unwrap().len(), 3);
        assert_eq!(
            Command::new(0x90, 0x00, Some(0x01), Some(0x02))
                .unwrap()
                .len(),
            4
        );
    }

    #[test]
    fn test_fields_keep_supplied_order() {
        let command = Command::new(0x90, 0x50, Some(0x01), Some(0x23)).unwrap();
        assert_eq!(command.fields(), &[0x90, 0x50, 0x01, 0x23]);
    }

    #[test]
    fn test_third_id_without_second_is_rejected() {
        assert_eq!(
            Command::new(0x90, 0x00, None, Some(0x02)),
            Err(CommandError::MissingField)
        );
    }

    #[test]
    fn test_raw_sentinels() {
        let two = Command::from_raw(0x01, 0x2E, SLINK_FIELD_ABSENT, SLINK_FIELD_ABSENT).unwrap();
        assert_eq!(two.fields(), &[0x01, 0x2E]);

        let three = Command::from_raw(0x01, 0x2E, 0x05, -7).unwrap();
        assert_eq!(three.fields(), &[0x01, 0x2E, 0x05]);

        let four = Command::from_raw(0x01, 0x2E, 0x05, 0xFF).unwrap();
        assert_eq!(four.fields(), &[0x01, 0x2E, 0x05, 0xFF]);

        assert_eq!(
            Command::from_raw(0x01, 0x2E, 0x100, SLINK_FIELD_ABSENT),
            Err(CommandError::FieldOutOfRange { value: 0x100 })
        );
    }

    #[test]
    fn test_cursor_walks_msb_first() {
        let mut pending = PendingCommand::default();
        pending.load(&Command::new(0b1010_0001, 0xFF, None, None).unwrap());

        let mut bits = std::vec::Vec::new();
        while let Some(bit) = pending.current_bit() {
            bits.push(bit);
            pending.advance();
        }

        assert_eq!(bits.len(), 16);
        assert_eq!(
            &bits[..8],
            &[true, false, true, false, false, false, false, true]
        );
        assert!(bits[8..].iter().all(|&b| b));
        assert!(pending.is_finished());
        assert_eq!(pending.field_index(), 2);
        assert_eq!(pending.bit_index(), 7);
    }

    #[test]
    fn test_load_rewinds_cursors() {
        let mut pending = PendingCommand::default();
        pending.load(&Command::new(0x01, 0x02, Some(0x03), None).unwrap());
        for _ in 0..11 {
            pending.advance();
        }
        assert_eq!((pending.field_index(), pending.bit_index()), (1, 4));

        pending.load(&Command::new(0x10, 0x20, None, None).unwrap());
        assert_eq!((pending.field_index(), pending.bit_index()), (0, 7));
        assert_eq!(pending.fields(), &[0x10, 0x20]);
    }
}
