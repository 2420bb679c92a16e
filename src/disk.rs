use std::io;

use byteorder::ByteOrder;

use crate::constants;
use crate::error::Fault;
use crate::Endian;

/// Backing tape of a mounted disk.
///
/// It is not guaranteed that every address within `[0, length]` is
/// accessible; use [`check_range`] to test whether a range is addressable.
///
/// [`check_range`]: #tymethod.check_range
pub trait Storage {
    /// Total length of the tape in bytes.
    fn length(&self) -> u32;

    /// Whether `[address, address+length)` is addressable.
    fn check_range(&self, address: u32, length: u32) -> bool;

    /// Immutably borrows the byte range at `address`.
    ///
    /// # Errors
    /// Errors when the range is not addressable.
    fn borrow_slice(&self, address: u32, length: u32) -> Result<&[u8], ()>;

    /// Mutably borrows the byte range at `address`.
    ///
    /// # Errors
    /// Errors when the range is not addressable.
    fn borrow_slice_mut(&mut self, address: u32, length: u32) -> Result<&mut [u8], ()>;
}

/// Contiguous in-memory tape; the stock `Storage` implementation.
///
/// # Examples
/// ```
/// use svm::{Memory, Storage};
///
/// let memory = Memory::new(16);
/// assert_eq!(memory.length(), 16);
/// assert_eq!(memory.check_range(4, 12), true);
/// assert_eq!(memory.check_range(10, 20), false);
/// ```
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    pub fn new(length: u32) -> Memory {
        Memory {
            data: vec![0; length as usize],
        }
    }

    /// The whole tape as a slice.
    ///
    /// # Examples
    /// ```
    /// use svm::Memory;
    ///
    /// let memory = Memory::from(&[3, 10, 4, 2][..]);
    /// assert_eq!(memory.data(), &[3, 10, 4, 2][..]);
    /// ```
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }
}

impl Storage for Memory {
    fn length(&self) -> u32 {
        self.data.len() as u32
    }

    fn check_range(&self, address: u32, length: u32) -> bool {
        let len = self.data.len() as u32;
        address <= len && length <= len - address
    }

    fn borrow_slice(&self, address: u32, length: u32) -> Result<&[u8], ()> {
        if self.check_range(address, length) {
            Ok(&self.data[address as usize..(address + length) as usize])
        } else {
            Err(())
        }
    }

    fn borrow_slice_mut(&mut self, address: u32, length: u32) -> Result<&mut [u8], ()> {
        if self.check_range(address, length) {
            Ok(&mut self.data[address as usize..(address + length) as usize])
        } else {
            Err(())
        }
    }
}

impl<'a> From<&'a [u8]> for Memory {
    fn from(s: &'a [u8]) -> Memory {
        Memory { data: Vec::from(s) }
    }
}

/// Opens backing tapes for MOUNT.
///
/// The stock provider hands out zeroed in-memory tapes; embedders may map
/// disk names onto fixed-length files instead.
pub trait DiskProvider {
    fn open(&mut self, name: &str, length: u32) -> io::Result<Box<dyn Storage>>;
}

/// Provider used when no external backing is configured.
#[derive(Default)]
pub struct MemoryDisks;

impl DiskProvider for MemoryDisks {
    fn open(&mut self, _name: &str, length: u32) -> io::Result<Box<dyn Storage>> {
        Ok(Box::new(Memory::new(length)))
    }
}

/// A mounted disk: fixed geometry, a cursor, and typed big-endian access.
///
/// Every read and write starts at the cursor and advances it by exactly
/// the width it encoded. An access whose last byte would fall outside the
/// tape is a fault and leaves the cursor alone.
pub struct Disk {
    name: String,
    sector_size: i32,
    sector_count: i32,
    cursor: u32,
    tape: Box<dyn Storage>,
}

impl Disk {
    pub fn new(name: &str, sector_size: i32, sector_count: i32, tape: Box<dyn Storage>) -> Disk {
        Disk {
            name: name.to_owned(),
            sector_size,
            sector_count,
            cursor: 0,
            tape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sector_size(&self) -> i32 {
        self.sector_size
    }

    pub fn sector_count(&self) -> i32 {
        self.sector_count
    }

    pub fn size(&self) -> u32 {
        self.tape.length()
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Moves the cursor; the target must lie strictly inside the tape.
    pub fn seek(&mut self, position: i32) -> Result<(), Fault> {
        if position < 0 || position as u32 >= self.size() {
            return Err(Fault::DiskBounds {
                position: i64::from(position),
                length: 0,
                size: self.size(),
            });
        }
        self.cursor = position as u32;
        Ok(())
    }

    fn read_bytes(&mut self, width: u32) -> Result<Vec<u8>, Fault> {
        let position = i64::from(self.cursor);
        let size = self.size();
        let bytes = self
            .tape
            .borrow_slice(self.cursor, width)
            .map_err(|_| Fault::DiskBounds {
                position,
                length: width,
                size,
            })?
            .to_vec();
        self.cursor += width;
        Ok(bytes)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Fault> {
        let width = bytes.len() as u32;
        let position = i64::from(self.cursor);
        let size = self.size();
        let slice = self
            .tape
            .borrow_slice_mut(self.cursor, width)
            .map_err(|_| Fault::DiskBounds {
                position,
                length: width,
                size,
            })?;
        slice.copy_from_slice(bytes);
        self.cursor += width;
        Ok(())
    }

    pub fn read_bool(&mut self) -> Result<bool, Fault> {
        Ok(self.read_bytes(constants::BOOL_BYTES)?[0] != 0)
    }

    pub fn read_char(&mut self) -> Result<char, Fault> {
        let byte = self.read_bytes(constants::CHAR_BYTES)?[0];
        if byte.is_ascii() {
            Ok(byte as char)
        } else {
            Err(Fault::BadCharCode(i32::from(byte)))
        }
    }

    pub fn read_int(&mut self) -> Result<i32, Fault> {
        Ok(Endian::read_i32(&self.read_bytes(constants::INT_BYTES)?))
    }

    pub fn read_float(&mut self) -> Result<f64, Fault> {
        Ok(Endian::read_f64(&self.read_bytes(constants::FLOAT_BYTES)?))
    }

    /// Reads a 4-byte length header followed by that many ASCII bytes, as
    /// one access: the length is peeked first and the cursor only moves
    /// once header and body both fit on the tape.
    pub fn read_str(&mut self) -> Result<String, Fault> {
        let position = i64::from(self.cursor);
        let size = self.size();
        let header = self
            .tape
            .borrow_slice(self.cursor, constants::STR_HEADER_BYTES)
            .map_err(|_| Fault::DiskBounds {
                position,
                length: constants::STR_HEADER_BYTES,
                size,
            })?;
        let length = Endian::read_i32(header);
        if length < 0 {
            return Err(Fault::BadRange(length));
        }
        let total = constants::STR_HEADER_BYTES + length as u32;
        let bytes = self
            .tape
            .borrow_slice(self.cursor, total)
            .map_err(|_| Fault::DiskBounds {
                position,
                length: total,
                size,
            })?;
        let body = &bytes[constants::STR_HEADER_BYTES as usize..];
        if let Some(&byte) = body.iter().find(|byte| !byte.is_ascii()) {
            return Err(Fault::BadCharCode(i32::from(byte)));
        }
        let text = body.iter().copied().map(char::from).collect();
        self.cursor += total;
        Ok(text)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), Fault> {
        self.write_bytes(&[value as u8])
    }

    pub fn write_char(&mut self, value: char) -> Result<(), Fault> {
        self.write_bytes(&[value as u8])
    }

    pub fn write_int(&mut self, value: i32) -> Result<(), Fault> {
        let mut buffer = [0u8; constants::INT_BYTES as usize];
        Endian::write_i32(&mut buffer, value);
        self.write_bytes(&buffer)
    }

    pub fn write_float(&mut self, value: f64) -> Result<(), Fault> {
        let mut buffer = [0u8; constants::FLOAT_BYTES as usize];
        Endian::write_f64(&mut buffer, value);
        self.write_bytes(&buffer)
    }

    /// Writes a 4-byte length header followed by the bytes, as one access:
    /// a range that does not fit entirely leaves the tape untouched.
    pub fn write_str(&mut self, text: &str) -> Result<(), Fault> {
        let mut buffer = vec![0u8; constants::STR_HEADER_BYTES as usize + text.len()];
        Endian::write_i32(&mut buffer[..4], text.len() as i32);
        buffer[4..].copy_from_slice(text.as_bytes());
        self.write_bytes(&buffer)
    }
}
