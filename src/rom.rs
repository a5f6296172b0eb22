use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::game_config::BinSection;

const HEADER_GAME_CODE_OFFSET: usize = 0x0C;
const HEADER_ARM9_OFFSET: usize = 0x20;
const HEADER_ARM9_SIZE: usize = 0x2C;
const HEADER_FAT_OFFSET: usize = 0x48;
const HEADER_FAT_SIZE: usize = 0x4C;
const HEADER_OVERLAY_TABLE_OFFSET: usize = 0x50;
const HEADER_OVERLAY_TABLE_SIZE: usize = 0x54;

const OVERLAY_ENTRY_SIZE: usize = 32;
const FAT_ENTRY_SIZE: usize = 8;

#[derive(Debug)]
pub enum RomError {
    OutOfBounds { offset: usize, len: usize },
    UnknownOverlay(u16),
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RomError::OutOfBounds { offset, len } => {
                write!(f, "out-of-bounds read of {} bytes at 0x{:X}", len, offset)
            }
            RomError::UnknownOverlay(id) => {
                write!(f, "overlay {} is not in the overlay table", id)
            }
        }
    }
}

impl Error for RomError {}

pub fn read_u32(data: &[u8], offset: usize) -> Result<u32, RomError> {
    if data.len() < offset + 4 {
        return Err(RomError::OutOfBounds { offset, len: 4 });
    }
    Ok(LittleEndian::read_u32(&data[offset..offset + 4]))
}

#[derive(Debug)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Rom {
        Rom { data }
    }

    pub fn from_file(path: &Path) -> io::Result<Rom> {
        Ok(Rom::new(fs::read(path)?))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn game_code(&self) -> Result<[u8; 4], RomError> {
        let bytes = self.slice(HEADER_GAME_CODE_OFFSET, 4)?;
        let mut code = [0; 4];
        code.copy_from_slice(bytes);
        Ok(code)
    }

    pub fn get_binary(&self, section: &BinSection) -> Result<&[u8], RomError> {
        match section.overlay_id {
            Some(id) => self.overlay(id),
            None => self.arm9(),
        }
    }

    pub fn arm9(&self) -> Result<&[u8], RomError> {
        let offset = read_u32(&self.data, HEADER_ARM9_OFFSET)? as usize;
        let size = read_u32(&self.data, HEADER_ARM9_SIZE)? as usize;
        self.slice(offset, size)
    }

    pub fn overlay(&self, id: u16) -> Result<&[u8], RomError> {
        let table_offset = read_u32(&self.data, HEADER_OVERLAY_TABLE_OFFSET)? as usize;
        let table_size = read_u32(&self.data, HEADER_OVERLAY_TABLE_SIZE)? as usize;
        let table = self.slice(table_offset, table_size)?;

        for entry in table.chunks_exact(OVERLAY_ENTRY_SIZE) {
            if LittleEndian::read_u32(&entry[0..4]) != id as u32 {
                continue;
            }

            let file_id = LittleEndian::read_u32(&entry[24..28]) as usize;

            let fat_offset = read_u32(&self.data, HEADER_FAT_OFFSET)? as usize;
            let fat_size = read_u32(&self.data, HEADER_FAT_SIZE)? as usize;
            let fat = self.slice(fat_offset, fat_size)?;

            let fat_entry = file_id * FAT_ENTRY_SIZE;
            if fat.len() < fat_entry + FAT_ENTRY_SIZE {
                return Err(RomError::OutOfBounds {
                    offset: fat_offset + fat_entry,
                    len: FAT_ENTRY_SIZE,
                });
            }

            let start = LittleEndian::read_u32(&fat[fat_entry..fat_entry + 4]) as usize;
            let end = LittleEndian::read_u32(&fat[fat_entry + 4..fat_entry + 8]) as usize;
            if end < start {
                return Err(RomError::OutOfBounds { offset: start, len: 0 });
            }

            return self.slice(start, end - start);
        }

        Err(RomError::UnknownOverlay(id))
    }

    fn slice(&self, offset: usize, len: usize) -> Result<&[u8], RomError> {
        if self.data.len() < offset + len {
            return Err(RomError::OutOfBounds { offset, len });
        }
        Ok(&self.data[offset..offset + len])
    }
}
