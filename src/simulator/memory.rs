/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Linear big-endian data memory. The loaded image is followed by a fixed
//! amount of free scratch memory; the stack grows down from the top.

use std::io::{self, Read, Write};

use crate::errors::SimulationError;
use crate::target::FREE_MEMORY_SIZE;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadAccess {
    ByteSigned,
    ByteUnsigned,
    HalfSigned,
    HalfUnsigned,
    Word,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreAccess {
    Byte,
    Half,
    Word,
}

pub struct DataMemory {
    bytes: Vec<u8>,
}

impl DataMemory {
    /// Allocates memory for an image of the given size plus the free
    /// scratch area, truncated to a multiple of 4 bytes.
    pub fn new(image_size: u32) -> DataMemory {
        let size = (image_size + FREE_MEMORY_SIZE) & 0xffff_fffc;
        DataMemory {
            bytes: vec![0; size as usize],
        }
    }

    /// Reads the memory image from the binary artifact.
    pub fn read_image(
        &mut self,
        reader: &mut dyn Read,
        image_size: u32,
    ) -> Result<(), SimulationError> {
        let image = &mut self.bytes[..image_size as usize];
        reader.read_exact(image).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                SimulationError::TruncatedBinary
            } else {
                SimulationError::Io(e)
            }
        })
    }

    pub fn len(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn check_bounds(&self, addr: u32, width: u32) -> Result<usize, SimulationError> {
        let end = addr.checked_add(width).filter(|end| *end <= self.len());
        match end {
            Some(_) => Ok(addr as usize),
            None => Err(SimulationError::AddressOutOfRange { addr }),
        }
    }

    pub fn load(&self, access: LoadAccess, addr: u32) -> Result<u32, SimulationError> {
        match access {
            LoadAccess::ByteSigned => {
                let at = self.check_bounds(addr, 1)?;
                Ok(self.bytes[at] as i8 as i32 as u32)
            }
            LoadAccess::ByteUnsigned => {
                let at = self.check_bounds(addr, 1)?;
                Ok(self.bytes[at] as u32)
            }
            LoadAccess::HalfSigned | LoadAccess::HalfUnsigned => {
                if addr & 0x1 != 0 {
                    return Err(SimulationError::UnalignedAccess {
                        access: "halfword",
                        addr,
                    });
                }
                let at = self.check_bounds(addr, 2)?;
                let half = u16::from_be_bytes([self.bytes[at], self.bytes[at + 1]]);
                Ok(match access {
                    LoadAccess::HalfSigned => half as i16 as i32 as u32,
                    _ => half as u32,
                })
            }
            LoadAccess::Word => {
                if addr & 0x3 != 0 {
                    return Err(SimulationError::UnalignedAccess {
                        access: "word",
                        addr,
                    });
                }
                let at = self.check_bounds(addr, 4)?;
                Ok(u32::from_be_bytes(
                    self.bytes[at..at + 4].try_into().expect("4-byte slice"),
                ))
            }
        }
    }

    /// Stores preserve the unaffected bytes of the enclosing word.
    pub fn store(
        &mut self,
        access: StoreAccess,
        addr: u32,
        value: u32,
    ) -> Result<(), SimulationError> {
        match access {
            StoreAccess::Byte => {
                let at = self.check_bounds(addr, 1)?;
                self.bytes[at] = value as u8;
            }
            StoreAccess::Half => {
                if addr & 0x1 != 0 {
                    return Err(SimulationError::UnalignedAccess {
                        access: "halfword",
                        addr,
                    });
                }
                let at = self.check_bounds(addr, 2)?;
                self.bytes[at..at + 2].copy_from_slice(&(value as u16).to_be_bytes());
            }
            StoreAccess::Word => {
                if addr & 0x3 != 0 {
                    return Err(SimulationError::UnalignedAccess {
                        access: "word",
                        addr,
                    });
                }
                let at = self.check_bounds(addr, 4)?;
                self.bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
            }
        }
        Ok(())
    }

    /// Hex dump, 16 bytes per row in 4-byte groups.
    pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Contents of data memory ({} bytes):", self.len())?;
        for (i, byte) in self.bytes.iter().enumerate() {
            if i % 16 == 0 {
                write!(out, "{:08x}\t", i)?;
            }
            write!(out, "{:02x}", byte)?;
            if i % 4 == 3 {
                write!(out, " ")?;
            }
            if i % 16 == 15 {
                writeln!(out)?;
            }
        }
        write!(out, "\n\n")?;
        Ok(())
    }
}

// ------------- unit tests -------------
