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

//! Windowed register file. The 32 architecturally visible registers are a
//! view over the globals and the window ring selected by the current
//! window pointer; the in registers of a window are the out registers of
//! its successor, so calls communicate through the shared in/out banks.

use crate::target::NWINDOWS;

pub struct RegisterFile {
    globals: [u32; 8],
    locals: [[u32; 8]; NWINDOWS],
    inout: [[u32; 8]; NWINDOWS],
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        RegisterFile {
            globals: [0; 8],
            locals: [[0; 8]; NWINDOWS],
            inout: [[0; 8]; NWINDOWS],
        }
    }

    pub fn reset(&mut self) {
        *self = RegisterFile::new();
    }

    /// Reads architectural register `reg` in the window selected by `cwp`.
    /// Register 0 always reads as zero.
    pub fn read(&self, cwp: usize, reg: u8) -> u32 {
        match reg {
            0..=7 => self.globals[reg as usize],
            8..=15 => self.inout[cwp][reg as usize - 8],
            16..=23 => self.locals[cwp][reg as usize - 16],
            24..=31 => self.inout[(cwp + 1) % NWINDOWS][reg as usize - 24],
            _ => unreachable!("register numbers are five bits"),
        }
    }

    /// Writes architectural register `reg`; writes to register 0 are
    /// discarded.
    pub fn write(&mut self, cwp: usize, reg: u8, value: u32) {
        match reg {
            0 => {}
            1..=7 => self.globals[reg as usize] = value,
            8..=15 => self.inout[cwp][reg as usize - 8] = value,
            16..=23 => self.locals[cwp][reg as usize - 16] = value,
            24..=31 => self.inout[(cwp + 1) % NWINDOWS][reg as usize - 24] = value,
            _ => unreachable!("register numbers are five bits"),
        }
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_register_is_pinned() {
        let mut regs = RegisterFile::new();
        regs.write(0, 0, 0xdead_beef);
        assert_eq!(regs.read(0, 0), 0);
    }

    #[test]
    fn test_globals_are_shared_between_windows() {
        let mut regs = RegisterFile::new();
        regs.write(3, 1, 42);
        assert_eq!(regs.read(9, 1), 42);
    }

    #[test]
    fn test_outs_become_ins_of_the_previous_window() {
        let mut regs = RegisterFile::new();
        // out register %o2 of window 5 aliases in register %i2 of window 4
        regs.write(5, 10, 7);
        assert_eq!(regs.read(4, 26), 7);
        // locals are private per window
        regs.write(5, 16, 9);
        assert_eq!(regs.read(4, 16), 0);
    }

    #[test]
    fn test_window_ring_wraps() {
        let mut regs = RegisterFile::new();
        regs.write(NWINDOWS - 1, 24, 11);
        assert_eq!(regs.read(0, 8), 11);
    }
}
