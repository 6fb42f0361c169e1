//! Initial register frame for a thread that has never run.
//!
//! The layout matches what the PendSV handler unstacks: the eight
//! callee-saved registers pushed by software, followed by the eight words
//! the hardware pops on exception return. Restoring a fresh frame therefore
//! "returns" straight into the thread's entry function.
//!
//! ```text
//!  saved sp -> R4 R5 R6 R7 R8 R9 R10 R11 | R0 R1 R2 R3 R12 LR PC xPSR <- stack top
//! ```

/// Words in an initial frame.
pub const INITIAL_FRAME_WORDS: usize = 16;

/// xPSR with only the Thumb bit set.
pub const INITIAL_XPSR: u32 = 0x0100_0000;

/// Word offsets from the saved stack pointer.
pub mod offset {
    pub const R4: usize = 0;
    pub const R11: usize = 7;
    pub const R0: usize = 8;
    pub const R12: usize = 12;
    pub const LR: usize = 13;
    pub const PC: usize = 14;
    pub const XPSR: usize = 15;
}

/// Fill pattern for general register `n`: its decimal number repeated in
/// every byte (R5 = `0x05050505`, R12 = `0x12121212`). R0 starts at zero.
pub const fn register_pattern(n: u32) -> u32 {
    let byte = (n / 10) * 16 + n % 10;
    byte * 0x0101_0101
}

/// Write an initial frame at the top of `region`.
///
/// `entry` becomes the PC and `exit` the link register, so a thread whose
/// entry function returns lands in `exit`. Returns the word index of the
/// saved stack pointer within `region`.
///
/// # Panics
///
/// Panics if `region` is shorter than [`INITIAL_FRAME_WORDS`]; callers
/// validate stack sizes first.
pub fn build_initial_frame(region: &mut [u32], entry: usize, exit: usize) -> usize {
    let sp = region.len() - INITIAL_FRAME_WORDS;
    let frame = &mut region[sp..];

    for n in 4..=11u32 {
        frame[offset::R4 + (n as usize - 4)] = register_pattern(n);
    }
    for n in 0..=3u32 {
        frame[offset::R0 + n as usize] = register_pattern(n);
    }
    frame[offset::R12] = register_pattern(12);
    frame[offset::LR] = exit as u32;
    // Exception return requires a halfword-aligned PC; the Thumb state
    // lives in xPSR instead of bit 0.
    frame[offset::PC] = (entry as u32) & !1;
    frame[offset::XPSR] = INITIAL_XPSR;

    sp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_pattern() {
        assert_eq!(register_pattern(0), 0);
        assert_eq!(register_pattern(1), 0x0101_0101);
        assert_eq!(register_pattern(7), 0x0707_0707);
        assert_eq!(register_pattern(10), 0x1010_1010);
        assert_eq!(register_pattern(12), 0x1212_1212);
    }

    #[test]
    fn test_initial_frame_layout() {
        let mut region = [0u32; 40];
        let sp = build_initial_frame(&mut region, 0x0800_1235, 0x0800_2001);

        assert_eq!(sp, 40 - INITIAL_FRAME_WORDS);
        let frame = &region[sp..];
        assert_eq!(frame[offset::R4], 0x0404_0404);
        assert_eq!(frame[offset::R11], 0x1111_1111);
        assert_eq!(frame[offset::R0], 0);
        assert_eq!(frame[offset::R0 + 3], 0x0303_0303);
        assert_eq!(frame[offset::R12], 0x1212_1212);
        assert_eq!(frame[offset::LR], 0x0800_2001);
        assert_eq!(frame[offset::PC], 0x0800_1234);
        assert_eq!(frame[offset::XPSR], INITIAL_XPSR);
        // Nothing below the frame is touched.
        assert!(region[..sp].iter().all(|&w| w == 0));
    }
}
