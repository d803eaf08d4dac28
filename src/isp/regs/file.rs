use bitmaps::{Bitmap, Bits, BitsImpl};

use crate::isp::regs::{InterruptFile, Reg, RegisterBlock, map::ISP_WORDS};

/// In-memory register block with per-word write tracking.
///
/// Every write through [`RegisterBlock::write`] marks its word; [`RegisterFile::load_defaults`]
/// does not. Tests use the tracking to prove that rejected configurations never reached the
/// hardware.
pub struct RegisterFile<const WORDS: usize>
where
    BitsImpl<WORDS>: Bits,
{
    words: [u32; WORDS],
    written: Bitmap<WORDS>,
}

/// Register file sized for the full ISP block.
pub type IspRegisterFile = RegisterFile<ISP_WORDS>;

impl<const WORDS: usize> core::fmt::Debug for RegisterFile<WORDS>
where
    BitsImpl<WORDS>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterFile")
            .field("words", &WORDS)
            .field("written", &self.written.len())
            .finish_non_exhaustive()
    }
}

impl<const WORDS: usize> Default for RegisterFile<WORDS>
where
    BitsImpl<WORDS>: Bits,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const WORDS: usize> RegisterFile<WORDS>
where
    BitsImpl<WORDS>: Bits,
{
    /// All-zero register file with nothing marked written.
    pub fn new() -> Self {
        Self {
            words: [0; WORDS],
            written: Bitmap::new(),
        }
    }

    /// Loads reset values without marking them written.
    pub fn load_defaults(&mut self, values: &[(Reg, u32)]) {
        for &(reg, value) in values {
            if let Some(word) = self.words.get_mut(reg.index()) {
                *word = value;
            }
        }
    }

    /// Returns true if `reg` was written since the last [`Self::clear_written`].
    pub fn is_written(&self, reg: Reg) -> bool {
        reg.index() < WORDS && self.written.get(reg.index())
    }

    /// Returns true if any register was written since the last clear.
    pub fn any_written(&self) -> bool {
        !self.written.is_empty()
    }

    /// Number of distinct registers written since the last clear.
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Forgets all write marks; register contents are kept.
    pub fn clear_written(&mut self) {
        self.written = Bitmap::new();
    }

    /// Visits each written register in address order.
    pub fn iter_written<F>(&self, mut f: F)
    where
        F: FnMut(Reg, u32),
    {
        let mut idx = self.written.first_index();
        while let Some(i) = idx {
            f(Reg((i * 4) as u16), self.words[i]);
            idx = self.written.next_index(i);
        }
    }
}

impl<const WORDS: usize> RegisterBlock for RegisterFile<WORDS>
where
    BitsImpl<WORDS>: Bits,
{
    type Interrupts = InterruptFile;

    fn read(&self, reg: Reg) -> u32 {
        debug_assert!(reg.index() < WORDS, "register outside the file");
        self.words.get(reg.index()).copied().unwrap_or(0)
    }

    fn write(&mut self, reg: Reg, value: u32) {
        debug_assert!(reg.index() < WORDS, "register outside the file");
        if let Some(word) = self.words.get_mut(reg.index()) {
            *word = value;
            self.written.set(reg.index(), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isp::regs::{Field, map};

    #[test]
    fn new_file_has_nothing_written() {
        let file = IspRegisterFile::new();
        assert!(!file.any_written());
        assert_eq!(file.read(map::CNTL), 0);
    }

    #[test]
    fn write_tracking_scenarios() {
        // Single word
        {
            let mut file = IspRegisterFile::new();
            file.write(map::INT_ENA, 0x10);
            assert!(file.is_written(map::INT_ENA));
            assert!(!file.is_written(map::INT_CLR));
            assert_eq!(file.written_count(), 1);
        }

        // Field writes mark the containing word only
        {
            let mut file = IspRegisterFile::new();
            file.write_field(map::AF_THRESHOLD_FIELD, 300);
            assert!(file.is_written(map::AF_THRESHOLD));
            assert_eq!(file.written_count(), 1);
            assert_eq!(file.read_field(map::AF_THRESHOLD_FIELD), 300);
        }

        // Rewriting the same word counts once
        {
            let mut file = IspRegisterFile::new();
            file.write(map::CNTL, 1);
            file.write(map::CNTL, 2);
            assert_eq!(file.written_count(), 1);
            assert_eq!(file.read(map::CNTL), 2);
        }
    }

    #[test]
    fn load_defaults_does_not_mark_written() {
        let mut file = IspRegisterFile::new();
        file.load_defaults(map::RESET_VALUES);

        assert!(!file.any_written());
        assert_eq!(file.read_field(map::CNTL_OUT_TYPE), 2);
        assert_eq!(file.read_field(map::AF_THRESHOLD_FIELD), 256);
    }

    #[test]
    fn clear_written_keeps_contents() {
        let mut file = IspRegisterFile::new();
        file.write(map::AF_CTRL1, 0x1234);
        file.clear_written();

        assert!(!file.any_written());
        assert_eq!(file.read(map::AF_CTRL1), 0x1234);
    }

    #[test]
    fn iter_written_visits_in_address_order() {
        let mut file = IspRegisterFile::new();
        file.write(map::INT_ENA, 0xA);
        file.write(map::CLK_EN, 0xB);
        file.write(map::HIST_MODE, 0xC);

        let mut seen = [(0u16, 0u32); 3];
        let mut count = 0;
        file.iter_written(|reg, value| {
            seen[count] = (reg.offset(), value);
            count += 1;
        });

        assert_eq!(count, 3);
        assert_eq!(
            seen,
            [
                (map::CLK_EN.offset(), 0xB),
                (map::INT_ENA.offset(), 0xA),
                (map::HIST_MODE.offset(), 0xC)
            ]
        );
    }

    #[test]
    fn small_file_tracks_fields() {
        const REG: Reg = Reg::at(0x4);
        const BIT: Field = Field::new("bit", REG, 3, 1);

        let mut file: RegisterFile<4> = RegisterFile::new();
        file.write_field(BIT, 1);
        assert_eq!(file.read(REG), 0b1000);
        assert!(file.is_written(REG));
    }
}
