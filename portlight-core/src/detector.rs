//! Input bank change detection
//!
//! Each bank is one 16-pin expander sampled as a `u16`. The word is split
//! into four ports of four pins; a port is reported when any of its pins
//! differs from the previous sample.
//!
//! Expander inputs are active-low (pulled up, a closed contact reads 0).
//! The reported pin state is inverted here so everything downstream works
//! with "1 = lit".

/// Maximum number of expander banks
pub const MAX_BANKS: usize = 8;

/// Ports per bank
pub const PORTS_PER_BANK: u8 = 4;

/// A port whose pins changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortChange {
    /// Global port index (`bank * 4 + nibble`)
    pub port: u8,
    /// Active-high pin state, bit 0 top-left .. bit 3 bottom-right
    pub lit: u8,
}

/// Result of comparing one bank sample against its history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BankChanges {
    bank: u8,
    sample: u16,
    changed: u16,
}

impl BankChanges {
    /// A change set with nothing in it
    pub const fn none(bank: u8, sample: u16) -> Self {
        Self {
            bank,
            sample,
            changed: 0,
        }
    }

    /// Bits that differ from the previous sample
    pub fn mask(&self) -> u16 {
        self.changed
    }

    /// True when the sample matched history
    pub fn is_empty(&self) -> bool {
        self.changed == 0
    }

    /// Ports with at least one changed pin, in nibble order
    pub fn ports(&self) -> impl Iterator<Item = PortChange> + '_ {
        (0..PORTS_PER_BANK).filter_map(move |nibble| {
            let shift = nibble * 4;
            if (self.changed >> shift) & 0x000F == 0 {
                return None;
            }
            Some(PortChange {
                port: self.bank * PORTS_PER_BANK + nibble,
                lit: (!(self.sample >> shift) & 0x000F) as u8,
            })
        })
    }
}

/// Per-bank sample history
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    history: [u16; MAX_BANKS],
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDetector {
    /// Create a detector with all history words zeroed
    pub const fn new() -> Self {
        Self {
            history: [0; MAX_BANKS],
        }
    }

    /// Compare a sample with the bank's history and store it as the new baseline
    ///
    /// Banks outside `0..MAX_BANKS` are ignored.
    pub fn observe(&mut self, bank: usize, sample: u16) -> BankChanges {
        let Some(previous) = self.history.get_mut(bank) else {
            return BankChanges::none(0, sample);
        };

        let changed = sample ^ *previous;
        *previous = sample;

        BankChanges {
            bank: bank as u8,
            sample,
            changed,
        }
    }

    /// Last stored sample for a bank
    pub fn history(&self, bank: usize) -> Option<u16> {
        self.history.get(bank).copied()
    }
}
