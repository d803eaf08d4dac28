//! Interrupt events and typed event masks.
//!
//! Bit positions match `INT_RAW`, `INT_ST`, `INT_ENA` and `INT_CLR`.

use bitmaps::Bitmap;

macro_rules! events {
    ($($(#[$meta:meta])* $name:ident = $bit:literal),* $(,)?) => {
        /// One hardware interrupt source.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Event {
            $($(#[$meta])* $name = $bit,)*
        }

        impl Event {
            /// Every event in bit order.
            pub const ALL: [Event; EVENT_COUNT] = [$(Event::$name,)*];
        }
    };
}

/// Number of interrupt sources.
pub const EVENT_COUNT: usize = 29;

events! {
    DataTypeErr = 0,
    AsyncFifoOvf = 1,
    BufFull = 2,
    HvnumSettingErr = 3,
    DataTypeSettingErr = 4,
    MipiHnumUnmatch = 5,
    DpcCheckDone = 6,
    GammaXcoordErr = 7,
    /// Luminance changed past the environment thresholds.
    AeMonitor = 8,
    /// Auto-exposure statistics ready.
    AeFrameDone = 9,
    /// Autofocus statistics ready.
    AfFdone = 10,
    /// Scene change detected by the autofocus environment detector.
    AfEnv = 11,
    /// White balance statistics ready.
    AwbFdone = 12,
    /// Histogram statistics ready.
    HistFdone = 13,
    Frame = 14,
    Blc = 15,
    Lsc = 16,
    Dpc = 17,
    Bf = 18,
    Demosaic = 19,
    Median = 20,
    Ccm = 21,
    Gamma = 22,
    Rgb2Yuv = 23,
    Sharp = 24,
    Color = 25,
    Yuv2Rgb = 26,
    TailIdi = 27,
    HeaderIdi = 28,
}

impl Event {
    /// Mask with only this event's bit set.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u8)
    }

    /// Looks up the event at a bit position.
    pub const fn from_index(index: usize) -> Option<Event> {
        if index < EVENT_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }
}

/// Set of [`Event`]s, stored as the raw register bits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventMask(u32);

impl EventMask {
    pub const EMPTY: EventMask = EventMask(0);
    pub const ALL: EventMask = EventMask((1 << EVENT_COUNT) - 1);

    /// Builds a mask from register bits, dropping undefined positions.
    #[inline]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn with(self, event: Event) -> Self {
        Self(self.0 | event.bit())
    }

    #[inline]
    pub const fn contains(self, event: Event) -> bool {
        self.0 & event.bit() != 0
    }

    #[inline]
    pub const fn intersects(self, other: EventMask) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn union(self, other: EventMask) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: EventMask) -> Self {
        Self(self.0 & other.0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the contained events in bit order.
    pub fn iter(self) -> EventIter {
        let bits = Bitmap::<32>::from_value(self.0);
        EventIter {
            bits,
            next: bits.first_index(),
        }
    }
}

impl From<Event> for EventMask {
    fn from(event: Event) -> Self {
        Self(event.bit())
    }
}

impl core::ops::BitOr for EventMask {
    type Output = EventMask;
    fn bitor(self, rhs: EventMask) -> EventMask {
        self.union(rhs)
    }
}

impl core::ops::BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: EventMask) {
        *self = self.union(rhs);
    }
}

impl core::ops::BitAnd for EventMask {
    type Output = EventMask;
    fn bitand(self, rhs: EventMask) -> EventMask {
        self.intersection(rhs)
    }
}

impl FromIterator<Event> for EventMask {
    fn from_iter<T: IntoIterator<Item = Event>>(iter: T) -> Self {
        iter.into_iter().fold(EventMask::EMPTY, EventMask::with)
    }
}

impl IntoIterator for EventMask {
    type Item = Event;
    type IntoIter = EventIter;
    fn into_iter(self) -> EventIter {
        self.iter()
    }
}

/// Iterator over the events of an [`EventMask`].
#[derive(Debug, Clone)]
pub struct EventIter {
    bits: Bitmap<32>,
    next: Option<usize>,
}

impl Iterator for EventIter {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        while let Some(i) = self.next {
            self.next = self.bits.next_index(i);
            if let Some(event) = Event::from_index(i) {
                return Some(event);
            }
        }
        None
    }
}

/// Events owned by the autofocus engine.
pub const AF_EVENTS: EventMask = EventMask::EMPTY.with(Event::AfFdone).with(Event::AfEnv);
/// Events owned by the auto-exposure engine.
pub const AE_EVENTS: EventMask = EventMask::EMPTY
    .with(Event::AeFrameDone)
    .with(Event::AeMonitor);
/// Events owned by the white balance engine.
pub const AWB_EVENTS: EventMask = EventMask::EMPTY.with(Event::AwbFdone);
/// Events owned by the histogram engine.
pub const HIST_EVENTS: EventMask = EventMask::EMPTY.with(Event::HistFdone);
