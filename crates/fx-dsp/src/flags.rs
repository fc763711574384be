//! Enabled-effect bit set

/// Bit set over {Equalizer, BassBoost, Virtualizer}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EffectFlags(u8);

impl EffectFlags {
    pub const NONE: Self = Self(0);
    pub const EQUALIZER: Self = Self(1);
    pub const BASS_BOOST: Self = Self(2);
    pub const VIRTUALIZER: Self = Self(4);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Equalizer or bass boost: the filter bank has work to do
    #[inline]
    pub const fn uses_filter_bank(self) -> bool {
        self.intersects(Self(Self::EQUALIZER.0 | Self::BASS_BOOST.0))
    }

    /// Return a copy with `flag` set or cleared
    #[inline]
    pub const fn with(self, flag: Self, enabled: bool) -> Self {
        if enabled {
            Self(self.0 | flag.0)
        } else {
            Self(self.0 & !flag.0)
        }
    }
}

impl std::ops::BitOr for EffectFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
