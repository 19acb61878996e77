//! Stage flags for the transformer.

/// Which transform stages are switched on.
///
/// A flag says a stage is *enabled*; the stage is only *active* when a
/// capability is bound as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformFlags(u8);

impl TransformFlags {
    /// No stage enabled.
    pub const NONE: Self = Self(0);
    /// Encryption stage enabled.
    pub const ENCRYPTION: Self = Self(0x01);
    /// Compression stage enabled.
    pub const COMPRESSION: Self = Self(0x02);

    /// Returns the raw bits.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Checks whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns these flags with `other` set.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns these flags with `other` cleared.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_independent() {
        let flags = TransformFlags::NONE.with(TransformFlags::COMPRESSION);
        assert!(flags.contains(TransformFlags::COMPRESSION));
        assert!(!flags.contains(TransformFlags::ENCRYPTION));

        let both = flags.with(TransformFlags::ENCRYPTION);
        assert_eq!(both.as_byte(), 0x03);

        let encrypt_only = both.without(TransformFlags::COMPRESSION);
        assert_eq!(encrypt_only, TransformFlags::ENCRYPTION);
    }

    #[test]
    fn clearing_an_unset_bit_is_a_noop() {
        let flags = TransformFlags::ENCRYPTION.without(TransformFlags::COMPRESSION);
        assert_eq!(flags, TransformFlags::ENCRYPTION);
    }
}
