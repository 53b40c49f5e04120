//! Layout policy bitsets: [`LayoutFlags`] governs a whole struct, [`FieldFlags`]
//! a single field.

use bitflags::bitflags;

bitflags! {
    /// Controls alignment, reordering, and override policy during compilation.
    ///
    /// `Align*`/`NoAlignment`/`AlignAuto` are mutually exclusive alignment
    /// modes; [`crate::compiler::StructBuilder::build`] rejects more than one
    /// being set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LayoutFlags: u32 {
        const ALIGN_1      = 1 << 0;
        const ALIGN_2      = 1 << 1;
        const ALIGN_4      = 1 << 2;
        const ALIGN_8      = 1 << 3;
        const ALIGN_AUTO   = 1 << 4;
        const NO_ALIGNMENT = 1 << 5;
        const REORDER_FIELDS      = 1 << 6;
        const ALLOW_OVERRIDE      = 1 << 7;
        const TYPE_SAFE_OVERRIDE  = 1 << 8;
        const FIXED_SIZE   = 1 << 9;
        const PROTECTED    = 1 << 10;
        const FINAL        = 1 << 11;

        const ALIGNMENT_MASK = Self::ALIGN_1.bits()
            | Self::ALIGN_2.bits()
            | Self::ALIGN_4.bits()
            | Self::ALIGN_8.bits()
            | Self::ALIGN_AUTO.bits()
            | Self::NO_ALIGNMENT.bits();
    }
}

impl Default for LayoutFlags {
    fn default() -> Self {
        LayoutFlags::ALLOW_OVERRIDE | LayoutFlags::ALIGN_AUTO
    }
}

impl LayoutFlags {
    /// The explicit byte alignment requested by `Align1`/`Align2`/`Align4`/`Align8`,
    /// or `None` if the struct uses `AlignAuto`/`NoAlignment`/no alignment flag.
    pub fn explicit_alignment(self) -> Option<usize> {
        if self.contains(LayoutFlags::ALIGN_1) {
            Some(1)
        } else if self.contains(LayoutFlags::ALIGN_2) {
            Some(2)
        } else if self.contains(LayoutFlags::ALIGN_4) {
            Some(4)
        } else if self.contains(LayoutFlags::ALIGN_8) {
            Some(8)
        } else {
            None
        }
    }

    pub fn no_alignment(self) -> bool {
        self.contains(LayoutFlags::NO_ALIGNMENT)
    }

    /// How many of `Align1`/`Align2`/`Align4`/`Align8`/`AlignAuto`/`NoAlignment`
    /// are set. [`crate::compiler::StructBuilder::build`] rejects anything
    /// above 1 as a conflicting-alignment-mode error.
    pub fn how_many_alignment_modes_set(self) -> u32 {
        (self & LayoutFlags::ALIGNMENT_MASK).bits().count_ones()
    }
}

bitflags! {
    /// Per-field policy, independent of the owning struct's [`LayoutFlags`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// A protected field cannot be overridden by a derived struct even
        /// when the struct allows overrides.
        const PROTECTED = 1 << 0;
    }
}
