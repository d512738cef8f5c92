use num_traits::{One, PrimInt};

/// Trait implemented by flag enums. The enum discriminant is the bit index.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// Plain bitmask container over a primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    /// Add or remove `flag` depending on `enabled`.
    pub fn set<U: FlagBitmask<Storage = T>>(&mut self, flag: U, enabled: bool) {
        if enabled {
            self.add(flag);
        } else {
            self.remove(flag);
        }
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, flags: &[U]) -> bool {
        let combined = flags.iter().fold(T::zero(), |acc, f| acc | f.mask());
        (self.bits & combined) == combined
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
#[macro_export]
macro_rules! define_bitmask_flags {
    ($(#[$meta:meta])* $name:ident, $storage:ty, { $($(#[$vmeta:meta])* $variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_bitmask_flags!(
    /// Behavior switches the controller toggles on the displacement resolver each frame.
    MoverFlag, u8, {
        /// Treat slopes steeper than the max floor angle as walls when moving up them.
        PreventMovingUpSteepSlope,
        /// Allow the resolver to climb small steps.
        CanClimbSteps,
    }
);

/// Flag set handed to a [`crate::DisplacementResolver`].
pub type MoverFlags = BitmaskFlags<u8>;

impl MoverFlags {
    /// Flags used while grounded: slope prevention and step climbing both on.
    pub fn grounded() -> Self {
        let mut flags = Self::default();
        flags.add(MoverFlag::PreventMovingUpSteepSlope);
        flags.add(MoverFlag::CanClimbSteps);
        flags
    }

    /// Flags used while airborne: everything off.
    pub fn airborne() -> Self {
        Self::default()
    }

    pub fn prevent_moving_up_steep_slope(&self) -> bool {
        self.has(MoverFlag::PreventMovingUpSteepSlope)
    }

    pub fn can_climb_steps(&self) -> bool {
        self.has(MoverFlag::CanClimbSteps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounded_flags_enable_both_switches() {
        let flags = MoverFlags::grounded();
        assert!(flags.prevent_moving_up_steep_slope());
        assert!(flags.can_climb_steps());
        assert!(flags.has_all(&[MoverFlag::PreventMovingUpSteepSlope, MoverFlag::CanClimbSteps]));
    }

    #[test]
    fn airborne_flags_are_empty() {
        let flags = MoverFlags::airborne();
        assert_eq!(flags.bits, 0);
        assert!(!flags.prevent_moving_up_steep_slope());
        assert!(!flags.can_climb_steps());
    }

    #[test]
    fn set_toggles_a_single_bit() {
        let mut flags = MoverFlags::grounded();
        flags.set(MoverFlag::CanClimbSteps, false);
        assert!(flags.prevent_moving_up_steep_slope());
        assert!(!flags.can_climb_steps());

        flags.set(MoverFlag::CanClimbSteps, true);
        assert_eq!(flags, MoverFlags::grounded());

        flags.clear();
        assert_eq!(flags, MoverFlags::airborne());
    }
}
