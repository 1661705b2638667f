//! Process-wide ambient parameters.

use core::sync::atomic::AtomicU32;
use core::sync::atomic::Ordering;

use crate::defs::Error;
use crate::defs::MAX_RADIX;
use crate::defs::MIN_RADIX;

static DEFAULT_RADIX: AtomicU32 = AtomicU32::new(10);

/// Returns the radix used by entry points that take none, e.g. [`pi`](crate::pi).
pub fn default_radix() -> u32 {
    DEFAULT_RADIX.load(Ordering::Relaxed)
}

/// Sets the process-wide default radix.
///
/// ## Errors
///
///  - InvalidRadix: the radix is outside 2..=36.
pub fn set_default_radix(radix: u32) -> Result<(), Error> {
    if !(MIN_RADIX..=MAX_RADIX).contains(&radix) {
        return Err(Error::InvalidRadix(radix));
    }

    DEFAULT_RADIX.store(radix, Ordering::Relaxed);

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_default_radix() {
        assert_eq!(default_radix(), 10);
        assert!(set_default_radix(1).is_err());
        assert!(set_default_radix(37).is_err());
    }
}
