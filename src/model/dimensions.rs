use crate::error::{Error, Result};

/// Target page size in pixels.
///
/// Both sides are guaranteed positive. No orientation or aspect policy is
/// applied here; callers that want one (e.g. portrait-only) enforce it
/// before building the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Validate a caller-supplied width and height.
    ///
    /// Rejects zero, negative, and values that do not fit in `u32`.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        let invalid = || Error::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        let w = u32::try_from(width).map_err(|_| invalid())?;
        let h = u32::try_from(height).map_err(|_| invalid())?;
        Ok(Self {
            width: w,
            height: h,
        })
    }

    /// A square page, as produced by a single "resolution" value.
    pub fn square(side: i64) -> Result<Self> {
        Self::new(side, side)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_positive() {
        let dims = Dimensions::new(600, 900).unwrap();
        assert_eq!(dims.width(), 600);
        assert_eq!(dims.height(), 900);
        assert_eq!(dims.to_string(), "600x900");
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(matches!(
            Dimensions::new(0, 100),
            Err(Error::InvalidDimensions { width: 0, height: 100 })
        ));
        assert!(Dimensions::new(100, 0).is_err());
        assert!(Dimensions::new(-5, 100).is_err());
        assert!(Dimensions::square(-1).is_err());
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(Dimensions::new(i64::from(u32::MAX) + 1, 10).is_err());
    }

    #[test]
    fn test_default_matches_square_800() {
        assert_eq!(Dimensions::default(), Dimensions::square(800).unwrap());
    }
}
