use crate::error::ServiceError;

/// A star rating, guaranteed to be a whole number in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: f64) -> Result<Self, ServiceError> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(ServiceError::InvalidRating);
        }
        if value < f64::from(Self::MIN) || value > f64::from(Self::MAX) {
            return Err(ServiceError::InvalidRating);
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Mean of `ratings` rounded to one decimal place; `0.0` when there are none.
pub fn rounded_average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}
