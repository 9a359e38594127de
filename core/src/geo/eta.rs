use crate::prelude::{NavError, NavResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One knot expressed in km/h.
pub const KNOTS_TO_KMH: f64 = 1.852;

/// Estimated time en route, split into whole hours and rounded minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eta {
    pub hours: f64,
    pub whole_hours: u64,
    pub minutes: u32,
}

impl Eta {
    pub fn from_knots(distance_km: f64, speed_knots: f64) -> NavResult<Self> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(NavError::InvalidDistance(distance_km));
        }
        if !speed_knots.is_finite() || speed_knots <= 0.0 {
            return Err(NavError::InvalidSpeed(speed_knots));
        }

        let hours = distance_km / (speed_knots * KNOTS_TO_KMH);
        let mut whole_hours = hours.floor() as u64;
        let mut minutes = ((hours - hours.floor()) * 60.0).round() as u32;
        if minutes == 60 {
            whole_hours += 1;
            minutes = 0;
        }

        Ok(Self {
            hours,
            whole_hours,
            minutes,
        })
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.whole_hours, self.minutes) {
            (0, minutes) => write!(f, "{minutes} min"),
            (hours, 0) => write!(f, "{hours} h"),
            (hours, minutes) => write!(f, "{hours} h {minutes} min"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_km_at_twenty_knots() {
        let eta = Eta::from_knots(100.0, 20.0).unwrap();
        assert_eq!(eta.whole_hours, 2);
        assert!((41..=43).contains(&eta.minutes), "got {} min", eta.minutes);
        assert_eq!(eta.to_string(), "2 h 42 min");
    }

    #[test]
    fn display_drops_empty_parts() {
        let short = Eta::from_knots(10.0, 20.0).unwrap();
        assert_eq!(short.whole_hours, 0);
        assert_eq!(short.to_string(), format!("{} min", short.minutes));

        let exact = Eta::from_knots(2.0 * KNOTS_TO_KMH * 10.0, 10.0).unwrap();
        assert_eq!(exact.to_string(), "2 h");
    }

    #[test]
    fn rounding_to_sixty_minutes_carries_into_hours() {
        // 0.9999 h rounds to 60 minutes
        let eta = Eta::from_knots(0.9999 * KNOTS_TO_KMH, 1.0).unwrap();
        assert_eq!(eta.whole_hours, 1);
        assert_eq!(eta.minutes, 0);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        assert!(matches!(
            Eta::from_knots(10.0, 0.0),
            Err(NavError::InvalidSpeed(_))
        ));
        assert!(matches!(
            Eta::from_knots(10.0, -3.0),
            Err(NavError::InvalidSpeed(_))
        ));
        assert!(matches!(
            Eta::from_knots(-1.0, 3.0),
            Err(NavError::InvalidDistance(_))
        ));
    }
}
