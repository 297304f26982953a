//! Renderer-local display state.
//!
//! Mutated only by the data listener (snapshot arrivals) and the
//! visibility/ambient transitions; nothing here survives a restart.

use std::time::Duration;

use wristcast_protocol::{IconBitmap, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Invisible,
    Interactive,
    Ambient,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Visibility::Invisible)
    }
}

pub struct DisplayState {
    pub visibility: Visibility,
    /// Limited ambient color depth: ambient mode drops style modifiers.
    pub low_color: bool,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub icon: Option<IconBitmap>,
    last_timestamp_ms: i64,
}

impl DisplayState {
    pub fn new(low_color: bool) -> Self {
        Self {
            visibility: Visibility::Invisible,
            low_color,
            low: None,
            high: None,
            icon: None,
            last_timestamp_ms: 0,
        }
    }

    /// Accept a snapshot if it is strictly newer than the cached one.
    ///
    /// Replacement is wholesale: low, high, and icon all come from
    /// the new snapshot, never merged field by field. Returns whether
    /// the snapshot was accepted.
    pub fn accept_snapshot(&mut self, snapshot: &WeatherSnapshot) -> bool {
        if snapshot.timestamp_ms <= self.last_timestamp_ms {
            log::debug!(
                "Dropping stale snapshot ({} <= {})",
                snapshot.timestamp_ms,
                self.last_timestamp_ms
            );
            return false;
        }
        self.last_timestamp_ms = snapshot.timestamp_ms;
        self.low = Some(snapshot.low);
        self.high = Some(snapshot.high);
        self.icon = match IconBitmap::decode(&snapshot.image) {
            Ok(icon) => Some(icon),
            Err(e) => {
                log::warn!("Undecodable icon in snapshot: {}", e);
                None
            }
        };
        true
    }
}

/// Delay until the next wall-clock second boundary.
///
/// Aligning each tick to the boundary instead of sleeping a fixed
/// interval keeps the seconds display from drifting.
pub fn next_tick_delay(now_ms: i64) -> Duration {
    Duration::from_millis((1000 - now_ms.rem_euclid(1000)) as u64)
}

/// Delay until the next minute boundary (ambient redraw cadence).
pub fn next_minute_delay(now_ms: i64) -> Duration {
    Duration::from_millis((60_000 - now_ms.rem_euclid(60_000)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp_ms: i64, low: f64, high: f64, image: Vec<u8>) -> WeatherSnapshot {
        WeatherSnapshot {
            low,
            high,
            image,
            timestamp_ms,
        }
    }

    fn valid_icon() -> Vec<u8> {
        let mut icon = IconBitmap::blank(8, 8).unwrap();
        icon.set_pixel(3, 3);
        icon.encode()
    }

    #[test]
    fn tick_delay_aligns_to_second_boundary() {
        assert_eq!(next_tick_delay(1_754_000_000_000), Duration::from_millis(1000));
        assert_eq!(next_tick_delay(1_754_000_000_001), Duration::from_millis(999));
        assert_eq!(next_tick_delay(1_754_000_000_999), Duration::from_millis(1));
        // The general property: delay = 1000 - (M mod 1000)
        for m in [3i64, 250, 500, 999, 12_345] {
            assert_eq!(
                next_tick_delay(m),
                Duration::from_millis((1000 - m % 1000) as u64)
            );
        }
    }

    #[test]
    fn minute_delay_aligns_to_minute_boundary() {
        assert_eq!(next_minute_delay(60_000), Duration::from_millis(60_000));
        assert_eq!(next_minute_delay(60_001), Duration::from_millis(59_999));
    }

    #[test]
    fn newer_snapshot_replaces_wholesale() {
        let mut state = DisplayState::new(false);
        assert!(state.accept_snapshot(&snapshot(100, 10.0, 25.0, valid_icon())));
        assert_eq!(state.low, Some(10.0));
        assert_eq!(state.high, Some(25.0));
        assert!(state.icon.is_some());

        // Newer snapshot without a decodable icon still replaces everything.
        assert!(state.accept_snapshot(&snapshot(200, -1.0, 4.0, vec![])));
        assert_eq!(state.low, Some(-1.0));
        assert_eq!(state.high, Some(4.0));
        assert!(state.icon.is_none());
    }

    #[test]
    fn stale_and_equal_timestamps_are_dropped() {
        let mut state = DisplayState::new(false);
        assert!(state.accept_snapshot(&snapshot(200, 10.0, 25.0, valid_icon())));
        assert!(!state.accept_snapshot(&snapshot(200, 0.0, 1.0, vec![])));
        assert!(!state.accept_snapshot(&snapshot(150, 0.0, 1.0, vec![])));
        assert_eq!(state.low, Some(10.0));
        assert_eq!(state.high, Some(25.0));
        assert!(state.icon.is_some());
    }

    #[test]
    fn initial_state_shows_nothing() {
        let state = DisplayState::new(false);
        assert_eq!(state.visibility, Visibility::Invisible);
        assert!(state.low.is_none() && state.high.is_none() && state.icon.is_none());
    }
}
