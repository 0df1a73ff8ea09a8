// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Comfort-band classification for sensor readings.
//!
//! Dashboards color-code temperature and humidity readings by comfort
//! band. The thresholds here match the reference dashboard: temperatures
//! are comfortable between 18 and 30 degrees Celsius, humidity is optimal
//! between 30 and 70 percent.

use std::fmt;

/// Comfort band for a temperature reading in degrees Celsius.
///
/// # Examples
///
/// ```
/// use homesync::TemperatureBand;
///
/// assert_eq!(TemperatureBand::classify(23.5), TemperatureBand::Comfortable);
/// assert_eq!(TemperatureBand::classify(31.0), TemperatureBand::Hot);
/// assert_eq!(TemperatureBand::classify(12.0), TemperatureBand::Cold);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    /// Below 18 °C.
    Cold,
    /// Between 18 and 30 °C inclusive.
    Comfortable,
    /// Above 30 °C.
    Hot,
}

impl TemperatureBand {
    /// Classifies a temperature reading.
    #[must_use]
    pub fn classify(celsius: f64) -> Self {
        if celsius > 30.0 {
            Self::Hot
        } else if celsius < 18.0 {
            Self::Cold
        } else {
            Self::Comfortable
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cold => "Cold",
            Self::Comfortable => "Comfortable",
            Self::Hot => "Hot",
        })
    }
}

/// Comfort band for a relative-humidity reading in percent.
///
/// # Examples
///
/// ```
/// use homesync::HumidityBand;
///
/// assert_eq!(HumidityBand::classify(45.0), HumidityBand::Optimal);
/// assert_eq!(HumidityBand::classify(80.0), HumidityBand::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityBand {
    /// Below 30 %.
    Dry,
    /// Between 30 and 70 % inclusive.
    Optimal,
    /// Above 70 %.
    High,
}

impl HumidityBand {
    /// Classifies a relative-humidity reading.
    #[must_use]
    pub fn classify(percent: f64) -> Self {
        if percent > 70.0 {
            Self::High
        } else if percent < 30.0 {
            Self::Dry
        } else {
            Self::Optimal
        }
    }
}

impl fmt::Display for HumidityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dry => "Dry",
            Self::Optimal => "Optimal",
            Self::High => "High",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_boundaries() {
        assert_eq!(TemperatureBand::classify(17.9), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::classify(18.0), TemperatureBand::Comfortable);
        assert_eq!(TemperatureBand::classify(30.0), TemperatureBand::Comfortable);
        assert_eq!(TemperatureBand::classify(30.1), TemperatureBand::Hot);
    }

    #[test]
    fn humidity_boundaries() {
        assert_eq!(HumidityBand::classify(29.9), HumidityBand::Dry);
        assert_eq!(HumidityBand::classify(30.0), HumidityBand::Optimal);
        assert_eq!(HumidityBand::classify(70.0), HumidityBand::Optimal);
        assert_eq!(HumidityBand::classify(70.1), HumidityBand::High);
    }

    #[test]
    fn band_labels() {
        assert_eq!(TemperatureBand::Hot.to_string(), "Hot");
        assert_eq!(HumidityBand::Optimal.to_string(), "Optimal");
    }
}
