//! Load categories acting on a cut panel

use serde::{Deserialize, Serialize};

/// Load category of a panel load case.
///
/// # Example
/// ```
/// use calc_engine::loads::LoadType;
///
/// assert_eq!(LoadType::Wind.code(), "W");
/// assert_eq!(LoadType::Dead.description(), "Dead load");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadType {
    /// D - self-weight of the panel and fixings
    Dead,
    /// L - imposed pressure (maintenance, crowd, infill load)
    Live,
    /// W - wind pressure or suction, entered as a magnitude
    Wind,
}

impl LoadType {
    /// Abbreviation used in combination equations
    pub fn code(&self) -> &'static str {
        match self {
            LoadType::Dead => "D",
            LoadType::Live => "L",
            LoadType::Wind => "W",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LoadType::Dead => "Dead load",
            LoadType::Live => "Live load",
            LoadType::Wind => "Wind load",
        }
    }
}

impl std::fmt::Display for LoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(LoadType::Dead.code(), "D");
        assert_eq!(LoadType::Live.code(), "L");
        assert_eq!(LoadType::Wind.to_string(), "W");
    }
}
