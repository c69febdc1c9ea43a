use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PassengerCounts {
    pub fn new(adults: u32, children: u32, infants: u32) -> Self {
        Self { adults, children, infants }
    }

    /// The searcher alone.
    pub fn single_adult() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// At least one adult whenever anyone travels.
    pub fn is_valid(&self) -> bool {
        self.is_empty() || self.adults >= 1
    }
}
