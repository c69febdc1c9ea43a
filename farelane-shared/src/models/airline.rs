use serde::{Deserialize, Serialize};

/// Static reference entry for an airline. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub id: i64,
    pub name: String,
    pub logo_path: String,
    pub code: String,
}

impl Airline {
    pub fn slug(&self) -> String {
        airline_slug(&self.name)
    }
}

/// Lowercase the name and join whitespace-separated words with hyphens.
pub fn airline_slug(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airline_slug() {
        assert_eq!(airline_slug("Garuda Indonesia"), "garuda-indonesia");
        assert_eq!(airline_slug("  Lion   Air "), "lion-air");
        assert_eq!(airline_slug("AirAsia"), "airasia");
    }
}
