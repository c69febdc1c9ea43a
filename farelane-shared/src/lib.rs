pub mod models;

pub use models::airline::{airline_slug, Airline};
pub use models::events::SessionChangedEvent;
pub use models::flight::{FareClass, FlightRecord, PassengerPrices, Pricing};
pub use models::month::{days_in_month, DayResults, MonthData, MonthMeta, MonthPhase, MonthSearchResults};
pub use models::passengers::PassengerCounts;
pub use models::response::{Direction, OneWayResults, RoundTripResults, SearchResponse, TripType};
pub use models::session::CacheKey;
