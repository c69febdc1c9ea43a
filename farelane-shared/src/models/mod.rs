pub mod airline;
pub mod events;
pub mod flight;
pub mod month;
pub mod passengers;
pub mod response;
pub mod session;
