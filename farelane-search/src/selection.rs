use farelane_shared::{Direction, FlightRecord};
use serde::Serialize;

/// Round-trip picking state: which outbound and inbound flights are held
/// and which tab the traveller is looking at.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundTripSelection {
    pub selected_outbound: Option<FlightRecord>,
    pub selected_inbound: Option<FlightRecord>,
    pub active_tab: Direction,
}

impl RoundTripSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold an outbound flight (replacing any previous one) and move on to
    /// the inbound tab.
    pub fn select_outbound(&mut self, flight: FlightRecord) {
        self.selected_outbound = Some(flight);
        self.active_tab = Direction::Inbound;
    }

    /// Inbound picks only make sense once an outbound flight is held.
    pub fn select_inbound(&mut self, flight: FlightRecord) -> Result<(), SelectionError> {
        if self.selected_outbound.is_none() {
            return Err(SelectionError::OutboundRequired);
        }
        self.selected_inbound = Some(flight);
        self.active_tab = Direction::Inbound;
        Ok(())
    }

    /// Dropping the outbound flight always sends the traveller back to the
    /// outbound tab.
    pub fn clear_outbound(&mut self) {
        self.selected_outbound = None;
        self.active_tab = Direction::Outbound;
    }

    pub fn clear_inbound(&mut self) {
        self.selected_inbound = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The inbound tab needs an outbound flight unless `allow_backward` is set.
    pub fn set_active_tab(&mut self, tab: Direction, allow_backward: bool) -> Result<(), SelectionError> {
        if tab == Direction::Inbound && self.selected_outbound.is_none() && !allow_backward {
            return Err(SelectionError::OutboundRequired);
        }
        self.active_tab = tab;
        Ok(())
    }

    /// 1 = nothing picked, 2 = one leg picked, 3 = both legs picked.
    pub fn booking_step(&self) -> u8 {
        match (&self.selected_outbound, &self.selected_inbound) {
            (Some(_), Some(_)) => 3,
            (None, None) => 1,
            _ => 2,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.booking_step() == 3
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Select an outbound flight first")]
    OutboundRequired,
    #[error("Flight {0} is not in the current results")]
    FlightNotFound(i64),
    #[error("Inbound selection is only available for round trips")]
    NotRoundTrip,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flight(id: i64) -> FlightRecord {
        serde_json::from_value(json!({ "flight_id": id, "pricing": { "grand_total": 100 } })).unwrap()
    }

    #[test]
    fn test_booking_step_progression() {
        let mut selection = RoundTripSelection::new();
        assert_eq!(selection.booking_step(), 1);
        assert_eq!(selection.active_tab, Direction::Outbound);

        selection.select_outbound(flight(1));
        assert_eq!(selection.booking_step(), 2);
        assert_eq!(selection.active_tab, Direction::Inbound);

        selection.select_inbound(flight(2)).unwrap();
        assert_eq!(selection.booking_step(), 3);
        assert!(selection.is_complete());
    }

    #[test]
    fn test_clearing_outbound_returns_to_outbound_tab() {
        let mut selection = RoundTripSelection::new();
        selection.select_outbound(flight(1));
        selection.select_inbound(flight(2)).unwrap();

        selection.clear_outbound();
        assert_eq!(selection.booking_step(), 2);
        assert_eq!(selection.active_tab, Direction::Outbound);
        assert!(selection.selected_inbound.is_some());
    }

    #[test]
    fn test_clearing_inbound_keeps_tab() {
        let mut selection = RoundTripSelection::new();
        selection.select_outbound(flight(1));
        selection.select_inbound(flight(2)).unwrap();

        selection.clear_inbound();
        assert_eq!(selection.booking_step(), 2);
        assert_eq!(selection.active_tab, Direction::Inbound);
    }

    #[test]
    fn test_inbound_tab_requires_outbound() {
        let mut selection = RoundTripSelection::new();
        assert_eq!(
            selection.set_active_tab(Direction::Inbound, false),
            Err(SelectionError::OutboundRequired)
        );
        assert_eq!(selection.active_tab, Direction::Outbound);

        selection.set_active_tab(Direction::Inbound, true).unwrap();
        assert_eq!(selection.active_tab, Direction::Inbound);
    }

    #[test]
    fn test_inbound_pick_requires_outbound() {
        let mut selection = RoundTripSelection::new();
        assert_eq!(selection.select_inbound(flight(2)), Err(SelectionError::OutboundRequired));
        assert_eq!(selection.booking_step(), 1);
    }

    #[test]
    fn test_selecting_again_replaces() {
        let mut selection = RoundTripSelection::new();
        selection.select_outbound(flight(1));
        selection.select_outbound(flight(5));
        assert_eq!(selection.selected_outbound.as_ref().map(|f| f.flight_id), Some(5));
        assert_eq!(selection.booking_step(), 2);
    }
}
