use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{Coordinates, LocationDetail};

/// Partial update to the location draft. Absent fields are left untouched,
/// so map clicks and address-field edits can arrive independently.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdate {
    pub coordinates: Option<Coordinates>,
    pub main_address: Option<String>,
    pub house_number: Option<String>,
    pub address_number: Option<String>,
    pub street: Option<String>,
    pub estate: Option<String>,
}

/// Location state accumulated during a booking session. Coordinates are a
/// single point, last write wins. Produces `None` when nothing was captured,
/// which submission treats as "no location attached".
#[derive(Debug, Clone, Default)]
pub struct LocationDraft {
    coordinates: Option<Coordinates>,
    main_address: Option<String>,
    house_number: Option<String>,
    address_number: Option<String>,
    street: Option<String>,
    estate: Option<String>,
}

impl LocationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_coordinates(&mut self, lat: f64, lng: f64) {
        self.coordinates = Some(Coordinates { lat, lng });
    }

    pub fn apply(&mut self, update: LocationUpdate) {
        if let Some(point) = update.coordinates {
            self.coordinates = Some(point);
        }
        if let Some(value) = update.main_address {
            self.main_address = Some(value);
        }
        if let Some(value) = update.house_number {
            self.house_number = Some(value);
        }
        if let Some(value) = update.address_number {
            self.address_number = Some(value);
        }
        if let Some(value) = update.street {
            self.street = Some(value);
        }
        if let Some(value) = update.estate {
            self.estate = Some(value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_none()
            && self.main_address.is_none()
            && self.house_number.is_none()
            && self.address_number.is_none()
            && self.street.is_none()
            && self.estate.is_none()
    }

    pub fn detail(&self) -> Option<LocationDetail> {
        if self.is_empty() {
            return None;
        }
        Some(LocationDetail {
            coordinates: self.coordinates,
            main_address: self.main_address.clone().unwrap_or_default(),
            house_number: self.house_number.clone(),
            address_number: self.address_number.clone(),
            street: self.street.clone(),
            estate: self.estate.clone(),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationDraft, LocationUpdate};

    #[test]
    fn empty_draft_produces_no_detail() {
        let draft = LocationDraft::new();
        assert!(draft.detail().is_none());
    }

    #[test]
    fn coordinates_are_last_write_wins() {
        let mut draft = LocationDraft::new();
        draft.set_coordinates(-1.286389, 36.817223);
        draft.set_coordinates(-1.3, 36.9);

        let detail = draft.detail().expect("detail after map click");
        let point = detail.coordinates.expect("point");
        assert_eq!(point.lat, -1.3);
        assert_eq!(point.lng, 36.9);
    }

    #[test]
    fn field_edits_are_independent_of_coordinates() {
        let mut draft = LocationDraft::new();
        draft.apply(LocationUpdate {
            main_address: Some("Moi Avenue".to_string()),
            ..Default::default()
        });
        draft.apply(LocationUpdate {
            estate: Some("South B".to_string()),
            ..Default::default()
        });

        let detail = draft.detail().expect("detail after field edits");
        assert!(detail.coordinates.is_none());
        assert_eq!(detail.main_address, "Moi Avenue");
        assert_eq!(detail.estate.as_deref(), Some("South B"));
        assert!(detail.street.is_none());
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut draft = LocationDraft::new();
        draft.set_coordinates(-1.286389, 36.817223);
        draft.clear();
        assert!(draft.detail().is_none());
    }
}
