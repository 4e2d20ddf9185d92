use crate::models::Service;

/// The fixed list of offerable services. Defined once at startup and
/// read-only afterwards; cart lines copy the price at add-time, so later
/// catalog edits never retroactively change a submitted booking.
#[derive(Debug, Clone)]
pub struct Catalog {
    services: Vec<Service>,
}

impl Catalog {
    /// The production service sheet. Prices in Ksh.
    pub fn standard() -> Self {
        Self {
            services: vec![
                Service::new("normal-car-wash", "Normal Car Wash", 300, None),
                Service::new("engine-wash", "Engine Wash", 300, None),
                Service::new("underwash", "Underwash", 500, None),
                Service::new(
                    "seat-cleaning",
                    "Seat Cleaning (per seat)",
                    500,
                    Some("Priced per seat"),
                ),
                Service::new(
                    "carpet-cleaning",
                    "Carpet Cleaning (per sq ft)",
                    30,
                    Some("Priced per square foot"),
                ),
            ],
        }
    }

    pub fn get(&self, service_id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == service_id)
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }
}
