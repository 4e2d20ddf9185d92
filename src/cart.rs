use std::collections::BTreeMap;

use crate::models::{CartLine, CartSnapshot, Service};

/// In-memory cart for the booking in progress. Keyed by stable service id;
/// at most one line per service. A line never exists at quantity zero: the
/// decrement that would reach zero removes it instead.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: BTreeMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `service`. The unit price is captured from the
    /// catalog entry at this moment and kept for the life of the line.
    pub fn add(&mut self, service: &Service) {
        let line = self
            .lines
            .entry(service.id.clone())
            .or_insert_with(|| CartLine {
                name: service.name.clone(),
                price: service.price,
                quantity: 0,
            });
        line.quantity += 1;
    }

    /// Remove one unit. Deletes the line when it reaches zero; a no-op when
    /// the service was never in the cart.
    pub fn remove(&mut self, service_id: &str) {
        if let Some(line) = self.lines.get_mut(service_id) {
            if line.quantity <= 1 {
                self.lines.remove(service_id);
            } else {
                line.quantity -= 1;
            }
        }
    }

    pub fn total(&self) -> i64 {
        self.lines
            .values()
            .map(|line| line.price * i64::from(line.quantity))
            .sum()
    }

    pub fn item_count(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &BTreeMap<String, CartLine> {
        &self.lines
    }

    /// Owned copy of the lines as persisted on a booking.
    pub fn snapshot(&self) -> CartSnapshot {
        self.lines.clone()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
