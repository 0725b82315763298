use serde::{Deserialize, Serialize};

use super::domain::{Item, ItemId, Zone};

/// The two mutable item zones of one in-progress proposal.
///
/// Each zone keeps insertion order and holds at most one entry per item id. The same
/// item may sit in both zones at once; that state is surfaced to callers through
/// [`ProposalSet::overlapping_items`] rather than blocked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSet {
    offer: Vec<Item>,
    request: Vec<Item>,
}

impl ProposalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&self) -> &[Item] {
        &self.offer
    }

    pub fn request(&self) -> &[Item] {
        &self.request
    }

    pub fn zone(&self, zone: Zone) -> &[Item] {
        match zone {
            Zone::Offer => &self.offer,
            Zone::Request => &self.request,
        }
    }

    /// Appends `item` to `zone` unless an entry with the same id is already there.
    /// Returns whether the zone changed.
    pub fn add(&mut self, zone: Zone, item: Item) -> bool {
        let entries = self.zone_mut(zone);
        if entries.iter().any(|existing| existing.id == item.id) {
            return false;
        }
        entries.push(item);
        true
    }

    /// Removes the entry with `item_id` from `zone`. Returns whether the zone changed.
    pub fn remove(&mut self, zone: Zone, item_id: &ItemId) -> bool {
        let entries = self.zone_mut(zone);
        let before = entries.len();
        entries.retain(|existing| &existing.id != item_id);
        entries.len() != before
    }

    pub fn add_to_offer(&mut self, item: Item) -> bool {
        self.add(Zone::Offer, item)
    }

    pub fn add_to_request(&mut self, item: Item) -> bool {
        self.add(Zone::Request, item)
    }

    pub fn remove_from_offer(&mut self, item_id: &ItemId) -> bool {
        self.remove(Zone::Offer, item_id)
    }

    pub fn remove_from_request(&mut self, item_id: &ItemId) -> bool {
        self.remove(Zone::Request, item_id)
    }

    pub fn clear_zone(&mut self, zone: Zone) {
        self.zone_mut(zone).clear();
    }

    pub fn reset(&mut self) {
        self.offer.clear();
        self.request.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.offer.is_empty() && self.request.is_empty()
    }

    pub fn both_zones_filled(&self) -> bool {
        !self.offer.is_empty() && !self.request.is_empty()
    }

    pub fn contains(&self, zone: Zone, item_id: &ItemId) -> bool {
        self.zone(zone).iter().any(|item| &item.id == item_id)
    }

    /// Item ids present in both zones, in offer order.
    pub fn overlapping_items(&self) -> Vec<ItemId> {
        self.offer
            .iter()
            .filter(|item| self.contains(Zone::Request, &item.id))
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn item_ids(&self, zone: Zone) -> Vec<ItemId> {
        self.zone(zone).iter().map(|item| item.id.clone()).collect()
    }

    pub fn total_value(&self, zone: Zone) -> u64 {
        self.zone(zone).iter().map(|item| u64::from(item.value)).sum()
    }

    pub fn summary(&self, zone: Zone) -> ZoneSummary {
        ZoneSummary {
            zone,
            item_count: self.zone(zone).len(),
            total_value: self.total_value(zone),
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut Vec<Item> {
        match zone {
            Zone::Offer => &mut self.offer,
            Zone::Request => &mut self.request,
        }
    }
}

/// Count and total value of one zone, as shown on the swap summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zone: Zone,
    pub item_count: usize,
    pub total_value: u64,
}
