use serde::Serialize;

use crate::catalog::Catalog;
use crate::data::profile::ProfilePayload;

/// Slot tags the item catalog assigns, in reporting order.
pub const SLOTS: [&str; 8] = [
    "warframe",
    "primary",
    "secondary",
    "melee",
    "companion",
    "archwing",
    "arch-gun",
    "arch-melee",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotUsage {
    pub unique_name: String,
    pub name: String,
    pub equip_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostUsed {
    pub slot: String,
    /// Display name of the item with the greatest equip time.
    pub name: Option<String>,
    pub equip_time: f64,
    pub items: Vec<SlotUsage>,
}

/// Usage for one slot. Only weapons whose exact catalog entry carries `type == slot`
/// take part; fuzzy matches are not trusted for slot membership.
///
/// The first item of the slot is the leader even at zero equip time. A later item takes
/// over only with a strictly greater equip time, so ties keep profile order.
pub fn most_used(profile: &ProfilePayload, catalog: &Catalog, slot: &str) -> MostUsed {
    let mut usage = MostUsed {
        slot: slot.to_string(),
        name: None,
        equip_time: 0.0,
        items: Vec::new(),
    };
    for weapon in &profile.weapons {
        let Some(entry) = catalog.get(&weapon.unique_name) else {
            continue;
        };
        if entry.item_type.as_deref() != Some(slot) {
            continue;
        }
        if usage.name.is_none() || weapon.equip_time > usage.equip_time {
            usage.name = Some(entry.display_name.clone());
            usage.equip_time = weapon.equip_time;
        }
        usage.items.push(SlotUsage {
            unique_name: weapon.unique_name.clone(),
            name: entry.display_name.clone(),
            equip_time: weapon.equip_time,
        });
    }
    usage
}

/// [most_used] for every slot that has at least one item.
pub fn most_used_by_slot(profile: &ProfilePayload, catalog: &Catalog) -> Vec<MostUsed> {
    SLOTS
        .iter()
        .map(|slot| most_used(profile, catalog, slot))
        .filter(|usage| !usage.items.is_empty())
        .collect()
}
