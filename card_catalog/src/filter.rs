//! Faceted filtering of the catalog.
//!
//! Facets combine with AND; the values selected within one facet combine with
//! OR. An empty facet never excludes a record.

use crate::models::{CardRecord, CardType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The active facet values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub colors: BTreeSet<String>,
    pub types: BTreeSet<CardType>,
    pub costs: BTreeSet<i32>,
    pub powers: BTreeSet<i32>,
    pub counters: BTreeSet<i32>,
    pub attributes: BTreeSet<String>,
    /// Set identifier, compared exactly (e.g. "OP09"); blank means all sets
    pub set: Option<String>,
    /// Free-text query matched against every field
    pub query: String,
    pub multicolor_only: bool,
    pub owned_only: bool,
}

impl FilterSelection {
    /// True when no facet is active
    pub fn is_empty(&self) -> bool {
        let without_text = Self {
            query: String::new(),
            set: None,
            ..self.clone()
        };
        self.query.trim().is_empty()
            && self.active_set().is_none()
            && without_text == Self::default()
    }

    /// Does `card` satisfy every active facet?
    pub fn matches(&self, card: &CardRecord) -> bool {
        self.matches_color(card)
            && self.matches_query(card)
            && (self.types.is_empty()
                || card.card_type.is_some_and(|t| self.types.contains(&t)))
            && matches_number(&self.costs, card.cost)
            && matches_number(&self.powers, card.power)
            && matches_number(&self.counters, card.counter)
            && (self.attributes.is_empty()
                || card
                    .attribute
                    .as_ref()
                    .is_some_and(|a| self.attributes.contains(a)))
            && self.active_set().is_none_or(|set| card.set_code == set)
            && (!self.owned_only || card.owned_quantity.unwrap_or(0) > 0)
    }

    /// The selected set, if it is not blank
    fn active_set(&self) -> Option<&str> {
        self.set.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn matches_color(&self, card: &CardRecord) -> bool {
        let any_selected = || card.colors.iter().any(|c| self.colors.contains(c));

        if self.multicolor_only {
            card.is_multicolor() && (self.colors.is_empty() || any_selected())
        } else {
            self.colors.is_empty() || any_selected()
        }
    }

    fn matches_query(&self, card: &CardRecord) -> bool {
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        card.field_values()
            .iter()
            .any(|value| value.to_lowercase().contains(&query))
    }
}

fn matches_number(selected: &BTreeSet<i32>, value: Option<i32>) -> bool {
    selected.is_empty() || value.is_some_and(|v| selected.contains(&v))
}

/// Records of `catalog` matching `selection`, in catalog order
pub fn apply_filters(catalog: &[CardRecord], selection: &FilterSelection) -> Vec<CardRecord> {
    catalog
        .iter()
        .filter(|card| selection.matches(card))
        .cloned()
        .collect()
}

/// Copy of `catalog` annotated with owned quantities keyed by product ID.
///
/// Products missing from `owned` are annotated with zero.
pub fn annotate_owned(catalog: &[CardRecord], owned: &HashMap<String, u32>) -> Vec<CardRecord> {
    catalog
        .iter()
        .map(|card| CardRecord {
            owned_quantity: Some(owned.get(&card.product_id).copied().unwrap_or(0)),
            ..card.clone()
        })
        .collect()
}
