use serde::{Deserialize, Serialize};

/// The closed set of printed card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Leader,
    Character,
    Event,
    Stage,
}

impl CardType {
    /// Returns the printed name of the type (e.g., "Character")
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Leader => "Leader",
            CardType::Character => "Character",
            CardType::Event => "Event",
            CardType::Stage => "Stage",
        }
    }

    /// Parse a dataset `extCardType` value, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "leader" => Some(CardType::Leader),
            "character" => Some(CardType::Character),
            "event" => Some(CardType::Event),
            "stage" => Some(CardType::Stage),
            _ => None,
        }
    }

    /// Returns all card types
    pub fn all() -> &'static [CardType] {
        &[
            CardType::Leader,
            CardType::Character,
            CardType::Event,
            CardType::Stage,
        ]
    }
}

/// Market prices for a product. The only part of a record that changes after load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFields {
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
    pub market: Option<f64>,
}

/// One row of a per-set dataset file, exactly as stored on disk.
///
/// Every column is optional so that older exports with fewer columns still load.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetRow {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub clean_name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub ext_number: String,
    #[serde(default)]
    pub ext_rarity: String,
    #[serde(default)]
    pub ext_description: String,
    #[serde(default)]
    pub ext_color: String,
    #[serde(default)]
    pub ext_card_type: String,
    #[serde(default)]
    pub ext_cost: String,
    #[serde(default)]
    pub ext_power: String,
    #[serde(default)]
    pub ext_counterplus: String,
    #[serde(default)]
    pub ext_attribute: String,
    #[serde(default)]
    pub ext_subtypes: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub low_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub mid_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub high_price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub market_price: Option<f64>,
}

impl DatasetRow {
    /// Convert a raw row into a catalog record tagged with its dataset file.
    ///
    /// `fallback_set` is used as the set code when `extNumber` carries no prefix.
    pub fn into_record(self, source_file: &str, fallback_set: &str) -> CardRecord {
        let set_code = set_code_from_number(&self.ext_number)
            .unwrap_or(fallback_set)
            .to_string();

        CardRecord {
            product_id: self.product_id.trim().to_string(),
            set_code,
            name: self.name,
            clean_name: self.clean_name,
            colors: split_multi_value(&self.ext_color),
            card_type: CardType::parse(&self.ext_card_type),
            cost: parse_stat(&self.ext_cost),
            power: parse_stat(&self.ext_power),
            counter: parse_stat(&self.ext_counterplus),
            attribute: non_empty(self.ext_attribute),
            rarity: self.ext_rarity,
            subtypes: split_multi_value(&self.ext_subtypes),
            description: self.ext_description,
            ext_number: self.ext_number.trim().to_string(),
            image_url: self.image_url,
            url: self.url,
            prices: PriceFields {
                low: self.low_price,
                mid: self.mid_price,
                high: self.high_price,
                market: self.market_price,
            },
            source_file: source_file.to_string(),
            owned_quantity: None,
        }
    }
}

/// One distinct printed card in the unified catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub product_id: String,
    pub set_code: String,
    pub name: String,
    pub clean_name: String,
    pub colors: Vec<String>,
    pub card_type: Option<CardType>,
    pub cost: Option<i32>,
    pub power: Option<i32>,
    pub counter: Option<i32>,
    pub attribute: Option<String>,
    pub rarity: String,
    pub subtypes: Vec<String>,
    pub description: String,
    pub ext_number: String,
    pub image_url: String,
    pub url: String,
    pub prices: PriceFields,
    pub source_file: String,
    /// Copies owned by the requesting user; supplied per request, never stored in datasets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_quantity: Option<u32>,
}

impl CardRecord {
    /// Returns true if the card carries more than one color
    pub fn is_multicolor(&self) -> bool {
        self.colors.len() > 1
    }

    /// String form of every field, used by free-text search
    pub fn field_values(&self) -> Vec<String> {
        let mut values = vec![
            self.product_id.clone(),
            self.set_code.clone(),
            self.name.clone(),
            self.clean_name.clone(),
            self.colors.join(","),
            self.rarity.clone(),
            self.subtypes.join(","),
            self.description.clone(),
            self.ext_number.clone(),
            self.image_url.clone(),
            self.url.clone(),
            self.source_file.clone(),
        ];

        if let Some(card_type) = self.card_type {
            values.push(card_type.as_str().to_string());
        }
        if let Some(attribute) = &self.attribute {
            values.push(attribute.clone());
        }
        values.extend(
            [self.cost, self.power, self.counter]
                .into_iter()
                .flatten()
                .map(|n| n.to_string()),
        );
        values.extend(
            [
                self.prices.low,
                self.prices.mid,
                self.prices.high,
                self.prices.market,
            ]
            .into_iter()
            .flatten()
            .map(|p| p.to_string()),
        );
        if let Some(owned) = self.owned_quantity {
            values.push(owned.to_string());
        }

        values
    }
}

/// One line of a deck list: a printed card number and how many copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckEntry {
    pub ext_number: String,
    pub quantity: u32,
}

/// A deck list entry resolved against its set's dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckCard {
    #[serde(flatten)]
    pub card: CardRecord,
    pub quantity: u32,
}

/// Set code of a printed card number: the text before the first hyphen.
///
/// `"OP09-001"` yields `"OP09"`; numbers without a hyphen yield `None`.
pub fn set_code_from_number(ext_number: &str) -> Option<&str> {
    let (prefix, _) = ext_number.trim().split_once('-')?;
    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

/// Split a semicolon-delimited column into trimmed, non-empty values
pub fn split_multi_value(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse cost/power/counter columns; a leading `+` is accepted ("+1000")
fn parse_stat(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse::<i32>()
        .ok()
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> DatasetRow {
        DatasetRow {
            product_id: " 588123 ".to_string(),
            name: "Monkey.D.Luffy (001)".to_string(),
            clean_name: "Monkey D Luffy 001".to_string(),
            ext_number: "OP09-001".to_string(),
            ext_color: "Red; Green".to_string(),
            ext_card_type: "Leader".to_string(),
            ext_power: "5000".to_string(),
            ext_counterplus: "".to_string(),
            ext_attribute: "Strike".to_string(),
            ext_subtypes: "Straw Hat Crew;Supernovas;".to_string(),
            market_price: Some(1.25),
            ..Default::default()
        }
    }

    #[test]
    fn test_into_record_normalizes_fields() {
        let record = sample_row().into_record("OP09.csv", "OP09");

        assert_eq!(record.product_id, "588123");
        assert_eq!(record.set_code, "OP09");
        assert_eq!(record.colors, vec!["Red", "Green"]);
        assert_eq!(record.subtypes, vec!["Straw Hat Crew", "Supernovas"]);
        assert_eq!(record.card_type, Some(CardType::Leader));
        assert_eq!(record.cost, None);
        assert_eq!(record.power, Some(5000));
        assert_eq!(record.counter, None);
        assert_eq!(record.attribute.as_deref(), Some("Strike"));
        assert_eq!(record.prices.market, Some(1.25));
        assert_eq!(record.source_file, "OP09.csv");
        assert!(record.owned_quantity.is_none());
    }

    #[test]
    fn test_into_record_falls_back_to_dataset_set() {
        let row = DatasetRow {
            product_id: "1".to_string(),
            ext_number: "".to_string(),
            ..Default::default()
        };
        let record = row.into_record("ST01.csv", "ST01");
        assert_eq!(record.set_code, "ST01");
    }

    #[test]
    fn test_set_code_from_number() {
        assert_eq!(set_code_from_number("OP09-001"), Some("OP09"));
        assert_eq!(set_code_from_number("ST01-012"), Some("ST01"));
        assert_eq!(set_code_from_number("P-001"), Some("P"));
        assert_eq!(set_code_from_number("OP09001"), None);
        assert_eq!(set_code_from_number("-001"), None);
    }

    #[test]
    fn test_parse_stat_variants() {
        assert_eq!(parse_stat("1000"), Some(1000));
        assert_eq!(parse_stat("+2000"), Some(2000));
        assert_eq!(parse_stat(" 3 "), Some(3));
        assert_eq!(parse_stat("-"), None);
        assert_eq!(parse_stat(""), None);
    }

    #[test]
    fn test_card_type_parse() {
        assert_eq!(CardType::parse("character"), Some(CardType::Character));
        assert_eq!(CardType::parse(" Stage "), Some(CardType::Stage));
        assert_eq!(CardType::parse("DON!!"), None);
        for card_type in CardType::all() {
            assert_eq!(CardType::parse(card_type.as_str()), Some(*card_type));
        }
    }

    #[test]
    fn test_field_values_cover_numbers_and_lists() {
        let record = sample_row().into_record("OP09.csv", "OP09");
        let values = record.field_values();

        assert!(values.contains(&"Red,Green".to_string()));
        assert!(values.contains(&"5000".to_string()));
        assert!(values.contains(&"Leader".to_string()));
        assert!(values.contains(&"1.25".to_string()));
    }

    #[test]
    fn test_deck_card_serializes_flat() {
        let card = DeckCard {
            card: sample_row().into_record("OP09.csv", "OP09"),
            quantity: 2,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["extNumber"], "OP09-001");
        assert_eq!(json["productId"], "588123");
    }
}
