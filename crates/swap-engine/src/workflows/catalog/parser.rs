use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct CatalogRecord {
    pub(crate) row: usize,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) value: u32,
    pub(crate) owner: String,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<CatalogRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let row = record?;
        records.push(CatalogRecord {
            // header is line 1
            row: index + 2,
            id: row.id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            value: row.value,
            owner: row.owner,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Item ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(
        rename = "Description",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    description: Option<String>,
    #[serde(rename = "Value", deserialize_with = "whole_units")]
    value: u32,
    #[serde(rename = "Owner")]
    owner: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Item values are whole currency units; `49.99` or `-5` is refused with a readable reason.
fn whole_units<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    raw.parse::<u32>().map_err(|_| {
        D::Error::custom(format!(
            "Value '{raw}' must be a whole, non-negative number of currency units"
        ))
    })
}
