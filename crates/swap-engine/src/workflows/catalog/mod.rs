//! Item catalog collaborator: the read-only source of `Item` records placed into swap zones.

mod parser;

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::swap::{Item, ItemId, OwnerId};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingId { row: usize },
    DuplicateItem(ItemId),
}

impl fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read item catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid item catalog CSV data: {}", err),
            CatalogImportError::MissingId { row } => {
                write!(f, "catalog row {} has an empty Item ID", row)
            }
            CatalogImportError::DuplicateItem(id) => {
                write!(f, "catalog lists item {} more than once", id)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::MissingId { .. } | CatalogImportError::DuplicateItem(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Ordered, id-unique set of items available to a swap session.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemCatalog {
    pub fn from_items(items: Vec<Item>) -> Result<Self, CatalogImportError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id.clone(), position).is_some() {
                return Err(CatalogImportError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items, index })
    }

    /// Reads `Item ID, Name, Description, Value, Owner` rows.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogImportError> {
        let records = parser::parse_records(reader)?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            if record.id.is_empty() {
                return Err(CatalogImportError::MissingId { row: record.row });
            }
            items.push(Item {
                id: ItemId(record.id),
                name: record.name,
                description: record.description,
                value: record.value,
                owner_id: OwnerId(record.owner),
            });
        }
        Self::from_items(items)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.index.get(id).map(|position| &self.items[*position])
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn owned_by(&self, owner: &OwnerId) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| &item.owner_id == owner)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
