//! List contents shared by the bundled stores.

use super::{Fields, ItemId, ListItem, Operation, StoreError};
use crate::query::ListQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredList {
    pub next_id: ItemId,
    pub items: Vec<ListItem>,
}

/// All lists of one site plus the column defaults applied on create
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteLists {
    #[serde(default)]
    pub column_defaults: BTreeMap<String, Fields>,
    #[serde(default)]
    pub lists: BTreeMap<String, StoredList>,
}

impl SiteLists {
    pub fn query(&self, list: &str, query: &ListQuery) -> Vec<ListItem> {
        let Some(stored) = self.lists.get(list) else {
            return Vec::new();
        };

        stored
            .items
            .iter()
            .filter(|item| query.matches(&item.fields))
            .map(|item| ListItem {
                id: item.id,
                fields: item
                    .fields
                    .iter()
                    .filter(|(name, _)| query.fields.contains(name))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            })
            .collect()
    }

    pub fn create(&mut self, list: &str, fields: Fields) -> ItemId {
        let mut item_fields = self.column_defaults.get(list).cloned().unwrap_or_default();
        item_fields.extend(fields);

        let stored = self.lists.entry(list.to_string()).or_default();
        stored.next_id += 1;
        let id = stored.next_id;
        stored.items.push(ListItem {
            id,
            fields: item_fields,
        });
        id
    }

    pub fn update(&mut self, list: &str, id: ItemId, fields: Fields) -> Result<(), StoreError> {
        let item = self
            .lists
            .get_mut(list)
            .and_then(|stored| stored.items.iter_mut().find(|item| item.id == id))
            .ok_or_else(|| StoreError::operation(Operation::Update, list, format!("item {} not found", id)))?;
        item.fields.extend(fields);
        Ok(())
    }

    pub fn delete(&mut self, list: &str, id: ItemId) -> Result<(), StoreError> {
        let stored = self
            .lists
            .get_mut(list)
            .ok_or_else(|| StoreError::operation(Operation::Delete, list, "list not found"))?;
        let before = stored.items.len();
        stored.items.retain(|item| item.id != id);
        if stored.items.len() == before {
            return Err(StoreError::operation(
                Operation::Delete,
                list,
                format!("item {} not found", id),
            ));
        }
        Ok(())
    }

    /// Full items of a list, in creation order
    pub fn items(&self, list: &str) -> Vec<ListItem> {
        self.lists
            .get(list)
            .map(|stored| stored.items.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_query, Criteria};

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_create_applies_column_defaults() {
        let mut site = SiteLists::default();
        site.column_defaults
            .insert("Review".to_string(), fields(&[("Ready", "No"), ("Kind", "App")]));

        let id = site.create("Review", fields(&[("Title", "Foo"), ("Kind", "Font")]));

        let items = site.items("Review");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].get("Ready"), Some("No"));
        assert_eq!(items[0].get("Kind"), Some("Font"));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut site = SiteLists::default();
        let first = site.create("L", fields(&[("Title", "a")]));
        site.delete("L", first).unwrap();
        let second = site.create("L", fields(&[("Title", "b")]));
        assert_ne!(first, second);
    }

    #[test]
    fn test_query_projects_requested_fields() {
        let mut site = SiteLists::default();
        site.create("L", fields(&[("Title", "a"), ("Status", "Done"), ("Other", "x")]));

        let query = build_query(&Criteria::new().equals("Title", "a"));
        let found = site.query("L", &query);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("Title"), Some("a"));
        assert_eq!(found[0].get("Other"), None);
    }

    #[test]
    fn test_query_unknown_list_is_empty() {
        let site = SiteLists::default();
        assert!(site.query("Missing", &build_query(&Criteria::new())).is_empty());
    }

    #[test]
    fn test_update_missing_item_fails() {
        let mut site = SiteLists::default();
        site.create("L", Fields::new());
        let err = site.update("L", 99, fields(&[("Status", "Done")])).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Operation {
                operation: Operation::Update,
                ..
            }
        ));
    }
}
