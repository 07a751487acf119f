//! Session shopping list, grouped by the recipe that needed each item.

use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::ShoppingListItem;
use crate::observability;

/// Owner of items added by hand
pub const GENERAL_OWNER: &str = "General";

const ITEM_ID_LEN: usize = 9;

/// A group of items under one heading
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingGroup<'a> {
    /// Recipe title, or `None` for items without one ("General Items")
    pub title: Option<&'a str>,
    pub items: Vec<&'a ShoppingListItem>,
}

impl ShoppingGroup<'_> {
    pub fn all_acquired(&self) -> bool {
        self.items.iter().all(|item| item.acquired)
    }

    pub fn has_pending(&self) -> bool {
        !self.all_acquired()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingList {
    items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append items for a recipe; `None` files them under "General".
    /// Returns the ids of the new entries.
    pub fn add_items<I, S>(&mut self, names: I, recipe_title: Option<&str>) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let owner = recipe_title.unwrap_or(GENERAL_OWNER);
        let mut ids = Vec::new();
        for name in names {
            let name = name.into();
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let id = new_item_id();
            self.items.push(ShoppingListItem {
                id: id.clone(),
                name: name.to_string(),
                recipe_title: owner.to_string(),
                acquired: false,
            });
            ids.push(id);
        }
        observability::record_shopping_items_added(ids.len());
        debug!(count = ids.len(), owner, "Shopping items added");
        ids
    }

    /// Flip the acquired flag; false when no item has this id
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.acquired = !item.acquired;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Items grouped by recipe title: groups with pending items first, then
    /// alphabetical. Item order inside a group is insertion order.
    pub fn grouped(&self) -> Vec<ShoppingGroup<'_>> {
        let mut groups: BTreeMap<Option<&str>, Vec<&ShoppingListItem>> = BTreeMap::new();
        for item in &self.items {
            let key = Some(item.recipe_title.as_str()).filter(|t| !t.trim().is_empty());
            groups.entry(key).or_default().push(item);
        }

        let mut groups: Vec<ShoppingGroup<'_>> = groups
            .into_iter()
            .map(|(title, items)| ShoppingGroup { title, items })
            .collect();
        groups.sort_by(|a, b| {
            b.has_pending()
                .cmp(&a.has_pending())
                .then_with(|| group_sort_key(a).cmp(&group_sort_key(b)))
        });
        groups
    }
}

fn group_sort_key(group: &ShoppingGroup<'_>) -> String {
    group.title.unwrap_or("General Items").to_lowercase()
}

fn new_item_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ITEM_ID_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_defaults_to_general_and_skips_blank() {
        let mut list = ShoppingList::new();
        let ids = list.add_items(["Milk", "  ", "Bread"], None);
        assert_eq!(ids.len(), 2);
        assert!(list.items().iter().all(|i| i.recipe_title == GENERAL_OWNER));
        assert!(ids.iter().all(|id| id.len() == ITEM_ID_LEN));
    }

    #[test]
    fn test_toggle_remove_clear() {
        let mut list = ShoppingList::new();
        let ids = list.add_items(vec!["2 cups Flour".to_string()], Some("Pancakes"));
        assert!(list.toggle(&ids[0]));
        assert!(list.items()[0].acquired);
        assert!(list.toggle(&ids[0]));
        assert!(!list.items()[0].acquired);
        assert!(!list.toggle("nope"));

        assert!(list.remove(&ids[0]));
        assert!(!list.remove(&ids[0]));
        list.add_items(["Eggs"], None);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_grouping_puts_pending_first() {
        let mut list = ShoppingList::new();
        let done = list.add_items(["Basil"], Some("Apple Pie"));
        list.add_items(["Tomatoes"], Some("Zucchini Bake"));
        list.add_items(["Butter"], Some("Crumble"));
        list.toggle(&done[0]);

        let groups = list.grouped();
        let titles: Vec<_> = groups.iter().map(|g| g.title).collect();
        assert_eq!(titles, vec![Some("Crumble"), Some("Zucchini Bake"), Some("Apple Pie")]);
        assert!(groups[2].all_acquired());
    }
}
