use crate::dictionary::{Item, ItemDictionary, ItemId, UNKNOWN_ITEM};
use crate::table::Table;
use std::collections::BTreeSet;

/// A table row encoded with the item ids of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    items: Vec<Item>,
    item_ids: Vec<ItemId>,
    item_id_set: BTreeSet<ItemId>,
}

impl Transaction {
    /// Encodes `row`, whose values are in training column order. Pairs the
    /// encoding table does not know become `UNKNOWN_ITEM`.
    pub fn new<S: AsRef<str>>(row: &[S], dictionary: &ItemDictionary) -> Self {
        let items: Vec<Item> = row
            .iter()
            .enumerate()
            .map(|(column_id, value)| (column_id, value.as_ref().to_string()))
            .collect();

        let item_ids: Vec<ItemId> = items
            .iter()
            .map(|(column_id, value)| dictionary.item_id(*column_id, value).unwrap_or(UNKNOWN_ITEM))
            .collect();

        let item_id_set = item_ids.iter().copied().collect();

        Self {
            items,
            item_ids,
            item_id_set,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Item ids in column order.
    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn item_id_set(&self) -> &BTreeSet<ItemId> {
        &self.item_id_set
    }

    pub fn has_unknown_items(&self) -> bool {
        self.item_id_set.contains(&UNKNOWN_ITEM)
    }
}

/// Encodes every row of `table`, restricted to `selection` in the order
/// used for training.
pub fn encode_table(
    table: &Table,
    selection: Option<&[String]>,
    dictionary: &ItemDictionary,
) -> crate::error::Result<Vec<Transaction>> {
    let indices = table.column_indices(selection)?;
    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let values: Vec<String> = indices.iter().map(|&i| row[i].to_string()).collect();
            Transaction::new(&values, dictionary)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    fn dictionary() -> ItemDictionary {
        ItemDictionary::parse("1->1,sunny\n2->1,rainy\n3->2,true\n4->2,false\n").unwrap()
    }

    #[test]
    fn test_encoding() {
        let transaction = Transaction::new(&["rainy", "true"], &dictionary());
        assert_eq!(transaction.item_ids(), &[2, 3]);
        assert_eq!(transaction.items()[0], (0, "rainy".to_string()));
        assert!(!transaction.has_unknown_items());
    }

    #[test]
    fn test_unknown_items() {
        let transaction = Transaction::new(&["overcast", "false"], &dictionary());
        assert_eq!(transaction.item_ids(), &[UNKNOWN_ITEM, 4]);
        assert!(transaction.has_unknown_items());
    }

    #[test]
    fn test_rule_matching_is_subset() {
        let transaction = Transaction::new(&["sunny", "false"], &dictionary());

        assert!(Rule::parse("{1,4} 0 5 3 0.9", 0).unwrap().matches(&transaction));
        assert!(Rule::parse("{4} 0 5 3 0.9", 1).unwrap().matches(&transaction));
        assert!(!Rule::parse("{1,3} 0 5 3 0.9", 2).unwrap().matches(&transaction));
        assert!(!Rule::parse("{1,4,7} 0 5 3 0.9", 3).unwrap().matches(&transaction));
    }

    #[test]
    fn test_empty_rule_matches_everything() {
        let empty = Rule::parse("{} 0 5 3 0.9", 0).unwrap();
        assert!(empty.matches(&Transaction::new(&["sunny", "true"], &dictionary())));
        assert!(empty.matches(&Transaction::new(&["hail", "maybe"], &dictionary())));
    }

    #[test]
    fn test_encode_table_with_selection() {
        let table = Table::new("t", vec!["windy".to_string(), "outlook".to_string()])
            .with_rows(vec![vec!["true", "sunny"]])
            .unwrap();
        let selection = vec!["outlook".to_string(), "windy".to_string()];
        let encoded = encode_table(&table, Some(&selection), &dictionary()).unwrap();
        assert_eq!(encoded[0].item_ids(), &[1, 3]);
    }
}
