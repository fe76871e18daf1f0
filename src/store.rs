//! The deals file. One JSON document holds every deal; the whole thing is
//! read at startup and rewritten on save, pretty-printed and sorted by id so
//! diffs stay reviewable.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::model::{Category, Deal, DealOption};

pub struct DealStore {
    path: PathBuf,
    deals: Vec<Deal>,
}

impl DealStore {
    pub fn load(path: &Path) -> Result<Self> {
        let deals = if path.exists() {
            serde_json::from_str(&fs::read_to_string(path)?)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            deals,
        })
    }

    pub fn save(&mut self) -> Result<()> {
        self.deals.sort_by(|a, b| a.id.cmp(&b.id));
        let mut output = serde_json::to_string_pretty(&self.deals)?;
        output.push('\n');

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, &output)?;

        Ok(())
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn deals_mut(&mut self) -> &mut [Deal] {
        &mut self.deals
    }

    pub fn get(&self, id: &str) -> Result<&Deal> {
        match self.deals.iter().find(|x| x.id == id) {
            Some(x) => Ok(x),
            None => bail!("No deal with id: {id}"),
        }
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Deal> {
        match self.deals.iter_mut().find(|x| x.id == id) {
            Some(x) => Ok(x),
            None => bail!("No deal with id: {id}"),
        }
    }

    pub fn create(&mut self, title: String, merchant: String, category: Category) -> &Deal {
        self.deals.push(Deal::new(title, merchant, category));
        self.deals.last().expect("just pushed")
    }

    /// Partial update: `patch` is merged into the deal's JSON form, so any
    /// field left out of the patch keeps its current value. Objects merge
    /// key by key, arrays element by element, and `null` removes a key
    /// (serde defaults then restore it on the way back in). Returns the
    /// merged deal.
    pub fn update_fields(&mut self, id: &str, patch: Value) -> Result<Deal> {
        let deal = self.get_mut(id)?;

        let mut value = serde_json::to_value(&*deal)?;
        merge(&mut value, patch);

        let mut merged: Deal =
            serde_json::from_value(value).context("Patched deal no longer deserializes")?;
        merged.id = deal.id.clone();
        merged.touch();
        *deal = merged;

        Ok(deal.clone())
    }

    pub fn remove(&mut self, id: &str) -> Result<Deal> {
        match self.deals.iter().position(|x| x.id == id) {
            Some(i) => Ok(self.deals.remove(i)),
            None => bail!("No deal with id: {id}"),
        }
    }

    pub fn add_option(&mut self, deal_id: &str) -> Result<String> {
        let deal = self.get_mut(deal_id)?;
        let option = DealOption::default();
        let id = option.id.clone();
        deal.options.push(option);
        deal.touch();
        Ok(id)
    }

    pub fn remove_option(&mut self, deal_id: &str, option_id: &str) -> Result<DealOption> {
        let deal = self.get_mut(deal_id)?;
        match deal.options.iter().position(|x| x.id == option_id) {
            Some(i) => {
                let removed = deal.options.remove(i);
                deal.touch();
                Ok(removed)
            }
            None => bail!("No option with id: {option_id}"),
        }
    }
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    base.remove(&key);
                } else {
                    merge(base.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        (Value::Array(base), Value::Array(patch)) => {
            for (i, value) in patch.into_iter().enumerate() {
                if i < base.len() {
                    merge(&mut base[i], value);
                } else {
                    base.push(value);
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::DealStatus;

    fn store() -> DealStore {
        DealStore {
            path: PathBuf::from("unused.json"),
            deals: Vec::new(),
        }
    }

    #[test]
    fn create_and_remove() {
        let mut store = store();
        let id = store
            .create("Deep tissue massage".into(), "Kneads".into(), Category::BeautySpa)
            .id
            .clone();

        assert_eq!(store.deals().len(), 1);
        assert_eq!(store.get(&id).unwrap().options.len(), 1);
        assert!(store.get("missing").is_err());

        store.remove(&id).unwrap();
        assert!(store.deals().is_empty());
        assert!(store.remove(&id).is_err());
    }

    #[test]
    fn patch_merges_deeply() {
        let mut store = store();
        let id = store
            .create("Sunset kayak tour".into(), "Bay Tours".into(), Category::Activities)
            .id
            .clone();
        let option_id = store.get(&id).unwrap().options[0].id.clone();

        let merged = store
            .update_fields(
                &id,
                json!({
                    "description": "Two hours on the water.",
                    "options": [{"id": option_id, "regular_price": 80.0}],
                }),
            )
            .unwrap();

        // untouched fields survive the patch
        assert_eq!(merged.title, "Sunset kayak tour");
        assert_eq!(merged.merchant, "Bay Tours");
        assert_eq!(merged.description, "Two hours on the water.");
        assert_eq!(merged.options[0].regular_price, 80.0);
        // fields omitted inside the nested object survive too
        assert_eq!(merged.options[0].platform_margin_percent, 50);
        assert_eq!(merged.options[0].monthly_capacity, 100);
    }

    #[test]
    fn patch_cannot_reassign_id() {
        let mut store = store();
        let id = store
            .create("Pottery class".into(), "Clay Co".into(), Category::Activities)
            .id
            .clone();

        let merged = store
            .update_fields(&id, json!({"id": "hijack!", "status": "in-review"}))
            .unwrap();
        assert_eq!(merged.id, id);
        assert_eq!(merged.status, DealStatus::InReview);
    }

    #[test]
    fn null_resets_to_default() {
        let mut store = store();
        let id = store
            .create("Car detail".into(), "Shine".into(), Category::Services)
            .id
            .clone();
        store
            .update_fields(&id, json!({"highlights": ["hand wash"]}))
            .unwrap();

        let merged = store.update_fields(&id, json!({"highlights": null})).unwrap();
        assert!(merged.highlights.is_empty());
    }

    #[test]
    fn options_stay_ordered() {
        let mut store = store();
        let id = store
            .create("Brunch for two".into(), "Cafe Azul".into(), Category::FoodDrink)
            .id
            .clone();
        let first = store.get(&id).unwrap().options[0].id.clone();
        let second = store.add_option(&id).unwrap();
        let third = store.add_option(&id).unwrap();

        let ids: Vec<_> = store.get(&id).unwrap().options.iter().map(|x| x.id.clone()).collect();
        assert_eq!(ids, vec![first.clone(), second.clone(), third.clone()]);

        store.remove_option(&id, &second).unwrap();
        let ids: Vec<_> = store.get(&id).unwrap().options.iter().map(|x| x.id.clone()).collect();
        assert_eq!(ids, vec![first, third]);
        assert!(store.remove_option(&id, &second).is_err());
    }
}
