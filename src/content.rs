//! Canned copy generation. The "writer" is a template fill over the deal's
//! own fields; the phased progress is pure theater with a fixed tick budget,
//! so runs are reproducible. Template sets can be overridden per category
//! from a yaml file.

use std::{collections::BTreeMap, fs, path::Path, thread, time::Duration};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Deal;
use crate::store::DealStore;
use crate::utils::{fmt_money, progress_bar};

const PHASES: [(&str, u64); 3] = [("outline", 12), ("draft", 30), ("polish", 8)];

const BUILTIN: &str = r#"
default:
  description: >-
    {title} from {merchant}. Book ahead, show your voucher on arrival, and
    let {merchant} take care of the rest. One voucher covers one visit at
    the advertised {price} price.
  highlights:
    - "One voucher per visit at {price}"
    - "Easy booking directly with {merchant}"
    - "Voucher valid for {validity}"
  fine_print: >-
    Valid for {validity} from purchase. Not combinable with other offers.
    Booking required, subject to availability.

food-drink:
  description: >-
    Pull up a chair at {merchant}. {title} covers the full spread for
    {price}, drinks menu available on the day. Walk-ins welcome outside
    peak hours, though booking is the safer bet.
  highlights:
    - "Full serving for {price}"
    - "Freshly prepared by {merchant}"
    - "Valid {validity}, including weekends"
  fine_print: >-
    Valid for {validity} from purchase. Dine-in only, one voucher per
    table visit. Drinks not included unless stated.

beauty-spa:
  description: >-
    Set aside an hour for yourself at {merchant}. {title} at {price},
    performed by qualified staff with products included. Arrive ten
    minutes early to settle in.
  highlights:
    - "Full treatment for {price}"
    - "Qualified, friendly staff at {merchant}"
    - "Products included, nothing extra to buy"
  fine_print: >-
    Valid for {validity} from purchase. Appointment required, 24h
    cancellation notice. Not valid with other promotions.

activities:
  description: >-
    {title} with {merchant}, all equipment and instruction included for
    {price}. Beginners welcome, groups capped for safety, and sessions
    run in most weather.
  highlights:
    - "All equipment included at {price}"
    - "Experienced guides from {merchant}"
    - "Beginner friendly, small groups"
  fine_print: >-
    Valid for {validity} from purchase. Weather dependent, minimum age
    may apply. Booking required.
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSet {
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub fine_print: String,
}

pub struct Templates {
    sets: BTreeMap<String, TemplateSet>,
}

impl Templates {
    pub fn builtin() -> Self {
        Self {
            sets: serde_yaml::from_str(BUILTIN).expect("hardcoded"),
        }
    }

    /// Loads a yaml override file, or the builtin sets when there is none.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::builtin());
        }
        let sets: BTreeMap<String, TemplateSet> =
            serde_yaml::from_str(&fs::read_to_string(path)?)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
        if !sets.contains_key("default") {
            bail!("{} has no \"default\" template set", path.display());
        }
        Ok(Self { sets })
    }

    fn for_deal(&self, deal: &Deal) -> &TemplateSet {
        self.sets
            .get(deal.category.slug())
            .unwrap_or_else(|| &self.sets["default"])
    }

    pub fn fill(&self, deal: &Deal) -> GeneratedCopy {
        let set = self.for_deal(deal);
        GeneratedCopy {
            description: substitute(&set.description, deal),
            highlights: set.highlights.iter().map(|x| substitute(x, deal)).collect(),
            fine_print: substitute(&set.fine_print, deal),
        }
    }
}

/// Field names line up with `Deal`, so this can be applied as a partial
/// update directly.
#[derive(Debug, Serialize)]
pub struct GeneratedCopy {
    pub description: String,
    pub highlights: Vec<String>,
    pub fine_print: String,
}

fn substitute(template: &str, deal: &Deal) -> String {
    let merchant = if deal.merchant.is_empty() {
        "the merchant"
    } else {
        &deal.merchant
    };
    let option = deal.options.first();
    let price = fmt_money(option.map(|x| x.deal_price).unwrap_or(0.0));
    let validity = option.map(|x| x.validity.as_str()).unwrap_or("30 days");

    template
        .replace("{title}", &deal.title)
        .replace("{merchant}", merchant)
        .replace("{price}", &price)
        .replace("{validity}", validity)
}

pub fn run(store: &mut DealStore, id: &str, templates: &Templates) -> Result<()> {
    let deal = store.get(id)?.clone();
    let copy = templates.fill(&deal);

    for (phase, ticks) in PHASES {
        eprintln!("{phase}...");
        let pb = progress_bar(ticks);
        for _ in 0..ticks {
            thread::sleep(Duration::from_millis(40));
            pb.inc(1);
        }
        pb.finish_and_clear();
    }

    store.update_fields(id, serde_json::to_value(&copy)?)?;
    eprintln!("Copy written to {id}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::pricing::Rounding;

    fn deal(category: Category) -> Deal {
        let mut deal = Deal::new(
            "Sunset kayak tour".to_string(),
            "Bay Tours".to_string(),
            category,
        );
        deal.options[0].regular_price = 100.0;
        deal.options[0].set_deal_price(60.0, Rounding::Dollars);
        deal
    }

    #[test]
    fn builtin_parses_with_default() {
        let templates = Templates::builtin();
        assert!(templates.sets.contains_key("default"));
        assert!(templates.sets.contains_key("food-drink"));
    }

    #[test]
    fn fill_substitutes_every_placeholder() {
        let copy = Templates::builtin().fill(&deal(Category::Activities));
        for text in [&copy.description, &copy.fine_print]
            .into_iter()
            .chain(&copy.highlights)
        {
            assert!(!text.contains('{'), "unfilled placeholder in: {text}");
        }
        assert!(copy.description.contains("Bay Tours"));
        assert!(copy.highlights.iter().any(|x| x.contains("$60")));
        assert!(copy.fine_print.contains("30 days"));
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        let copy = Templates::builtin().fill(&deal(Category::Retail));
        assert!(copy.description.contains("Sunset kayak tour"));
        assert!(copy.description.contains("voucher"));
    }

    #[test]
    fn fill_is_deterministic() {
        let deal = deal(Category::FoodDrink);
        let templates = Templates::builtin();
        assert_eq!(
            templates.fill(&deal).description,
            templates.fill(&deal).description
        );
    }
}
