use core::fmt;
use std::str::FromStr;

use anyhow::bail;
use clap::ValueEnum;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::utils::now;

pub fn gen_id() -> String {
    nanoid!(
        7,
        &[
            '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G',
            'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X',
            'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
            'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
        ]
    )
}

/// Promotional rates the platform supports, stored as their percent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PromoRate {
    Five = 5,
    Ten = 10,
    Fifteen = 15,
    Twenty = 20,
}

impl PromoRate {
    pub fn all() -> [Self; 4] {
        [Self::Five, Self::Ten, Self::Fifteen, Self::Twenty]
    }

    pub fn percent(&self) -> u8 {
        *self as u8
    }

    pub fn from_percent(x: u8) -> anyhow::Result<Self> {
        Ok(match x {
            5 => Self::Five,
            10 => Self::Ten,
            15 => Self::Fifteen,
            20 => Self::Twenty,
            _ => bail!("Unsupported rate: {x}% (use 5, 10, 15 or 20)"),
        })
    }
}

impl fmt::Display for PromoRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl FromStr for PromoRate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_percent(s.trim_end_matches('%').parse()?)
    }
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum DealStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Published,
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::InReview => write!(f, "in-review"),
            Self::Approved => write!(f, "approved"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl FromStr for DealStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "draft" => Self::Draft,
            "in-review" => Self::InReview,
            "approved" => Self::Approved,
            "published" => Self::Published,
            _ => bail!("Unknown status: {s}"),
        })
    }
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[default]
    FoodDrink,
    BeautySpa,
    Activities,
    Services,
    Retail,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FoodDrink => "Food & Drink",
            Self::BeautySpa => "Beauty & Spa",
            Self::Activities => "Activities",
            Self::Services => "Services",
            Self::Retail => "Retail",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::FoodDrink => "food-drink",
            Self::BeautySpa => "beauty-spa",
            Self::Activities => "activities",
            Self::Services => "services",
            Self::Retail => "retail",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single purchasable option of a deal. Derived figures (discount, payout)
/// are stored alongside the inputs so the file on disk always shows what the
/// editor last produced; `pricing` keeps them consistent on every edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealOption {
    #[serde(default = "gen_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub regular_price: f64,
    #[serde(default)]
    pub deal_price: f64,
    #[serde(default)]
    pub discount_percent: i64,
    #[serde(default = "default_margin")]
    pub platform_margin_percent: u8,
    #[serde(default)]
    pub merchant_payout: f64,
    #[serde(default = "default_pays_max")]
    pub merchant_pays_max: PromoRate,
    #[serde(default = "default_promo")]
    pub promo_discount: PromoRate,
    #[serde(default = "default_capacity")]
    pub monthly_capacity: u32,
    #[serde(default = "default_validity")]
    pub validity: String,
}

fn default_margin() -> u8 {
    50
}

fn default_pays_max() -> PromoRate {
    PromoRate::Twenty
}

fn default_promo() -> PromoRate {
    PromoRate::Ten
}

fn default_capacity() -> u32 {
    100
}

fn default_validity() -> String {
    "30 days".to_string()
}

impl Default for DealOption {
    fn default() -> Self {
        Self {
            id: gen_id(),
            name: String::new(),
            regular_price: 0.0,
            deal_price: 0.0,
            discount_percent: 0,
            platform_margin_percent: default_margin(),
            merchant_payout: 0.0,
            merchant_pays_max: default_pays_max(),
            promo_discount: default_promo(),
            monthly_capacity: default_capacity(),
            validity: default_validity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default = "gen_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub merchant: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub status: DealStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub fine_print: String,
    #[serde(default)]
    pub options: Vec<DealOption>,
    #[serde(default)]
    pub updated: u32,
}

impl Deal {
    pub fn new(title: String, merchant: String, category: Category) -> Self {
        let mut deal = Self {
            id: gen_id(),
            title,
            merchant,
            category,
            status: DealStatus::default(),
            description: String::new(),
            highlights: Vec::new(),
            fine_print: String::new(),
            options: vec![DealOption::default()],
            updated: 0,
        };
        deal.touch();
        deal
    }

    pub fn touch(&mut self) {
        self.updated = now();
    }

    pub fn option(&self, id: &str) -> Option<&DealOption> {
        self.options.iter().find(|x| x.id == id)
    }

    pub fn option_mut(&mut self, id: &str) -> Option<&mut DealOption> {
        self.options.iter_mut().find(|x| x.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_defaults() {
        let option = DealOption::default();
        assert_eq!(option.platform_margin_percent, 50);
        assert_eq!(option.merchant_pays_max, PromoRate::Twenty);
        assert_eq!(option.promo_discount, PromoRate::Ten);
        assert_eq!(option.monthly_capacity, 100);
        assert_eq!(option.validity, "30 days");
        assert_eq!(option.id.len(), 7);
    }

    #[test]
    fn option_defaults_from_empty_json() {
        let option: DealOption = serde_json::from_str("{}").unwrap();
        assert_eq!(option.regular_price, 0.0);
        assert_eq!(option.deal_price, 0.0);
        assert_eq!(option.platform_margin_percent, 50);
        assert_eq!(option.monthly_capacity, 100);
    }

    #[test]
    fn promo_rate_repr() {
        assert_eq!(serde_json::to_string(&PromoRate::Fifteen).unwrap(), "15");
        assert_eq!(
            serde_json::from_str::<PromoRate>("20").unwrap(),
            PromoRate::Twenty
        );
        assert!(serde_json::from_str::<PromoRate>("12").is_err());

        assert_eq!("15".parse::<PromoRate>().unwrap(), PromoRate::Fifteen);
        assert_eq!("15%".parse::<PromoRate>().unwrap(), PromoRate::Fifteen);
        assert!("12".parse::<PromoRate>().is_err());
    }

    #[test]
    fn new_deal_has_one_default_option() {
        let deal = Deal::new(
            "Half-price tasting menu".to_string(),
            "Cafe Azul".to_string(),
            Category::FoodDrink,
        );
        assert_eq!(deal.status, DealStatus::Draft);
        assert_eq!(deal.options.len(), 1);
        assert!(deal.updated > 0);
    }
}
