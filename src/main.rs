mod content;
mod model;
mod pricing;
mod review;
mod settings;
mod store;
mod utils;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;

use crate::model::{Category, DealOption, PromoRate};
use crate::pricing::Rounding;
use crate::settings::Settings;
use crate::store::DealStore;
use crate::utils::fmt_money;

#[derive(Debug, Parser)]
struct Cli {
    /// Directory holding deals.json, settings.json and templates.yaml
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Round money to cents for this run, whatever the settings say
    #[arg(long)]
    cents: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-derive every option's dependent figures and rewrite the file
    Check,
    /// Create a deal with a single default option
    New {
        title: String,
        #[arg(long)]
        merchant: Option<String>,
        #[arg(long, value_enum)]
        category: Option<Category>,
    },
    /// One line per deal
    List,
    /// Edit one pricing field of an option; its dependents follow
    Set {
        deal: String,
        option: String,
        /// Merchant's regular price
        #[arg(long)]
        regular: Option<f64>,
        /// Discounted price the customer pays
        #[arg(long)]
        price: Option<f64>,
        /// Discount percent; the deal price follows
        #[arg(long)]
        discount: Option<i64>,
        /// Platform margin percent
        #[arg(long)]
        margin: Option<u8>,
        /// Cap on the merchant's promo contribution (5/10/15/20)
        #[arg(long)]
        max: Option<u8>,
        /// Promotional discount rate (5/10/15/20)
        #[arg(long)]
        promo: Option<u8>,
    },
    /// Show the full revenue split for an option
    Split {
        deal: String,
        option: String,
        #[arg(long)]
        json: bool,
    },
    /// Append a default option to a deal
    NewOption { deal: String },
    /// Grade one deal against the pre-qualification checklist, or all of them
    Review { deal: Option<String> },
    /// Fill in description, highlights and fine print from templates
    Generate { deal: String },
    /// Deep-merge a json patch into a deal
    Patch { deal: String, patch: String },
    /// Delete a deal, or one of its options
    Remove {
        deal: String,
        option: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.data_dir.join("settings.json"))?;
    let rounding = if cli.cents {
        Rounding::Cents
    } else {
        settings.rounding()
    };
    let mut store = DealStore::load(&cli.data_dir.join("deals.json"))?;

    match cli.command {
        Command::Check => {
            let mut drifted = 0;
            for deal in store.deals_mut() {
                for option in &mut deal.options {
                    let before = option.clone();
                    option.recompute(rounding);
                    if *option != before {
                        drifted += 1;
                        eprintln!("Recomputed {}/{}", deal.id, option.id);
                    }
                }
            }
            store.save()?;
            eprintln!(
                "{} deals written ({drifted} options recomputed)",
                store.deals().len()
            );
        }
        Command::New {
            title,
            merchant,
            category,
        } => {
            let deal = store.create(
                title,
                merchant.unwrap_or_default(),
                category.unwrap_or_default(),
            );
            println!("{}", deal.id);
            store.save()?;
        }
        Command::List => {
            for deal in store
                .deals()
                .iter()
                .sorted_by_key(|x| (x.status, x.title.clone()))
            {
                println!(
                    "{} {:<9} {:<2} options  {}",
                    deal.id,
                    deal.status.to_string(),
                    deal.options.len(),
                    deal.title
                );
            }
            let counts = store.deals().iter().counts_by(|x| x.status);
            let line = counts
                .into_iter()
                .sorted()
                .map(|(status, n)| format!("{n} {status}"))
                .join(", ");
            if !line.is_empty() {
                eprintln!("{line}");
            }
        }
        Command::Set {
            deal,
            option,
            regular,
            price,
            discount,
            margin,
            max,
            promo,
        } => {
            let edits = [
                regular.is_some(),
                price.is_some(),
                discount.is_some(),
                margin.is_some(),
                max.is_some(),
                promo.is_some(),
            ];
            if edits.iter().filter(|x| **x).count() != 1 {
                bail!("Set exactly one field per edit");
            }

            let deal = store.get_mut(&deal)?;
            let Some(target) = deal.option_mut(&option) else {
                bail!("No option with id: {option}");
            };
            if let Some(x) = regular {
                target.set_regular_price(x);
            }
            if let Some(x) = price {
                target.set_deal_price(x, rounding);
            }
            if let Some(x) = discount {
                target.set_discount_percent(x, rounding);
            }
            if let Some(x) = margin {
                target.set_platform_margin(x, rounding);
            }
            if let Some(x) = max {
                target.merchant_pays_max = PromoRate::from_percent(x)?;
            }
            if let Some(x) = promo {
                target.promo_discount = PromoRate::from_percent(x)?;
            }

            let snapshot = target.clone();
            deal.touch();
            store.save()?;
            print_summary(&snapshot, rounding);
        }
        Command::Split { deal, option, json } => {
            let deal = store.get(&deal)?;
            let Some(target) = deal.option(&option) else {
                bail!("No option with id: {option}");
            };
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&target.summary(rounding))?
                );
            } else {
                print_summary(target, rounding);
            }
        }
        Command::NewOption { deal } => {
            let id = store.add_option(&deal)?;
            store.save()?;
            println!("{id}");
        }
        Command::Review { deal } => match deal {
            Some(id) => review::prequalify(store.get(&id)?).print(),
            None => review::main(&store)?,
        },
        Command::Generate { deal } => {
            let templates = content::Templates::load(&cli.data_dir.join("templates.yaml"))?;
            content::run(&mut store, &deal, &templates)?;
            store.save()?;
        }
        Command::Patch { deal, patch } => {
            let patch = serde_json::from_str(&patch).context("Patch is not valid json")?;
            let merged = store.update_fields(&deal, patch)?;
            store.save()?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        Command::Remove { deal, option } => {
            match option {
                Some(option) => {
                    let removed = store.remove_option(&deal, &option)?;
                    eprintln!("Removed option {}", removed.id);
                }
                None => {
                    let removed = store.remove(&deal)?;
                    eprintln!("Removed {} ({})", removed.id, removed.title);
                }
            }
            store.save()?;
        }
    }

    Ok(())
}

fn print_summary(option: &DealOption, rounding: Rounding) {
    let s = option.summary(rounding);

    println!(
        "{} {}  (regular {}, {}% off)",
        option.id,
        fmt_money(option.deal_price),
        fmt_money(option.regular_price),
        option.discount_percent
    );
    println!("Revenue split");
    println!("  customer pays    {}", fmt_money(s.customer_pays as f64));
    println!(
        "  merchant gets    {} ({}%)",
        fmt_money(s.merchant_gets as f64),
        s.merchant_margin
    );
    println!(
        "  platform gets    {} ({}%)",
        fmt_money(s.platform_gets as f64),
        s.platform_margin
    );
    println!(
        "With {} promotion (merchant pays up to {} = {})",
        option.promo_discount,
        option.merchant_pays_max,
        fmt_money(s.merchant_pays_max_amount)
    );
    println!(
        "  unit price       {}",
        fmt_money(s.unit_price_with_promo)
    );
    println!(
        "  discount         {} (merchant {}, platform {})",
        fmt_money(s.promo_discount_amount),
        fmt_money(s.split_merchant_pays),
        fmt_money(s.split_platform_covers)
    );
    println!(
        "  merchant gets    {} (worst case {})",
        fmt_money(s.merchant_gets_with_promo),
        fmt_money(s.merchant_gets_min)
    );
    println!(
        "  platform gets    {}",
        fmt_money(s.platform_gets_with_promo)
    );
    println!("Merchant payout by promo discount");
    for row in &s.payouts_by_promo_discount {
        println!("  {:>3}%  {}", row.discount_percent, fmt_money(row.payout));
    }
}
