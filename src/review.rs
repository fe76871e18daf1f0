//! Pre-qualification gate: a fixed checklist over a deal's content and
//! pricing. Deterministic, so the same deal always grades the same.

use core::fmt;

use anyhow::Result;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use crate::model::Deal;
use crate::pricing::percent;
use crate::store::DealStore;
use crate::utils::progress_bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Pass,
    Review,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Review => write!(f, "review"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub status: Verdict,
    pub score: u32,
    pub checks: Vec<Check>,
    pub recommendations: Vec<String>,
}

struct Checklist {
    checks: Vec<Check>,
    recommendations: Vec<String>,
}

impl Checklist {
    fn push(&mut self, name: &'static str, passed: bool, note: String, fix: &str) {
        if !passed {
            self.recommendations.push(fix.to_string());
        }
        self.checks.push(Check { name, passed, note });
    }
}

pub fn prequalify(deal: &Deal) -> Report {
    let mut list = Checklist {
        checks: Vec::new(),
        recommendations: Vec::new(),
    };

    let title = deal.title.trim();
    list.push(
        "title",
        title.len() >= 8,
        format!("{} characters", title.len()),
        "Give the deal a descriptive title of at least 8 characters",
    );
    list.push(
        "description",
        deal.description.len() >= 120,
        format!("{} characters", deal.description.len()),
        "Write at least 120 characters of description copy",
    );
    list.push(
        "highlights",
        !deal.highlights.is_empty(),
        format!("{} listed", deal.highlights.len()),
        "Add at least one highlight bullet",
    );
    list.push(
        "fine-print",
        !deal.fine_print.trim().is_empty(),
        String::new(),
        "Spell out the fine print (validity, exclusions)",
    );

    let options = &deal.options;
    list.push(
        "has-options",
        !options.is_empty(),
        format!("{} options", options.len()),
        "Add at least one purchasable option",
    );
    list.push(
        "options-priced",
        !options.is_empty() && options.iter().all(|x| x.deal_price > 0.0),
        String::new(),
        "Set a deal price on every option",
    );
    list.push(
        "prices-ordered",
        options.iter().all(|x| x.deal_price <= x.regular_price),
        String::new(),
        "Deal prices must not exceed the regular price",
    );
    list.push(
        "discount-range",
        !options.is_empty()
            && options
                .iter()
                .all(|x| (5..=90).contains(&x.discount_percent)),
        String::new(),
        "Keep discounts between 5% and 90%",
    );
    list.push(
        "merchant-payout",
        !options.is_empty() && options.iter().all(|x| x.merchant_payout > 0.0),
        String::new(),
        "Adjust prices or margin so the merchant payout is positive",
    );
    list.push(
        "capacity",
        options.iter().all(|x| x.monthly_capacity > 0),
        String::new(),
        "Set a monthly capacity above zero",
    );

    let passed = list.checks.iter().filter(|x| x.passed).count();
    let score = percent(passed as f64 / list.checks.len() as f64 * 100.0) as u32;
    let status = if score >= 80 {
        Verdict::Pass
    } else if score >= 50 {
        Verdict::Review
    } else {
        Verdict::Fail
    };

    Report {
        status,
        score,
        checks: list.checks,
        recommendations: list.recommendations,
    }
}

impl Report {
    pub fn print(&self) {
        println!("{} ({}%)", self.status, self.score);
        for check in &self.checks {
            let mark = if check.passed { "ok" } else { "!!" };
            if check.note.is_empty() {
                println!("  {mark} {}", check.name);
            } else {
                println!("  {mark} {} ({})", check.name, check.note);
            }
        }
        for fix in &self.recommendations {
            println!("  -> {fix}");
        }
    }
}

/// Grade every deal in the store, worst first.
pub fn main(store: &DealStore) -> Result<()> {
    let pb = progress_bar(store.deals().len() as u64);
    let reports: Vec<_> = store
        .deals()
        .par_iter()
        .map(|deal| {
            let report = prequalify(deal);
            pb.inc(1);
            (deal, report)
        })
        .collect();
    pb.finish_and_clear();

    for (deal, report) in reports
        .into_iter()
        .sorted_by_key(|(_, report)| report.score)
    {
        println!(
            "{} {:>3}% {:<7} {}",
            deal.id,
            report.score,
            report.status.to_string(),
            deal.title
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::pricing::Rounding;

    fn complete_deal() -> Deal {
        let mut deal = Deal::new(
            "Sunset kayak tour for two".to_string(),
            "Bay Tours".to_string(),
            Category::Activities,
        );
        deal.description = "Paddle out as the sun goes down, with a guide, all gear included, \
                            and hot drinks on the beach afterwards. Suitable for beginners."
            .to_string();
        deal.highlights = vec!["All gear included".to_string()];
        deal.fine_print = "Valid for 30 days. Weather dependent.".to_string();

        let option = &mut deal.options[0];
        option.regular_price = 100.0;
        option.deal_price = 60.0;
        option.recompute(Rounding::Dollars);
        deal
    }

    #[test]
    fn complete_deal_passes() {
        let report = prequalify(&complete_deal());
        assert_eq!(report.score, 100);
        assert_eq!(report.status, Verdict::Pass);
        assert_eq!(report.checks.len(), 10);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn bare_deal_fails() {
        let deal = Deal::new("Spa".to_string(), String::new(), Category::BeautySpa);
        let report = prequalify(&deal);
        assert_eq!(report.status, Verdict::Fail);
        assert_eq!(
            report.recommendations.len(),
            report.checks.iter().filter(|x| !x.passed).count()
        );
    }

    #[test]
    fn unpriced_option_needs_review() {
        let mut deal = complete_deal();
        let option = &mut deal.options[0];
        option.deal_price = 0.0;
        option.recompute(Rounding::Dollars);

        let report = prequalify(&deal);
        assert_eq!(report.score, 70);
        assert_eq!(report.status, Verdict::Review);
    }

    #[test]
    fn grading_is_deterministic() {
        let deal = complete_deal();
        let a = prequalify(&deal);
        let b = prequalify(&deal);
        assert_eq!(a.score, b.score);
        assert_eq!(a.status, b.status);
        assert_eq!(a.recommendations, b.recommendations);
    }

    #[test]
    fn overpriced_option_is_flagged() {
        let mut deal = complete_deal();
        deal.options[0].set_deal_price(150.0, Rounding::Dollars);

        let report = prequalify(&deal);
        let check = report
            .checks
            .iter()
            .find(|x| x.name == "prices-ordered")
            .unwrap();
        assert!(!check.passed);
    }
}
