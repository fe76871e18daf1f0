//! Derived pricing for deal options: discount, payout, revenue splits and
//! the promotional payout table. Pure arithmetic, no I/O.

use serde::Serialize;

use crate::model::{DealOption, PromoRate};

/// Money rounding granularity. Percent values are always rounded to whole
/// integers regardless of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Dollars,
    Cents,
}

impl Rounding {
    pub fn money(&self, x: f64) -> f64 {
        let x = sanitize(x);
        match self {
            Self::Dollars => x.round(),
            Self::Cents => (x * 100.0).round() / 100.0,
        }
    }
}

pub fn percent(x: f64) -> i64 {
    if x.is_finite() {
        x.round() as i64
    } else {
        0
    }
}

fn sanitize(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn derive_discount(regular: f64, deal: f64) -> i64 {
    if regular > 0.0 {
        percent((regular - deal) / regular * 100.0)
    } else {
        0
    }
}

impl DealOption {
    pub fn merchant_margin(&self) -> u8 {
        100 - self.platform_margin_percent
    }

    fn payout(&self, rounding: Rounding) -> f64 {
        rounding.money(self.deal_price * f64::from(self.merchant_margin()) / 100.0)
    }

    /// The regular price was edited: only the discount follows (the deal
    /// price the merchant agreed on stays put).
    pub fn set_regular_price(&mut self, value: f64) {
        self.regular_price = sanitize(value);
        self.discount_percent = derive_discount(self.regular_price, self.deal_price);
    }

    pub fn set_deal_price(&mut self, value: f64, rounding: Rounding) {
        self.deal_price = sanitize(value);
        self.discount_percent = derive_discount(self.regular_price, self.deal_price);
        self.merchant_payout = self.payout(rounding);
    }

    pub fn set_discount_percent(&mut self, value: i64, rounding: Rounding) {
        self.discount_percent = value.clamp(0, 100);
        self.deal_price =
            rounding.money(self.regular_price * (1.0 - self.discount_percent as f64 / 100.0));
        self.merchant_payout = self.payout(rounding);
    }

    pub fn set_platform_margin(&mut self, value: u8, rounding: Rounding) {
        self.platform_margin_percent = value.min(100);
        self.merchant_payout = self.payout(rounding);
    }

    /// Re-derives every dependent field from the primary inputs. Editing a
    /// single field via the setters above never leaves anything stale; this
    /// exists for files written by hand or by older versions.
    pub fn recompute(&mut self, rounding: Rounding) {
        self.regular_price = sanitize(self.regular_price);
        self.deal_price = sanitize(self.deal_price);
        self.discount_percent = derive_discount(self.regular_price, self.deal_price);
        self.merchant_payout = self.payout(rounding);
    }

    pub fn summary(&self, rounding: Rounding) -> OptionSummary {
        let regular = sanitize(self.regular_price);
        let deal = sanitize(self.deal_price);
        let merchant_margin = self.merchant_margin();
        let platform_margin = self.platform_margin_percent;

        let promo =
            PromoSplit::compute(regular, self.merchant_pays_max, self.promo_discount, rounding);
        let worst =
            PromoSplit::compute(regular, self.merchant_pays_max, PromoRate::Twenty, rounding);

        OptionSummary {
            // The plain split is always shown in whole dollars; the three
            // figures round independently, so they need not sum to the deal
            // price exactly.
            customer_pays: percent(deal),
            merchant_gets: percent(deal * f64::from(merchant_margin) / 100.0),
            merchant_margin,
            platform_gets: percent(deal * f64::from(platform_margin) / 100.0),
            platform_margin,
            merchant_pays_max_amount: promo.max_amount,
            merchant_gets_min: worst.merchant_gets,
            promo_discount_amount: promo.discount_amount,
            split_merchant_pays: promo.merchant_pays,
            split_platform_covers: promo.platform_covers,
            unit_price_with_promo: promo.unit_price,
            merchant_gets_with_promo: promo.merchant_gets,
            platform_gets_with_promo: promo.platform_gets,
            payouts_by_promo_discount: PromoRate::all()
                .into_iter()
                .map(|rate| PayoutRow {
                    discount_percent: rate.percent(),
                    payout: PromoSplit::compute(regular, self.merchant_pays_max, rate, rounding)
                        .merchant_gets,
                })
                .collect(),
        }
    }
}

/// One promotional discount layer on top of the regular price, funded partly
/// by the merchant (capped by `merchant_pays_max`) and partly by the
/// platform. Each stage rounds before feeding the next.
#[derive(Debug, Clone, Copy)]
struct PromoSplit {
    max_amount: f64,
    discount_amount: f64,
    merchant_pays: f64,
    platform_covers: f64,
    unit_price: f64,
    merchant_gets: f64,
    platform_gets: f64,
}

impl PromoSplit {
    fn compute(regular: f64, pays_max: PromoRate, promo: PromoRate, rounding: Rounding) -> Self {
        let max_amount = rounding.money(regular * f64::from(pays_max.percent()) / 100.0);
        let discount_amount = rounding.money(regular * f64::from(promo.percent()) / 100.0);
        let merchant_pays =
            rounding.money(discount_amount * f64::from(pays_max.percent()) / 100.0);
        let platform_covers = rounding.money(discount_amount - merchant_pays);
        let unit_price = rounding.money(regular - discount_amount);
        let merchant_gets = rounding.money(regular - max_amount - platform_covers);
        let platform_gets = rounding.money(unit_price - merchant_gets);

        Self {
            max_amount,
            discount_amount,
            merchant_pays,
            platform_covers,
            unit_price,
            merchant_gets,
            platform_gets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PayoutRow {
    pub discount_percent: u8,
    pub payout: f64,
}

/// Everything the split view shows. Computed on demand, never persisted.
#[derive(Debug, Serialize)]
pub struct OptionSummary {
    pub customer_pays: i64,
    pub merchant_gets: i64,
    pub merchant_margin: u8,
    pub platform_gets: i64,
    pub platform_margin: u8,
    pub merchant_pays_max_amount: f64,
    pub merchant_gets_min: f64,
    pub promo_discount_amount: f64,
    pub split_merchant_pays: f64,
    pub split_platform_covers: f64,
    pub unit_price_with_promo: f64,
    pub merchant_gets_with_promo: f64,
    pub platform_gets_with_promo: f64,
    pub payouts_by_promo_discount: Vec<PayoutRow>,
}
