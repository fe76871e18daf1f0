use std::time::{SystemTime, UNIX_EPOCH};

use indicatif::{ProgressBar, ProgressStyle};

pub fn progress_bar(len: u64) -> ProgressBar {
    ProgressBar::new(len).with_style(
        ProgressStyle::with_template("[{elapsed_precise}] {human_pos} {percent}% ({per_sec})")
            .expect("hardcoded"),
    )
}

pub fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|x| x.as_secs() as u32)
        .unwrap_or(0)
}

/// Whole amounts print without cents, everything else with two digits.
pub fn fmt_money(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("${x:.0}")
    } else {
        format!("${x:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_money_drops_empty_cents() {
        assert_eq!(fmt_money(25.0), "$25");
        assert_eq!(fmt_money(11.99), "$11.99");
        assert_eq!(fmt_money(0.4), "$0.40");
    }
}
