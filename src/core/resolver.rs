use crate::core::ledger::CurrencyLedger;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

/// Number of calendar days scanned backwards when the requested date has no
/// rate of its own.
pub const FALLBACK_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub date: NaiveDate,
}

/// Point-in-time lookup: the exact date, otherwise the closest earlier date
/// within the fallback window. Never looks forward.
pub fn find(ledger: &CurrencyLedger, target: NaiveDate) -> Option<ResolvedRate> {
    if let Some(rate) = ledger.get(&target) {
        return Some(ResolvedRate { rate, date: target });
    }

    (1..=FALLBACK_WINDOW_DAYS)
        .map_while(|days_back| target.checked_sub_days(Days::new(days_back)))
        .find_map(|date| ledger.get(&date).map(|rate| ResolvedRate { rate, date }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::QuoteDirection;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn ledger(entries: &[(&str, &str)]) -> CurrencyLedger {
        let mut ledger = CurrencyLedger::new(QuoteDirection::UsdTo("PLN".to_string()));
        for (d, r) in entries {
            ledger.insert(date(d), Decimal::from_str(r).unwrap());
        }
        ledger
    }

    #[test]
    fn test_exact_date_has_priority() {
        let ledger = ledger(&[("2024-03-01", "3.95"), ("2024-03-04", "3.97")]);
        let resolved = find(&ledger, date("2024-03-04")).unwrap();
        assert_eq!(resolved.date, date("2024-03-04"));
        assert_eq!(resolved.rate, Decimal::from_str("3.97").unwrap());
    }

    #[test]
    fn test_fallback_picks_closest_earlier_date() {
        let ledger = ledger(&[("2024-02-28", "3.90"), ("2024-03-01", "3.95")]);
        // weekend gap
        let resolved = find(&ledger, date("2024-03-03")).unwrap();
        assert_eq!(resolved.date, date("2024-03-01"));
    }

    #[test]
    fn test_fallback_window_is_bounded() {
        let ledger = ledger(&[("2024-01-01", "4.0015")]);
        assert_eq!(
            find(&ledger, date("2024-01-31")).map(|r| r.date),
            Some(date("2024-01-01"))
        );
        assert!(find(&ledger, date("2024-02-01")).is_none());
    }

    #[test]
    fn test_never_resolves_forward() {
        let ledger = ledger(&[("2020-01-01", "3.80")]);
        assert!(find(&ledger, date("2019-12-31")).is_none());
    }
}
