//! Title pre-filter — rejects obviously out-of-domain roles before any API call.

use std::sync::OnceLock;

use regex::RegexSet;

/// Reason string persisted alongside the sentinel score for rejected jobs.
/// Distinguishes "evaluated and excluded" from "not yet evaluated".
pub const PREFILTER_REASON: &str = "Pre-filtered: function mismatch";

/// Case-insensitive patterns for functions the candidate is not targeting.
/// A match on any pattern rejects the job at zero external cost.
const FILTER_PATTERNS: &[&str] = &[
    r"(?i)\bpayroll\b",
    r"(?i)\bprocurement\b",
    r"(?i)\brecruiter\b",
    r"(?i)\brecruiting\b",
    r"(?i)\btalent acquisition\b",
    r"(?i)\bhuman resources\b",
    r"(?i)\boffice manager\b",
    r"(?i)\bexecutive assistant\b",
    r"(?i)\badministrative\b",
    r"(?i)\baccountant\b",
    r"(?i)\baudit\b",
    r"(?i)\blegal counsel\b",
    r"(?i)\bcompliance officer\b",
    r"(?i)\bmarketing\b",
    r"(?i)\bsales\b",
    r"(?i)\bgraphic design\b",
    r"(?i)\bcontent writer\b",
    r"(?i)\bcopywriter\b",
    r"(?i)\binterior design\b",
    r"(?i)\bfacilities\b",
];

fn filter_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| RegexSet::new(FILTER_PATTERNS).expect("pre-filter patterns are valid"))
}

/// Returns the rejection reason if the title matches any filter pattern,
/// else `None` (job proceeds to scoring). Deterministic.
pub fn pre_filter(title: &str) -> Option<&'static str> {
    if filter_set().is_match(title) {
        Some(PREFILTER_REASON)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_domain_titles() {
        assert_eq!(pre_filter("Payroll Specialist"), Some(PREFILTER_REASON));
        assert_eq!(pre_filter("Senior Compliance Officer"), Some(PREFILTER_REASON));
        assert_eq!(pre_filter("Talent Acquisition Lead"), Some(PREFILTER_REASON));
        assert_eq!(pre_filter("Executive Assistant to CEO"), Some(PREFILTER_REASON));
    }

    #[test]
    fn test_passes_engineering_titles() {
        assert_eq!(pre_filter("Software Engineer — Trading Systems"), None);
        assert_eq!(pre_filter("Graduate Quantitative Developer"), None);
        assert_eq!(pre_filter("C++ Engineer, Market Data"), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(pre_filter("PAYROLL MANAGER"), Some(PREFILTER_REASON));
        assert_eq!(pre_filter("payroll manager"), Some(PREFILTER_REASON));
    }

    #[test]
    fn test_word_boundaries_avoid_substring_hits() {
        // "sales" must not fire inside an unrelated word
        assert_eq!(pre_filter("Salesforce Platform Engineer"), None);
    }

    #[test]
    fn test_is_deterministic() {
        let title = "Senior Compliance Officer";
        let first = pre_filter(title);
        for _ in 0..10 {
            assert_eq!(pre_filter(title), first);
        }
    }
}
