//! Free-text validators and the closing-utterance matcher.
//!
//! Pure string checks, no state.

use std::sync::LazyLock;

use regex::Regex;

use crate::estimate::parse_inr;

/// Indian mobile number: optional `+91` (with optional separator) or leading
/// `0`, then ten digits starting with 6-9.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+91[\s-]?|0)?[6-9]\d{9}$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Acknowledgment words that end a finished conversation.
static CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:thanks|thank\s+you|thank\s+u|thx|ok|okay|sure|great|cool|perfect|done|noted|sounds\s+good|cheers|got\s+it|alright)\b",
    )
    .unwrap()
});

pub fn is_valid_phone(input: &str) -> bool {
    PHONE_RE.is_match(input.trim())
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input.trim())
}

/// Parse a typed budget into whole rupees.
///
/// Accepts `125000`, `₹125,000`, `Rs 1.5L`, `2 lakh`, `1cr`. Zero, negative
/// and unparseable input yield `None`.
pub fn parse_budget_amount(input: &str) -> Option<u64> {
    parse_inr(input).filter(|amount| *amount > 0)
}

/// Whether the text reads as a thanks/acknowledgment.
pub fn is_closing_utterance(input: &str) -> bool {
    CLOSING_RE.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn phone_accepts_indian_mobiles() {
        for ok in [
            "9876543210",
            "+91 9876543210",
            "+919876543210",
            "+91-9876543210",
            "09876543210",
            "  6000000000 ",
        ] {
            assert!(is_valid_phone(ok), "{ok} should be accepted");
        }
    }

    #[test]
    fn phone_rejects_malformed() {
        for bad in [
            "",
            "12345",
            "5876543210",
            "98765432101",
            "987654321",
            "+1 9876543210",
            "98765-43210",
            "phone",
        ] {
            assert!(!is_valid_phone(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("ann.lee@acme.co.in"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("noatsign.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("@b.com"));
    }

    #[test]
    fn budget_amount_normalization() {
        assert_eq!(parse_budget_amount("125000"), Some(125_000));
        assert_eq!(parse_budget_amount("₹125,000"), Some(125_000));
        assert_eq!(parse_budget_amount("125,000 "), Some(125_000));
        assert_eq!(parse_budget_amount("Rs 1.5L"), Some(150_000));
        assert_eq!(parse_budget_amount("2 lakh"), Some(200_000));
        assert_eq!(parse_budget_amount("75k"), Some(75_000));
        assert_eq!(parse_budget_amount("1cr"), Some(10_000_000));
        assert_eq!(parse_budget_amount("99999.6"), Some(100_000));
    }

    #[test]
    fn budget_amount_rejections() {
        for bad in ["0", "-5", "abc", "", "₹", "0.2", "12 apples", "1.2.3"] {
            assert_eq!(parse_budget_amount(bad), None, "{bad} should be rejected");
        }
    }

    #[test]
    fn closing_keywords() {
        for yes in [
            "thanks a lot",
            "Thank you!",
            "OK",
            "okay then",
            "Sounds good",
            "cheers mate",
            "great, noted",
            "got it",
        ] {
            assert!(is_closing_utterance(yes), "{yes} should close");
        }
        for no in ["no", "what next?", "bookkeeping", "donezo", "okra"] {
            assert!(!is_closing_utterance(no), "{no} should not close");
        }
    }

    proptest! {
        #[test]
        fn any_mobile_with_prefix_is_valid(
            first in 6u8..=9,
            rest in "[0-9]{9}",
            prefix in prop_oneof![Just(""), Just("+91"), Just("+91 "), Just("0")],
        ) {
            let number = format!("{prefix}{first}{rest}");
            prop_assert!(is_valid_phone(&number));
        }

        #[test]
        fn leading_digit_below_six_is_invalid(first in 0u8..=5, rest in "[0-9]{9}") {
            let number = format!("{first}{rest}");
            prop_assert!(!is_valid_phone(&number));
        }

        #[test]
        fn grouped_amounts_parse_to_plain_value(n in 1u64..1_000_000_000) {
            let grouped = crate::estimate::format_inr(n);
            prop_assert_eq!(parse_budget_amount(&grouped), Some(n));
            prop_assert_eq!(parse_budget_amount(&format!("{n} ")), Some(n));
        }

        #[test]
        fn negative_amounts_never_parse(n in 1u64..1_000_000) {
            let negative = format!("-{n}");
            prop_assert_eq!(parse_budget_amount(&negative), None);
        }
    }
}
