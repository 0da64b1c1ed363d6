//! Post-OCR character correction for blood-test reports.
//!
//! An ordered list of (pattern, replacement) rules, each targeting one known
//! recognition failure. Rules run in sequence and each is applied to every
//! non-overlapping occurrence before the next rule starts.
//!
//! Order constraints:
//! - `pipe_to_capital_i` runs first so later rules only ever see `I`, never `|`.
//! - `letter_prefix_before_digits` relies on that: `|5` becomes `I5`, then `L5`.
//! - The unit rules run after both, so `mg/d|` reaches them as `mg/dI`.
//! - `decimal_comma` touches only digits and commas, so it cannot feed
//!   any earlier rule and the whole set is idempotent.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// How a rule rewrites a match.
enum Replacement {
    /// Regex replacement template (`$1`, `${1}` for capture groups).
    Template(&'static str),
    /// Computed from the match.
    With(fn(&Captures) -> String),
}

struct CorrectionRule {
    name: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

fn rule(name: &'static str, regex_str: &str, replacement: Replacement) -> CorrectionRule {
    CorrectionRule {
        name,
        pattern: Regex::new(regex_str).expect("Invalid OCR correction regex pattern"),
        replacement,
    }
}

static CORRECTION_RULES: LazyLock<Vec<CorrectionRule>> = LazyLock::new(|| {
    vec![
        // `|` is almost always a misread capital I.
        rule("pipe_to_capital_i", r"\|", Replacement::Template("I")),
        // Word-initial l/i/I directly before digits is a misread L.
        // A literal `1` is left alone: it is indistinguishable from a digit.
        rule(
            "letter_prefix_before_digits",
            r"\b[lIi](\d+)",
            Replacement::Template("L${1}"),
        ),
        // m→rn/r, g→q/9, d→cl/0/o, L→l/1/I
        rule(
            "unit_mg_per_dl",
            r"(?i)(?:rn|m|r)[gq9]\s*/\s*(?:cl|[d0o])[l1i]\b",
            Replacement::Template("mg/dL"),
        ),
        // I→1/l/i, U→V. A `1` directly after a digit belongs to the value
        // (`41U/L`), so it only counts as I after a non-digit. The char
        // before the unit is captured and written back.
        rule(
            "unit_iu_per_l",
            r"(?i)(?:(^|\D)[1il]|(\d)[il])[uv]\s*/\s*[l1i]\b",
            Replacement::With(iu_per_l_keeping_prefix),
        ),
        // 13,5 → 13.5 and 1,2,3 → 1.2.3 in one match. Thousands
        // separators are misread as decimals (1,200 → 1.200).
        rule(
            "decimal_comma",
            r"\d(?:,\d)+",
            Replacement::With(comma_run_to_points),
        ),
    ]
});

fn iu_per_l_keeping_prefix(caps: &Captures) -> String {
    let prefix = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
    format!("{prefix}IU/L")
}

fn comma_run_to_points(caps: &Captures) -> String {
    caps[0].replace(',', ".")
}

/// Correct systematic OCR confusions in recognized report text.
///
/// Pure and total: empty input yields empty output, and
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.to_string();
    for r in CORRECTION_RULES.iter() {
        let corrected = match &r.replacement {
            Replacement::Template(t) => r.pattern.replace_all(&text, *t),
            Replacement::With(f) => r.pattern.replace_all(&text, |caps: &Captures| f(caps)),
        };
        if let Cow::Owned(s) = corrected {
            tracing::debug!(rule = r.name, "OCR correction rule applied");
            text = s;
        }
    }
    text
}

/// Names of the correction rules in application order.
pub fn correction_rule_names() -> Vec<&'static str> {
    CORRECTION_RULES.iter().map(|r| r.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_run_in_documented_order() {
        assert_eq!(
            correction_rule_names(),
            vec![
                "pipe_to_capital_i",
                "letter_prefix_before_digits",
                "unit_mg_per_dl",
                "unit_iu_per_l",
                "decimal_comma",
            ]
        );
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn clean_text_unchanged() {
        let text = "Hemoglobin: 13.5 g/dL\nGlucose : 250 mg/dL\nALT: 30 IU/L";
        assert_eq!(normalize(text), text);
    }

    // ── Rule 1 ───────────────────────────────────────────

    #[test]
    fn pipe_becomes_capital_i() {
        assert_eq!(normalize("|ron panel"), "Iron panel");
    }

    // ── Rule 2 ───────────────────────────────────────────

    #[test]
    fn word_initial_l_or_i_before_digits_becomes_l() {
        assert_eq!(normalize("value l20"), "value L20");
        assert_eq!(normalize("value i20"), "value L20");
        assert_eq!(normalize("value I20"), "value L20");
    }

    #[test]
    fn pipe_before_digits_resolves_through_capital_i() {
        // Needs rule 1 to have turned `|` into `I` first.
        assert_eq!(normalize("code |5"), "code L5");
    }

    #[test]
    fn numbers_starting_with_one_are_kept() {
        assert_eq!(normalize("Hemoglobin: 13.5"), "Hemoglobin: 13.5");
        assert_eq!(normalize("Vitamin B12: 450"), "Vitamin B12: 450");
        assert_eq!(normalize("HbA1c: 5.4"), "HbA1c: 5.4");
    }

    #[test]
    fn letters_inside_words_are_kept() {
        assert_eq!(normalize("Vol12"), "Vol12");
    }

    // ── Rule 3 ───────────────────────────────────────────

    #[test]
    fn garbled_mg_per_dl_is_canonicalized() {
        assert_eq!(normalize("Glucose 95 rng/d1"), "Glucose 95 mg/dL");
        assert_eq!(normalize("Glucose 95 mq/dl"), "Glucose 95 mg/dL");
        assert_eq!(normalize("Glucose 95 m9 / cll"), "Glucose 95 mg/dL");
        assert_eq!(normalize("Glucose 95 MG/DL"), "Glucose 95 mg/dL");
        assert_eq!(normalize("Glucose 95mg/0l"), "Glucose 95mg/dL");
    }

    #[test]
    fn mg_per_dl_with_pipe_resolves_through_capital_i() {
        assert_eq!(normalize("95 mg/d|"), "95 mg/dL");
    }

    // ── Rule 4 ───────────────────────────────────────────

    #[test]
    fn garbled_iu_per_l_is_canonicalized() {
        assert_eq!(normalize("ALT 30 lU/L"), "ALT 30 IU/L");
        assert_eq!(normalize("ALT 30 1U/1"), "ALT 30 IU/L");
        assert_eq!(normalize("ALT 30 iu/l"), "ALT 30 IU/L");
        assert_eq!(normalize("ALT 30 |V/L"), "ALT 30 IU/L");
    }

    #[test]
    fn digit_one_after_value_stays_part_of_value() {
        assert_eq!(normalize("ALT: 41U/L\nAST: 21U/L"), "ALT: 41U/L\nAST: 21U/L");
        assert_eq!(normalize("ALT: 41 U/L"), "ALT: 41 U/L");
    }

    #[test]
    fn letter_unit_glued_to_value_is_canonicalized() {
        assert_eq!(normalize("ALT: 4lU/L"), "ALT: 4IU/L");
        assert_eq!(normalize("lu/l at start"), "IU/L at start");
    }

    #[test]
    fn milli_international_units_keep_prefix() {
        assert_eq!(normalize("TSH 2.1 mIU/L"), "TSH 2.1 mIU/L");
        assert_eq!(normalize("TSH 2.1 mlu/l"), "TSH 2.1 mIU/L");
    }

    #[test]
    fn other_units_untouched() {
        assert_eq!(normalize("Sodium 140 mmol/L"), "Sodium 140 mmol/L");
        assert_eq!(normalize("Vitamin D 32 ng/mL"), "Vitamin D 32 ng/mL");
    }

    // ── Rule 5 ───────────────────────────────────────────

    #[test]
    fn decimal_comma_becomes_point() {
        assert_eq!(normalize("Creatinine: 0,9"), "Creatinine: 0.9");
        assert_eq!(normalize("Hemoglobin 13,5 g/dL"), "Hemoglobin 13.5 g/dL");
    }

    #[test]
    fn thousands_separator_is_read_as_decimal() {
        // Known limitation: locale-naive.
        assert_eq!(normalize("Platelets 1,200"), "Platelets 1.200");
    }

    #[test]
    fn comma_runs_are_rewritten_in_one_match() {
        assert_eq!(normalize("1,2,3"), "1.2.3");
    }

    #[test]
    fn list_commas_untouched() {
        assert_eq!(normalize("Glucose, fasting"), "Glucose, fasting");
        assert_eq!(normalize("5, 6"), "5, 6");
    }

    // ── Whole set ────────────────────────────────────────

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "Patient: Jane Doe\nDate: 12/05/2024",
            "Hemoglobin: 13,5 g/dl\nGlucose | 250 rng/d1",
            "ALT l20 1U/1, AST i5 iu/l",
            "1,2,3,4 and |||",
            "mg/d| mq/cll m9/0i",
            "code |5 l7 i9 I2",
            "TSH 2,1 mlu/l",
            "ALT: 41U/L 4lU/l 1u/1",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn normalize_is_deterministic() {
        let raw = "Hemoglobin: 13,5 g/dl rng/d1";
        assert_eq!(normalize(raw), normalize(raw));
    }
}
