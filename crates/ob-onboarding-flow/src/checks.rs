//! Validation primitives shared by every form.
//!
//! Each check reads from a step document and records at most one message
//! per path. Paths are dotted and relative to the step document; the engine
//! re-roots them under `stepN` before they reach the caller.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use ob_onboarding_types::{FieldErrors, FieldPath};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::document::{DateValue, Doc};
use crate::options::{OptionKey, Selection};

// ============================================================================
// FORMATS
// ============================================================================

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").unwrap());

static EIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}-\d{7}$").unwrap());

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]{7,20}$").unwrap());

static CRD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,8}$").unwrap());

/// Text formats checked by [`format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Email,
    Ssn,
    Ein,
    Phone,
    CrdNumber,
}

impl TextFormat {
    fn regex(&self) -> &'static Regex {
        match self {
            TextFormat::Email => &EMAIL_RE,
            TextFormat::Ssn => &SSN_RE,
            TextFormat::Ein => &EIN_RE,
            TextFormat::Phone => &PHONE_RE,
            TextFormat::CrdNumber => &CRD_RE,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            TextFormat::Email => "a valid email address",
            TextFormat::Ssn => "in the format ###-##-####",
            TextFormat::Ein => "in the format ##-#######",
            TextFormat::Phone => "a valid phone number",
            TextFormat::CrdNumber => "digits only",
        }
    }
}

fn path(dotted: &str) -> FieldPath {
    FieldPath::parse(dotted)
}

// ============================================================================
// REQUIRED / FORMAT
// ============================================================================

/// Non-blank text.
pub fn required_text(doc: Doc<'_>, dotted: &str, label: &str, errors: &mut FieldErrors) -> bool {
    if doc.has_text(dotted) {
        return true;
    }
    errors.insert(path(dotted), format!("{label} is required"));
    false
}

/// Non-blank text with a caller-worded message.
pub fn required_text_with(doc: Doc<'_>, dotted: &str, message: &str, errors: &mut FieldErrors) {
    if !doc.has_text(dotted) {
        errors.insert(path(dotted), message);
    }
}

/// Format of a text leaf; blank passes unless `required`.
pub fn format(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    fmt: TextFormat,
    required: bool,
    errors: &mut FieldErrors,
) {
    let text = doc.text(dotted);
    if text.is_empty() {
        if required {
            errors.insert(path(dotted), format!("{label} is required"));
        }
        return;
    }
    if !fmt.regex().is_match(text) {
        errors.insert(path(dotted), format!("{label} must be {}", fmt.hint()));
    }
}

// ============================================================================
// OPTION MAPS
// ============================================================================

/// Exactly one flag of the option map must be true.
pub fn exactly_one<E: OptionKey>(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Option<E> {
    let selection = doc.selection::<E>(dotted);
    if selection.count() != 1 {
        errors.insert(path(dotted), format!("Select exactly one {label}"));
    }
    selection.one()
}

/// At least one flag of the option map must be true.
pub fn at_least_one<E: OptionKey>(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    errors: &mut FieldErrors,
) -> Selection<E> {
    let selection = doc.selection::<E>(dotted);
    if selection.is_empty() {
        errors.insert(path(dotted), format!("Select at least one {label}"));
    }
    selection
}

// ============================================================================
// NUMBERS / DATES
// ============================================================================

/// Amount leaf: a number (or null when not `required`) that is not negative.
pub fn amount(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<Decimal> {
    match doc.get(dotted) {
        None | Some(Value::Null) => {
            if required {
                errors.insert(path(dotted), format!("{label} is required"));
            }
            None
        }
        Some(value) => match crate::document::to_decimal(value) {
            Some(v) if v.is_sign_negative() && !v.is_zero() => {
                errors.insert(path(dotted), format!("{label} must be zero or greater"));
                None
            }
            Some(v) => Some(v),
            None => {
                errors.insert(path(dotted), format!("{label} must be a number"));
                None
            }
        },
    }
}

/// Every named line of an amount group, errors keyed per line.
pub fn amount_group(doc: Doc<'_>, group: &str, lines: &[&str], errors: &mut FieldErrors) {
    for line in lines {
        amount(doc, &format!("{group}.{line}"), &line_label(line), false, errors);
    }
}

fn line_label(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Four-digit year within `min_year..=today.year()`.
pub fn plausible_year(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    min_year: i32,
    today: NaiveDate,
    errors: &mut FieldErrors,
) {
    let max_year = today.year();
    let ok = doc
        .integer(dotted)
        .or_else(|| doc.text(dotted).parse::<i64>().ok())
        .is_some_and(|y| (i64::from(min_year)..=i64::from(max_year)).contains(&y));
    if !ok {
        errors.insert(
            path(dotted),
            format!("{label} must be a 4-digit year between {min_year} and {max_year}"),
        );
    }
}

/// Date rules beyond "parses as YYYY-MM-DD".
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRule {
    pub required: bool,
    pub not_future: bool,
    pub not_before: Option<NaiveDate>,
}

impl DateRule {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn not_future(mut self) -> Self {
        self.not_future = true;
        self
    }

    pub fn not_before(mut self, earliest: Option<NaiveDate>) -> Self {
        self.not_before = earliest;
        self
    }
}

pub fn date(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    rule: DateRule,
    today: NaiveDate,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    match doc.date(dotted) {
        DateValue::Missing => {
            if rule.required {
                errors.insert(path(dotted), format!("{label} is required"));
            }
            None
        }
        DateValue::Invalid => {
            errors.insert(
                path(dotted),
                format!("{label} must be a valid date (YYYY-MM-DD)"),
            );
            None
        }
        DateValue::Valid(d) if rule.not_future && d > today => {
            errors.insert(path(dotted), format!("{label} cannot be in the future"));
            None
        }
        DateValue::Valid(d) => match rule.not_before {
            Some(earliest) if d < earliest => {
                errors.insert(
                    path(dotted),
                    format!("{label} cannot be before {}", earliest.format("%Y-%m-%d")),
                );
                None
            }
            _ => Some(d),
        },
    }
}

// ============================================================================
// COMPOSITES
// ============================================================================

pub const PHONE_KINDS: [&str; 3] = ["home", "business", "mobile"];

/// Phone group at `<dotted>.{home,business,mobile}`: each present number is
/// well-formed; when `require_one`, at least one is given (error at the group).
pub fn phones(doc: Doc<'_>, dotted: &str, require_one: bool, errors: &mut FieldErrors) {
    let mut any = false;
    for kind in PHONE_KINDS {
        let leaf = format!("{dotted}.{kind}");
        if doc.has_text(&leaf) {
            any = true;
            format(doc, &leaf, &line_label(kind), TextFormat::Phone, false, errors);
        }
    }
    if require_one && !any {
        errors.insert(
            path(dotted),
            "Provide at least one phone number (home, business, or mobile)",
        );
    }
}

/// Postal address with line1, city, postalCode and country required.
pub fn address(doc: Doc<'_>, dotted: &str, errors: &mut FieldErrors) {
    for (leaf, label) in [
        ("line1", "Address line 1"),
        ("city", "City"),
        ("postalCode", "Postal code"),
        ("country", "Country"),
    ] {
        required_text(doc, &format!("{dotted}.{leaf}"), label, errors);
    }
}

/// Signature block `{typedSignature, printedName, date}`: all parts present
/// or all absent; `required` makes "all absent" an error at the block path.
pub fn signature(
    doc: Doc<'_>,
    dotted: &str,
    label: &str,
    required: bool,
    today: NaiveDate,
    errors: &mut FieldErrors,
) {
    let typed = format!("{dotted}.typedSignature");
    let printed = format!("{dotted}.printedName");
    let signed_on = format!("{dotted}.date");

    let present = [
        doc.has_text(&typed),
        doc.has_text(&printed),
        doc.date(&signed_on) != DateValue::Missing,
    ];
    if present.iter().all(|p| !p) {
        if required {
            errors.insert(path(dotted), format!("{label} signature is required"));
        }
        return;
    }

    let incomplete = format!("required to complete the {label} signature");
    if !present[0] {
        errors.insert(path(&typed), format!("Typed signature is {incomplete}"));
    }
    if !present[1] {
        errors.insert(path(&printed), format!("Printed name is {incomplete}"));
    }
    if present[2] {
        date(
            doc,
            &signed_on,
            "Signature date",
            DateRule::default().not_future(),
            today,
            errors,
        );
    } else {
        errors.insert(path(&signed_on), format!("Signature date is {incomplete}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::YesNo;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_exactly_one_reports_at_option_map() {
        let fields = json!({"flag": {"yes": true, "no": true}});
        let mut errors = FieldErrors::new();
        let chosen = exactly_one::<YesNo>(Doc::new(&fields), "flag", "answer", &mut errors);
        assert_eq!(chosen, None);
        assert!(errors.message("flag").unwrap().contains("exactly one"));
    }

    #[test]
    fn test_amounts_reject_negative_and_text() {
        let fields = json!({"a": -1, "b": "12", "c": 0, "d": null});
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        amount(doc, "a", "A", false, &mut errors);
        amount(doc, "b", "B", false, &mut errors);
        assert_eq!(amount(doc, "c", "C", true, &mut errors), Some(Decimal::ZERO));
        assert_eq!(amount(doc, "d", "D", false, &mut errors), None);
        assert_eq!(errors.message("a"), Some("A must be zero or greater"));
        assert_eq!(errors.message("b"), Some("B must be a number"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_year_bounds() {
        let fields = json!({"old": 1850, "ok": 2010, "future": 2030, "text": "2001"});
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        for leaf in ["old", "ok", "future", "text"] {
            plausible_year(doc, leaf, "Since year", 1900, today(), &mut errors);
        }
        assert!(errors.message("old").is_some());
        assert!(errors.message("future").is_some());
        assert!(errors.message("ok").is_none());
        assert!(errors.message("text").is_none());
    }

    #[test]
    fn test_dates() {
        let fields = json!({"future": "2027-01-01", "bad": "01/02/2020", "early": "2020-01-01"});
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        date(doc, "future", "Date", DateRule::required().not_future(), today(), &mut errors);
        date(doc, "bad", "Date", DateRule::default(), today(), &mut errors);
        date(doc, "missing", "Establishment date", DateRule::required(), today(), &mut errors);
        date(
            doc,
            "early",
            "Sent",
            DateRule::required().not_before(NaiveDate::from_ymd_opt(2021, 1, 1)),
            today(),
            &mut errors,
        );
        assert_eq!(errors.message("future"), Some("Date cannot be in the future"));
        assert!(errors.message("bad").unwrap().contains("valid date"));
        assert!(errors.message("missing").unwrap().contains("required"));
        assert!(errors.message("early").unwrap().contains("cannot be before"));
    }

    #[test]
    fn test_formats() {
        let fields = json!({
            "ssn": "123-45-6789", "badSsn": "123456789",
            "ein": "12-3456789", "email": "jane@example", "phone": "(555) 123-4567"
        });
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        format(doc, "ssn", "SSN", TextFormat::Ssn, true, &mut errors);
        format(doc, "badSsn", "SSN", TextFormat::Ssn, true, &mut errors);
        format(doc, "ein", "EIN", TextFormat::Ein, true, &mut errors);
        format(doc, "email", "Email", TextFormat::Email, true, &mut errors);
        format(doc, "phone", "Phone", TextFormat::Phone, true, &mut errors);
        assert_eq!(errors.len(), 2);
        assert!(errors.message("badSsn").is_some());
        assert!(errors.message("email").is_some());
    }

    #[test]
    fn test_phone_group_needs_one_number() {
        let fields = json!({"phones": {"home": "", "business": "", "mobile": ""}});
        let mut errors = FieldErrors::new();
        phones(Doc::new(&fields), "phones", true, &mut errors);
        assert!(errors.message("phones").unwrap().contains("at least one"));
    }

    #[test]
    fn test_signature_all_or_nothing() {
        let fields = json!({
            "empty": {"typedSignature": "", "printedName": "", "date": null},
            "partial": {"typedSignature": "J. Doe", "printedName": "", "date": null},
            "full": {"typedSignature": "J. Doe", "printedName": "Jane Doe", "date": "2026-05-01"}
        });
        let doc = Doc::new(&fields);
        let mut errors = FieldErrors::new();
        signature(doc, "empty", "Supervisor", false, today(), &mut errors);
        assert!(errors.is_empty());

        signature(doc, "empty", "Account owner", true, today(), &mut errors);
        assert_eq!(errors.message("empty"), Some("Account owner signature is required"));

        signature(doc, "partial", "Account owner", true, today(), &mut errors);
        assert!(errors.message("partial.printedName").is_some());
        assert!(errors.message("partial.date").is_some());
        assert!(errors.message("partial.typedSignature").is_none());

        let mut errors = FieldErrors::new();
        signature(doc, "full", "Account owner", true, today(), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_line_labels() {
        assert_eq!(line_label("cashMoneyMarketsCds"), "Cash money markets cds");
        assert_eq!(line_label("salary"), "Salary");
    }
}
