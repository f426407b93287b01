//! Categorical code tables.
//!
//! Each enum maps free spreadsheet text onto the one or two character code the
//! clearinghouse expects. Tables are either open (unknown input maps to a
//! fallback code) or closed (unknown input is an `InvalidValue`).

use crate::error::{FormatError, Result};
use crate::field::{fold_diacritics, only_digits};

fn folded_upper(value: &str) -> String {
    fold_diacritics(value.trim()).to_uppercase()
}

/// Interest index. Closed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indexer {
    /// Exchange-rate variation, `0000`.
    Vcp,
    /// `0001`.
    Selic,
    /// Interbank deposit rate, `0003`.
    Di,
    /// Reference rate, `0020`.
    Tr,
    /// Fixed rate, `0099`.
    Pre,
}

impl Indexer {
    /// Resolve an index name; accents and case are ignored.
    pub fn parse(value: &str, field: &str) -> Result<Self> {
        let key = folded_upper(value);
        match key.as_str() {
            "" => Err(FormatError::missing(field)),
            "VCP" => Ok(Self::Vcp),
            "SELIC" => Ok(Self::Selic),
            "DI" => Ok(Self::Di),
            "TR" => Ok(Self::Tr),
            "PRE" | "PRE-FIXADO" | "PRE FIXADO" | "PREFIXADO" => Ok(Self::Pre),
            _ => Err(FormatError::invalid_value(
                field,
                value.trim(),
                "use VCP, SELIC, DI, TR or PRE-FIXADO",
            )),
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Vcp => "0000",
            Self::Selic => "0001",
            Self::Di => "0003",
            Self::Tr => "0020",
            Self::Pre => "0099",
        }
    }

    /// Floating indexes that cannot be rendered without a rate.
    #[must_use]
    pub const fn requires_rate(self) -> bool {
        matches!(self, Self::Selic | Self::Di)
    }

    /// Indexes for which a floating rate is written at all.
    #[must_use]
    pub const fn accepts_rate(self) -> bool {
        matches!(self, Self::Vcp | Self::Selic | Self::Di)
    }
}

/// Guarantee kind. Open table: anything unrecognised is "no guarantee".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuaranteeKind {
    Floating,
    Unsecured,
    Real,
    None,
    Subordinated,
}

impl GuaranteeKind {
    /// Match by keyword containment.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let key = folded_upper(value);
        if key.contains("FLUTUANTE") {
            Self::Floating
        } else if key.contains("QUIROGRAF") {
            Self::Unsecured
        } else if key.contains("REAL") {
            Self::Real
        } else if key.contains("SUBORDINADA") {
            Self::Subordinated
        } else {
            Self::None
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Floating => "1",
            Self::Unsecured => "2",
            Self::Real => "3",
            Self::None => "4",
            Self::Subordinated => "5",
        }
    }
}

/// Interest calculation criterion (day-count basis). Closed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterestCriterion {
    BusinessDays252,
    Months252,
    CalendarDays360,
    Months360,
    CalendarDays365,
    Months365,
}

/// Accepted descriptions after accent folding and dash normalisation.
const CRITERION_DESCRIPTIONS: &[(&str, InterestCriterion)] = &[
    (
        "252-NUMERO DIAS UTEIS ENTRE A DATA DE INICIO OU O ULTIMO PAGAMENTO E O PROXIMO",
        InterestCriterion::BusinessDays252,
    ),
    (
        "252-NUMERO DE MESES ENTRE A DATA DE INICIO OU O ULTIMO PAGAMENTO E O PROXIMO X 21",
        InterestCriterion::Months252,
    ),
    (
        "252-NUMERO DE MESES ENTRE A DATA DE INICIO OU ULTIMO PAGAMENTO E O PROXIMO X 21",
        InterestCriterion::Months252,
    ),
    (
        "360-NUMERO DIAS CORRIDOS ENTRE A DATA DE INICIO OU O ULTIMO PAGAMENTO E O PROXIMO",
        InterestCriterion::CalendarDays360,
    ),
    (
        "360-NUMERO DIAS CORRIDOS ENTRE A DATA DE INICIO OU ULTIMO PAGAMENTO E O PROXIMO",
        InterestCriterion::CalendarDays360,
    ),
    (
        "360-NUMERO DE MESES ENTRE A DATA DE INICIO OU O ULTIMO PAGAMENTO E O PROXIMO X 30",
        InterestCriterion::Months360,
    ),
    (
        "360-NUMERO DE MESES ENTRE A DATA DE INICIO OU ULTIMO PAGAMENTO E O PROXIMO X 30",
        InterestCriterion::Months360,
    ),
    (
        "365-NUMERO DIAS CORRIDOS ENTRE A DATA DE INICIO OU O ULTIMO PAGAMENTO E O PROXIMO",
        InterestCriterion::CalendarDays365,
    ),
    (
        "365-NUMERO DIAS CORRIDOS ENTRE A DATA DE INICIO OU ULTIMO PAGAMENTO E O PROXIMO",
        InterestCriterion::CalendarDays365,
    ),
    (
        "365-NUMERO DE MESES ENTRE A DATA DE INICIO OU O PROXIMO X 30",
        InterestCriterion::Months365,
    ),
    (
        "365-NUMERO DE MESES ENTRE A DATA DE INICIO OU PROXIMO X 30",
        InterestCriterion::Months365,
    ),
];

impl InterestCriterion {
    const ALL: [Self; 6] = [
        Self::BusinessDays252,
        Self::Months252,
        Self::CalendarDays360,
        Self::Months360,
        Self::CalendarDays365,
        Self::Months365,
    ];

    /// Resolve a code (`1`..`6`, optionally zero-prefixed, optionally followed
    /// by its description) or a full description.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let raw = value.trim().trim_matches(|ch| matches!(ch, '\'' | '"' | '`')).trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(code) = leading_code(raw) {
            return Some(code);
        }

        let collapsed = folded_upper(raw)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let key = collapsed
            .replace(" \u{2013} ", "-")
            .replace(" - ", "-")
            .replace('\u{2013}', "-");
        CRITERION_DESCRIPTIONS
            .iter()
            .find(|(description, _)| *description == key)
            .map(|(_, criterion)| *criterion)
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BusinessDays252 => "01",
            Self::Months252 => "02",
            Self::CalendarDays360 => "03",
            Self::Months360 => "04",
            Self::CalendarDays365 => "05",
            Self::Months365 => "06",
        }
    }
}

/// A code digit 1-6 at the start of the text, not followed by another word character.
fn leading_code(raw: &str) -> Option<InterestCriterion> {
    let in_range = |ch: char| ('1'..='6').contains(&ch);
    let body = raw
        .strip_prefix('0')
        .filter(|rest| rest.starts_with(in_range))
        .unwrap_or(raw);
    let mut chars = body.chars();
    let first = chars.next().filter(|ch| in_range(*ch))?;
    if chars
        .next()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_')
    {
        return None;
    }
    let index = first.to_digit(10)? as usize - 1;
    InterestCriterion::ALL.get(index).copied()
}

/// Payment method `01`..`07`; blank means `01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentMethod(u8);

impl PaymentMethod {
    pub const DEFAULT: Self = Self(1);

    /// Parse from digits; only the last two digits are considered.
    pub fn parse(value: &str, field: &str) -> Result<Self> {
        let digits = only_digits(value);
        if digits.is_empty() {
            return Ok(Self::DEFAULT);
        }
        let tail = &digits[digits.len().saturating_sub(2)..];
        match tail.parse::<u8>() {
            Ok(n @ 1..=7) => Ok(Self(n)),
            _ => Err(FormatError::invalid_value(field, value.trim(), "use 01..07")),
        }
    }

    #[must_use]
    pub fn code(self) -> String {
        format!("{:02}", self.0)
    }

    /// Methods 02, 03 and 04 carry interest flows and open the schedule group.
    #[must_use]
    pub const fn has_interest_schedule(self) -> bool {
        matches!(self.0, 2..=4)
    }
}

/// `S`/`N` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    /// Blank is `MissingField`; anything but S/N is `InvalidValue`.
    pub fn parse(value: &str, field: &str) -> Result<Self> {
        match folded_upper(value).as_str() {
            "" => Err(FormatError::missing(field)),
            "S" => Ok(Self::Yes),
            "N" => Ok(Self::No),
            _ => Err(FormatError::invalid_value(field, value.trim(), "use S or N")),
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Yes => "S",
            Self::No => "N",
        }
    }
}

/// Parse a one-letter code from a closed set; blank yields `None`.
fn parse_letter<T: Copy>(
    value: &str,
    field: &str,
    table: &[(&str, T)],
    hint: &str,
) -> Result<Option<T>> {
    let key = folded_upper(value);
    if key.is_empty() {
        return Ok(None);
    }
    table
        .iter()
        .find(|(code, _)| *code == key)
        .map(|(_, item)| Some(*item))
        .ok_or_else(|| FormatError::invalid_value(field, value.trim(), hint))
}

/// Interest periodicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Periodicity {
    Constant,
    Variable,
}

impl Periodicity {
    pub fn parse(value: &str, field: &str) -> Result<Option<Self>> {
        parse_letter(
            value,
            field,
            &[("C", Self::Constant), ("V", Self::Variable)],
            "use C or V",
        )
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Constant => "C",
            Self::Variable => "V",
        }
    }
}

/// Unit of the interest interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterestUnit {
    Days,
    BusinessDays,
    Months,
}

impl InterestUnit {
    pub fn parse(value: &str, field: &str) -> Result<Option<Self>> {
        parse_letter(
            value,
            field,
            &[
                ("D", Self::Days),
                ("U", Self::BusinessDays),
                ("M", Self::Months),
            ],
            "use D, U or M",
        )
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Days => "D",
            Self::BusinessDays => "U",
            Self::Months => "M",
        }
    }
}

/// Whether the interest interval counts business or calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermType {
    Business,
    Calendar,
}

impl TermType {
    pub fn parse(value: &str, field: &str) -> Result<Option<Self>> {
        parse_letter(
            value,
            field,
            &[("U", Self::Business), ("C", Self::Calendar)],
            "use U or C",
        )
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Business => "U",
            Self::Calendar => "C",
        }
    }
}

/// Participant role on a deposit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticipantRole {
    Issuer,
    Distributor,
}

impl ParticipantRole {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Issuer => "02",
            Self::Distributor => "03",
        }
    }

    /// Lower-case label used in file names and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Issuer => "emissor",
            Self::Distributor => "distribuidor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_table_is_closed() {
        assert_eq!(Indexer::parse("pré-fixado", "IDX").unwrap(), Indexer::Pre);
        assert_eq!(Indexer::parse(" Selic ", "IDX").unwrap().code(), "0001");
        assert_eq!(Indexer::parse("TR", "IDX").unwrap().code(), "0020");
        assert!(matches!(
            Indexer::parse("IPCA", "IDX"),
            Err(FormatError::InvalidValue { .. })
        ));
        assert!(matches!(
            Indexer::parse("", "IDX"),
            Err(FormatError::MissingField { .. })
        ));
    }

    #[test]
    fn test_guarantee_table_is_open() {
        assert_eq!(GuaranteeKind::parse("Garantia Real").code(), "3");
        assert_eq!(GuaranteeKind::parse("quirografária").code(), "2");
        assert_eq!(GuaranteeKind::parse("flutuante").code(), "1");
        assert_eq!(GuaranteeKind::parse("subordinada").code(), "5");
        assert_eq!(GuaranteeKind::parse("").code(), "4");
        assert_eq!(GuaranteeKind::parse("fiança bancária").code(), "4");
    }

    #[test]
    fn test_criterion_codes() {
        assert_eq!(InterestCriterion::parse("1").unwrap().code(), "01");
        assert_eq!(InterestCriterion::parse("06").unwrap().code(), "06");
        assert_eq!(InterestCriterion::parse("'03").unwrap().code(), "03");
        assert_eq!(
            InterestCriterion::parse("5 - 365 dias corridos").unwrap().code(),
            "05"
        );
        assert_eq!(InterestCriterion::parse("10"), None);
        assert_eq!(InterestCriterion::parse("7"), None);
        assert_eq!(InterestCriterion::parse(""), None);
    }

    #[test]
    fn test_criterion_descriptions() {
        let text = "252 - Número dias úteis entre a data de início ou o último pagamento e o próximo";
        assert_eq!(
            InterestCriterion::parse(text),
            Some(InterestCriterion::BusinessDays252)
        );
        let text = "365 – Número de meses entre a data de início ou próximo x 30";
        assert_eq!(InterestCriterion::parse(text), Some(InterestCriterion::Months365));
    }

    #[test]
    fn test_payment_method() {
        assert_eq!(PaymentMethod::parse("", "FP").unwrap().code(), "01");
        assert_eq!(PaymentMethod::parse("3", "FP").unwrap().code(), "03");
        assert!(PaymentMethod::parse("04", "FP").unwrap().has_interest_schedule());
        assert!(!PaymentMethod::parse("05", "FP").unwrap().has_interest_schedule());
        assert!(PaymentMethod::parse("08", "FP").is_err());
        assert!(PaymentMethod::parse("00", "FP").is_err());
    }

    #[test]
    fn test_letter_codes() {
        assert_eq!(Flag::parse("s", "F").unwrap(), Flag::Yes);
        assert!(Flag::parse("X", "F").is_err());
        assert_eq!(Periodicity::parse("", "P").unwrap(), None);
        assert_eq!(Periodicity::parse("v", "P").unwrap(), Some(Periodicity::Variable));
        assert!(Periodicity::parse("Q", "P").is_err());
        assert_eq!(InterestUnit::parse("U", "U").unwrap(), Some(InterestUnit::BusinessDays));
        assert_eq!(TermType::parse("c", "T").unwrap(), Some(TermType::Calendar));
        assert_eq!(ParticipantRole::Distributor.code(), "03");
    }
}
