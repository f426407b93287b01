//! NC (commercial note issuance) records.
//!
//! An NC file is a 44-byte header followed by one 553-byte record per note.
//! Two variants of the record share one offset table; [`NcLayout`] selects the
//! constants and conditional groups that differ between them.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::codes::{
    Flag, GuaranteeKind, Indexer, InterestCriterion, InterestUnit, PaymentMethod, Periodicity,
    TermType,
};
use crate::date::{days_between, normalize_date};
use crate::error::{FormatError, Result};
use crate::field::{
    DecimalSpec, clean_text, format_decimal, format_digits, format_digits_checked, format_text,
    only_digits, parse_decimal, render_decimal,
};
use crate::layout::{FieldSpec, RecordLayout, RecordWriter};
use crate::profile::IssuerProfile;
use crate::value::{CellValue, RecordRow};

/// Leading tag identifying NC records.
pub const NC_RECORD_TAG: &str = "NC   1";
pub const NC_RECORD_LEN: usize = 553;
pub const NC_HEADER_LEN: usize = 44;

/// Canonical input columns of an NC row.
pub mod columns {
    pub const ISSUE_DATE: &str = "DATA_DE_EMISSAO";
    pub const MATURITY_DATE: &str = "DATA_DE_VENCIMENTO";
    pub const QUANTITY: &str = "QUANTIDADE_EMITIDA";
    pub const UNIT_PRICE: &str = "VALOR_UNITARIO";
    pub const GUARANTOR: &str = "AVALISTA";
    pub const GUARANTEE_KIND: &str = "ESPECIE_GARANTIA";
    pub const INDEXER: &str = "INDEXADOR";
    pub const VCP_INDICATOR: &str = "TIPO_INDICADOR_VCP";
    pub const FLOATING_RATE: &str = "TAXA_FLUTUANTE";
    pub const CRITERION: &str = "CRITERIO_CALCULO_JUROS";
    pub const SPREAD: &str = "TAXA_SPREAD";
    pub const ISSUER_NAME: &str = "NOME_EMISSOR";
    pub const ISSUER_CNPJ: &str = "CNPJ_EMISSOR";
    pub const PAYMENT_METHOD: &str = "FORMA_PAGAMENTO";
    pub const INCORPORATES_INTEREST: &str = "INCORPORA_JUROS";
    pub const INCORPORATION_DATE: &str = "DATA_INCORPORACAO_JUROS";
    pub const POST_INCORPORATION_VALUE: &str = "VALOR_APOS_INCORPORACAO";
    pub const PERIODICITY: &str = "PERIODICIDADE_JUROS";
    pub const INTEREST_INTERVAL: &str = "JUROS_A_CADA";
    pub const INTEREST_UNIT: &str = "UNIDADE";
    pub const TERM_TYPE: &str = "TIPO_PRAZO";
    pub const INTEREST_START_DATE: &str = "DATA_A_PARTIR_JUROS";
}

use columns as col;

const NC_FIELDS: &[FieldSpec] = &[
    FieldSpec::literal("tag", 0, "NC   1INCL              0000"),
    FieldSpec::literal("issue_type", 28, "N"),
    FieldSpec::digits("registrar_account", 29, 8),
    FieldSpec::literal("issue_format", 37, "E"),
    FieldSpec::digits("bookkeeper_account", 38, 8),
    FieldSpec::text("reserved_46", 46, 12),
    FieldSpec::literal("issue_number", 58, "1"),
    FieldSpec::text("reserved_59", 59, 3),
    FieldSpec::text("series", 62, 10),
    FieldSpec::date("issue_date", 72),
    FieldSpec::date("maturity_date", 80),
    FieldSpec::digits("term_days", 88, 10),
    FieldSpec::date("registration_date", 98),
    FieldSpec::digits("quantity", 106, 10),
    FieldSpec::decimal("unit_price", 116, 16, 8),
    FieldSpec::decimal("financial_value", 140, 10, 2),
    FieldSpec::text("reserved_152", 152, 32),
    FieldSpec::literal("regime", 184, "2"),
    FieldSpec::code("past_events", 185, 1),
    FieldSpec::literal("placement", 186, "PRIVADA                       "),
    FieldSpec::literal("program", 216, "2080 "),
    FieldSpec::literal("program_date", 221, "20231113"),
    FieldSpec::literal("program_flag", 229, "S"),
    FieldSpec::text("reserved_230", 230, 1),
    FieldSpec::text("guarantor", 231, 50),
    FieldSpec::literal("fiduciary_agent", 281, "N"),
    FieldSpec::text("reserved_282", 282, 18),
    FieldSpec::code("guarantee_kind", 300, 1),
    FieldSpec::text("reserved_301", 301, 100),
    FieldSpec::code("payment_method", 401, 2),
    FieldSpec::code("indexer", 403, 4),
    FieldSpec::digits("vcp_indicator", 407, 10),
    FieldSpec::decimal("floating_rate", 417, 3, 2),
    FieldSpec::decimal("spread", 422, 4, 4),
    FieldSpec::code("criterion", 430, 2),
    FieldSpec::code("incorporates_interest", 432, 1),
    FieldSpec::date("incorporation_date", 433),
    FieldSpec::decimal("post_incorporation_value", 441, 16, 8),
    FieldSpec::code("offer_audience", 465, 1),
    FieldSpec::code("offer_rite", 466, 1),
    FieldSpec::literal("pending_statements", 467, "N"),
    FieldSpec::text("issuer_name", 468, 50),
    FieldSpec::digits("issuer_cnpj", 518, 14),
    FieldSpec::code("periodicity", 532, 1),
    FieldSpec::digits("interest_interval", 533, 10),
    FieldSpec::code("interest_unit", 543, 1),
    FieldSpec::code("term_type", 544, 1),
    FieldSpec::date("interest_start_date", 545),
];

/// Offset table of the 553-byte NC record.
pub static NC_RECORD_LAYOUT: RecordLayout = RecordLayout {
    name: "NC",
    length: NC_RECORD_LEN,
    fields: NC_FIELDS,
};

const NC_HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::literal("tag", 0, "NC   0INCL"),
    FieldSpec::text("participant", 10, 20),
    FieldSpec::date("file_date", 30),
    FieldSpec::literal("suffix", 38, "00004<"),
];

/// Offset table of the 44-byte NC header.
pub static NC_HEADER_LAYOUT: RecordLayout = RecordLayout {
    name: "NC header",
    length: NC_HEADER_LEN,
    fields: NC_HEADER_FIELDS,
};

const UNIT_PRICE_SPEC: DecimalSpec = DecimalSpec::mandatory(16, 8);
const FINANCIAL_VALUE_SPEC: DecimalSpec = DecimalSpec::mandatory(10, 2);
const FLOATING_RATE_SPEC: DecimalSpec = DecimalSpec::mandatory(3, 2);
const SPREAD_SPEC: DecimalSpec = DecimalSpec::mandatory(4, 4);

/// NC record variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NcLayout {
    /// Single series, fixed payment method `01`, no incorporation or schedule groups.
    Legacy,
    /// Series `1`, parsed payment method with conditional incorporation and schedule groups.
    #[default]
    Extended,
}

impl NcLayout {
    #[must_use]
    pub const fn series(self) -> &'static str {
        match self {
            Self::Legacy => "UNICA",
            Self::Extended => "1",
        }
    }

    #[must_use]
    pub const fn past_events(self) -> &'static str {
        match self {
            Self::Legacy => "S",
            Self::Extended => "N",
        }
    }

    /// Columns that must exist in the input table for this variant.
    #[must_use]
    pub fn required_columns(self) -> Vec<&'static str> {
        let mut required = vec![
            col::ISSUE_DATE,
            col::MATURITY_DATE,
            col::QUANTITY,
            col::UNIT_PRICE,
            col::INDEXER,
            col::SPREAD,
            col::ISSUER_NAME,
            col::ISSUER_CNPJ,
        ];
        if self == Self::Extended {
            required.extend([
                col::PAYMENT_METHOD,
                col::INCORPORATES_INTEREST,
                col::INCORPORATION_DATE,
                col::POST_INCORPORATION_VALUE,
                col::PERIODICITY,
                col::INTEREST_INTERVAL,
                col::INTEREST_UNIT,
                col::TERM_TYPE,
                col::INTEREST_START_DATE,
            ]);
        }
        required
    }

    /// Columns read when present.
    #[must_use]
    pub fn optional_columns(self) -> Vec<&'static str> {
        vec![
            col::GUARANTOR,
            col::GUARANTEE_KIND,
            col::VCP_INDICATOR,
            col::FLOATING_RATE,
            col::CRITERION,
        ]
    }
}

impl std::fmt::Display for NcLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

fn compact(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Build the NC header line for the given file date.
pub fn build_nc_header(profile: &IssuerProfile, date: NaiveDate) -> Result<String> {
    let mut writer = NC_HEADER_LAYOUT.writer();
    writer
        .put("participant", format_text(&profile.participant_name, 20))?
        .put("file_date", compact(date))?;
    writer.finish()
}

fn required_decimal(value: &CellValue, field: &str) -> Result<Decimal> {
    if value.is_blank() {
        return Err(FormatError::missing(field));
    }
    parse_decimal(value)
        .ok_or_else(|| FormatError::invalid_value(field, value.as_text(), "not a number"))
}

/// Builds NC records from canonical rows.
#[derive(Debug, Clone)]
pub struct NcRecordBuilder {
    layout: NcLayout,
    profile: IssuerProfile,
    registration_date: NaiveDate,
}

impl NcRecordBuilder {
    /// `registration_date` is written into every record; callers pass today.
    #[must_use]
    pub fn new(layout: NcLayout, profile: IssuerProfile, registration_date: NaiveDate) -> Self {
        Self {
            layout,
            profile,
            registration_date,
        }
    }

    #[must_use]
    pub fn layout(&self) -> NcLayout {
        self.layout
    }

    #[must_use]
    pub fn profile(&self) -> &IssuerProfile {
        &self.profile
    }

    /// Header line for a batch built by this builder.
    pub fn header(&self, file_date: NaiveDate) -> Result<String> {
        build_nc_header(&self.profile, file_date)
    }

    /// Build one 553-byte record.
    ///
    /// Errors name the canonical column that caused them; the row number is
    /// added by the caller.
    pub fn build(&self, row: &RecordRow) -> Result<String> {
        let text = |name: &str| row.get(name).as_text().into_owned();
        let mut w = NC_RECORD_LAYOUT.writer();

        w.put(
            "registrar_account",
            format_digits(&self.profile.registrar_account, 8),
        )?
        .put(
            "bookkeeper_account",
            format_digits(&self.profile.bookkeeper_account, 8),
        )?
        .put("series", format_text(self.layout.series(), 10))?
        .put("past_events", self.layout.past_events())?
        .put("registration_date", compact(self.registration_date))?;

        // Dates and term
        let issue_date = normalize_date(row.get(col::ISSUE_DATE), col::ISSUE_DATE)?;
        let maturity_date = normalize_date(row.get(col::MATURITY_DATE), col::MATURITY_DATE)?;
        let term = days_between(&issue_date, &maturity_date, col::MATURITY_DATE)?;
        w.put("issue_date", issue_date)?
            .put("maturity_date", maturity_date)?
            .put("term_days", format_digits_checked(&term.to_string(), 10, "term_days")?)?;

        // Quantity, price and financial value
        let quantity_raw = text(col::QUANTITY);
        if only_digits(&quantity_raw).is_empty() {
            return Err(FormatError::missing(col::QUANTITY));
        }
        let quantity = format_digits_checked(&quantity_raw, 10, col::QUANTITY)?;
        let unit_price = required_decimal(row.get(col::UNIT_PRICE), col::UNIT_PRICE)?;
        let unit_price_field = render_decimal(unit_price, UNIT_PRICE_SPEC, col::UNIT_PRICE)?;
        let truncated_price = unit_price
            .round_dp_with_strategy(UNIT_PRICE_SPEC.fraction_digits, RoundingStrategy::ToZero);
        let financial_value = quantity
            .parse::<Decimal>()
            .ok()
            .and_then(|qty| qty.checked_mul(truncated_price))
            .ok_or_else(|| {
                FormatError::invalid_value(
                    col::UNIT_PRICE,
                    unit_price.to_string(),
                    "financial value overflow",
                )
            })?;
        w.put("quantity", quantity)?
            .put("unit_price", unit_price_field)?
            .put(
                "financial_value",
                render_decimal(financial_value, FINANCIAL_VALUE_SPEC, "financial_value")?,
            )?;

        // Guarantee
        let guarantor = Some(clean_text(&text(col::GUARANTOR)))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| clean_text(&self.profile.default_guarantor));
        w.put("guarantor", format_text(&guarantor, 50))?.put(
            "guarantee_kind",
            GuaranteeKind::parse(&text(col::GUARANTEE_KIND)).code(),
        )?;

        // Index, rate and criterion
        let payment_method = match self.layout {
            NcLayout::Legacy => PaymentMethod::DEFAULT,
            NcLayout::Extended => {
                PaymentMethod::parse(&text(col::PAYMENT_METHOD), col::PAYMENT_METHOD)?
            }
        };
        let indexer = Indexer::parse(&text(col::INDEXER), col::INDEXER)?;
        w.put("payment_method", payment_method.code())?
            .put("indexer", indexer.code())?;

        if indexer == Indexer::Vcp {
            let indicator = text(col::VCP_INDICATOR);
            if only_digits(&indicator).is_empty() {
                return Err(FormatError::missing(col::VCP_INDICATOR));
            }
            w.put(
                "vcp_indicator",
                format_digits_checked(&indicator, 10, col::VCP_INDICATOR)?,
            )?;
        }

        let rate = row.get(col::FLOATING_RATE);
        let rate_rendered = if indexer.accepts_rate() && !rate.is_blank() {
            w.put(
                "floating_rate",
                format_decimal(rate, FLOATING_RATE_SPEC, col::FLOATING_RATE)?,
            )?;
            true
        } else if indexer.requires_rate() {
            return Err(FormatError::missing(col::FLOATING_RATE));
        } else {
            false
        };

        if rate_rendered {
            let raw = text(col::CRITERION);
            let criterion = InterestCriterion::parse(&raw).ok_or_else(|| {
                if raw.trim().is_empty() {
                    FormatError::missing(col::CRITERION)
                } else {
                    FormatError::invalid_value(col::CRITERION, raw.trim(), "use codes 01..06")
                }
            })?;
            w.put("criterion", criterion.code())?;
        }

        let spread = row.get(col::SPREAD);
        if !spread.is_blank() {
            w.put("spread", format_decimal(spread, SPREAD_SPEC, col::SPREAD)?)?;
        }

        // Issuer
        let issuer_name = clean_text(&text(col::ISSUER_NAME));
        if issuer_name.is_empty() {
            return Err(FormatError::missing(col::ISSUER_NAME));
        }
        let cnpj = text(col::ISSUER_CNPJ);
        if only_digits(&cnpj).is_empty() {
            return Err(FormatError::missing(col::ISSUER_CNPJ));
        }
        w.put("issuer_name", format_text(&issuer_name, 50))?
            .put("issuer_cnpj", format_digits_checked(&cnpj, 14, col::ISSUER_CNPJ)?)?;

        match self.layout {
            NcLayout::Legacy => {
                w.put("incorporates_interest", Flag::No.code())?;
            }
            NcLayout::Extended if payment_method.has_interest_schedule() => {
                put_incorporation(&mut w, row)?;
                put_schedule(&mut w, row)?;
            }
            NcLayout::Extended => {}
        }

        w.finish()
    }
}

/// Interest incorporation group, opened by payment methods 02..04.
fn put_incorporation(w: &mut RecordWriter<'_>, row: &RecordRow) -> Result<()> {
    let flag = Flag::parse(
        &row.get(col::INCORPORATES_INTEREST).as_text(),
        col::INCORPORATES_INTEREST,
    )?;
    w.put("incorporates_interest", flag.code())?;
    if flag == Flag::Yes {
        let date = normalize_date(row.get(col::INCORPORATION_DATE), col::INCORPORATION_DATE)?;
        let value = format_decimal(
            row.get(col::POST_INCORPORATION_VALUE),
            UNIT_PRICE_SPEC,
            col::POST_INCORPORATION_VALUE,
        )?;
        w.put("incorporation_date", date)?
            .put("post_incorporation_value", value)?;
    }
    Ok(())
}

/// Payment schedule group, opened by payment methods 02..04.
fn put_schedule(w: &mut RecordWriter<'_>, row: &RecordRow) -> Result<()> {
    let periodicity =
        Periodicity::parse(&row.get(col::PERIODICITY).as_text(), col::PERIODICITY)?;
    if let Some(periodicity) = periodicity {
        w.put("periodicity", periodicity.code())?;
    }
    if periodicity != Some(Periodicity::Variable) {
        let interval = row.get(col::INTEREST_INTERVAL).as_text();
        if only_digits(&interval).is_empty() {
            return Err(FormatError::missing(col::INTEREST_INTERVAL));
        }
        w.put(
            "interest_interval",
            format_digits_checked(&interval, 10, col::INTEREST_INTERVAL)?,
        )?;
    }
    let unit = InterestUnit::parse(&row.get(col::INTEREST_UNIT).as_text(), col::INTEREST_UNIT)?;
    if let Some(unit) = unit {
        w.put("interest_unit", unit.code())?;
    }
    let term_type = TermType::parse(&row.get(col::TERM_TYPE).as_text(), col::TERM_TYPE)?;
    if let Some(term_type) = term_type {
        w.put("term_type", term_type.code())?;
    }
    let start = normalize_date(
        row.get(col::INTEREST_START_DATE),
        col::INTEREST_START_DATE,
    )?;
    w.put("interest_start_date", start)?;
    Ok(())
}
