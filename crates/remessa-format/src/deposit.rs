//! Deposit/trade records (the `MDA` family).
//!
//! An 18-byte header followed by one 91-byte record per asset line. Every
//! record carries a sequence number handed out by the daily allocator.

use chrono::NaiveDate;

use crate::codes::ParticipantRole;
use crate::error::Result;
use crate::field::{DecimalSpec, format_decimal, format_digits, format_text};
use crate::layout::{FieldSpec, RecordLayout};
use crate::value::RecordRow;

/// Leading tag identifying deposit records.
pub const DEPOSIT_RECORD_TAG: &str = "MDA  1";
pub const DEPOSIT_RECORD_LEN: usize = 91;
pub const DEPOSIT_HEADER_LEN: usize = 18;

/// Canonical input columns of a deposit row.
pub mod columns {
    pub const ASSET_CODE: &str = "CODIGO_CETIP_ATIVO";
    pub const COUNTERPARTY_ACCOUNT: &str = "CONTA_CETIP_CONTRAPARTE";
    pub const ISSUER_ACCOUNT: &str = "CONTA_CETIP_EMISSOR";
    pub const QUANTITY: &str = "QTDE_DE_COTAS";
    pub const UNIT_PRICE: &str = "P_U";

    /// Every deposit column is required.
    pub const REQUIRED: &[&str] = &[
        ASSET_CODE,
        COUNTERPARTY_ACCOUNT,
        ISSUER_ACCOUNT,
        QUANTITY,
        UNIT_PRICE,
    ];
}

use columns as col;

const DEPOSIT_FIELDS: &[FieldSpec] = &[
    FieldSpec::literal("tag", 0, "MDA  1"),
    FieldSpec::literal("operation", 6, "0401"),
    FieldSpec::digits("sequence", 10, 10),
    FieldSpec::literal("reserved_20", 20, "00"),
    FieldSpec::text("asset_code", 22, 11),
    FieldSpec::digits("counterparty_account", 33, 8),
    FieldSpec::digits("issuer_account", 41, 8),
    FieldSpec::decimal("quantity", 49, 12, 8).zero_filled(),
    FieldSpec::decimal("unit_price", 69, 10, 8).zero_filled(),
    FieldSpec::literal("settlement_mode", 87, "00"),
    FieldSpec::code("participant_role", 89, 2),
];

/// Offset table of the 91-byte deposit record.
pub static DEPOSIT_RECORD_LAYOUT: RecordLayout = RecordLayout {
    name: "MDA",
    length: DEPOSIT_RECORD_LEN,
    fields: DEPOSIT_FIELDS,
};

const DEPOSIT_HEADER_FIELDS: &[FieldSpec] = &[
    FieldSpec::literal("tag", 0, "MDA  0"),
    FieldSpec::literal("operation", 6, "0401"),
    FieldSpec::date("operation_date", 10),
];

/// Offset table of the 18-byte deposit header.
pub static DEPOSIT_HEADER_LAYOUT: RecordLayout = RecordLayout {
    name: "MDA header",
    length: DEPOSIT_HEADER_LEN,
    fields: DEPOSIT_HEADER_FIELDS,
};

const QUANTITY_SPEC: DecimalSpec = DecimalSpec::lenient(12, 8);
const UNIT_PRICE_SPEC: DecimalSpec = DecimalSpec::lenient(10, 8);

/// Build the deposit header for the operation date.
pub fn build_deposit_header(operation_date: NaiveDate) -> Result<String> {
    let mut writer = DEPOSIT_HEADER_LAYOUT.writer();
    writer.put(
        "operation_date",
        operation_date.format("%Y%m%d").to_string(),
    )?;
    writer.finish()
}

/// Builds deposit records for one participant role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRecordBuilder {
    role: ParticipantRole,
}

impl DepositRecordBuilder {
    #[must_use]
    pub fn new(role: ParticipantRole) -> Self {
        Self { role }
    }

    #[must_use]
    pub fn role(&self) -> ParticipantRole {
        self.role
    }

    /// Build one 91-byte record.
    ///
    /// Quantity and unit price are lenient: blank or unparseable values are
    /// written as zero and logged.
    pub fn build(&self, sequence: &str, row: &RecordRow) -> Result<String> {
        let text = |name: &str| row.get(name).as_text().into_owned();
        let mut w = DEPOSIT_RECORD_LAYOUT.writer();
        w.put("sequence", format_digits(sequence, 10))?
            .put("asset_code", format_text(&text(col::ASSET_CODE), 11))?
            .put(
                "counterparty_account",
                format_digits(&text(col::COUNTERPARTY_ACCOUNT), 8),
            )?
            .put(
                "issuer_account",
                format_digits(&text(col::ISSUER_ACCOUNT), 8),
            )?
            .put(
                "quantity",
                format_decimal(row.get(col::QUANTITY), QUANTITY_SPEC, col::QUANTITY)?,
            )?
            .put(
                "unit_price",
                format_decimal(row.get(col::UNIT_PRICE), UNIT_PRICE_SPEC, col::UNIT_PRICE)?,
            )?
            .put("participant_role", self.role.code())?;
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_tables_are_contiguous() {
        DEPOSIT_RECORD_LAYOUT.validate().unwrap();
        DEPOSIT_HEADER_LAYOUT.validate().unwrap();
    }

    #[test]
    fn test_header() {
        let header = build_deposit_header(NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()).unwrap();
        assert_eq!(header, "MDA  0040120250903");
    }

    #[test]
    fn test_record_fields() {
        let row = RecordRow::new(2)
            .with(col::ASSET_CODE, "CRA0123")
            .with(col::COUNTERPARTY_ACCOUNT, "12345.67-8")
            .with(col::ISSUER_ACCOUNT, "87654321")
            .with(col::QUANTITY, "10")
            .with(col::UNIT_PRICE, "1.234,5");
        let line = DepositRecordBuilder::new(ParticipantRole::Issuer)
            .build("0000000007", &row)
            .unwrap();
        assert_eq!(line.len(), DEPOSIT_RECORD_LEN);
        assert_eq!(&line[0..22], "MDA  10401000000000700");
        assert_eq!(&line[22..33], "CRA0123    ");
        assert_eq!(&line[33..41], "12345678");
        assert_eq!(&line[41..49], "87654321");
        assert_eq!(&line[49..69], "00000000001000000000");
        assert_eq!(&line[69..87], "000000123450000000");
        assert_eq!(&line[87..91], "0002");
    }
}
