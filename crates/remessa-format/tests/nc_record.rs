use chrono::NaiveDate;

use remessa_format::nc::NC_RECORD_LAYOUT;
use remessa_format::nc::columns as col;
use remessa_format::{FormatError, IssuerProfile, NcLayout, NcRecordBuilder, RecordRow};

fn builder(layout: NcLayout) -> NcRecordBuilder {
    NcRecordBuilder::new(
        layout,
        IssuerProfile::default(),
        NaiveDate::from_ymd_opt(2025, 9, 3).expect("date"),
    )
}

fn fixed_rate_row() -> RecordRow {
    RecordRow::new(2)
        .with(col::ISSUE_DATE, "03/09/2025")
        .with(col::MATURITY_DATE, "03/09/2026")
        .with(col::QUANTITY, "1000")
        .with(col::UNIT_PRICE, "1,00000000")
        .with(col::INDEXER, "PRE-FIXADO")
        .with(col::ISSUER_NAME, "Companhia Exemplo Ltda")
        .with(col::ISSUER_CNPJ, "12.345.678/0001-90")
}

fn field(line: &str, name: &str) -> String {
    let (_, spec) = NC_RECORD_LAYOUT.field(name).expect("known field");
    line[spec.offset..spec.end()].to_string()
}

fn missing_field(result: Result<String, FormatError>) -> String {
    match result {
        Err(FormatError::MissingField { field }) => field,
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn fixed_rate_note_end_to_end() {
    let line = builder(NcLayout::Extended)
        .build(&fixed_rate_row())
        .expect("valid row");

    assert_eq!(line.len(), 553);
    assert!(line.starts_with("NC   1INCL              0000N33738404E33738002"));
    assert_eq!(field(&line, "issue_date"), "20250903");
    assert_eq!(field(&line, "maturity_date"), "20260903");
    assert_eq!(field(&line, "term_days"), "0000000365");
    assert_eq!(field(&line, "registration_date"), "20250903");
    assert_eq!(field(&line, "quantity"), "0000001000");
    assert_eq!(field(&line, "unit_price"), "000000000000000100000000");
    assert_eq!(field(&line, "financial_value"), "000000100000");
    assert_eq!(field(&line, "series"), "1         ");
    assert_eq!(field(&line, "past_events"), "N");
    assert_eq!(field(&line, "payment_method"), "01");
    assert_eq!(field(&line, "indexer"), "0099");
    assert_eq!(field(&line, "vcp_indicator"), " ".repeat(10));
    assert_eq!(field(&line, "floating_rate"), " ".repeat(5));
    assert_eq!(field(&line, "spread"), " ".repeat(8));
    assert_eq!(field(&line, "criterion"), "  ");
    assert_eq!(field(&line, "incorporates_interest"), " ");
    assert_eq!(field(&line, "issuer_name").trim_end(), "COMPANHIA EXEMPLO LTDA");
    assert_eq!(field(&line, "issuer_cnpj"), "12345678000190");
    assert_eq!(&line[532..], " ".repeat(21));
}

#[test]
fn quantity_is_written_as_a_plain_zero_padded_integer() {
    let row = fixed_rate_row().with(col::QUANTITY, "1000000");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");

    assert_eq!(line.len(), 553);
    assert_eq!(field(&line, "quantity"), "0001000000");
    assert_eq!(field(&line, "financial_value"), "000100000000");
    assert_eq!(field(&line, "term_days"), "0000000365");
    assert_eq!(field(&line, "floating_rate"), " ".repeat(5));
}

#[test]
fn fixed_index_ignores_a_supplied_rate() {
    let row = fixed_rate_row()
        .with(col::FLOATING_RATE, "1,5")
        .with(col::CRITERION, "1");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");
    assert_eq!(field(&line, "floating_rate"), "     ");
    assert_eq!(field(&line, "criterion"), "  ");
}

#[test]
fn floating_index_requires_rate() {
    let row = fixed_rate_row().with(col::INDEXER, "SELIC");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::FLOATING_RATE
    );
}

#[test]
fn rendered_rate_requires_criterion() {
    let row = fixed_rate_row()
        .with(col::INDEXER, "DI")
        .with(col::FLOATING_RATE, "105,5");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::CRITERION
    );

    let row = row.with(col::CRITERION, "Criterio 9");
    assert!(matches!(
        builder(NcLayout::Extended).build(&row),
        Err(FormatError::InvalidValue { .. })
    ));

    let row = row.with(col::CRITERION, "03");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");
    assert_eq!(field(&line, "indexer"), "0003");
    assert_eq!(field(&line, "floating_rate"), "10550");
    assert_eq!(field(&line, "criterion"), "03");
}

#[test]
fn vcp_requires_indicator_and_rate_is_optional() {
    let row = fixed_rate_row().with(col::INDEXER, "VCP");
    assert_eq!(
        missing_field(builder(NcLayout::Legacy).build(&row)),
        col::VCP_INDICATOR
    );

    let row = row.with(col::VCP_INDICATOR, "42");
    let line = builder(NcLayout::Legacy).build(&row).expect("valid row");
    assert_eq!(field(&line, "vcp_indicator"), "0000000042");
    assert_eq!(field(&line, "floating_rate"), "     ");
    assert_eq!(field(&line, "criterion"), "  ");
}

#[test]
fn spread_is_optional_but_validated() {
    let row = fixed_rate_row().with(col::SPREAD, "2,12345");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");
    assert_eq!(field(&line, "spread"), "00021234");

    let row = fixed_rate_row().with(col::SPREAD, "abc");
    assert!(matches!(
        builder(NcLayout::Extended).build(&row),
        Err(FormatError::InvalidValue { .. })
    ));
}

#[test]
fn interest_flow_payment_opens_incorporation_and_schedule() {
    let row = fixed_rate_row().with(col::PAYMENT_METHOD, "2");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::INCORPORATES_INTEREST
    );

    let row = row
        .with(col::INCORPORATES_INTEREST, "S")
        .with(col::INCORPORATION_DATE, "2025-12-01")
        .with(col::POST_INCORPORATION_VALUE, "1,02")
        .with(col::PERIODICITY, "C")
        .with(col::INTEREST_INTERVAL, "30")
        .with(col::INTEREST_UNIT, "D")
        .with(col::TERM_TYPE, "C")
        .with(col::INTEREST_START_DATE, "03/09/2025");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");
    assert_eq!(line.len(), 553);
    assert_eq!(field(&line, "payment_method"), "02");
    assert_eq!(field(&line, "incorporates_interest"), "S");
    assert_eq!(field(&line, "incorporation_date"), "20251201");
    assert_eq!(
        field(&line, "post_incorporation_value"),
        "000000000000000102000000"
    );
    assert_eq!(&line[532..], "C0000000030DC20250903");
}

#[test]
fn incorporation_flag_yes_requires_date_and_value() {
    let row = fixed_rate_row()
        .with(col::PAYMENT_METHOD, "03")
        .with(col::INCORPORATES_INTEREST, "S");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::INCORPORATION_DATE
    );
}

#[test]
fn variable_periodicity_leaves_interval_blank() {
    let row = fixed_rate_row()
        .with(col::PAYMENT_METHOD, "04")
        .with(col::INCORPORATES_INTEREST, "N")
        .with(col::PERIODICITY, "V")
        .with(col::INTEREST_INTERVAL, "30")
        .with(col::INTEREST_START_DATE, "20250903");
    let line = builder(NcLayout::Extended).build(&row).expect("valid row");
    assert_eq!(field(&line, "incorporates_interest"), "N");
    assert_eq!(field(&line, "incorporation_date"), " ".repeat(8));
    assert_eq!(&line[532..], "V            20250903");
}

#[test]
fn constant_or_blank_periodicity_requires_interval() {
    let row = fixed_rate_row()
        .with(col::PAYMENT_METHOD, "02")
        .with(col::INCORPORATES_INTEREST, "N")
        .with(col::INTEREST_START_DATE, "20250903");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::INTEREST_INTERVAL
    );

    let row = row.with(col::INTEREST_INTERVAL, "12345678901");
    assert!(matches!(
        builder(NcLayout::Extended).build(&row),
        Err(FormatError::InvalidValue { .. })
    ));
}

#[test]
fn legacy_layout_ignores_payment_columns() {
    let row = fixed_rate_row().with(col::PAYMENT_METHOD, "02");
    let line = builder(NcLayout::Legacy).build(&row).expect("valid row");
    assert_eq!(field(&line, "series"), "UNICA     ");
    assert_eq!(field(&line, "payment_method"), "01");
    assert_eq!(field(&line, "incorporates_interest"), "N");
    assert_eq!(&line[532..], " ".repeat(21));
}

#[test]
fn invalid_inputs_name_their_field() {
    let cases = [
        (fixed_rate_row().with(col::INDEXER, "IPCA"), col::INDEXER),
        (fixed_rate_row().with(col::PAYMENT_METHOD, "08"), col::PAYMENT_METHOD),
        (fixed_rate_row().with(col::UNIT_PRICE, "-1"), col::UNIT_PRICE),
        (fixed_rate_row().with(col::QUANTITY, "12345678901"), col::QUANTITY),
        (fixed_rate_row().with(col::MATURITY_DATE, "01/01/2025"), col::MATURITY_DATE),
    ];
    for (row, expected) in cases {
        let err = builder(NcLayout::Extended)
            .build(&row)
            .expect_err("row must be rejected");
        assert_eq!(err.field(), expected, "{err}");
        assert!(!err.is_internal());
    }
}

#[test]
fn mandatory_identity_fields() {
    let row = fixed_rate_row().with(col::ISSUER_NAME, " -- ");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::ISSUER_NAME
    );
    let row = fixed_rate_row().with(col::ISSUER_CNPJ, "");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::ISSUER_CNPJ
    );
    let row = fixed_rate_row().with(col::QUANTITY, "n/a");
    assert_eq!(
        missing_field(builder(NcLayout::Extended).build(&row)),
        col::QUANTITY
    );
}

#[test]
fn custom_profile_flows_into_header_and_record() {
    let profile = IssuerProfile {
        participant_name: "OUTRADTVM".to_string(),
        registrar_account: "11112222".to_string(),
        bookkeeper_account: "33334444".to_string(),
        default_guarantor: "SEM AVAL".to_string(),
    };
    let builder = NcRecordBuilder::new(
        NcLayout::Extended,
        profile,
        NaiveDate::from_ymd_opt(2025, 9, 3).expect("date"),
    );
    let header = builder
        .header(NaiveDate::from_ymd_opt(2025, 9, 3).expect("date"))
        .expect("header");
    assert_eq!(header, "NC   0INCLOUTRADTVM           2025090300004<");

    let line = builder.build(&fixed_rate_row()).expect("valid row");
    assert_eq!(field(&line, "registrar_account"), "11112222");
    assert_eq!(field(&line, "bookkeeper_account"), "33334444");
    assert_eq!(field(&line, "guarantor").trim_end(), "SEM AVAL");
}
