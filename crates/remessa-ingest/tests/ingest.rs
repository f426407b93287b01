use std::fs;
use std::path::Path;

use tempfile::tempdir;

use remessa_format::nc::columns as nc_col;
use remessa_format::{CellValue, NcLayout};
use remessa_ingest::{
    ColumnMap, IngestError, ReadOptions, deposit_fields, nc_fields, read_table,
};

#[test]
fn deposit_csv_resolves_to_canonical_rows() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deposito.csv");
    fs::write(
        &path,
        "Código CETIP Ativo,Conta CETIP Contraparte,Conta CETIP Emissor,Qtde de Cotas,P.U.\n\
         CRA0123,12345678,87654321,10,\"1,5\"\n\
         ,,,,\n\
         CRA0456,12345678,87654321,nan,2\n",
    )
    .expect("write csv");

    let table = read_table(&path, ReadOptions::default()).expect("read");
    let map = ColumnMap::resolve(&table, &deposit_fields()).expect("resolve");
    let rows = table.records(&map);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line(), 2);
    assert_eq!(rows[0].get("CODIGO_CETIP_ATIVO").as_text(), "CRA0123");
    assert_eq!(rows[0].get("P_U").as_text(), "1,5");
    assert_eq!(rows[1].line(), 4);
    assert_eq!(rows[1].get("QTDE_DE_COTAS"), &CellValue::Empty);
}

#[test]
fn nc_csv_with_accented_headers() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("notas.csv");
    let headers = [
        "Data de Emissão",
        "Data de Vencimento",
        "Quantidade Emitida",
        "Valor Unitário",
        "Indexador",
        "Taxa Spread",
        "Nome Emissor",
        "CNPJ Emissor",
        "Avalista",
    ];
    fs::write(
        &path,
        format!(
            "{}\n03/09/2025,03/09/2026,1000,\"1,00000000\",PRE-FIXADO,12,ACME,12.345.678/0001-90,NAO HA\n",
            headers.join(",")
        ),
    )
    .expect("write csv");

    let table = read_table(&path, ReadOptions::default()).expect("read");
    let map = ColumnMap::resolve(&table, &nc_fields(NcLayout::Legacy)).expect("resolve");
    let rows = table.records(&map);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(nc_col::ISSUE_DATE).as_text(), "03/09/2025");
    assert_eq!(rows[0].get(nc_col::GUARANTOR).as_text(), "NAO HA");
    assert!(rows[0].get(nc_col::CRITERION).is_blank());
}

#[test]
fn missing_columns_are_reported_together() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("deposito.csv");
    fs::write(&path, "CODIGO_CETIP_ATIVO,P_U\nCRA0123,1\n").expect("write csv");

    let table = read_table(&path, ReadOptions::default()).expect("read");
    match ColumnMap::resolve(&table, &deposit_fields()) {
        Err(IngestError::MissingColumns { columns, .. }) => assert_eq!(
            columns,
            ["CONTA_CETIP_CONTRAPARTE", "CONTA_CETIP_EMISSOR", "QTDE_DE_COTAS"]
        ),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unsupported_and_missing_inputs() {
    let dir = tempdir().expect("tempdir");
    let pdf = dir.path().join("input.pdf");
    fs::write(&pdf, "x").expect("write");
    assert!(matches!(
        read_table(&pdf, ReadOptions::default()),
        Err(IngestError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        read_table(Path::new("/nonexistent/input.csv"), ReadOptions::default()),
        Err(IngestError::FileNotFound { .. })
    ));
}

#[test]
fn corrupt_workbook_is_a_workbook_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.xlsx");
    fs::write(&path, "not a zip archive").expect("write");
    assert!(matches!(
        read_table(&path, ReadOptions { sheet_index: 0 }),
        Err(IngestError::Workbook { .. })
    ));
}
