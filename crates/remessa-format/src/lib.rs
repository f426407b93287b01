//! Fixed-width record encoding for clearinghouse remittance files.
//!
//! This crate turns spreadsheet rows into byte-exact flat-file records:
//!
//! - Field formatters for text, digit and scaled-decimal fields
//! - Date normalisation from heterogeneous input to `YYYYMMDD`
//! - Offset-table layouts with conditional field groups
//! - NC (note issuance) and MDA (deposit/trade) record builders
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use remessa_format::{DepositRecordBuilder, ParticipantRole, RecordRow, build_deposit_header};
//!
//! let header = build_deposit_header(NaiveDate::from_ymd_opt(2025, 9, 3).unwrap()).unwrap();
//! assert_eq!(header, "MDA  0040120250903");
//!
//! let row = RecordRow::new(2)
//!     .with("CODIGO_CETIP_ATIVO", "CRA0123")
//!     .with("QTDE_DE_COTAS", "10")
//!     .with("P_U", "1,5");
//! let line = DepositRecordBuilder::new(ParticipantRole::Issuer)
//!     .build("0000000001", &row)
//!     .unwrap();
//! assert_eq!(line.len(), 91);
//! ```

pub mod codes;
pub mod date;
pub mod deposit;
mod error;
pub mod family;
pub mod field;
pub mod layout;
pub mod nc;
mod profile;
mod value;

// Re-export error types
pub use error::{FormatError, Result};

// Re-export core types
pub use codes::ParticipantRole;
pub use date::{days_between, normalize_date};
pub use deposit::{DepositRecordBuilder, build_deposit_header};
pub use family::{RecordFamily, count_records};
pub use field::{DecimalSpec, Requirement, format_decimal, format_digits, format_text};
pub use layout::{FieldKind, FieldSpec, Fill, RecordLayout, RecordWriter};
pub use nc::{NcLayout, NcRecordBuilder, build_nc_header};
pub use profile::IssuerProfile;
pub use value::{CellValue, RecordRow};
