//! Column-name normalisation and canonical field resolution.
//!
//! Input sheets are filled in by hand, so headers drift: accents, spacing,
//! punctuation and small wording changes. Each canonical field lists the
//! header spellings it accepts; the map is resolved once per table.

use std::collections::BTreeSet;

use remessa_format::NcLayout;
use remessa_format::deposit::columns as deposit_col;
use remessa_format::field::fold_diacritics;
use remessa_format::nc::columns as nc_col;

use crate::error::{IngestError, Result};
use crate::table::Table;

/// Normalise a header to ASCII `UPPER_SNAKE`.
///
/// Diacritics are folded, anything that is not a letter, digit or underscore
/// separates words, and runs of separators collapse to one `_`.
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    let folded = fold_diacritics(name).to_ascii_uppercase();
    folded
        .split(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
        .flat_map(|word| word.split('_'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// A canonical field and the header spellings that map to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl FieldAliases {
    #[must_use]
    pub const fn required(canonical: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            canonical,
            aliases,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(canonical: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            canonical,
            aliases,
            required: false,
        }
    }

    /// Normalised spellings, canonical name first.
    fn candidates(&self) -> Vec<String> {
        std::iter::once(self.canonical)
            .chain(self.aliases.iter().copied())
            .map(normalize_column_name)
            .collect()
    }
}

/// Alias entries for the NC columns of `layout`.
#[must_use]
pub fn nc_fields(layout: NcLayout) -> Vec<FieldAliases> {
    let aliases = |canonical: &str| -> &'static [&'static str] {
        match canonical {
            nc_col::ISSUE_DATE => &["DATA_EMISSAO"],
            nc_col::MATURITY_DATE => &["DATA_VENCIMENTO"],
            nc_col::QUANTITY => &["QUANTIDADE", "QTDE_EMITIDA"],
            nc_col::UNIT_PRICE => &["PU_EMISSAO", "VALOR_NOMINAL_UNITARIO"],
            nc_col::GUARANTEE_KIND => &["ESPECIE_DA_GARANTIA", "GARANTIA"],
            nc_col::SPREAD => &["SPREAD"],
            nc_col::ISSUER_NAME => &["RAZAO_SOCIAL_EMISSOR", "EMISSOR"],
            nc_col::ISSUER_CNPJ => &["CNPJ"],
            nc_col::CRITERION => &["CRITERIO_DE_CALCULO_DOS_JUROS"],
            _ => &[],
        }
    };
    let required = layout
        .required_columns()
        .into_iter()
        .map(|c| FieldAliases::required(c, aliases(c)));
    let optional = layout
        .optional_columns()
        .into_iter()
        .map(|c| FieldAliases::optional(c, aliases(c)));
    required.chain(optional).collect()
}

/// Alias entries for the deposit columns.
#[must_use]
pub fn deposit_fields() -> Vec<FieldAliases> {
    vec![
        FieldAliases::required(
            deposit_col::ASSET_CODE,
            &["CODIGO_CETIP", "CODIGO_DO_ATIVO", "COD_CETIP", "ATIVO"],
        ),
        FieldAliases::required(
            deposit_col::COUNTERPARTY_ACCOUNT,
            &["CONTA_CONTRAPARTE", "CONTRAPARTE"],
        ),
        FieldAliases::required(
            deposit_col::ISSUER_ACCOUNT,
            &["CONTA_EMISSOR", "CONTA_DO_EMISSOR"],
        ),
        FieldAliases::required(
            deposit_col::QUANTITY,
            &["QUANTIDADE_DE_COTAS", "QTD_COTAS", "QUANTIDADE", "QTD"],
        ),
        FieldAliases::required(
            deposit_col::UNIT_PRICE,
            &["PU", "PRECO_UNITARIO", "VALOR_UNITARIO"],
        ),
    ]
}

/// Canonical field name to column index, resolved for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: Vec<(&'static str, usize)>,
}

impl ColumnMap {
    /// Resolve `fields` against the table headers.
    ///
    /// Exact normalised matches are taken first for every field, then the
    /// remaining fields match an unclaimed column whose name contains one of
    /// their spellings. Every required field left unresolved is reported in a
    /// single [`IngestError::MissingColumns`].
    pub fn resolve(table: &Table, fields: &[FieldAliases]) -> Result<Self> {
        let headers: Vec<String> = table
            .headers()
            .iter()
            .map(|h| normalize_column_name(h))
            .collect();
        let candidates: Vec<Vec<String>> = fields.iter().map(FieldAliases::candidates).collect();

        let mut claimed = BTreeSet::new();
        let mut resolved: Vec<Option<usize>> = vec![None; fields.len()];

        for (slot, spellings) in resolved.iter_mut().zip(&candidates) {
            let hit = spellings.iter().find_map(|spelling| {
                headers
                    .iter()
                    .position(|h| h == spelling)
                    .filter(|i| !claimed.contains(i))
            });
            if let Some(index) = hit {
                claimed.insert(index);
                *slot = Some(index);
            }
        }

        for (field, (slot, spellings)) in fields.iter().zip(resolved.iter_mut().zip(&candidates)) {
            if slot.is_some() {
                continue;
            }
            let hit = spellings.iter().find_map(|spelling| {
                headers
                    .iter()
                    .enumerate()
                    .find(|(i, h)| {
                        !h.is_empty() && !claimed.contains(i) && h.contains(spelling.as_str())
                    })
                    .map(|(i, _)| i)
            });
            if let Some(index) = hit {
                tracing::debug!(
                    field = field.canonical,
                    header = %table.headers()[index],
                    "column matched by containment"
                );
                claimed.insert(index);
                *slot = Some(index);
            }
        }

        let missing: Vec<String> = fields
            .iter()
            .zip(&resolved)
            .filter(|(field, slot)| field.required && slot.is_none())
            .map(|(field, _)| field.canonical.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                path: table.source().to_path_buf(),
                columns: missing,
            });
        }

        let entries = fields
            .iter()
            .zip(resolved)
            .filter_map(|(field, slot)| slot.map(|index| (field.canonical, index)))
            .collect();
        Ok(Self { entries })
    }

    /// Column index resolved for `canonical`.
    #[must_use]
    pub fn index_of(&self, canonical: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, index)| *index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
