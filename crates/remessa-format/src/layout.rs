//! Record layouts as offset tables.
//!
//! A [`RecordLayout`] lists every field of a fixed-width record with its byte
//! offset and length. Builders render field values and hand them to a
//! [`RecordWriter`], which places them, fills the fields a conditional group
//! left unset, and checks the composed line against the declared length.

use crate::error::{FormatError, Result};

/// What a field holds; informational except for literals, which the writer emits itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Constant bytes.
    Literal(&'static str),
    /// Alphanumeric, space padded.
    Text,
    /// Digits, zero padded.
    Digits,
    /// Scaled decimal without separator.
    Decimal {
        integer_digits: u32,
        fraction_digits: u32,
    },
    /// `YYYYMMDD`.
    Date,
    /// Short categorical code.
    Code,
}

/// Fill used when a field is left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    Spaces,
    Zeros,
}

impl Fill {
    fn render(self, length: usize) -> String {
        match self {
            Self::Spaces => " ".repeat(length),
            Self::Zeros => "0".repeat(length),
        }
    }
}

/// One field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// 0-based byte offset.
    pub offset: usize,
    pub length: usize,
    pub kind: FieldKind,
    pub fill: Fill,
}

impl FieldSpec {
    const fn new(name: &'static str, offset: usize, length: usize, kind: FieldKind) -> Self {
        Self {
            name,
            offset,
            length,
            kind,
            fill: Fill::Spaces,
        }
    }

    pub const fn literal(name: &'static str, offset: usize, value: &'static str) -> Self {
        Self::new(name, offset, value.len(), FieldKind::Literal(value))
    }

    pub const fn text(name: &'static str, offset: usize, length: usize) -> Self {
        Self::new(name, offset, length, FieldKind::Text)
    }

    pub const fn digits(name: &'static str, offset: usize, length: usize) -> Self {
        Self::new(name, offset, length, FieldKind::Digits)
    }

    pub const fn decimal(
        name: &'static str,
        offset: usize,
        integer_digits: u32,
        fraction_digits: u32,
    ) -> Self {
        Self::new(
            name,
            offset,
            (integer_digits + fraction_digits) as usize,
            FieldKind::Decimal {
                integer_digits,
                fraction_digits,
            },
        )
    }

    pub const fn date(name: &'static str, offset: usize) -> Self {
        Self::new(name, offset, 8, FieldKind::Date)
    }

    pub const fn code(name: &'static str, offset: usize, length: usize) -> Self {
        Self::new(name, offset, length, FieldKind::Code)
    }

    /// Fill with zeros instead of spaces when left unset.
    #[must_use]
    pub const fn zero_filled(mut self) -> Self {
        self.fill = Fill::Zeros;
        self
    }

    /// Offset one past the last byte of this field.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Ordered field table of one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    pub name: &'static str,
    pub length: usize,
    pub fields: &'static [FieldSpec],
}

impl RecordLayout {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<(usize, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }

    /// Check that fields are contiguous and cover exactly `length` bytes.
    pub fn validate(&self) -> Result<()> {
        let mut expected_offset = 0;
        for spec in self.fields {
            if spec.offset != expected_offset {
                return Err(self.mismatch(spec.name, expected_offset, spec.offset));
            }
            if let FieldKind::Literal(value) = spec.kind
                && value.len() != spec.length
            {
                return Err(self.mismatch(spec.name, spec.length, value.len()));
            }
            expected_offset = spec.end();
        }
        if expected_offset != self.length {
            return Err(self.mismatch("<end>", self.length, expected_offset));
        }
        Ok(())
    }

    fn mismatch(&self, field: &str, expected: usize, actual: usize) -> FormatError {
        FormatError::RecordLengthMismatch {
            record: self.name,
            field: field.to_string(),
            expected,
            actual,
        }
    }

    /// Start composing a record with this layout.
    #[must_use]
    pub fn writer(&self) -> RecordWriter<'_> {
        RecordWriter::new(self)
    }
}

/// Places rendered field values into a record.
#[derive(Debug)]
pub struct RecordWriter<'a> {
    layout: &'a RecordLayout,
    values: Vec<Option<String>>,
}

impl<'a> RecordWriter<'a> {
    #[must_use]
    pub fn new(layout: &'a RecordLayout) -> Self {
        Self {
            layout,
            values: vec![None; layout.fields.len()],
        }
    }

    /// Set a field to an already rendered value.
    ///
    /// The value must have exactly the field's length. An unknown field name
    /// is reported with an expected length of zero.
    pub fn put(&mut self, name: &str, value: impl Into<String>) -> Result<&mut Self> {
        let value = value.into();
        let Some((index, spec)) = self.layout.field(name) else {
            return Err(self.layout.mismatch(name, 0, value.len()));
        };
        if value.len() != spec.length {
            return Err(self.layout.mismatch(name, spec.length, value.len()));
        }
        self.values[index] = Some(value);
        Ok(self)
    }

    /// Compose the record: literals, set values, fills for the rest.
    pub fn finish(self) -> Result<String> {
        let mut line = String::with_capacity(self.layout.length);
        for (spec, value) in self.layout.fields.iter().zip(self.values) {
            match (spec.kind, value) {
                (_, Some(value)) => line.push_str(&value),
                (FieldKind::Literal(literal), None) => line.push_str(literal),
                (_, None) => line.push_str(&spec.fill.render(spec.length)),
            }
        }
        if line.len() != self.layout.length {
            return Err(self.layout.mismatch("<record>", self.layout.length, line.len()));
        }
        Ok(line)
    }
}
