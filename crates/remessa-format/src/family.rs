//! Record families, identified by the leading tag of each line.

use crate::deposit::DEPOSIT_RECORD_TAG;
use crate::nc::NC_RECORD_TAG;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFamily {
    /// Commercial note issuance records.
    Nc,
    /// Deposit/trade records.
    Mda,
}

impl RecordFamily {
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Nc => NC_RECORD_TAG,
            Self::Mda => DEPOSIT_RECORD_TAG,
        }
    }

    /// Family of a single line, if it is a data record.
    #[must_use]
    pub fn of_line(line: &str) -> Option<Self> {
        [Self::Nc, Self::Mda]
            .into_iter()
            .find(|family| line.starts_with(family.tag()))
    }
}

/// Count the data records of one family in a file's content.
///
/// Headers and lines of other families are ignored; both LF and CRLF
/// terminators are accepted.
#[must_use]
pub fn count_records(content: &str, family: RecordFamily) -> usize {
    content
        .lines()
        .filter(|line| RecordFamily::of_line(line) == Some(family))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_ignores_headers() {
        let content = "NC   0INCLX\r\nNC   1INCL a\r\nNC   1INCL b\r\n";
        assert_eq!(count_records(content, RecordFamily::Nc), 2);
        assert_eq!(count_records(content, RecordFamily::Mda), 0);
    }

    #[test]
    fn test_line_family() {
        assert_eq!(RecordFamily::of_line("MDA  10401"), Some(RecordFamily::Mda));
        assert_eq!(RecordFamily::of_line("MDA  00401"), None);
        assert_eq!(RecordFamily::of_line(""), None);
    }
}
