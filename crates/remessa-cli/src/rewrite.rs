//! Sale-to-purchase account rewrite for trade files.
//!
//! A sale file lists the seller's and buyer's accounts; the matching purchase
//! file is the same content with the two accounts swapped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Seller account in its 10-digit form, rewritten first.
pub const SALE_ACCOUNT: &str = "0177410001";
pub const PURCHASE_ACCOUNT: &str = "0252977002";
/// Buyer account in its 8-digit form.
pub const BUYER_ACCOUNT: &str = "52977002";
pub const SELLER_ACCOUNT: &str = "77410001";
/// An 8-digit buyer account right after this prefix is part of a 10-digit account.
const KEEP_PREFIX: &str = "02";

/// Swap the accounts of a sale file.
///
/// `0177410001` becomes `0252977002`, then every `52977002` not directly
/// preceded by `02` becomes `77410001`. The prefix check looks at the text
/// after the first replacement, so the accounts it just wrote are kept.
#[must_use]
pub fn rewrite_sale(content: &str) -> String {
    let swapped = content.replace(SALE_ACCOUNT, PURCHASE_ACCOUNT);
    let mut out = String::with_capacity(swapped.len());
    let mut copied = 0;
    let mut search = 0;
    while let Some(offset) = swapped[search..].find(BUYER_ACCOUNT) {
        let start = search + offset;
        if swapped[..start].ends_with(KEEP_PREFIX) {
            search = start + 1;
            continue;
        }
        out.push_str(&swapped[copied..start]);
        out.push_str(SELLER_ACCOUNT);
        copied = start + BUYER_ACCOUNT.len();
        search = copied;
    }
    out.push_str(&swapped[copied..]);
    out
}

/// Output path for a sale file: `x_venda.txt` becomes `x_compra.txt`, anything
/// else gets `_compra.txt` appended to its stem.
#[must_use]
pub fn purchase_path(sale: &Path) -> PathBuf {
    let name = sale
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some(prefix) = name.strip_suffix("_venda.txt") {
        return sale.with_file_name(format!("{prefix}_compra.txt"));
    }
    let stem = sale
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sale.with_file_name(format!("{stem}_compra.txt"))
}

/// Rewrite `input` into `output` (or the derived purchase path) and return the path written.
pub fn rewrite_sale_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if !input.is_file() {
        bail!("sale file not found: {}", input.display());
    }
    let content =
        fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let target = output.map_or_else(|| purchase_path(input), Path::to_path_buf);
    fs::write(&target, rewrite_sale(&content))
        .with_context(|| format!("write {}", target.display()))?;
    tracing::info!(
        input = %input.display(),
        output = %target.display(),
        "purchase file written"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swaps_both_accounts() {
        assert_eq!(rewrite_sale("A0177410001B"), "A0252977002B");
        assert_eq!(rewrite_sale("X52977002Y"), "X77410001Y");
    }

    #[test]
    fn test_keeps_buyer_account_after_prefix() {
        assert_eq!(rewrite_sale("0252977002"), "0252977002");
        // The 10-digit sale account turns into the prefixed form and is left alone.
        assert_eq!(rewrite_sale("0177410001 52977002"), "0252977002 77410001");
    }

    #[test]
    fn test_adjacent_matches() {
        // The prefix is read from the input, so a replaced account ending in
        // `02` still protects the one right after it.
        assert_eq!(rewrite_sale("5297700252977002"), "7741000152977002");
        assert_eq!(rewrite_sale("52977002X52977002"), "77410001X77410001");
    }

    #[test]
    fn test_non_ascii_content_is_preserved() {
        assert_eq!(rewrite_sale("ção52977002é"), "ção77410001é");
    }

    #[test]
    fn test_purchase_path() {
        assert_eq!(
            purchase_path(Path::new("/tmp/lote_venda.txt")),
            Path::new("/tmp/lote_compra.txt")
        );
        assert_eq!(
            purchase_path(Path::new("/tmp/lote.txt")),
            Path::new("/tmp/lote_compra.txt")
        );
    }
}
