use crate::MarketError;

const MAX_SYMBOL_LEN: usize = 20;

/// Trim and uppercase a user-supplied ticker.
///
/// Accepts ASCII alphanumerics plus the separators used by exchange-qualified
/// and index tickers (`BRK.B`, `RDS-A`, `TSX:RY`, `^GSPC`, `EURUSD=X`).
pub fn normalize_symbol(raw: &str) -> Result<String, MarketError> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(MarketError::InvalidSymbol("symbol is empty".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(MarketError::InvalidSymbol(format!(
            "{} exceeds {} characters",
            symbol, MAX_SYMBOL_LEN
        )));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '^' | '=')))
    {
        return Err(MarketError::InvalidSymbol(format!(
            "{} contains unsupported character '{}'",
            symbol, bad
        )));
    }

    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_uppercases() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(
            normalize_symbol("   "),
            Err(MarketError::InvalidSymbol(_))
        ));
    }

    #[test]
    fn test_normalize_rejects_bad_chars() {
        assert!(normalize_symbol("AA PL").is_err());
        assert!(normalize_symbol("AAPL;DROP").is_err());
        assert!(normalize_symbol("../etc").is_err());
    }

    #[test]
    fn test_normalize_rejects_long_input() {
        let long = "A".repeat(21);
        assert!(normalize_symbol(&long).is_err());
        assert!(normalize_symbol(&"A".repeat(20)).is_ok());
    }
}
