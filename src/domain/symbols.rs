//! Symbol list parsing.
//!
//! Symbols are separated by commas and/or newlines, trimmed and upper-cased.
//! Blank tokens are ignored and repeats keep their first position. Tokens
//! longer than [`MAX_SYMBOL_LEN`] are set aside as rejected.

use std::collections::HashSet;

pub const MAX_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolList {
    pub symbols: Vec<String>,
    pub rejected: Vec<String>,
}

impl SymbolList {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolError {
    #[error("no symbols given")]
    Empty,

    #[error("no valid symbols; rejected: {}", .0.join(", "))]
    AllRejected(Vec<String>),
}

pub fn parse_symbols(input: &str) -> Result<SymbolList, SymbolError> {
    let mut list = SymbolList::default();
    let mut seen = HashSet::new();

    for token in input.split(['\n', ',']) {
        let symbol = token.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        if symbol.chars().count() > MAX_SYMBOL_LEN {
            list.rejected.push(symbol);
            continue;
        }
        if seen.insert(symbol.clone()) {
            list.symbols.push(symbol);
        }
    }

    if list.symbols.is_empty() {
        if list.rejected.is_empty() {
            return Err(SymbolError::Empty);
        }
        return Err(SymbolError::AllRejected(list.rejected));
    }
    Ok(list)
}
