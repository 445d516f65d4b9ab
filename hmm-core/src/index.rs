//! # Tabelas de Índices (símbolo ↔ id)
//!
//! Bijeções imutáveis entre as strings de superfície (palavras ou tags) e ids inteiros
//! densos `0..n`. O id de cada símbolo é a sua posição na listagem (número da linha,
//! começando em 0), atribuído uma única vez e nunca renumerado.
//!
//! Com ids densos, o modelo pode guardar transição e emissão em matrizes contíguas
//! em vez de mapas aninhados `HashMap<(String, String), f64>`.

use std::collections::HashMap;

use crate::error::{HmmError, Result, SymbolKind};

/// Tabela de índices imutável para um tipo de símbolo.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    kind: SymbolKind,
    /// `symbols[id]` = símbolo.
    symbols: Vec<String>,
    /// Inverso de `symbols`.
    ids: HashMap<String, usize>,
}

impl SymbolTable {
    /// Constrói a tabela a partir de uma listagem ordenada.
    ///
    /// Falha se a listagem estiver vazia, contiver um símbolo vazio ou repetido
    /// (a tabela precisa ser uma bijeção). Os erros apontam a linha do arquivo, contada a
    /// partir de 1.
    pub fn from_symbols<I, S>(kind: SymbolKind, symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            kind,
            symbols: Vec::new(),
            ids: HashMap::new(),
        };

        for (id, symbol) in symbols.into_iter().enumerate() {
            let symbol: String = symbol.into();
            if symbol.is_empty() {
                return Err(HmmError::MalformedIndex {
                    kind,
                    line: id + 1,
                    reason: "blank entry".to_string(),
                });
            }
            if let Some(first) = table.ids.get(&symbol) {
                return Err(HmmError::MalformedIndex {
                    kind,
                    line: id + 1,
                    reason: format!("{symbol:?} already listed on line {}", first + 1),
                });
            }
            table.ids.insert(symbol.clone(), id);
            table.symbols.push(symbol);
        }

        if table.symbols.is_empty() {
            return Err(HmmError::EmptyTable { kind });
        }
        Ok(table)
    }

    /// Lê um arquivo de índices já carregado em memória: um símbolo por linha.
    ///
    /// Espaços nas bordas de cada linha são descartados, assim como linhas em branco
    /// no final do arquivo. Uma linha em branco no meio da listagem é um erro, pois
    /// deslocaria todos os ids seguintes.
    pub fn parse(kind: SymbolKind, text: &str) -> Result<Self> {
        Self::from_symbols(kind, text.trim_end().lines().map(str::trim))
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Número de símbolos (K para tags, V para palavras).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Id do símbolo, se existir.
    pub fn id(&self, symbol: &str) -> Option<usize> {
        self.ids.get(symbol).copied()
    }

    /// Como [`SymbolTable::id`], mas falha com `UnknownSymbol`.
    pub fn lookup(&self, symbol: &str) -> Result<usize> {
        self.id(symbol).ok_or_else(|| HmmError::UnknownSymbol {
            kind: self.kind,
            symbol: symbol.to_string(),
        })
    }

    /// Símbolo do id, se existir.
    pub fn symbol(&self, id: usize) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    /// Como [`SymbolTable::symbol`], mas falha com `IndexMismatch`.
    pub fn resolve(&self, id: usize) -> Result<&str> {
        self.symbol(id).ok_or(HmmError::IndexMismatch {
            kind: self.kind,
            id,
            size: self.symbols.len(),
        })
    }

    /// Símbolos em ordem de id.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_listing_order() {
        let tags = SymbolTable::parse(SymbolKind::Tag, "N\nV\nADJ\n").unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags.id("N"), Some(0));
        assert_eq!(tags.id("ADJ"), Some(2));
        assert_eq!(tags.symbol(1), Some("V"));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["N", "V", "ADJ"]);
    }

    #[test]
    fn test_trailing_blank_lines_and_spaces_are_ignored() {
        let words = SymbolTable::parse(SymbolKind::Word, " dog \r\nruns\n\n\n").unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words.id("dog"), Some(0));
        assert_eq!(words.id("runs"), Some(1));
    }

    #[test]
    fn test_interior_blank_line_is_rejected() {
        let err = SymbolTable::parse(SymbolKind::Word, "dog\n\nruns\n").unwrap_err();
        assert!(matches!(err, HmmError::MalformedIndex { line: 2, .. }));
        assert_eq!(err.to_string(), "word index line 2: blank entry");
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let err = SymbolTable::parse(SymbolKind::Tag, "N\nV\nN\n").unwrap_err();
        assert!(matches!(
            err,
            HmmError::MalformedIndex {
                kind: SymbolKind::Tag,
                line: 3,
                ..
            }
        ));
        assert!(err.to_string().ends_with("\"N\" already listed on line 1"));
    }

    #[test]
    fn test_empty_listing_is_rejected() {
        let err = SymbolTable::parse(SymbolKind::Tag, "\n\n").unwrap_err();
        assert!(matches!(err, HmmError::EmptyTable { kind: SymbolKind::Tag }));
    }

    #[test]
    fn test_lookup_and_resolve_errors() {
        let tags = SymbolTable::from_symbols(SymbolKind::Tag, ["N", "V"]).unwrap();
        assert!(matches!(
            tags.lookup("ADJ"),
            Err(HmmError::UnknownSymbol { kind: SymbolKind::Tag, .. })
        ));
        assert!(matches!(
            tags.resolve(2),
            Err(HmmError::IndexMismatch { id: 2, size: 2, .. })
        ));
        assert_eq!(tags.resolve(1).unwrap(), "V");
    }
}
