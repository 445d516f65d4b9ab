//! # Erros do Motor HMM
//!
//! Todos os erros são detectados na carga/parse das entradas (corpus, índices, tabelas do
//! modelo) e propagados como falhas definitivas: nenhuma saída parcial é produzida.

use std::fmt;

use thiserror::Error;

/// Qual tabela de índices está envolvida em um erro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Vocabulário de palavras (observações).
    Word,
    /// Conjunto de tags (estados ocultos).
    Tag,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Word => f.write_str("word"),
            SymbolKind::Tag => f.write_str("tag"),
        }
    }
}

/// Qual família de distribuições do modelo está envolvida em um erro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTable {
    Prior,
    Transition,
    Emission,
}

impl fmt::Display for ModelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTable::Prior => f.write_str("prior"),
            ModelTable::Transition => f.write_str("transition"),
            ModelTable::Emission => f.write_str("emission"),
        }
    }
}

/// Erro unificado de todas as operações do crate.
#[derive(Debug, Error)]
pub enum HmmError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token sem exatamente um delimitador (ex: `dog`, `a_b_c`).
    #[error("malformed token {token:?} on line {line}: expected exactly one '{delimiter}'")]
    MalformedToken {
        line: usize,
        token: String,
        delimiter: char,
    },

    /// Palavra ou tag ausente da tabela de índices correspondente.
    #[error("unknown {kind} {symbol:?}")]
    UnknownSymbol { kind: SymbolKind, symbol: String },

    /// Id numérico fora do intervalo da tabela de índices.
    #[error("{kind} id {id} has no entry in an index of size {size}")]
    IndexMismatch {
        kind: SymbolKind,
        id: usize,
        size: usize,
    },

    /// Sequência codificada com número diferente de palavras e tags.
    #[error("sequence has {words} words but {tags} tags")]
    LengthMismatch { words: usize, tags: usize },

    /// Dimensões de uma tabela carregada não batem com K/V.
    #[error("{table} table has the wrong shape: {detail}")]
    ModelShapeMismatch { table: ModelTable, detail: String },

    /// Entrada ≤ 0: o logaritmo não é definido.
    #[error("{table} entry at row {row}, column {column} is not strictly positive: {value}")]
    NonPositiveProbability {
        table: ModelTable,
        row: usize,
        column: usize,
        value: f64,
    },

    #[error("{table} file line {line}: {value:?} is not a finite number")]
    InvalidNumber {
        table: ModelTable,
        line: usize,
        value: String,
    },

    #[error("{kind} index line {line}: {reason}")]
    MalformedIndex {
        kind: SymbolKind,
        line: usize,
        reason: String,
    },

    #[error("{kind} index is empty")]
    EmptyTable { kind: SymbolKind },

    #[error("observation sequence is empty")]
    EmptySequence,

    #[error("corpus has no sequences")]
    EmptyCorpus,
}

pub type Result<T> = std::result::Result<T, HmmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = HmmError::UnknownSymbol {
            kind: SymbolKind::Word,
            symbol: "gato".to_string(),
        };
        assert_eq!(err.to_string(), "unknown word \"gato\"");

        let err = HmmError::NonPositiveProbability {
            table: ModelTable::Emission,
            row: 1,
            column: 3,
            value: 0.0,
        };
        assert!(err.to_string().starts_with("emission entry at row 1, column 3"));

        let err = HmmError::LengthMismatch { words: 3, tags: 1 };
        assert_eq!(err.to_string(), "sequence has 3 words but 1 tags");
    }
}
