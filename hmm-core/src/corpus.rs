//! # Corpus Etiquetado
//!
//! Cada linha do corpus é uma sequência de tokens separados por espaço, no formato
//! `palavra<delim>tag`:
//!
//! ```text
//! the_DT dog_NN runs_VBZ
//! ```
//!
//! O corpus é lido em duas etapas:
//! 1. **Parse** ([`parse_corpus`]): texto → [`TaggedSequence`] (strings).
//! 2. **Codificação** ([`TaggedSequence::encode`]): strings → [`EncodedSequence`] (ids densos),
//!    usando as tabelas de índices. Palavras fora do vocabulário são **rejeitadas** aqui,
//!    antes de qualquer inferência.

use crate::error::{HmmError, Result};
use crate::index::SymbolTable;

/// Delimitador entre palavra e tag dentro de um token.
pub const DEFAULT_DELIMITER: char = '_';

/// Uma sequência etiquetada, ainda em strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSequence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

/// Uma sequência etiquetada em ids: `words[t]` ∈ `0..V`, `tags[t]` ∈ `0..K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    pub words: Vec<usize>,
    pub tags: Vec<usize>,
}

impl EncodedSequence {
    /// Comprimento T da sequência.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Separa um token em `(palavra, tag)`. Exige exatamente um delimitador e
/// ambos os lados não vazios.
pub fn split_token(token: &str, delimiter: char) -> Option<(&str, &str)> {
    let (word, tag) = token.split_once(delimiter)?;
    if word.is_empty() || tag.is_empty() || tag.contains(delimiter) {
        return None;
    }
    Some((word, tag))
}

/// Faz o parse de uma linha do corpus. `line_no` (base 1) aparece nas mensagens de erro.
pub fn parse_line(line: &str, line_no: usize, delimiter: char) -> Result<TaggedSequence> {
    let mut sequence = TaggedSequence {
        words: Vec::new(),
        tags: Vec::new(),
    };

    for token in line.split_whitespace() {
        let (word, tag) =
            split_token(token, delimiter).ok_or_else(|| HmmError::MalformedToken {
                line: line_no,
                token: token.to_string(),
                delimiter,
            })?;
        sequence.words.push(word.to_string());
        sequence.tags.push(tag.to_string());
    }

    if sequence.words.is_empty() {
        return Err(HmmError::EmptySequence);
    }
    Ok(sequence)
}

/// Faz o parse de um corpus inteiro, uma sequência por linha.
///
/// Linhas em branco não formam sequências e são puladas; a numeração de linhas
/// nas mensagens de erro continua refletindo o arquivo original.
pub fn parse_corpus(text: &str, delimiter: char) -> Result<Vec<TaggedSequence>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(line, i + 1, delimiter))
        .collect()
}

impl TaggedSequence {
    /// Comprimento T da sequência.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Converte palavras e tags em ids. Falha com `UnknownSymbol` no primeiro
    /// símbolo ausente das tabelas.
    pub fn encode(&self, words: &SymbolTable, tags: &SymbolTable) -> Result<EncodedSequence> {
        Ok(EncodedSequence {
            words: self
                .words
                .iter()
                .map(|w| words.lookup(w))
                .collect::<Result<_>>()?,
            tags: self
                .tags
                .iter()
                .map(|t| tags.lookup(t))
                .collect::<Result<_>>()?,
        })
    }
}

/// Codifica todas as sequências do corpus.
pub fn encode_corpus(
    corpus: &[TaggedSequence],
    words: &SymbolTable,
    tags: &SymbolTable,
) -> Result<Vec<EncodedSequence>> {
    corpus.iter().map(|s| s.encode(words, tags)).collect()
}

/// Formata uma linha no mesmo formato do corpus, pareando as palavras originais
/// com as tags fornecidas (ex: as preditas).
pub fn format_line<'a, W, T>(words: W, tags: T, delimiter: char) -> String
where
    W: IntoIterator<Item = &'a str>,
    T: IntoIterator<Item = &'a str>,
{
    words
        .into_iter()
        .zip(tags)
        .map(|(w, t)| format!("{w}{delimiter}{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SymbolKind;

    #[test]
    fn test_parse_line_splits_word_and_tag() {
        let seq = parse_line("dog_N  runs_V", 1, DEFAULT_DELIMITER).unwrap();
        assert_eq!(seq.words, vec!["dog", "runs"]);
        assert_eq!(seq.tags, vec!["N", "V"]);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_token_needs_exactly_one_delimiter() {
        assert_eq!(split_token("a_X", '_'), Some(("a", "X")));
        assert_eq!(split_token("aX", '_'), None);
        assert_eq!(split_token("a_b_X", '_'), None);
        assert_eq!(split_token("_X", '_'), None);
        assert_eq!(split_token("a_", '_'), None);

        let err = parse_line("dog_N runs", 7, '_').unwrap_err();
        match err {
            HmmError::MalformedToken { line, token, .. } => {
                assert_eq!(line, 7);
                assert_eq!(token, "runs");
            }
            other => panic!("erro inesperado: {other}"),
        }
    }

    #[test]
    fn test_parse_corpus_skips_blank_lines_but_keeps_numbering() {
        let corpus = parse_corpus("a_X\n\nb_Y c_X\n", '_').unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[1].words, vec!["b", "c"]);

        let err = parse_corpus("a_X\n\nbY\n", '_').unwrap_err();
        assert!(matches!(err, HmmError::MalformedToken { line: 3, .. }));
    }

    #[test]
    fn test_encode_rejects_unseen_word() {
        let words = SymbolTable::from_symbols(SymbolKind::Word, ["dog", "runs"]).unwrap();
        let tags = SymbolTable::from_symbols(SymbolKind::Tag, ["N", "V"]).unwrap();

        let seq = parse_line("dog_N runs_V", 1, '_').unwrap();
        let encoded = seq.encode(&words, &tags).unwrap();
        assert_eq!(encoded.words, vec![0, 1]);
        assert_eq!(encoded.tags, vec![0, 1]);

        let seq = parse_line("cat_N runs_V", 1, '_').unwrap();
        match seq.encode(&words, &tags).unwrap_err() {
            HmmError::UnknownSymbol { kind, symbol } => {
                assert_eq!(kind, SymbolKind::Word);
                assert_eq!(symbol, "cat");
            }
            other => panic!("erro inesperado: {other}"),
        }

        let seq = parse_line("dog_ADJ", 1, '_').unwrap();
        assert!(matches!(
            seq.encode(&words, &tags),
            Err(HmmError::UnknownSymbol { kind: SymbolKind::Tag, .. })
        ));
    }

    #[test]
    fn test_format_line_pairs_words_with_tags() {
        let line = format_line(["dog", "runs"], ["N", "N"], '_');
        assert_eq!(line, "dog_N runs_N");
    }
}
