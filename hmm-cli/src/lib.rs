//! Utilitários compartilhados pelos binários `learnhmm`, `forwardbackward` e `hmm-curve`:
//! configuração do logging e leitura/escrita dos arquivos de texto.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hmm_core::corpus::{encode_corpus, parse_corpus, EncodedSequence, TaggedSequence, DEFAULT_DELIMITER};
use hmm_core::{SymbolKind, SymbolTable};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logging em stderr; o nível vem de `RUST_LOG` (padrão `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Cria (ou trunca) `path` para escrita bufferizada.
pub fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Preenche um arquivo já criado com `write` e faz flush.
pub fn fill_file<F>(path: &Path, mut out: BufWriter<File>, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> hmm_core::Result<()>,
{
    write(&mut out).with_context(|| format!("failed to write {}", path.display()))?;
    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Cria `path` e entrega um writer bufferizado para `write`; faz flush no fim.
pub fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> hmm_core::Result<()>,
{
    fill_file(path, create_file(path)?, write)
}

/// Vocabulário e conjunto de tags.
pub struct Indexes {
    pub words: SymbolTable,
    pub tags: SymbolTable,
}

pub fn load_indexes(word_path: &Path, tag_path: &Path) -> Result<Indexes> {
    let words = SymbolTable::parse(SymbolKind::Word, &read_text(word_path)?)
        .with_context(|| format!("invalid word index {}", word_path.display()))?;
    let tags = SymbolTable::parse(SymbolKind::Tag, &read_text(tag_path)?)
        .with_context(|| format!("invalid tag index {}", tag_path.display()))?;
    info!(palavras = words.len(), tags = tags.len(), "índices carregados");
    Ok(Indexes { words, tags })
}

/// Lê e codifica um corpus. Devolve também as sequências em texto, usadas para escrever
/// as predições com as palavras originais.
pub fn load_corpus(path: &Path, indexes: &Indexes) -> Result<(Vec<TaggedSequence>, Vec<EncodedSequence>)> {
    let corpus = parse_corpus(&read_text(path)?, DEFAULT_DELIMITER)
        .with_context(|| format!("invalid corpus {}", path.display()))?;
    let encoded = encode_corpus(&corpus, &indexes.words, &indexes.tags)
        .with_context(|| format!("invalid corpus {}", path.display()))?;
    info!(
        arquivo = %path.display(),
        sequencias = corpus.len(),
        tokens = encoded.iter().map(EncodedSequence::len).sum::<usize>(),
        "corpus carregado"
    );
    Ok((corpus, encoded))
}
