//! Treina o HMM por contagem supervisionada e grava prior, emissão e transição.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hmm_cli::{init_tracing, load_corpus, load_indexes, write_file};
use hmm_core::estimate;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Estima os parâmetros de um HMM a partir de um corpus etiquetado.")]
struct Args {
    /// Corpus de treino: uma sequência `palavra_tag ...` por linha
    train_input: PathBuf,

    /// Vocabulário: uma palavra por linha (número da linha = id)
    index_to_word: PathBuf,

    /// Conjunto de tags: uma tag por linha (número da linha = id)
    index_to_tag: PathBuf,

    /// Arquivo de saída do prior (K linhas)
    hmmprior: PathBuf,

    /// Arquivo de saída da emissão (K linhas × V colunas)
    hmmemit: PathBuf,

    /// Arquivo de saída da transição (K linhas × K colunas)
    hmmtrans: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let indexes = load_indexes(&args.index_to_word, &args.index_to_tag)?;
    let (_, corpus) = load_corpus(&args.train_input, &indexes)?;

    let model = estimate(&corpus, indexes.tags.len(), indexes.words.len())
        .context("failed to estimate the model")?;
    info!(
        tags = model.num_tags(),
        palavras = model.num_words(),
        "modelo estimado"
    );

    write_file(&args.hmmprior, |out| model.write_prior(out))?;
    write_file(&args.hmmemit, |out| model.write_emission(out))?;
    write_file(&args.hmmtrans, |out| model.write_transition(out))?;
    info!("parâmetros gravados");

    Ok(())
}
