//! Curva de aprendizado: verossimilhança média no treino e na validação em função do
//! número de sequências de treino. Grava os pontos em JSON.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hmm_cli::{init_tracing, load_corpus, load_indexes, write_file};
use hmm_core::curve::{learning_curve, to_json, DEFAULT_SIZES};

#[derive(Parser, Debug)]
#[command(about = "Calcula a curva de aprendizado do HMM (log-verossimilhança × tamanho do treino).")]
struct Args {
    /// Corpus de treino
    train_input: PathBuf,

    /// Corpus de validação
    validation_input: PathBuf,

    /// Vocabulário: uma palavra por linha
    index_to_word: PathBuf,

    /// Conjunto de tags: uma tag por linha
    index_to_tag: PathBuf,

    /// Arquivo JSON de saída
    output: PathBuf,

    /// Números de sequências de treino, separados por vírgula
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES)]
    sizes: Vec<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let indexes = load_indexes(&args.index_to_word, &args.index_to_tag)?;
    let (_, train) = load_corpus(&args.train_input, &indexes)?;
    let (_, validation) = load_corpus(&args.validation_input, &indexes)?;

    let points = learning_curve(
        &train,
        &validation,
        &args.sizes,
        indexes.tags.len(),
        indexes.words.len(),
    )
    .context("failed to compute the learning curve")?;
    let json = to_json(&points)?;

    write_file(&args.output, |out| {
        writeln!(out, "{json}")?;
        Ok(())
    })
}
