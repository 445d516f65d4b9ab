//! Avalia um corpus com forward-backward: grava as tags preditas e as métricas.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hmm_cli::{create_file, fill_file, init_tracing, load_corpus, load_indexes, read_text};
use hmm_core::corpus::{format_line, DEFAULT_DELIMITER};
use hmm_core::{evaluate, HmmModel};
use tracing::{info, warn};

/// Tolerância para |Σ − 1| nas distribuições de um modelo carregado.
const STOCHASTIC_TOLERANCE: f64 = 1e-6;

#[derive(Parser, Debug)]
#[command(about = "Avalia um corpus etiquetado com o algoritmo forward-backward.")]
struct Args {
    /// Corpus a avaliar: uma sequência `palavra_tag ...` por linha
    validation_input: PathBuf,

    /// Vocabulário: uma palavra por linha (número da linha = id)
    index_to_word: PathBuf,

    /// Conjunto de tags: uma tag por linha (número da linha = id)
    index_to_tag: PathBuf,

    /// Prior estimado (K linhas)
    hmmprior: PathBuf,

    /// Emissão estimada (K linhas × V colunas)
    hmmemit: PathBuf,

    /// Transição estimada (K linhas × K colunas)
    hmmtrans: PathBuf,

    /// Arquivo de saída com as tags preditas
    predicted_file: PathBuf,

    /// Arquivo de saída com as métricas
    metric_file: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let indexes = load_indexes(&args.index_to_word, &args.index_to_tag)?;
    let (corpus, encoded) = load_corpus(&args.validation_input, &indexes)?;

    let model = HmmModel::from_text(
        &read_text(&args.hmmprior)?,
        &read_text(&args.hmmtrans)?,
        &read_text(&args.hmmemit)?,
        indexes.tags.len(),
        indexes.words.len(),
    )
    .context("invalid model files")?;
    let deviation = model.stochastic_deviation();
    if deviation > STOCHASTIC_TOLERANCE {
        warn!(deviation, "o modelo carregado não é estocástico por linha");
    }

    let evaluation = evaluate(&model, &encoded).context("evaluation failed")?;
    info!(
        avg_log_likelihood = evaluation.metrics.avg_log_likelihood,
        accuracy = evaluation.metrics.accuracy,
        "avaliação concluída"
    );

    let mut lines = Vec::with_capacity(corpus.len());
    for (sequence, predicted) in corpus.iter().zip(&evaluation.predictions) {
        let tags = predicted
            .iter()
            .map(|&id| indexes.tags.resolve(id))
            .collect::<hmm_core::Result<Vec<_>>>()?;
        lines.push(format_line(
            sequence.words.iter().map(String::as_str),
            tags,
            DEFAULT_DELIMITER,
        ));
    }

    // As duas saídas existem antes de qualquer escrita: se uma não pode ser criada,
    // nenhuma fica no disco.
    let predicted_out = create_file(&args.predicted_file)?;
    let metric_out = match create_file(&args.metric_file) {
        Ok(out) => out,
        Err(err) => {
            drop(predicted_out);
            if let Err(remove_err) = fs::remove_file(&args.predicted_file) {
                warn!(erro = %remove_err, "não foi possível remover o arquivo de predições");
            }
            return Err(err);
        }
    };

    fill_file(&args.predicted_file, predicted_out, |out| {
        for line in &lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    })?;
    fill_file(&args.metric_file, metric_out, |out| {
        writeln!(out, "{}", evaluation.metrics)?;
        Ok(())
    })?;

    Ok(())
}
