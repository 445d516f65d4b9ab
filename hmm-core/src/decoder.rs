//! # Decodificação Posterior e Avaliação
//!
//! Para cada posição `t` escolhemos, **independentemente**, a tag que maximiza a
//! marginal posterior $P(y_t = s \mid o)$:
//!
//! $$ \hat{y}_t = \arg\max_s\; \alpha[t][s] + \beta[t][s] $$
//!
//! O normalizador $\log P(o)$ é comum a todas as tags e não muda o argmax. Isso **não**
//! é Viterbi: a sequência resultante pode até ter transições improváveis, mas cada
//! posição individual tem a maior chance de estar correta.
//!
//! ## Avaliação do corpus
//! Cada sequência é uma unidade independente de trabalho ([`evaluate_sequence`]) e o corpus
//! é processado em paralelo com Rayon. Os resultados voltam na ordem do corpus e são
//! combinados por uma redução explícita ([`Tally`]), de modo que as métricas são
//! idênticas bit a bit para qualquer número de threads.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::EncodedSequence;
use crate::error::{HmmError, Result};
use crate::inference::{ForwardBackward, LogModel};
use crate::model::HmmModel;

/// Índice do maior score; empates ficam com o menor índice (primeira tag listada).
pub fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Tag posterior mais provável em cada posição.
pub fn decode(fb: &ForwardBackward) -> Vec<usize> {
    (0..fb.len()).map(|t| argmax(&fb.scores(t))).collect()
}

/// Resultado da avaliação de uma única sequência.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceResult {
    /// Ids das tags preditas, uma por token.
    pub predicted: Vec<usize>,
    /// $\log P(o_1 \ldots o_T)$
    pub log_likelihood: f64,
    /// Tokens cuja tag predita difere da tag de referência.
    pub mismatches: usize,
}

/// Avalia uma sequência: forward-backward, decodificação e comparação com as tags de
/// referência. Função pura: só lê o modelo.
///
/// Cada palavra precisa da sua tag de referência; caso contrário falha com
/// `LengthMismatch`.
pub fn evaluate_sequence(model: &LogModel, sequence: &EncodedSequence) -> Result<SequenceResult> {
    if sequence.words.len() != sequence.tags.len() {
        return Err(HmmError::LengthMismatch {
            words: sequence.words.len(),
            tags: sequence.tags.len(),
        });
    }
    let fb = ForwardBackward::run(model, &sequence.words)?;
    let predicted = decode(&fb);
    let mismatches = predicted
        .iter()
        .zip(&sequence.tags)
        .filter(|(p, gold)| p != gold)
        .count();

    Ok(SequenceResult {
        log_likelihood: fb.log_likelihood(),
        predicted,
        mismatches,
    })
}

/// Acumulador associativo das métricas do corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub sequences: usize,
    pub tokens: usize,
    pub mismatches: usize,
    pub log_likelihood_sum: f64,
}

impl Tally {
    /// Contribuição de uma sequência.
    pub fn of(result: &SequenceResult) -> Self {
        Self {
            sequences: 1,
            tokens: result.predicted.len(),
            mismatches: result.mismatches,
            log_likelihood_sum: result.log_likelihood,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            sequences: self.sequences + other.sequences,
            tokens: self.tokens + other.tokens,
            mismatches: self.mismatches + other.mismatches,
            log_likelihood_sum: self.log_likelihood_sum + other.log_likelihood_sum,
        }
    }

    /// Divide os totais. Falha com `EmptyCorpus` se nada foi acumulado.
    pub fn metrics(&self) -> Result<Metrics> {
        if self.sequences == 0 || self.tokens == 0 {
            return Err(HmmError::EmptyCorpus);
        }
        Ok(Metrics {
            avg_log_likelihood: self.log_likelihood_sum / self.sequences as f64,
            accuracy: 1.0 - self.mismatches as f64 / self.tokens as f64,
        })
    }
}

/// Métricas agregadas do corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Média de $\log P(o)$ por sequência (sem normalizar pelo comprimento).
    pub avg_log_likelihood: f64,
    /// `1 - erros / tokens`.
    pub accuracy: f64,
}

impl fmt::Display for Metrics {
    /// Formato do arquivo de métricas: duas linhas.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average Log-Likelihood: {:?}", self.avg_log_likelihood)?;
        write!(f, "Accuracy: {:?}", self.accuracy)
    }
}

/// Predições de todas as sequências (na ordem do corpus) e métricas agregadas.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub predictions: Vec<Vec<usize>>,
    pub metrics: Metrics,
}

/// Avalia o corpus inteiro com o modelo.
///
/// # Exemplo
/// ```rust
/// use hmm_core::corpus::EncodedSequence;
/// use hmm_core::decoder::evaluate;
/// use hmm_core::estimator::estimate;
///
/// let corpus = vec![EncodedSequence { words: vec![0, 1], tags: vec![0, 1] }];
/// let model = estimate(&corpus, 2, 2).unwrap();
/// let evaluation = evaluate(&model, &corpus).unwrap();
/// assert_eq!(evaluation.predictions, vec![vec![0, 1]]);
/// assert_eq!(evaluation.metrics.accuracy, 1.0);
/// ```
pub fn evaluate(model: &HmmModel, corpus: &[EncodedSequence]) -> Result<Evaluation> {
    let log_model = LogModel::from(model);

    let results = corpus
        .par_iter()
        .map(|sequence| evaluate_sequence(&log_model, sequence))
        .collect::<Result<Vec<_>>>()?;

    // Soma de f64 não é associativa: reduzimos na ordem do corpus, não na ordem das threads.
    let tally = results
        .iter()
        .map(Tally::of)
        .fold(Tally::default(), Tally::merge);
    let metrics = tally.metrics()?;

    debug!(
        sequences = tally.sequences,
        tokens = tally.tokens,
        mismatches = tally.mismatches,
        "corpus avaliado"
    );

    Ok(Evaluation {
        predictions: results.into_iter().map(|r| r.predicted).collect(),
        metrics,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::inference::proptests::model_and_observations;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prediction_is_the_posterior_mode((model, observations) in model_and_observations()) {
            let log_model = LogModel::from(&model);
            let fb = ForwardBackward::run(&log_model, &observations).unwrap();
            let predicted = decode(&fb);
            prop_assert_eq!(predicted.len(), observations.len());
            for (t, &tag) in predicted.iter().enumerate() {
                let posteriors = fb.posteriors(t);
                prop_assert!(posteriors.iter().all(|&p| p <= posteriors[tag] + 1e-12));
                // nenhum índice menor tem o mesmo score
                let scores = fb.scores(t);
                prop_assert!(scores[..tag].iter().all(|&s| s < scores[tag]));
            }
        }

        #[test]
        fn evaluation_is_repeatable((model, observations) in model_and_observations()) {
            let tags = vec![0; observations.len()];
            let corpus = vec![EncodedSequence { words: observations, tags }];
            let first = evaluate(&model, &corpus).unwrap();
            let second = evaluate(&model, &corpus).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
