//! # Estimação Supervisionada dos Parâmetros
//!
//! Máxima verossimilhança por contagem, com suavização **Add-1 (Laplace)**:
//!
//! $$ \pi_s = \frac{c_\pi(s) + 1}{N + K} \qquad
//!    A_{s,s'} = \frac{c_A(s, s') + 1}{\sum_{s''} c_A(s, s'') + K} \qquad
//!    B_{s,w} = \frac{c_B(s, w) + 1}{\sum_{w'} c_B(s, w') + V} $$
//!
//! onde N é o número de sequências. Somar 1 a cada contagem garante que toda
//! combinação (mesmo nunca vista no treino) receba probabilidade positiva, o que
//! mantém os logaritmos da inferência definidos.
//!
//! As contagens são inteiras e comutativas: o corpus é dividido entre as threads do
//! Rayon e as contagens parciais são somadas no fim, com resultado idêntico ao
//! sequencial.

use rayon::prelude::*;
use tracing::debug;

use crate::corpus::EncodedSequence;
use crate::error::{HmmError, Result, SymbolKind};
use crate::model::HmmModel;

/// Contagens brutas de prior, transição e emissão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    num_tags: usize,
    num_words: usize,
    sequences: u64,
    prior: Vec<u64>,
    /// K×K, row-major (linha = tag de origem).
    transition: Vec<u64>,
    /// K×V, row-major (linha = tag).
    emission: Vec<u64>,
}

impl Counts {
    pub fn new(num_tags: usize, num_words: usize) -> Self {
        Self {
            num_tags,
            num_words,
            sequences: 0,
            prior: vec![0; num_tags],
            transition: vec![0; num_tags * num_tags],
            emission: vec![0; num_tags * num_words],
        }
    }

    /// Acumula uma sequência. Falha com `LengthMismatch` se palavras e tags não formarem
    /// pares, ou com `IndexMismatch` se algum id estiver fora das tabelas; nesses casos as
    /// contagens não são alteradas.
    pub fn observe(&mut self, sequence: &EncodedSequence) -> Result<()> {
        self.check_ids(sequence)?;

        let Some(&first) = sequence.tags.first() else {
            return Ok(());
        };
        self.sequences += 1;
        self.prior[first] += 1;

        for pair in sequence.tags.windows(2) {
            self.transition[pair[0] * self.num_tags + pair[1]] += 1;
        }
        for (&tag, &word) in sequence.tags.iter().zip(&sequence.words) {
            self.emission[tag * self.num_words + word] += 1;
        }
        Ok(())
    }

    fn check_ids(&self, sequence: &EncodedSequence) -> Result<()> {
        if sequence.words.len() != sequence.tags.len() {
            return Err(HmmError::LengthMismatch {
                words: sequence.words.len(),
                tags: sequence.tags.len(),
            });
        }
        if let Some(&id) = sequence.tags.iter().find(|&&t| t >= self.num_tags) {
            return Err(HmmError::IndexMismatch {
                kind: SymbolKind::Tag,
                id,
                size: self.num_tags,
            });
        }
        if let Some(&id) = sequence.words.iter().find(|&&w| w >= self.num_words) {
            return Err(HmmError::IndexMismatch {
                kind: SymbolKind::Word,
                id,
                size: self.num_words,
            });
        }
        Ok(())
    }

    /// Soma duas contagens parciais (mesmas dimensões).
    pub fn merge(mut self, other: Self) -> Self {
        self.sequences += other.sequences;
        for (a, b) in self.prior.iter_mut().zip(other.prior) {
            *a += b;
        }
        for (a, b) in self.transition.iter_mut().zip(other.transition) {
            *a += b;
        }
        for (a, b) in self.emission.iter_mut().zip(other.emission) {
            *a += b;
        }
        self
    }

    /// Número de sequências observadas (N).
    pub fn sequences(&self) -> u64 {
        self.sequences
    }

    /// Normaliza as contagens com Add-1 em um [`HmmModel`].
    pub fn into_model(self) -> Result<HmmModel> {
        let k = self.num_tags;
        let v = self.num_words;

        let prior = smooth_row(&self.prior, self.sequences, k);
        let transition = self
            .transition
            .chunks(k.max(1))
            .map(|row| smooth_row(row, row.iter().sum(), k))
            .collect();
        let emission = self
            .emission
            .chunks(v.max(1))
            .map(|row| smooth_row(row, row.iter().sum(), v))
            .collect();

        HmmModel::new(prior, transition, emission)
    }
}

/// `(c + 1) / (total + categories)` para cada contagem da linha.
fn smooth_row(counts: &[u64], total: u64, categories: usize) -> Vec<f64> {
    let denominator = (total + categories as u64) as f64;
    counts
        .iter()
        .map(|&c| (c + 1) as f64 / denominator)
        .collect()
}

/// Estima um [`HmmModel`] a partir de um corpus codificado com K tags e V palavras.
///
/// # Exemplo
/// ```rust
/// use hmm_core::corpus::EncodedSequence;
/// use hmm_core::estimator::estimate;
///
/// // "dog_N runs_V" com tags {N, V} e vocabulário {dog, runs}
/// let corpus = vec![EncodedSequence { words: vec![0, 1], tags: vec![0, 1] }];
/// let model = estimate(&corpus, 2, 2).unwrap();
/// assert!((model.prior()[0] - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn estimate(corpus: &[EncodedSequence], num_tags: usize, num_words: usize) -> Result<HmmModel> {
    let counts = corpus
        .par_iter()
        .try_fold(
            || Counts::new(num_tags, num_words),
            |mut counts, sequence| {
                counts.observe(sequence)?;
                Ok::<_, HmmError>(counts)
            },
        )
        .try_reduce(|| Counts::new(num_tags, num_words), |a, b| Ok(a.merge(b)))?;

    debug!(
        sequences = counts.sequences(),
        num_tags, num_words, "contagens acumuladas"
    );
    counts.into_model()
}
