//! # Forward-Backward em Log-Space
//!
//! Para uma sequência de observações $o_1 \ldots o_T$:
//!
//! ```text
//! Forward:   α[1][s] = log π[s] + log B[s][o₁]
//!            α[t][s] = log B[s][oₜ] + LSE_{s'}( α[t-1][s'] + log A[s'][s] )      t = 2..T
//!
//! Backward:  β[T][s] = 0
//!            β[t][s] = LSE_{s'}( log B[s'][oₜ₊₁] + β[t+1][s'] + log A[s][s'] )   t = T-1..1
//! ```
//!
//! `α[t][s] = log P(o₁..oₜ, yₜ = s)` e `β[t][s] = log P(oₜ₊₁..o_T | yₜ = s)`.
//! Multiplicar centenas de probabilidades pequenas causaria underflow em espaço
//! linear; em log-space os produtos viram somas e as somas viram [`log_sum_exp`].
//!
//! Nos tipos abaixo o tempo é indexado a partir de 0 (`t = 0..T`).

use crate::error::{HmmError, Result, SymbolKind};
use crate::model::HmmModel;

/// `log Σ exp(vᵢ)` estável: `max(v) + log Σ exp(vᵢ − max(v))`.
///
/// Retorna `-∞` para um slice vazio ou só com `-∞` (probabilidade zero).
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Logaritmos das tabelas do [`HmmModel`], calculados uma vez e compartilhados
/// (somente leitura) por todas as sequências.
#[derive(Debug, Clone, PartialEq)]
pub struct LogModel {
    num_tags: usize,
    num_words: usize,
    prior: Vec<f64>,
    /// K×K, row-major (linha = origem).
    transition: Vec<f64>,
    /// K×V, row-major (linha = tag).
    emission: Vec<f64>,
}

impl From<&HmmModel> for LogModel {
    fn from(model: &HmmModel) -> Self {
        let k = model.num_tags();
        Self {
            num_tags: k,
            num_words: model.num_words(),
            prior: model.prior().iter().map(|p| p.ln()).collect(),
            transition: (0..k)
                .flat_map(|s| model.transition_row(s).iter().map(|p| p.ln()))
                .collect(),
            emission: (0..k)
                .flat_map(|s| model.emission_row(s).iter().map(|p| p.ln()))
                .collect(),
        }
    }
}

impl LogModel {
    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    pub fn num_words(&self) -> usize {
        self.num_words
    }

    #[inline]
    fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition[from * self.num_tags + to]
    }

    #[inline]
    fn emission(&self, tag: usize, word: usize) -> f64 {
        self.emission[tag * self.num_words + word]
    }

    /// Confere que a sequência é não vazia e que todo id está no vocabulário.
    fn check_observations(&self, observations: &[usize]) -> Result<()> {
        if observations.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        match observations.iter().find(|&&w| w >= self.num_words) {
            Some(&id) => Err(HmmError::IndexMismatch {
                kind: SymbolKind::Word,
                id,
                size: self.num_words,
            }),
            None => Ok(()),
        }
    }
}

/// Tabela T×K de scores em log (α ou β). `row(t)[s]` é o score do estado `s` no tempo `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    num_tags: usize,
    data: Vec<f64>,
}

impl Lattice {
    fn new(len: usize, num_tags: usize) -> Self {
        Self {
            num_tags,
            data: vec![0.0; len * num_tags],
        }
    }

    /// Comprimento T.
    pub fn len(&self) -> usize {
        self.data.len() / self.num_tags
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn num_tags(&self) -> usize {
        self.num_tags
    }

    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.num_tags..(t + 1) * self.num_tags]
    }

    fn row_mut(&mut self, t: usize) -> &mut [f64] {
        &mut self.data[t * self.num_tags..(t + 1) * self.num_tags]
    }

    /// Dois tempos adjacentes: (`t`, `t + 1`), o primeiro mutável.
    fn pair_mut(&mut self, t: usize) -> (&mut [f64], &[f64]) {
        let (head, tail) = self.data.split_at_mut((t + 1) * self.num_tags);
        (&mut head[t * self.num_tags..], &tail[..self.num_tags])
    }

    /// Dois tempos adjacentes: (`t - 1`, `t`), o segundo mutável.
    fn prev_pair_mut(&mut self, t: usize) -> (&[f64], &mut [f64]) {
        let (head, tail) = self.data.split_at_mut(t * self.num_tags);
        (&head[(t - 1) * self.num_tags..], &mut tail[..self.num_tags])
    }
}

/// Passo forward: calcula α para toda a sequência.
///
/// T = 1 é só o caso base; o laço da recorrência fica vazio.
pub fn forward(model: &LogModel, observations: &[usize]) -> Result<Lattice> {
    model.check_observations(observations)?;
    let k = model.num_tags;
    let mut alpha = Lattice::new(observations.len(), k);
    let mut terms = vec![0.0; k];

    for (s, a) in alpha.row_mut(0).iter_mut().enumerate() {
        *a = model.prior[s] + model.emission(s, observations[0]);
    }

    for (t, &word) in observations.iter().enumerate().skip(1) {
        let (prev, curr) = alpha.prev_pair_mut(t);
        for (s, a) in curr.iter_mut().enumerate() {
            for (from, term) in terms.iter_mut().enumerate() {
                *term = prev[from] + model.transition(from, s);
            }
            *a = model.emission(s, word) + log_sum_exp(&terms);
        }
    }

    Ok(alpha)
}

/// Passo backward: calcula β para toda a sequência.
pub fn backward(model: &LogModel, observations: &[usize]) -> Result<Lattice> {
    model.check_observations(observations)?;
    let k = model.num_tags;
    // β[T-1][s] = log 1 = 0 já vem da inicialização
    let mut beta = Lattice::new(observations.len(), k);
    let mut terms = vec![0.0; k];

    for t in (0..observations.len() - 1).rev() {
        let next_word = observations[t + 1];
        let (curr, next) = beta.pair_mut(t);
        for (s, b) in curr.iter_mut().enumerate() {
            for (to, term) in terms.iter_mut().enumerate() {
                *term = model.emission(to, next_word) + next[to] + model.transition(s, to);
            }
            *b = log_sum_exp(&terms);
        }
    }

    Ok(beta)
}

/// Resultado do forward-backward de uma sequência.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardBackward {
    pub alpha: Lattice,
    pub beta: Lattice,
}

impl ForwardBackward {
    /// Executa os dois passos sobre a sequência.
    pub fn run(model: &LogModel, observations: &[usize]) -> Result<Self> {
        Ok(Self {
            alpha: forward(model, observations)?,
            beta: backward(model, observations)?,
        })
    }

    /// Comprimento T.
    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// $\log P(o_1 \ldots o_T) = \text{LSE}_s\, \alpha[T][s]$
    pub fn log_likelihood(&self) -> f64 {
        log_sum_exp(self.alpha.row(self.alpha.len() - 1))
    }

    /// $\text{LSE}_s(\alpha[t][s] + \beta[t][s])$: a mesma verossimilhança calculada no tempo `t`.
    pub fn log_likelihood_at(&self, t: usize) -> f64 {
        log_sum_exp(&self.scores(t))
    }

    /// `score(t, s) = α[t][s] + β[t][s]`, proporcional a $\log P(y_t = s \mid o)$.
    pub fn scores(&self, t: usize) -> Vec<f64> {
        self.alpha
            .row(t)
            .iter()
            .zip(self.beta.row(t))
            .map(|(a, b)| a + b)
            .collect()
    }

    /// Marginais posteriores normalizadas $P(y_t = s \mid o)$; somam 1.
    pub fn posteriors(&self, t: usize) -> Vec<f64> {
        let ll = self.log_likelihood();
        self.scores(t).into_iter().map(|s| (s - ll).exp()).collect()
    }
}
