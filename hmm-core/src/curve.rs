//! # Curva de Aprendizado
//!
//! Mede como a verossimilhança média evolui com a quantidade de dados de treino:
//! para cada tamanho `n`, estima um modelo com as `n` primeiras sequências do treino e o
//! avalia no treino completo e na validação. O gráfico em si fica fora deste crate; aqui
//! só produzimos os pontos (serializáveis em JSON).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::EncodedSequence;
use crate::decoder::{evaluate, Metrics};
use crate::error::{HmmError, Result};
use crate::estimator::estimate;

/// Tamanhos de treino usados quando nenhum é informado.
pub const DEFAULT_SIZES: [usize; 4] = [10, 100, 1000, 10000];

/// Um ponto da curva.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Sequências de treino realmente usadas (limitado ao tamanho do treino).
    pub num_sequences: usize,
    pub train: Metrics,
    pub validation: Metrics,
}

/// Calcula um [`CurvePoint`] por tamanho em `sizes`, na ordem dada.
pub fn learning_curve(
    train: &[EncodedSequence],
    validation: &[EncodedSequence],
    sizes: &[usize],
    num_tags: usize,
    num_words: usize,
) -> Result<Vec<CurvePoint>> {
    if train.is_empty() || validation.is_empty() {
        return Err(HmmError::EmptyCorpus);
    }

    sizes
        .iter()
        .map(|&size| -> Result<CurvePoint> {
            let n = size.min(train.len());
            let model = estimate(&train[..n], num_tags, num_words)?;
            let point = CurvePoint {
                num_sequences: n,
                train: evaluate(&model, train)?.metrics,
                validation: evaluate(&model, validation)?.metrics,
            };
            info!(
                num_sequences = n,
                train = point.train.avg_log_likelihood,
                validation = point.validation.avg_log_likelihood,
                "ponto da curva"
            );
            Ok(point)
        })
        .collect()
}

/// Serializa a curva em JSON legível.
pub fn to_json(points: &[CurvePoint]) -> Result<String> {
    Ok(serde_json::to_string_pretty(points)?)
}
