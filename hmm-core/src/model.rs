//! # Modelo de Probabilidades do HMM
//!
//! Três tabelas densas indexadas pelos ids das [`SymbolTable`](crate::index::SymbolTable)s:
//!
//! | Tabela       | Forma | Significado                                   |
//! |--------------|-------|-----------------------------------------------|
//! | `prior`      | K     | $P(y_1 = s)$                                  |
//! | `transition` | K×K   | $P(y_{t+1} = s' \mid y_t = s)$ (linha = origem) |
//! | `emission`   | K×V   | $P(x_t = w \mid y_t = s)$ (linha = tag)       |
//!
//! ## Invariante
//! Toda entrada é estritamente positiva. O [`estimator`](crate::estimator) garante isso
//! pela suavização de Laplace; um modelo lido de arquivos é **validado** em
//! [`HmmModel::new`], nunca presumido válido.
//!
//! ## Formato em texto
//! Uma linha por linha da tabela, valores separados por espaço:
//!
//! ```text
//! 0.6666666666666666 0.3333333333333333
//! 0.5 0.5
//! ```

use std::io::Write;

use crate::error::{HmmError, ModelTable, Result};

/// Matriz densa em ordem row-major.
#[derive(Debug, Clone, PartialEq)]
struct Matrix {
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `max(1)` só importa para V = 0, que as tabelas de índices já proíbem.
        self.data.chunks(self.cols.max(1))
    }
}

/// Modelo HMM de primeira ordem com probabilidades em espaço linear.
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    prior: Vec<f64>,
    transition: Matrix,
    emission: Matrix,
}

impl HmmModel {
    /// Monta e valida um modelo.
    ///
    /// - `prior` tem K entradas;
    /// - `transition` tem K linhas de K colunas;
    /// - `emission` tem K linhas de V colunas (V = comprimento da primeira linha).
    ///
    /// Falha com `ModelShapeMismatch` para formas inconsistentes e com
    /// `NonPositiveProbability` para qualquer entrada ≤ 0 (ou NaN).
    pub fn new(prior: Vec<f64>, transition: Vec<Vec<f64>>, emission: Vec<Vec<f64>>) -> Result<Self> {
        let num_tags = prior.len();
        if num_tags == 0 {
            return Err(HmmError::ModelShapeMismatch {
                table: ModelTable::Prior,
                detail: "no entries".to_string(),
            });
        }
        let num_words = emission.first().map_or(0, Vec::len);
        if num_words == 0 {
            return Err(HmmError::ModelShapeMismatch {
                table: ModelTable::Emission,
                detail: "no columns".to_string(),
            });
        }

        let transition = flatten(ModelTable::Transition, transition, num_tags, num_tags)?;
        let emission = flatten(ModelTable::Emission, emission, num_tags, num_words)?;

        let model = Self {
            prior,
            transition,
            emission,
        };
        model.check_positive()?;
        Ok(model)
    }

    /// Número de tags K.
    pub fn num_tags(&self) -> usize {
        self.prior.len()
    }

    /// Tamanho do vocabulário V.
    pub fn num_words(&self) -> usize {
        self.emission.cols
    }

    pub fn prior(&self) -> &[f64] {
        &self.prior
    }

    /// $P(y_{t+1} = \text{to} \mid y_t = \text{from})$
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        self.transition.row(from)[to]
    }

    /// Distribuição de transição saindo de `from`.
    pub fn transition_row(&self, from: usize) -> &[f64] {
        self.transition.row(from)
    }

    /// $P(x_t = \text{word} \mid y_t = \text{tag})$
    pub fn emission(&self, tag: usize, word: usize) -> f64 {
        self.emission.row(tag)[word]
    }

    /// Distribuição de emissão da tag.
    pub fn emission_row(&self, tag: usize) -> &[f64] {
        self.emission.row(tag)
    }

    /// Maior desvio |Σ − 1| entre o prior e todas as linhas de transição e emissão.
    ///
    /// O estimador produz desvios da ordem do erro de arredondamento; um modelo
    /// externo pode não ser estocástico sem violar nenhuma invariante de carga.
    pub fn stochastic_deviation(&self) -> f64 {
        std::iter::once(self.prior.as_slice())
            .chain(self.transition.rows())
            .chain(self.emission.rows())
            .map(|row| (row.iter().sum::<f64>() - 1.0).abs())
            .fold(0.0, f64::max)
    }

    fn check_positive(&self) -> Result<()> {
        let tables = [
            (ModelTable::Prior, self.prior.len().max(1), self.prior.as_slice()),
            (ModelTable::Transition, self.transition.cols, self.transition.data.as_slice()),
            (ModelTable::Emission, self.emission.cols, self.emission.data.as_slice()),
        ];
        for (table, cols, data) in tables {
            // `!(v > 0.0)` também captura NaN.
            if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !(**v > 0.0)) {
                let (row, column) = match table {
                    ModelTable::Prior => (i, 0),
                    _ => (i / cols, i % cols),
                };
                return Err(HmmError::NonPositiveProbability {
                    table,
                    row,
                    column,
                    value,
                });
            }
        }
        Ok(())
    }

    // =====================================================================
    // FORMATO EM TEXTO
    // =====================================================================

    /// Escreve o prior: K linhas, um valor por linha.
    pub fn write_prior<W: Write>(&self, mut out: W) -> Result<()> {
        for p in &self.prior {
            writeln!(out, "{p:?}")?;
        }
        Ok(())
    }

    /// Escreve a matriz de transição: K linhas de K valores.
    pub fn write_transition<W: Write>(&self, out: W) -> Result<()> {
        write_matrix(out, &self.transition)
    }

    /// Escreve a matriz de emissão: K linhas de V valores.
    pub fn write_emission<W: Write>(&self, out: W) -> Result<()> {
        write_matrix(out, &self.emission)
    }

    /// Lê as três tabelas em texto e valida contra K tags e V palavras.
    pub fn from_text(
        prior: &str,
        transition: &str,
        emission: &str,
        num_tags: usize,
        num_words: usize,
    ) -> Result<Self> {
        let prior_rows = parse_table(ModelTable::Prior, prior, num_tags, 1)?;
        let transition = parse_table(ModelTable::Transition, transition, num_tags, num_tags)?;
        let emission = parse_table(ModelTable::Emission, emission, num_tags, num_words)?;
        let prior = prior_rows.into_iter().flatten().collect();
        Self::new(prior, transition, emission)
    }
}

/// Achata `rows` em uma [`Matrix`] conferindo a forma `expected_rows × cols`.
fn flatten(table: ModelTable, rows: Vec<Vec<f64>>, expected_rows: usize, cols: usize) -> Result<Matrix> {
    if rows.len() != expected_rows {
        return Err(HmmError::ModelShapeMismatch {
            table,
            detail: format!("expected {expected_rows} rows, found {}", rows.len()),
        });
    }
    let mut data = Vec::with_capacity(expected_rows * cols);
    for (r, row) in rows.into_iter().enumerate() {
        if row.len() != cols {
            return Err(HmmError::ModelShapeMismatch {
                table,
                detail: format!("row {r} has {} columns, expected {cols}", row.len()),
            });
        }
        data.extend(row);
    }
    Ok(Matrix { cols, data })
}

/// Faz o parse de uma tabela em texto, linha a linha, conferindo a forma.
fn parse_table(table: ModelTable, text: &str, rows: usize, cols: usize) -> Result<Vec<Vec<f64>>> {
    let parsed = text
        .trim_end()
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.split_whitespace()
                .map(|value| parse_value(table, i + 1, value))
                .collect::<Result<Vec<f64>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    if parsed.len() != rows {
        return Err(HmmError::ModelShapeMismatch {
            table,
            detail: format!("expected {rows} lines, found {}", parsed.len()),
        });
    }
    if let Some((r, row)) = parsed.iter().enumerate().find(|(_, row)| row.len() != cols) {
        return Err(HmmError::ModelShapeMismatch {
            table,
            detail: format!("line {} has {} values, expected {cols}", r + 1, row.len()),
        });
    }
    Ok(parsed)
}

fn parse_value(table: ModelTable, line: usize, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(HmmError::InvalidNumber {
            table,
            line,
            value: value.to_string(),
        }),
    }
}

fn write_matrix<W: Write>(mut out: W, matrix: &Matrix) -> Result<()> {
    for row in matrix.rows() {
        let line = row
            .iter()
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tag_model() -> HmmModel {
        HmmModel::new(
            vec![0.75, 0.25],
            vec![vec![0.5, 0.5], vec![0.1, 0.9]],
            vec![vec![0.2, 0.3, 0.5], vec![0.6, 0.2, 0.2]],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors_follow_row_major_layout() {
        let model = two_tag_model();
        assert_eq!(model.num_tags(), 2);
        assert_eq!(model.num_words(), 3);
        assert_eq!(model.transition(1, 0), 0.1);
        assert_eq!(model.emission(0, 2), 0.5);
        assert_eq!(model.emission_row(1), &[0.6, 0.2, 0.2]);
        assert!(model.stochastic_deviation() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = HmmModel::new(vec![0.5, 0.5], vec![vec![1.0]], vec![vec![1.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            HmmError::ModelShapeMismatch { table: ModelTable::Transition, .. }
        ));

        let err = HmmModel::new(
            vec![1.0],
            vec![vec![1.0]],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HmmError::ModelShapeMismatch { table: ModelTable::Emission, .. }
        ));
    }

    #[test]
    fn test_non_positive_entry_is_rejected() {
        let err = HmmModel::new(
            vec![0.5, 0.5],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
            vec![vec![1.0, 0.0], vec![0.5, 0.5]],
        )
        .unwrap_err();
        match err {
            HmmError::NonPositiveProbability { table, row, column, value } => {
                assert_eq!(table, ModelTable::Emission);
                assert_eq!((row, column), (0, 1));
                assert_eq!(value, 0.0);
            }
            other => panic!("erro inesperado: {other}"),
        }

        let err = HmmModel::new(vec![f64::NAN], vec![vec![1.0]], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            HmmError::NonPositiveProbability { table: ModelTable::Prior, .. }
        ));
    }

    #[test]
    fn test_text_round_trip_is_exact() {
        let model = two_tag_model();
        let mut prior = Vec::new();
        let mut transition = Vec::new();
        let mut emission = Vec::new();
        model.write_prior(&mut prior).unwrap();
        model.write_transition(&mut transition).unwrap();
        model.write_emission(&mut emission).unwrap();

        let transition = String::from_utf8(transition).unwrap();
        assert_eq!(transition, "0.5 0.5\n0.1 0.9\n");

        let loaded = HmmModel::from_text(
            &String::from_utf8(prior).unwrap(),
            &transition,
            &String::from_utf8(emission).unwrap(),
            2,
            3,
        )
        .unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn test_from_text_checks_against_index_sizes() {
        // 3 palavras no vocabulário, mas a emissão só tem 2 colunas
        let err = HmmModel::from_text("0.5\n0.5\n", "0.5 0.5\n0.5 0.5\n", "0.5 0.5\n0.5 0.5\n", 2, 3)
            .unwrap_err();
        assert!(matches!(
            err,
            HmmError::ModelShapeMismatch { table: ModelTable::Emission, .. }
        ));

        // prior com uma linha a menos
        let err = HmmModel::from_text("1.0\n", "0.5 0.5\n0.5 0.5\n", "1.0\n1.0\n", 2, 1).unwrap_err();
        assert!(matches!(
            err,
            HmmError::ModelShapeMismatch { table: ModelTable::Prior, .. }
        ));
    }

    #[test]
    fn test_from_text_rejects_garbage_and_negatives() {
        let err = HmmModel::from_text("abc\n", "1.0\n", "1.0\n", 1, 1).unwrap_err();
        assert!(matches!(
            err,
            HmmError::InvalidNumber { table: ModelTable::Prior, line: 1, .. }
        ));

        let err = HmmModel::from_text("1.0\n", "inf\n", "1.0\n", 1, 1).unwrap_err();
        assert!(matches!(err, HmmError::InvalidNumber { table: ModelTable::Transition, .. }));

        let err = HmmModel::from_text("1.0\n", "1.0\n", "-0.5\n", 1, 1).unwrap_err();
        assert!(matches!(
            err,
            HmmError::NonPositiveProbability { table: ModelTable::Emission, .. }
        ));
    }
}
