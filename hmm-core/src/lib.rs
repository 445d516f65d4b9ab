//! # hmm-core — HMM Supervisionado para Etiquetagem de Sequências
//!
//! Este crate implementa um Hidden Markov Model de primeira ordem para etiquetagem
//! (ex: part-of-speech tagging): os parâmetros são estimados por contagem com suavização
//! de Laplace e a inferência usa o algoritmo **forward-backward em log-space**, com
//! decodificação pela marginal posterior de cada posição.
//!
//! ## Arquitetura
//!
//! O dado flui em uma linha reta:
//!
//! 1.  **Índices** ([`index`]): vocabulário e tags viram ids densos `0..V` e `0..K`.
//! 2.  **Corpus** ([`corpus`]): linhas `palavra_tag ...` viram sequências de ids.
//! 3.  **Estimação** ([`estimator`]): contagens + Add-1 → [`HmmModel`] (prior, transição, emissão).
//! 4.  **Inferência** ([`inference`]): tabelas α/β por sequência.
//! 5.  **Decodificação** ([`decoder`]): tags preditas, log-verossimilhança e acurácia do corpus.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use hmm_core::corpus::{encode_corpus, parse_corpus, DEFAULT_DELIMITER};
//! use hmm_core::{estimate, evaluate, SymbolKind, SymbolTable};
//!
//! let words = SymbolTable::parse(SymbolKind::Word, "dog\nruns\n").unwrap();
//! let tags = SymbolTable::parse(SymbolKind::Tag, "N\nV\n").unwrap();
//!
//! let corpus = parse_corpus("dog_N runs_V\n", DEFAULT_DELIMITER).unwrap();
//! let encoded = encode_corpus(&corpus, &words, &tags).unwrap();
//!
//! let model = estimate(&encoded, tags.len(), words.len()).unwrap();
//! let evaluation = evaluate(&model, &encoded).unwrap();
//!
//! assert_eq!(evaluation.metrics.accuracy, 1.0);
//! println!("{}", evaluation.metrics);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`model`]: tabelas densas e o formato em texto dos arquivos de parâmetros.
//! - [`inference`]: `log_sum_exp`, forward e backward.
//! - [`curve`]: curva de aprendizado (verossimilhança × tamanho do treino).

pub mod corpus;
pub mod curve;
pub mod decoder;
pub mod error;
pub mod estimator;
pub mod index;
pub mod inference;
pub mod model;

pub use decoder::{evaluate, Evaluation, Metrics};
pub use error::{HmmError, ModelTable, Result, SymbolKind};
pub use estimator::estimate;
pub use index::SymbolTable;
pub use inference::{ForwardBackward, LogModel};
pub use model::HmmModel;
