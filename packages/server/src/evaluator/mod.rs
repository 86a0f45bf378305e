//! The multimodal model that judges a student's hand sign.

mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiEvaluator;

/// An in-memory file handed to the model.
#[derive(Debug, Clone, Copy)]
pub struct Attachment<'a> {
    pub mime_type: &'a str,
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
pub struct EvaluationRequest<'a> {
    /// Letter the student is attempting.
    pub letter: &'a str,
    pub photo: Attachment<'a>,
    pub reference: Attachment<'a>,
}

/// Model verdict. `result_text` is `None` when the model produced no usable
/// text, typically because generation was blocked; `finish_reason` then says
/// why when the model reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub result_text: Option<String>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("request to model failed: {0}")]
    Transport(String),

    #[error("model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode model response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SignEvaluator: Send + Sync {
    /// Model identifier recorded with every validation.
    fn model_name(&self) -> &str;

    async fn evaluate(&self, request: EvaluationRequest<'_>) -> Result<Evaluation, EvaluatorError>;
}

/// Instruction sent with every request. The model must open with a fixed
/// yes/no sentence so clients can classify the answer.
pub fn system_prompt(letter: &str) -> String {
    format!(
        "Avaliador LIBRAS. Aluno tenta a letra '{letter}'. \
         Compare a foto (aluno) com a letra '{letter}' no PDF (referência). \
         Responda em português. \
         Inicie com 'Sim, está correto.' ou 'Não, está incorreto.' e justifique em uma única frase curta."
    )
}
