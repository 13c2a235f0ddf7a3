//! Answer pipeline: run every question through the inference client.
//!
//! Questions are processed one by one in document order with a fixed pause
//! between consecutive calls. A question with no answer gets the placeholder
//! text; a question that is empty after trimming is skipped and does not
//! produce a pair at all.

use crate::config::FillConfig;
use crate::output::{Answer, QaPair};
use crate::pipeline::context::Context;
use crate::pipeline::inference::InferenceClient;
use crate::progress::FillProgressCallback;
use std::sync::Arc;
use tracing::{debug, info};

/// Answer `questions` against `context`, returning pairs in input order.
///
/// `context` is the raw data-document text; it is cut to
/// `config.max_context_chars` here, before the first call.
pub async fn answer_questions<S: AsRef<str>>(
    client: &InferenceClient,
    questions: &[S],
    context: &str,
    config: &FillConfig,
    progress: Option<&Arc<dyn FillProgressCallback>>,
) -> (Vec<QaPair>, Context) {
    let context = Context::truncated(context, config.max_context_chars, &config.truncation_marker);
    if context.is_truncated() {
        info!(
            "Context truncated from {} to {} characters",
            context.original_chars(),
            config.max_context_chars
        );
    }

    let asked: Vec<&str> = questions
        .iter()
        .map(|q| q.as_ref().trim())
        .filter(|q| !q.is_empty())
        .collect();
    let total = asked.len();
    if total < questions.len() {
        debug!("Skipping {} empty questions", questions.len() - total);
    }

    let mut pairs = Vec::with_capacity(total);
    for (idx, question) in asked.into_iter().enumerate() {
        if idx > 0 {
            client.sleeper().sleep(config.inter_request_delay).await;
        }
        if let Some(cb) = progress {
            cb.on_question_start(idx + 1, total, question);
        }

        let answer = client.answer(question, context.as_str()).await;
        if let Some(cb) = progress {
            match &answer {
                Answer::Found(text) => cb.on_question_answered(idx + 1, total, text),
                Answer::NotFound(err) => cb.on_question_unanswered(idx + 1, total, &err.to_string()),
            }
        }

        pairs.push(QaPair::from_answer(question, answer, &config.placeholder_answer));
    }

    (pairs, context)
}
