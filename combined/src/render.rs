//! Text rendering of replies, errors and validator results.

use std::fmt::Write;

use client::{ApiReply, RawReply};
use common::AppError;
use contracts::{Response, Sentiment, UploadedImage};
use domain::{Session, ValidationResult};
use serde_json::Value;

/// `[status] discriminator - localized message`, then the payload.
pub fn reply(reply: &ApiReply) -> String {
    let mut out = format!("[{}] {}", reply.status, reply.discriminator());
    if let Some(message) = reply.message() {
        let _ = write!(out, " - {message}");
    }

    match &reply.response {
        Response::GetPostsSuccess(page) => {
            let _ = write!(
                out,
                "\n페이지 {}/{} (총 {}개)",
                page.page,
                page.total_pages().max(1),
                page.total
            );
        }
        Response::CreateCommentSuccess(comment) => {
            if let Some(sentiment) = &comment.sentiment {
                let _ = write!(out, "\n감정: {}", sentiment_line(sentiment));
            }
        }
        Response::UploadSuccess(upload) => {
            if let Some(line) = prediction_line(upload) {
                let _ = write!(out, "\n분류: {line}");
            }
        }
        _ => {}
    }

    let data = reply.response.data();
    if !data.is_null() {
        let _ = write!(out, "\n{}", pretty(&data));
    }
    out
}

/// Replies from the model API and the health check.
pub fn raw(reply: &RawReply) -> String {
    let mut out = format!("[{}]", reply.status);
    if let Some(sentiment) = reply.sentiment() {
        let _ = write!(out, " {}", sentiment_line(&sentiment));
    }
    let _ = write!(out, "\n{}", pretty(&reply.body));
    out
}

/// `긍정적 (95%)`
pub fn sentiment_line(sentiment: &Sentiment) -> String {
    let mut line = format!(
        "{} ({:.0}%)",
        sentiment.label.display_ko(),
        sentiment.confidence * 100.0
    );
    if let Some(description) = &sentiment.description {
        let _ = write!(line, " {description}");
    }
    line
}

/// `Dog(강아지) 93%`, or the classifier error.
pub fn prediction_line(upload: &UploadedImage) -> Option<String> {
    if let Some(prediction) = &upload.prediction {
        return Some(format!(
            "{}({}) {:.0}%",
            prediction.class_name,
            prediction.class_name_ko(),
            prediction.confidence_score * 100.0
        ));
    }
    upload
        .prediction_error
        .as_ref()
        .map(|error| format!("실패 - {error}"))
}

/// Error line with its code; form failures list every field and transport
/// failures carry the raw body.
pub fn error(err: &AppError) -> String {
    if let AppError::Transport { body, .. } = err {
        let mut out = format!("{}: {}", err.code(), err.user_message());
        if !body.is_empty() {
            let body = serde_json::from_str::<Value>(body)
                .map(|value| pretty(&value))
                .unwrap_or_else(|_| body.clone());
            let _ = write!(out, "\n{body}");
        }
        return out;
    }

    match err.field_errors() {
        Some(fields) => {
            let mut out = format!("{}:", err.code());
            for (field, messages) in fields.iter() {
                for message in messages {
                    let _ = write!(out, "\n  {field}: {message}");
                }
            }
            out
        }
        None => format!("{}: {}", err.code(), err.user_message()),
    }
}

pub fn validation(label: &str, result: &ValidationResult) -> String {
    let mut out = format!(
        "{label}: {}",
        if result.is_valid() { "valid" } else { "invalid" }
    );
    for message in result.errors() {
        let _ = write!(out, "\n  - {message}");
    }
    out
}

pub fn session(session: &Session) -> String {
    match session.current_user() {
        Some(user) => format!("{} (user_id {})", user.nickname, user.user_id),
        None => "로그인되지 않음".to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
