//! Resume ingestion — plain-text extraction from uploaded files.
//!
//! Supported: PDF and plain text. Everything else is rejected — uploads stay
//! limited to formats we can extract deterministically.

use crate::errors::AppError;

pub fn extract_resume_text(content_type: &str, data: &[u8]) -> Result<String, AppError> {
    let text = match content_type {
        "application/pdf" => pdf_extract::extract_text_from_mem(data)
            .map_err(|e| AppError::UnprocessableEntity(format!("PDF extraction failed: {e}")))?,
        "text/plain" => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Validation("Text file is not valid UTF-8".to_string()))?,
        other => {
            return Err(AppError::Validation(format!(
                "Unsupported file type '{other}'. Upload a PDF or plain-text resume."
            )))
        }
    };

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract any text from the uploaded file".to_string(),
        ));
    }

    Ok(text)
}
