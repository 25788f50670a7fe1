use thiserror::Error;

/// Errors from resume text extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// File type outside the supported set (.txt, .md, .docx).
    #[error("unsupported file type: {name}")]
    UnsupportedFileType { name: String },

    /// Plaintext upload that is not valid UTF-8.
    #[error("file is not valid UTF-8 text")]
    InvalidText,

    /// The .docx payload could not be read.
    #[error("failed to read .docx: {0}")]
    Docx(String),
}

/// Extract plain text from an uploaded resume.
///
/// Supported types are UTF-8 plaintext (.txt, .md) and Word documents
/// (.docx). Anything else is a validation error for the caller to
/// surface, never a silent empty result.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let lower = filename.to_ascii_lowercase();

    if lower.ends_with(".docx") {
        return extract_docx(bytes);
    }

    if lower.ends_with(".txt") || lower.ends_with(".md") {
        return String::from_utf8(bytes.to_vec()).map_err(|_| ExtractError::InvalidText);
    }

    Err(ExtractError::UnsupportedFileType {
        name: filename.to_string(),
    })
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for paragraph_child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let docx_rs::RunChild::Text(t) = run_child {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            if !line.is_empty() {
                text.push_str(&line);
                text.push('\n');
            }
        }
    }

    Ok(text)
}
