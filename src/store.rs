use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{OmrError, Result};
use crate::types::{AnswerLabel, AnswerList};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// What a capture represents. Each kind has a stable file in the store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    AnswerKey,
    Submission,
}

impl CaptureKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            CaptureKind::AnswerKey => "answer-key.xml",
            CaptureKind::Submission => "submission.xml",
        }
    }
}

impl FromStr for CaptureKind {
    type Err = OmrError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "key" | "answer-key" => Ok(CaptureKind::AnswerKey),
            "submission" => Ok(CaptureKind::Submission),
            _ => Err(OmrError::InvalidConfig(format!("unknown capture kind: {}", s))),
        }
    }
}

impl Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureKind::AnswerKey => write!(f, "answer key"),
            CaptureKind::Submission => write!(f, "submission"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Answers")]
struct AnswersDocument {
    #[serde(rename = "Question", default)]
    questions: Vec<QuestionElement>,
}

#[derive(Debug, Serialize, Deserialize)]
struct QuestionElement {
    #[serde(rename = "@number")]
    number: usize,
    #[serde(rename = "$text", default)]
    label: String,
}

/// Persists answer lists as XML files in a directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Writes answers under `name`, replacing anything stored there before.
    /// The document is written to a temporary file in the same directory and
    /// renamed over `name`, so a failed write leaves the previous answers.
    pub fn write(&self, name: &str, answers: &[AnswerLabel]) -> Result<()> {
        let path = self.path(name);
        let xml = encode_answers(answers).map_err(|reason| OmrError::MalformedAnswers {
            path: path.clone(),
            reason,
        })?;

        std::fs::create_dir_all(&self.dir).map_err(|source| OmrError::StorageUnavailable {
            path: self.dir.clone(),
            source,
        })?;
        let unavailable = |source: io::Error| OmrError::StorageUnavailable {
            path: path.clone(),
            source,
        };
        let mut file = NamedTempFile::new_in(&self.dir).map_err(unavailable)?;
        file.write_all(xml.as_bytes()).map_err(unavailable)?;
        file.as_file().sync_all().map_err(unavailable)?;
        file.persist(&path).map_err(|e| unavailable(e.error))?;

        info!("wrote {} answers to {}", answers.len(), path.display());
        Ok(())
    }

    /// Reads the answers stored under `name`. Nothing stored yet reads as an
    /// empty list.
    pub fn read(&self, name: &str) -> Result<AnswerList> {
        let path = self.path(name);
        let xml = match std::fs::read_to_string(&path) {
            Ok(xml) => xml,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not exist, no answers stored", path.display());
                return Ok(vec![]);
            }
            Err(source) => return Err(OmrError::StorageUnavailable { path, source }),
        };

        decode_answers(&xml).map_err(|reason| OmrError::MalformedAnswers { path, reason })
    }

    pub fn write_capture(&self, kind: CaptureKind, answers: &[AnswerLabel]) -> Result<()> {
        self.write(kind.file_name(), answers)
    }

    pub fn read_capture(&self, kind: CaptureKind) -> Result<AnswerList> {
        self.read(kind.file_name())
    }
}

/// Renders answers as an indented `<Answers>` document with one numbered
/// `<Question>` per answer.
pub fn encode_answers(answers: &[AnswerLabel]) -> std::result::Result<String, String> {
    let document = AnswersDocument {
        questions: answers
            .iter()
            .enumerate()
            .map(|(i, label)| QuestionElement {
                number: i + 1,
                label: label.to_string(),
            })
            .collect(),
    };

    let mut xml = String::from(XML_DECLARATION);
    xml.push('\n');
    let mut serializer = quick_xml::se::Serializer::new(&mut xml);
    serializer.indent(' ', 2);
    document.serialize(serializer).map_err(|e| e.to_string())?;
    xml.push('\n');
    Ok(xml)
}

/// Parses an `<Answers>` document. Question numbers must count up from 1.
pub fn decode_answers(xml: &str) -> std::result::Result<AnswerList, String> {
    let document: AnswersDocument =
        quick_xml::de::from_str(xml).map_err(|e| e.to_string())?;

    document
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, question)| {
            if question.number != i + 1 {
                return Err(format!(
                    "expected question {} but found question {}",
                    i + 1,
                    question.number
                ));
            }
            question
                .label
                .parse::<AnswerLabel>()
                .map_err(|e| format!("question {}: {}", question.number, e))
        })
        .collect()
}
