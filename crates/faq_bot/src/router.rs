//! Maps decoded chat messages to replies. Transport concerns (polling,
//! keyboards, file downloads) belong to whoever feeds this router.

use faq_engine::{
    DualMatch, EngineError, LexicalIndex, RetrievalEngine, SemanticIndex, TfIdfIndex,
    Word2VecIndex,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A slash command, without the slash.
    Command(String),
    Text(String),
    Photo { file_name: String, file_size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Button labels to offer with the reply.
    pub keyboard: Option<Vec<String>>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }
}

/// Canned texts used by the router.
#[derive(Debug, Clone)]
pub struct RouterTexts {
    pub greeting: String,
    pub about_button: String,
    pub complaint_button: String,
    pub about_company: String,
    pub complaint_prompt: String,
    pub photo_forwarded: String,
    pub empty_query: String,
    pub unknown_command: String,
    pub lexical_heading: String,
    pub semantic_heading: String,
}

impl Default for RouterTexts {
    fn default() -> Self {
        Self {
            greeting: "How can we help you?".to_string(),
            about_button: "About the company".to_string(),
            complaint_button: "File a complaint".to_string(),
            about_company: "Our company delivers goods all over the country.".to_string(),
            complaint_prompt: "Please attach a photo for your complaint.".to_string(),
            photo_forwarded: "Your request has been forwarded to a specialist.".to_string(),
            empty_query: "Please type your question.".to_string(),
            unknown_command: "Unknown command. Send /start to see the menu.".to_string(),
            lexical_heading: "TF-IDF method".to_string(),
            semantic_heading: "Word2Vec method".to_string(),
        }
    }
}

pub struct MessageRouter<'a, L = TfIdfIndex, S = Word2VecIndex> {
    engine: &'a RetrievalEngine<L, S>,
    texts: RouterTexts,
}

impl<'a, L: LexicalIndex, S: SemanticIndex> MessageRouter<'a, L, S> {
    pub fn new(engine: &'a RetrievalEngine<L, S>) -> Self {
        Self::with_texts(engine, RouterTexts::default())
    }

    pub fn with_texts(engine: &'a RetrievalEngine<L, S>, texts: RouterTexts) -> Self {
        Self { engine, texts }
    }

    pub fn route(&self, message: &Inbound) -> Reply {
        match message {
            Inbound::Command(cmd) if cmd == "start" => Reply {
                text: self.texts.greeting.clone(),
                keyboard: Some(vec![
                    self.texts.about_button.clone(),
                    self.texts.complaint_button.clone(),
                ]),
            },
            Inbound::Command(cmd) => {
                debug!(command = %cmd, "unknown command");
                Reply::text(self.texts.unknown_command.clone())
            }
            Inbound::Text(text) if *text == self.texts.about_button => {
                Reply::text(self.texts.about_company.clone())
            }
            Inbound::Text(text) if *text == self.texts.complaint_button => {
                Reply::text(self.texts.complaint_prompt.clone())
            }
            Inbound::Photo {
                file_name,
                file_size,
            } => {
                info!(%file_name, file_size, "photo received for complaint");
                Reply::text(format!(
                    "File name: {file_name}\nFile size: {file_size} bytes\n{}",
                    self.texts.photo_forwarded
                ))
            }
            Inbound::Text(text) => match self.engine.answer(text) {
                Ok(result) => Reply::text(format_dual_match(&result, &self.texts)),
                Err(EngineError::EmptyQuery) => Reply::text(self.texts.empty_query.clone()),
                Err(err) => Reply::text(err.to_string()),
            },
        }
    }
}

pub fn format_dual_match(result: &DualMatch, texts: &RouterTexts) -> String {
    format!(
        "{}:\nQuestion: {}\nAnswer: {}\n\n{}:\nQuestion: {}\nAnswer: {}",
        texts.lexical_heading,
        result.lexical.question,
        result.lexical.answer,
        texts.semantic_heading,
        result.semantic.question,
        result.semantic.answer,
    )
}
