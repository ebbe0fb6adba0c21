//! Stream Driver: one forward pass of `html5gum` tokens into a [`TokenSink`].

use html5gum::{DefaultEmitter, Token, Tokenizer};

use crate::error::Result;

/// Receiver of tokenizer events, called synchronously in document order.
pub trait TokenSink {
    fn on_tag_open(&mut self, name: &str, attrs: &[(String, String)]) -> Result<()>;
    fn on_tag_close(&mut self, name: &str) -> Result<()>;
    fn on_text(&mut self, text: &str) -> Result<()>;
}

/// Tokenize `html` and push every start tag, end tag and text chunk into
/// `sink`. The first sink error aborts the pass.
///
/// Self-closing start tags (`<br/>`) are followed by a close event.
/// The contents of `<script>`, `<style>` and the other raw-text elements
/// arrive as a single text chunk, never as tags.
/// Comments and doctypes are skipped; tokenizer errors are recovered from by
/// the tokenizer itself.
pub fn drive<S: TokenSink + ?Sized>(html: &str, sink: &mut S) -> Result<()> {
    let mut emitter = DefaultEmitter::default();
    emitter.naively_switch_states(true);

    for token in Tokenizer::new_with_emitter(html, emitter) {
        let token = match token {
            Ok(token) => token,
            Err(never) => match never {},
        };
        match token {
            Token::StartTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name);
                let attrs: Vec<(String, String)> = tag
                    .attributes
                    .iter()
                    .map(|(key, value)| {
                        (
                            String::from_utf8_lossy(key).into_owned(),
                            String::from_utf8_lossy(value).into_owned(),
                        )
                    })
                    .collect();
                sink.on_tag_open(&name, &attrs)?;
                if tag.self_closing {
                    sink.on_tag_close(&name)?;
                }
            }
            Token::EndTag(tag) => {
                sink.on_tag_close(&String::from_utf8_lossy(&tag.name))?;
            }
            Token::String(text) => {
                sink.on_text(&String::from_utf8_lossy(&text))?;
            }
            Token::Error(error) => {
                tracing::trace!("Tokenizer recovered from {:?}", error);
            }
            _ => {}
        }
    }

    Ok(())
}
