//! Token classification: raw arguments → bind instructions.
//!
//! Nothing is written to any target here: the tokenizer only resolves names,
//! parses tags, expands list files and arguments files, and emits an ordered
//! list of [`Occurrence`]s for the binder. A fatal problem (unknown argument,
//! missing value, unreadable file) stops tokenization with nothing bound.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use crate::args::container::ArgumentGraph;
use crate::args::tag;
use crate::args::value::{parse_bool, Tag};
use crate::config::ParserConfig;
use crate::error::ArgError;

/// What to do with one occurrence of an argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    /// The null sentinel: reset the target.
    Clear,
    /// The argument was given but carried no value of its own, as with an
    /// empty list file.
    Supplied,
    Literal { raw: String, tag: Option<Tag> },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Occurrence {
    pub index: usize,
    pub value: BindValue,
}

/// Where a token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    CommandLine,
    ArgumentsFile(PathBuf),
}

#[derive(Debug)]
struct Pending {
    text: String,
    source: Source,
}

/// Result of tokenizing one command line.
#[derive(Debug, Default)]
pub(crate) struct TokenStream {
    pub occurrences: Vec<Occurrence>,
    pub errors: Vec<ArgError>,
    /// A fatal error stopped tokenization; nothing should be bound.
    pub aborted: bool,
}

pub(crate) fn tokenize(
    args: &[String],
    graph: &ArgumentGraph<'_>,
    config: &ParserConfig,
) -> TokenStream {
    let mut tokenizer = Tokenizer {
        graph,
        config,
        pending: args
            .iter()
            .map(|text| Pending {
                text: text.clone(),
                source: Source::CommandLine,
            })
            .collect(),
        stream: TokenStream::default(),
        explicit: HashMap::new(),
    };
    tokenizer.run();
    tokenizer.stream
}

struct Tokenizer<'g, 'a> {
    graph: &'g ArgumentGraph<'a>,
    config: &'g ParserConfig,
    pending: VecDeque<Pending>,
    stream: TokenStream,
    /// Last explicit raw value of each scalar, for override detection.
    explicit: HashMap<usize, String>,
}

impl Tokenizer<'_, '_> {
    fn run(&mut self) {
        let mut options_ended = false;
        while let Some(token) = self.pending.pop_front() {
            let result = if options_ended {
                self.positional(token.text)
            } else if self.config.end_of_options && token.text == "--" {
                options_ended = true;
                Ok(())
            } else if tag::strip_prefix(&token.text).is_some() {
                self.named(token)
            } else {
                self.positional(token.text)
            };
            if let Err(err) = result {
                self.stream.errors.push(err);
                self.stream.aborted = true;
                return;
            }
        }
    }

    /// Handle a dash-prefixed token. `Err` is fatal.
    fn named(&mut self, token: Pending) -> Result<(), ArgError> {
        let graph = self.graph;
        let body = tag::strip_prefix(&token.text).unwrap_or_default();
        let name = tag::name_part(body);

        if name == self.config.arguments_file {
            return self.arguments_file(&token);
        }

        let Some(index) = graph.lookup(name) else {
            if token.text.parse::<f64>().is_ok() {
                return self.positional(token.text);
            }
            if let Some((known, _)) = name
                .split_once('=')
                .filter(|(known, _)| graph.lookup(known).is_some())
            {
                self.stream.errors.push(ArgError::MalformedTag {
                    reason: format!(
                        "'--{}=value' syntax is not supported; pass the value as a separate token",
                        known
                    ),
                    token: token.text,
                });
                return Ok(());
            }
            return Err(ArgError::UnknownArgument { token: token.text });
        };
        let descriptor = &graph.descriptors()[index];
        if !descriptor.is_flag() && self.pending.is_empty() {
            return Err(ArgError::MissingValue {
                argument: descriptor.long_name().to_string(),
            });
        }

        let tag = match tag::parse_name_token(body) {
            Ok(parsed) => parsed.tag,
            Err(reason) => {
                self.stream.errors.push(ArgError::MalformedTag {
                    token: token.text,
                    reason,
                });
                self.skip_value(descriptor.is_flag());
                return Ok(());
            }
        };
        if tag.is_some() && !descriptor.accepts_tags() {
            self.stream.errors.push(ArgError::TagsNotSupported {
                argument: descriptor.long_name().to_string(),
            });
            self.skip_value(descriptor.is_flag());
            return Ok(());
        }

        if descriptor.is_flag() {
            let value = match self.pending.front().and_then(|next| parse_bool(&next.text)) {
                Some(value) => {
                    self.pending.pop_front();
                    value
                }
                None => true,
            };
            self.record(index, value.to_string(), tag, &token.source);
            return Ok(());
        }

        let Some(value) = self.pending.pop_front() else {
            return Err(ArgError::MissingValue {
                argument: descriptor.long_name().to_string(),
            });
        };

        if self.config.is_null_sentinel(&value.text) {
            self.stream.occurrences.push(Occurrence {
                index,
                value: BindValue::Clear,
            });
            return Ok(());
        }
        if descriptor.expands_list_files() && self.config.is_list_file(&value.text) {
            return self.list_file(index, &value.text, tag);
        }
        self.record(index, value.text, tag, &token.source);
        Ok(())
    }

    fn positional(&mut self, value: String) -> Result<(), ArgError> {
        let graph = self.graph;
        let Some(index) = graph.positional_index() else {
            self.stream
                .errors
                .push(ArgError::UnexpectedPositional { value });
            return Ok(());
        };
        if graph.descriptors()[index].expands_list_files() && self.config.is_list_file(&value) {
            return self.list_file(index, &value, None);
        }
        self.stream.occurrences.push(Occurrence {
            index,
            value: BindValue::Literal {
                raw: value,
                tag: None,
            },
        });
        Ok(())
    }

    /// Emit a literal, rejecting a conflicting scalar from an arguments file.
    fn record(&mut self, index: usize, raw: String, tag: Option<Tag>, source: &Source) {
        let graph = self.graph;
        let descriptor = &graph.descriptors()[index];
        if !descriptor.is_collection() {
            if let Source::ArgumentsFile(path) = source {
                if self.explicit.get(&index).is_some_and(|prev| *prev != raw) {
                    self.stream.errors.push(ArgError::DisallowedOverride {
                        argument: descriptor.long_name().to_string(),
                        path: path.clone(),
                    });
                    return;
                }
            }
            self.explicit.insert(index, raw.clone());
        }
        self.stream.occurrences.push(Occurrence {
            index,
            value: BindValue::Literal { raw, tag },
        });
    }

    /// Replace a list-file path by one literal per line.
    fn list_file(&mut self, index: usize, path: &str, tag: Option<Tag>) -> Result<(), ArgError> {
        let path = PathBuf::from(path);
        let content = std::fs::read_to_string(&path).map_err(|source| ArgError::ArgumentFile {
            path: path.clone(),
            source,
        })?;
        self.stream.occurrences.push(Occurrence {
            index,
            value: BindValue::Supplied,
        });
        let before = self.stream.occurrences.len();
        for line in content.lines().map(str::trim).filter(|line| !line.is_empty()) {
            self.stream.occurrences.push(Occurrence {
                index,
                value: BindValue::Literal {
                    raw: line.to_string(),
                    tag: tag.clone(),
                },
            });
        }
        tracing::debug!(
            path = %path.display(),
            values = self.stream.occurrences.len() - before,
            "Expanded list file"
        );
        Ok(())
    }

    /// Splice the contents of an arguments file into the token stream.
    fn arguments_file(&mut self, token: &Pending) -> Result<(), ArgError> {
        let body = tag::strip_prefix(&token.text).unwrap_or_default();
        let Some(value) = self.pending.pop_front() else {
            return Err(ArgError::MissingValue {
                argument: self.config.arguments_file.clone(),
            });
        };
        if body.contains(':') {
            self.stream.errors.push(ArgError::MalformedTag {
                token: token.text.clone(),
                reason: "arguments files cannot be tagged".to_string(),
            });
            return Ok(());
        }
        let path = PathBuf::from(&value.text);
        if matches!(token.source, Source::ArgumentsFile(_)) {
            return Err(ArgError::RecursiveArgumentsFile { path });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ArgError::ArgumentFile {
            path: path.clone(),
            source,
        })?;
        let tokens = arguments_file_tokens(&content);
        tracing::debug!(path = %path.display(), tokens = tokens.len(), "Read arguments file");
        for text in tokens.into_iter().rev() {
            self.pending.push_front(Pending {
                text,
                source: Source::ArgumentsFile(path.clone()),
            });
        }
        Ok(())
    }

    /// Discard the value token of a rejected occurrence.
    fn skip_value(&mut self, is_flag: bool) {
        if is_flag {
            if self
                .pending
                .front()
                .is_some_and(|next| parse_bool(&next.text).is_some())
            {
                self.pending.pop_front();
            }
        } else {
            self.pending.pop_front();
        }
    }
}

/// Split arguments-file content into command-line tokens.
///
/// Each non-blank, non-comment line is `name value` or `name=value`; the
/// name gets a `--` prefix when it has none.
fn arguments_file_tokens(content: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let space = line.find(char::is_whitespace);
        let equals = line.find('=').filter(|&eq| {
            space.map_or(true, |sp| eq < sp) && line.find(':').map_or(true, |colon| eq < colon)
        });
        let (name, value) = match (equals, space) {
            (Some(eq), _) => (&line[..eq], Some(&line[eq + 1..])),
            (None, Some(sp)) => (&line[..sp], Some(line[sp..].trim())),
            (None, None) => (line, None),
        };
        if name.starts_with('-') {
            tokens.push(name.to_string());
        } else {
            tokens.push(format!("--{}", name));
        }
        if let Some(value) = value {
            tokens.push(value.to_string());
        }
    }
    tokens
}
