//! Name-token grammar: `--name[:tagName][,key=value]*`.

use crate::args::value::Tag;

/// A dash-prefixed token split into its argument name and optional tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameToken {
    pub name: String,
    pub tag: Option<Tag>,
}

/// Strip a recognized option prefix (`--` or `-`).
///
/// Returns `None` for tokens that are not argument names, including the bare
/// `-` (conventionally stdin) and `--` (end of options).
pub fn strip_prefix(token: &str) -> Option<&str> {
    if token == "-" || token == "--" {
        return None;
    }
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .filter(|body| !body.is_empty())
}

/// The argument name portion of a name-token body (everything before `:`).
pub fn name_part(body: &str) -> &str {
    body.split_once(':').map_or(body, |(name, _)| name)
}

/// Parse the body of a name token (prefix already stripped).
///
/// The error string describes the grammar violation.
pub fn parse_name_token(body: &str) -> Result<NameToken, String> {
    let Some((name, tag_expr)) = body.split_once(':') else {
        if body.contains('=') {
            return Err("'NAME=value' syntax cannot be mixed with tagged arguments; \
                        pass the value as a separate token"
                .to_string());
        }
        return Ok(NameToken {
            name: body.to_string(),
            tag: None,
        });
    };

    if name.is_empty() {
        return Err("missing argument name before ':'".to_string());
    }
    if name.contains('=') {
        return Err("'NAME=value' syntax cannot be mixed with tagged arguments".to_string());
    }
    if tag_expr.is_empty() {
        return Err("':' must be followed by a tag name or attributes".to_string());
    }

    let mut tag = Tag::default();
    for (position, segment) in tag_expr.split(',').enumerate() {
        if segment.is_empty() {
            return Err("empty segment in tag expression (leading, trailing or doubled ',')"
                .to_string());
        }
        match segment.split_once('=') {
            None if position == 0 => tag.name = Some(segment.to_string()),
            None => {
                return Err(format!("attribute '{}' is missing '=value'", segment));
            }
            Some((key, _)) if key.is_empty() => {
                return Err(format!("attribute '{}' has an empty key", segment));
            }
            Some((key, value)) if value.is_empty() => {
                return Err(format!("attribute '{}' has an empty value", key));
            }
            Some((key, value)) => {
                if tag.attributes.insert(key.to_string(), value.to_string()).is_some() {
                    return Err(format!("attribute '{}' is specified more than once", key));
                }
            }
        }
    }

    Ok(NameToken {
        name: name.to_string(),
        tag: Some(tag),
    })
}
