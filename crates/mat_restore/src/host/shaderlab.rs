//! ShaderLab source parser
//!
//! Extracts what the restorer needs from a `.shader` file: the shader name
//! from the `Shader "..."` header and the property names declared in its
//! `Properties { ... }` block. Everything after the properties block
//! (sub-shaders, passes, HLSL programs) is ignored.

use thiserror::Error;

use super::ShaderPropertySet;

/// Shader header and declared properties of a `.shader` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Name from the `Shader "..."` header
    pub name: String,
    /// Property names in declaration order
    pub properties: Vec<String>,
}

impl ShaderSource {
    /// Declared properties as a membership set
    pub fn property_set(&self) -> ShaderPropertySet {
        self.properties.iter().cloned().collect()
    }
}

/// ShaderLab parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShaderLabError {
    /// No `Shader "name"` header was found
    #[error("Missing Shader \"name\" header")]
    MissingShaderName,

    /// A keyword was not followed by a `{ ... }` block
    #[error("Expected '{{' after {0}")]
    ExpectedBlock(&'static str),

    /// A block was opened but never closed
    #[error("Unterminated {0} block")]
    UnterminatedBlock(&'static str),
}

/// ShaderLab parser
pub struct ShaderLabParser;

impl ShaderLabParser {
    /// Parse the header and property block of a shader source file
    ///
    /// A shader without a `Properties` block is valid and declares nothing.
    pub fn parse(source: &str) -> Result<ShaderSource, ShaderLabError> {
        let code = strip_comments(source);
        let (name, header_end) = Self::parse_header(&code)?;

        let after_header = &code[header_end..];
        let properties = match find_keyword(after_header, "Properties") {
            Some(offset) => {
                let body = block_body(&after_header[offset + "Properties".len()..], "Properties")?;
                Self::parse_properties(body)
            }
            None => Vec::new(),
        };

        Ok(ShaderSource { name, properties })
    }

    /// Returns the shader name and the byte index just past it
    fn parse_header(code: &str) -> Result<(String, usize), ShaderLabError> {
        let keyword = find_keyword(code, "Shader").ok_or(ShaderLabError::MissingShaderName)?;
        let after = &code[keyword + "Shader".len()..];
        let trimmed = after.trim_start();
        let quoted = trimmed.strip_prefix('"').ok_or(ShaderLabError::MissingShaderName)?;
        let end = quoted.find('"').ok_or(ShaderLabError::MissingShaderName)?;

        let name = quoted[..end].to_string();
        let consumed = code.len() - quoted.len() + end + 1;
        Ok((name, consumed))
    }

    /// Property names, one declaration per line
    fn parse_properties(body: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for line in body.lines() {
            let Some(rest) = skip_attributes(line.trim()) else {
                continue;
            };

            let ident_len = rest
                .find(|c: char| !is_ident_char(c))
                .unwrap_or(rest.len());
            let ident = &rest[..ident_len];
            if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            if rest[ident_len..].trim_start().starts_with('(') && !names.iter().any(|n| n == ident) {
                names.push(ident.to_string());
            }
        }

        names
    }
}

/// Skip leading `[Attribute]` groups, `None` if one is left open
fn skip_attributes(mut line: &str) -> Option<&str> {
    while let Some(inner) = line.strip_prefix('[') {
        let end = inner.find(']')?;
        line = inner[end + 1..].trim_start();
    }
    Some(line)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of `keyword` as a whole word outside string literals
fn find_keyword(code: &str, keyword: &str) -> Option<usize> {
    let mut in_string = false;
    for (index, c) in code.char_indices() {
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string || !code[index..].starts_with(keyword) {
            continue;
        }

        let before_ok = code[..index].chars().next_back().map_or(true, |p| !is_ident_char(p));
        let after_ok = code[index + keyword.len()..].chars().next().map_or(true, |n| !is_ident_char(n));
        if before_ok && after_ok {
            return Some(index);
        }
    }
    None
}

/// Contents of the `{ ... }` block that `code` starts with
fn block_body<'a>(code: &'a str, what: &'static str) -> Result<&'a str, ShaderLabError> {
    let trimmed = code.trim_start();
    let inner = trimmed.strip_prefix('{').ok_or(ShaderLabError::ExpectedBlock(what))?;

    let mut depth = 1usize;
    let mut in_string = false;
    for (index, c) in inner.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&inner[..index]);
                }
            }
            _ => {}
        }
    }

    Err(ShaderLabError::UnterminatedBlock(what))
}

/// Remove `//` and `/* */` comments, keeping line breaks and string literals
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            in_string = c != '"';
            out.push(c);
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && skipped == '/' {
                        break;
                    }
                    previous = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOON_SHADER: &str = r#"
// Simple toon shader
Shader "Custom/Toon Lit" {
    Properties {
        [MainTexture] _MainTex ("Albedo (RGB)", 2D) = "white" {}
        _Color ("Color", Color) = (1,1,1,1)
        [Toggle(_USE_RIM)] [HideInInspector] _UseRim ("Use Rim", Float) = 0
        _ShadeSteps ("Shade Steps", Range(1, 8)) = 3
        // _Disabled ("Disabled", Float) = 0
        /* _AlsoDisabled ("Also", Float) = 0 */
        _RimColor ("Rim // Color", Color) = (1,1,1,1)
    }
    SubShader {
        Tags { "RenderType"="Opaque" }
        Pass { }
    }
}
"#;

    #[test]
    fn test_parse_name_and_properties() {
        let shader = ShaderLabParser::parse(TOON_SHADER).unwrap();
        assert_eq!(shader.name, "Custom/Toon Lit");
        assert_eq!(
            shader.properties,
            vec!["_MainTex", "_Color", "_UseRim", "_ShadeSteps", "_RimColor"]
        );
    }

    #[test]
    fn test_property_set() {
        let shader = ShaderLabParser::parse(TOON_SHADER).unwrap();
        let set = shader.property_set();
        assert!(set.contains("_UseRim"));
        assert!(!set.contains("_Disabled"));
        assert!(!set.contains("_AlsoDisabled"));
    }

    #[test]
    fn test_shader_without_properties() {
        let shader = ShaderLabParser::parse("Shader \"Hidden/Blit\" { SubShader { Pass { } } }").unwrap();
        assert_eq!(shader.name, "Hidden/Blit");
        assert!(shader.properties.is_empty());
    }

    #[test]
    fn test_single_line_properties_block() {
        let shader = ShaderLabParser::parse(
            "Shader \"Unlit/Flat\" { Properties { _Color (\"Color\", Color) = (1,1,1,1) } }",
        )
        .unwrap();
        assert_eq!(shader.properties, vec!["_Color"]);
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(
            ShaderLabParser::parse("Properties { }"),
            Err(ShaderLabError::MissingShaderName)
        );
        assert_eq!(
            ShaderLabParser::parse("Shader Unquoted { }"),
            Err(ShaderLabError::MissingShaderName)
        );
    }

    #[test]
    fn test_unterminated_properties() {
        let result = ShaderLabParser::parse("Shader \"A\" { Properties { _Color (\"c\", Color) = (1,1,1,1)");
        assert_eq!(result, Err(ShaderLabError::UnterminatedBlock("Properties")));
    }

    #[test]
    fn test_keyword_inside_name_is_ignored() {
        let shader = ShaderLabParser::parse("Shader \"Properties Demo\" { }").unwrap();
        assert_eq!(shader.name, "Properties Demo");
        assert!(shader.properties.is_empty());
    }
}
