//! Token-level analysis of declarations
//!
//! The front end disambiguates declaration kinds but does not expose every
//! syntactic fact the model needs: leading `inline` on a namespace, trailing
//! `override`/`final`, `= delete`, the text of a `noexcept(...)` expression and
//! so on. Those are recovered here from the tokens of a cursor's extent.

use cxxdoc_core::entities::{CvQualifiers, Definition, RefQualifier};

use crate::cursor::CursorKind;

/// Split source text into C++ tokens
///
/// Comments are dropped and `>>` is kept as two tokens so template argument
/// lists stay balanced.
pub fn tokenize(source: &str) -> Vec<String> {
    const PUNCTUATION: [&str; 12] = [
        "...", "::", "->", "&&", "||", "==", "!=", "<=", "+=", "-=", "++", "--",
    ];

    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i += 2;
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || matches!(chars[i], '_' | '.' | '\''))
            {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else if c == '"' || c == '\'' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != c {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
            tokens.push(chars[start..i].iter().collect());
        } else {
            let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
            match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
                Some(p) => {
                    tokens.push((*p).to_string());
                    i += p.len();
                }
                None => {
                    tokens.push(c.to_string());
                    i += 1;
                }
            }
        }
    }
    tokens
}

pub fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

fn needs_space(prev: &str, next: &str) -> bool {
    if matches!(
        next,
        ")" | "]" | "}" | "," | ";" | "::" | "(" | "[" | "<" | ">" | "." | "->"
    ) {
        return false;
    }
    if matches!(
        prev,
        "(" | "[" | "{" | "::" | "~" | "<" | "!" | "." | "->" | "*" | "&" | "&&"
    ) {
        return false;
    }
    if prev == "," {
        return true;
    }
    if next == "..." {
        return false;
    }
    if matches!(next, "*" | "&" | "&&") {
        return is_identifier(prev) || prev == ">";
    }
    true
}

/// Join tokens back into source text with normalized spacing
///
/// `["void", "(", "*", ")", "(", "int", ",", "char", ")"]` becomes
/// `void(*)(int, char)` and `["char", "&"]` becomes `char &`.
pub fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut out = String::new();
    let mut prev = "";
    for token in tokens {
        let token = token.as_ref();
        if needs_space(prev, token) {
            out.push(' ');
        }
        out.push_str(token);
        prev = token;
    }
    out
}

/// Index of the bracket closing the one at `open`
///
/// Parentheses, square brackets and braces are tracked together.
pub fn close_of<S: AsRef<str>>(tokens: &[S], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.as_ref() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `>` closing a template argument list opened at `open`
pub fn close_angle<S: AsRef<str>>(tokens: &[S], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < tokens.len() {
        match tokens[i].as_ref() {
            "<" => depth += 1,
            ">" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            // parenthesized arguments may contain comparisons
            "(" | "[" | "{" => i = close_of(tokens, i)?,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split at top-level commas
pub fn split_top_level<S: AsRef<str>>(tokens: &[S]) -> Vec<&[S]> {
    let mut segments = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.as_ref() {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth -= 1,
            "," if depth == 0 => {
                segments.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        segments.push(&tokens[start..]);
    }
    segments
}

/// Declaration specifiers found before a declarator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Specifiers {
    pub is_virtual: bool,
    pub is_static: bool,
    pub is_constexpr: bool,
    pub is_explicit: bool,
    pub is_thread_local: bool,
    pub is_mutable: bool,
}

impl Specifiers {
    /// Record `token` if it is a specifier keyword
    ///
    /// `inline`, `friend` and `extern` are accepted but not kept.
    fn record(&mut self, token: &str) -> bool {
        match token {
            "virtual" => self.is_virtual = true,
            "static" => self.is_static = true,
            "constexpr" | "consteval" => self.is_constexpr = true,
            "explicit" => self.is_explicit = true,
            "inline" | "friend" | "extern" => {}
            "thread_local" => self.is_thread_local = true,
            "mutable" => self.is_mutable = true,
            _ => return false,
        }
        true
    }
}

/// Separate specifier keywords from the type part of a declaration prefix
///
/// Attributes and template heads are dropped, as is a trailing nested-name
/// qualifier such as `ns::` in front of an out-of-line name.
fn split_prefix(prefix: &[String]) -> (Specifiers, Vec<String>) {
    let mut specifiers = Specifiers::default();
    let mut type_tokens: Vec<String> = Vec::new();
    let mut i = 0;
    while i < prefix.len() {
        let token = prefix[i].as_str();
        if token == "[" && prefix.get(i + 1).map(String::as_str) == Some("[") {
            i = close_of(prefix, i).map_or(prefix.len(), |c| c + 1);
            continue;
        }
        if token == "template" && prefix.get(i + 1).map(String::as_str) == Some("<") {
            i = close_angle(prefix, i + 1).map_or(prefix.len(), |c| c + 1);
            continue;
        }
        if !specifiers.record(token) {
            type_tokens.push(token.to_string());
        }
        i += 1;
    }

    while type_tokens.len() >= 2
        && type_tokens[type_tokens.len() - 1] == "::"
        && is_identifier(&type_tokens[type_tokens.len() - 2])
    {
        type_tokens.truncate(type_tokens.len() - 2);
    }
    (specifiers, type_tokens)
}

fn unbalanced_parens(tokens: &[String]) -> usize {
    let open = tokens.iter().filter(|t| *t == "(").count();
    let close = tokens.iter().filter(|t| *t == ")").count();
    open.saturating_sub(close)
}

/// Facts written after the parameter list of a function declarator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrailingSpecifiers {
    pub cv: CvQualifiers,
    pub ref_qualifier: RefQualifier,
    /// Expression text of a written `noexcept`, `"true"` when bare
    pub noexcept: Option<String>,
    pub is_override: bool,
    pub is_final: bool,
    pub is_pure: bool,
    pub definition: Definition,
    /// Type after `->`
    pub trailing_return: Option<String>,
}

fn parse_trailing(tokens: &[String]) -> TrailingSpecifiers {
    let mut result = TrailingSpecifiers::default();
    let next = |i: usize| tokens.get(i + 1).map(String::as_str);

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "const" => result.cv.is_const = true,
            "volatile" => result.cv.is_volatile = true,
            "&" => result.ref_qualifier = RefQualifier::Lvalue,
            "&&" => result.ref_qualifier = RefQualifier::Rvalue,
            "override" => result.is_override = true,
            "final" => result.is_final = true,
            "noexcept" => {
                if next(i) == Some("(") {
                    let close = close_of(tokens, i + 1).unwrap_or(tokens.len());
                    result.noexcept = Some(join(&tokens[i + 2..close.min(tokens.len())]));
                    i = close;
                } else {
                    result.noexcept = Some("true".to_string());
                }
            }
            "->" => {
                let mut j = i + 1;
                while j < tokens.len()
                    && !matches!(
                        tokens[j].as_str(),
                        "override" | "final" | "=" | "{" | ";" | "try" | "requires"
                    )
                {
                    if matches!(tokens[j].as_str(), "(" | "[") {
                        j = close_of(tokens, j).unwrap_or(tokens.len());
                    }
                    j += 1;
                }
                result.trailing_return = Some(join(&tokens[i + 1..j.min(tokens.len())]));
                i = j;
                continue;
            }
            "=" => {
                match next(i) {
                    Some("0") => result.is_pure = true,
                    Some("delete") => result.definition = Definition::Deleted,
                    Some("default") => result.definition = Definition::Defaulted,
                    _ => {}
                }
                break;
            }
            "{" | ";" | ":" | "try" | "requires" => break,
            "(" | "[" => i = close_of(tokens, i).unwrap_or(tokens.len()),
            token if is_identifier(token) && next(i) == Some("(") => {
                // attribute macros, dynamic exception specifications
                i = close_of(tokens, i + 1).unwrap_or(tokens.len());
            }
            _ => {}
        }
        i += 1;
    }
    result
}

/// Token analysis of a function-like declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionTokens {
    pub specifiers: Specifiers,
    /// Return type as written; empty for constructors and destructors
    pub return_type: String,
    /// Target type of a conversion operator
    pub conversion_target: Option<String>,
    /// Parameter list split at top-level commas
    pub parameters: Vec<Vec<String>>,
    pub is_variadic: bool,
    pub trailing: TrailingSpecifiers,
}

/// Find where the declarator name starts and where its parameter list opens
fn locate_name(tokens: &[String], spelling: &str, kind: CursorKind) -> Option<(usize, usize)> {
    let at = |i: usize| tokens.get(i).map(String::as_str);

    if kind == CursorKind::ConversionFunction || spelling.starts_with("operator") {
        let op = tokens.iter().position(|t| t == "operator")?;
        if at(op + 1) == Some("(") && at(op + 2) == Some(")") {
            return Some((op, op + 3));
        }
        let open = (op + 1..tokens.len()).find(|&i| tokens[i] == "(")?;
        return Some((op, open));
    }

    if let Some(class_name) = spelling.strip_prefix('~') {
        let class_name = class_name.trim();
        return (0..tokens.len())
            .find(|&i| at(i) == Some("~") && at(i + 1) == Some(class_name) && at(i + 2) == Some("("))
            .map(|i| (i, i + 2));
    }

    let ident = cxxdoc_core::scope::split_qualified(spelling)
        .last()
        .copied()
        .unwrap_or(spelling);
    let ident = ident.split('<').next().unwrap_or(ident).trim();
    for (i, token) in tokens.iter().enumerate() {
        if token != ident {
            continue;
        }
        let mut j = i + 1;
        if at(j) == Some("<") {
            j = close_angle(tokens, j)? + 1;
        }
        if at(j) == Some("(") {
            return Some((i, j));
        }
    }
    None
}

/// Analyze the tokens of a function, method, constructor, destructor or
/// conversion operator
///
/// Returns `None` when the declarator name or its parameter list cannot be
/// found in the tokens.
pub fn analyze_function(tokens: &[String], spelling: &str, kind: CursorKind) -> Option<FunctionTokens> {
    let (name_start, open) = locate_name(tokens, spelling, kind)?;
    let close = close_of(tokens, open)?;

    let (specifiers, mut return_tokens) = split_prefix(&tokens[..name_start]);

    // declarator of a returned function pointer wraps around the name
    let mut rest = close + 1;
    let mut unbalanced = unbalanced_parens(&return_tokens);
    let wraps_name = unbalanced > 0;
    while unbalanced > 0 && tokens.get(rest).map(String::as_str) == Some(")") {
        return_tokens.push(")".to_string());
        unbalanced -= 1;
        rest += 1;
    }
    if wraps_name && unbalanced == 0 {
        while matches!(tokens.get(rest).map(String::as_str), Some("(") | Some("[")) {
            let end = close_of(tokens, rest)?;
            return_tokens.extend(tokens[rest..=end].iter().cloned());
            rest = end + 1;
        }
    }

    let trailing = parse_trailing(tokens.get(rest..).unwrap_or_default());

    let conversion_target = (kind == CursorKind::ConversionFunction)
        .then(|| join(&tokens[name_start + 1..open]));

    let mut return_type = join(&return_tokens);
    if let Some(target) = &conversion_target {
        return_type = target.clone();
    } else if let Some(trailing_return) = &trailing.trailing_return {
        if return_type == "auto" {
            return_type = trailing_return.clone();
        }
    }

    let parameters: Vec<Vec<String>> = split_top_level(&tokens[open + 1..close])
        .into_iter()
        .map(<[String]>::to_vec)
        .collect();
    let is_variadic = parameters
        .last()
        .is_some_and(|last| last.len() == 1 && last[0] == "...");

    Some(FunctionTokens {
        specifiers,
        return_type,
        conversion_target,
        parameters,
        is_variadic,
        trailing,
    })
}

/// Position of a declared name in a declaration's tokens
///
/// Names that are part of a nested-name qualifier (`name::` or `::name`) are
/// skipped.
pub fn find_declared_name(tokens: &[String], name: &str) -> Option<usize> {
    tokens.iter().enumerate().position(|(i, t)| {
        t == name
            && tokens.get(i + 1).map(String::as_str) != Some("::")
            && (i == 0 || tokens[i - 1] != "::")
    })
}

/// Type and default value of a parameter, split out of its tokens
pub fn analyze_parameter(tokens: &[String], name: &str) -> (String, Option<String>) {
    let eq = split_at_top_level(tokens, "=");
    let (declarator, default) = match eq {
        Some(i) => (&tokens[..i], Some(join(&tokens[i + 1..]))),
        None => (tokens, None),
    };

    let name_pos = if name.is_empty() {
        None
    } else {
        declarator.iter().rposition(|t| t == name)
    };
    let type_tokens: Vec<&String> = match name_pos {
        Some(pos) => declarator
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(_, t)| t)
            .collect(),
        None => declarator.iter().collect(),
    };
    (join(&type_tokens), default)
}

fn split_at_top_level(tokens: &[String], needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        match token.as_str() {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth -= 1,
            t if t == needle && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Token analysis of a variable or data member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTokens {
    pub specifiers: Specifiers,
    pub type_name: String,
    pub initializer: Option<String>,
}

pub fn analyze_variable(tokens: &[String], name: &str) -> VariableTokens {
    let tokens: Vec<String> = tokens.iter().filter(|t| *t != ";").cloned().collect();
    let Some(pos) = find_declared_name(&tokens, name) else {
        let (specifiers, type_tokens) = split_prefix(&tokens);
        return VariableTokens {
            specifiers,
            type_name: join(&type_tokens),
            initializer: None,
        };
    };

    let (specifiers, mut type_tokens) = split_prefix(&tokens[..pos]);

    let mut i = pos + 1;
    let mut initializer = None;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "=" => {
                initializer = Some(join(&tokens[i + 1..]));
                break;
            }
            "{" => {
                let end = close_of(&tokens, i).unwrap_or(tokens.len() - 1);
                initializer = Some(join(&tokens[i..=end]));
                break;
            }
            ":" => break,
            "(" | "[" => {
                let end = close_of(&tokens, i).unwrap_or(tokens.len() - 1);
                type_tokens.extend(tokens[i..=end].iter().cloned());
                i = end + 1;
            }
            token => {
                type_tokens.push(token.to_string());
                i += 1;
            }
        }
    }

    VariableTokens {
        specifiers,
        type_name: join(&type_tokens),
        initializer,
    }
}

/// Parse an integer literal as written in an enumerator initializer
///
/// Handles a leading sign, hex/octal/binary prefixes, digit separators and
/// integer suffixes. Anything else is not a literal.
pub fn parse_integer_literal<S: AsRef<str>>(tokens: &[S]) -> Option<i128> {
    let text: String = tokens.iter().map(AsRef::as_ref).collect::<String>();
    let text = text.trim_start_matches('(').trim_end_matches(')');
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: String = digits
        .trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z'])
        .chars()
        .filter(|c| *c != '\'')
        .collect();

    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        i128::from_str_radix(bin, 2).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i128>().ok()?
    };
    Some(if negative { -value } else { value })
}
