use serde_json::Value;

use crate::error::{ForgeError, ForgeResult};

/// A compiled template. Compilation happens once; `render` is a pure function
/// of (template, document) and can be applied to any number of documents.
#[derive(Clone, Debug)]
pub struct Template {
    nodes: Vec<Node>,
}

/// The closed set of block constructs. Helpers outside this set are a compile
/// error, never a silent fallthrough to some host-language behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockKind {
    If,
    Unless,
    Each,
}

impl BlockKind {
    fn name(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
            BlockKind::Each => "each",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "if" => Some(BlockKind::If),
            "unless" => Some(BlockKind::Unless),
            "each" => Some(BlockKind::Each),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
enum Node {
    Text(String),
    Var(Path),
    Block {
        kind: BlockKind,
        path: Path,
        body: Vec<Node>,
        // Always empty for Each; the parser rejects {{else}} there.
        else_body: Vec<Node>,
    },
}

/// A dotted path expression, e.g. `project.name` or `@index`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn parse(expr: &str) -> ForgeResult<Self> {
        if expr.is_empty() {
            return Err(ForgeError::template("empty path expression"));
        }
        let segments: Vec<String> = expr.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ForgeError::template(format!(
                "malformed path expression '{expr}'"
            )));
        }
        Ok(Self { segments })
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Token {
    Text(String),
    Var(Path),
    Open(BlockKind, Path),
    Close(BlockKind),
    Else,
}

impl Template {
    pub fn compile(source: &str) -> ForgeResult<Self> {
        let tokens = lex(source)?;
        let mut pos = 0usize;
        let nodes = parse_nodes(&tokens, &mut pos, None)?;
        debug_assert_eq!(pos, tokens.len());
        Ok(Self { nodes })
    }

    pub fn render(&self, doc: &Value) -> String {
        let mut out = String::new();
        render_nodes(
            &self.nodes,
            Scope {
                value: doc,
                iter: None,
            },
            &mut out,
        );
        out
    }
}

fn lex(source: &str) -> ForgeResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            tokens.push(Token::Text(rest[..open].to_string()));
        }
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            return Err(ForgeError::template("unclosed '{{' marker"));
        };
        tokens.push(classify(after[..close].trim())?);
        rest = &after[close + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

fn classify(expr: &str) -> ForgeResult<Token> {
    if expr.is_empty() {
        return Err(ForgeError::template("empty '{{ }}' expression"));
    }

    if let Some(helper) = expr.strip_prefix('#') {
        let mut parts = helper.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let kind = BlockKind::from_name(name)
            .ok_or_else(|| ForgeError::template(format!("unknown helper '#{name}'")))?;
        let arg = parts
            .next()
            .ok_or_else(|| ForgeError::template(format!("'{{{{#{name}}}}}' needs a path")))?;
        if parts.next().is_some() {
            return Err(ForgeError::template(format!(
                "'{{{{#{name}}}}}' takes exactly one path"
            )));
        }
        return Ok(Token::Open(kind, Path::parse(arg)?));
    }

    if let Some(name) = expr.strip_prefix('/') {
        let kind = BlockKind::from_name(name.trim()).ok_or_else(|| {
            ForgeError::template(format!("closing tag '{{{{/{name}}}}}' is not a block helper"))
        })?;
        return Ok(Token::Close(kind));
    }

    if expr == "else" {
        return Ok(Token::Else);
    }

    Ok(Token::Var(Path::parse(expr)?))
}

/// Parses nodes until the enclosing block (if any) is closed. Leaves `pos`
/// just past the consumed tokens.
fn parse_nodes(
    tokens: &[Token],
    pos: &mut usize,
    enclosing: Option<BlockKind>,
) -> ForgeResult<Vec<Node>> {
    let mut nodes = Vec::new();

    while *pos < tokens.len() {
        match &tokens[*pos] {
            Token::Text(text) => {
                nodes.push(Node::Text(text.clone()));
                *pos += 1;
            }
            Token::Var(path) => {
                nodes.push(Node::Var(path.clone()));
                *pos += 1;
            }
            Token::Open(kind, path) => {
                *pos += 1;
                nodes.push(parse_block(tokens, pos, *kind, path.clone())?);
            }
            Token::Close(kind) => match enclosing {
                Some(open_kind) if open_kind == *kind => return Ok(nodes),
                Some(open_kind) => {
                    return Err(ForgeError::template(format!(
                        "mismatched closing tag: expected '{{{{/{}}}}}', found '{{{{/{}}}}}'",
                        open_kind.name(),
                        kind.name()
                    )));
                }
                None => {
                    return Err(ForgeError::template(format!(
                        "unexpected '{{{{/{}}}}}' with no open block",
                        kind.name()
                    )));
                }
            },
            Token::Else => match enclosing {
                // The enclosing parse_block decides whether the branch is
                // legal; this just hands control back without consuming.
                Some(_) => return Ok(nodes),
                None => {
                    return Err(ForgeError::template(
                        "unexpected '{{else}}' outside of a block",
                    ));
                }
            },
        }
    }

    match enclosing {
        Some(kind) => Err(ForgeError::template(format!(
            "unterminated '{{{{#{}}}}}' block",
            kind.name()
        ))),
        None => Ok(nodes),
    }
}

fn parse_block(
    tokens: &[Token],
    pos: &mut usize,
    kind: BlockKind,
    path: Path,
) -> ForgeResult<Node> {
    let body = parse_nodes(tokens, pos, Some(kind))?;

    let mut else_body = Vec::new();
    match tokens.get(*pos) {
        Some(Token::Else) => {
            if kind == BlockKind::Each {
                return Err(ForgeError::template(
                    "'{{#each}}' does not take an '{{else}}' branch",
                ));
            }
            *pos += 1;
            else_body = parse_nodes(tokens, pos, Some(kind))?;
            match tokens.get(*pos) {
                Some(Token::Close(close)) if *close == kind => {}
                Some(Token::Else) => {
                    return Err(ForgeError::template(format!(
                        "duplicate '{{{{else}}}}' in '{{{{#{}}}}}' block",
                        kind.name()
                    )));
                }
                _ => {
                    return Err(ForgeError::template(format!(
                        "unterminated '{{{{#{}}}}}' block",
                        kind.name()
                    )));
                }
            }
        }
        Some(Token::Close(close)) if *close == kind => {}
        _ => {
            return Err(ForgeError::template(format!(
                "unterminated '{{{{#{}}}}}' block",
                kind.name()
            )));
        }
    }
    *pos += 1; // consume the close tag

    Ok(Node::Block {
        kind,
        path,
        body,
        else_body,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The binding scope a path expression resolves against: the current value
/// plus, inside an `each` body, the element's iteration position.
#[derive(Clone, Copy)]
struct Scope<'a> {
    value: &'a Value,
    iter: Option<IterPos>,
}

#[derive(Clone, Copy)]
struct IterPos {
    index: usize,
    len: usize,
}

fn render_nodes(nodes: &[Node], scope: Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = resolve(path, scope) {
                    out.push_str(&value_to_string(&value));
                }
            }
            Node::Block {
                kind,
                path,
                body,
                else_body,
            } => match kind {
                BlockKind::If | BlockKind::Unless => {
                    let mut cond = resolve(path, scope).is_some_and(|v| truthy(&v));
                    if *kind == BlockKind::Unless {
                        cond = !cond;
                    }
                    let branch = if cond { body } else { else_body };
                    render_nodes(branch, scope, out);
                }
                BlockKind::Each => {
                    let Some(Value::Array(items)) = resolve(path, scope) else {
                        // Not a sequence: render nothing.
                        continue;
                    };
                    let len = items.len();
                    for (index, item) in items.iter().enumerate() {
                        let element_scope = Scope {
                            value: item,
                            iter: Some(IterPos { index, len }),
                        };
                        render_nodes(body, element_scope, out);
                    }
                }
            },
        }
    }
}

fn resolve(path: &Path, scope: Scope<'_>) -> Option<Value> {
    let first = path.segments[0].as_str();

    if let Some(synthetic) = first.strip_prefix('@') {
        // Synthetic iteration fields are scalars; no further descent.
        if path.segments.len() > 1 {
            return None;
        }
        let pos = scope.iter?;
        return match synthetic {
            "index" => Some(Value::from(pos.index)),
            "index_plus_1" => Some(Value::from(pos.index + 1)),
            "first" => Some(Value::Bool(pos.index == 0)),
            "last" => Some(Value::Bool(pos.index + 1 == pos.len)),
            _ => None,
        };
    }

    let rest: &[String] = if first == "this" {
        &path.segments[1..]
    } else {
        &path.segments
    };

    let mut current = scope.value;
    for segment in rest {
        current = current.get(segment)?;
    }
    Some(current.clone())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => String::new(),
    }
}
