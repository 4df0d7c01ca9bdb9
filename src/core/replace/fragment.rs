//! Replacement fragments and their rendering to source text.

/// A synthesized translation call, e.g. `t("Hi {arg1}", { arg1: name })`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFragment {
    pub callee: String,
    /// Key already rendered as a JS expression.
    pub key: String,
    /// `(argN, expression source)` pairs in slot order.
    pub args: Vec<(String, String)>,
    pub comment: Option<String>,
}

impl CallFragment {
    pub fn render(&self) -> String {
        let mut out = format!("{}({}", self.callee, self.key);
        if let Some(comment) = &self.comment {
            out.push_str(" /* ");
            out.push_str(&comment.replace("*/", "*\\/"));
            out.push_str(" */");
        }
        if !self.args.is_empty() {
            let args: Vec<String> = self
                .args
                .iter()
                .map(|(name, expr)| format!("{name}: {expr}"))
                .collect();
            out.push_str(", { ");
            out.push_str(&args.join(", "));
            out.push_str(" }");
        }
        out.push(')');
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Text emitted exactly as given, already escaped for its context.
    Verbatim(String),
    Call(CallFragment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The call alone replaces the literal.
    Call(CallFragment),
    /// A template literal interleaving text and calls.
    Template(Vec<Piece>),
    /// An attribute value wrapped in an expression container.
    AttributeValue(Box<Fragment>),
    /// JSX children: raw text siblings with `{call}` containers between them.
    Children(Vec<Piece>),
}

impl Fragment {
    pub fn render(&self) -> String {
        match self {
            Fragment::Call(call) => call.render(),
            Fragment::Template(pieces) => {
                let mut out = String::from("`");
                for piece in pieces {
                    match piece {
                        Piece::Verbatim(text) => out.push_str(text),
                        Piece::Call(call) => {
                            out.push_str("${");
                            out.push_str(&call.render());
                            out.push('}');
                        }
                    }
                }
                out.push('`');
                out
            }
            Fragment::AttributeValue(inner) => format!("{{{}}}", inner.render()),
            Fragment::Children(pieces) => {
                let mut out = String::new();
                for piece in pieces {
                    match piece {
                        Piece::Verbatim(text) => out.push_str(text),
                        Piece::Call(call) => {
                            out.push('{');
                            out.push_str(&call.render());
                            out.push('}');
                        }
                    }
                }
                out
            }
        }
    }
}
