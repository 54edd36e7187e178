//! A small Wadler-style document algebra for pretty-printing nodes.
//!
//! A [`Doc::Group`] renders flat (every [`Doc::Line`] becomes a space) when it
//! holds no hard line and fits in the space left on the current line;
//! otherwise each `Line` in it becomes a newline at the current nesting.
//! `Text` may contain newlines: they are emitted verbatim with no indentation,
//! which is how caller-supplied text is reproduced exactly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    Nil,
    Text(String),
    Line,
    HardLine,
    Concat(Vec<Doc>),
    Nest(usize, Box<Doc>),
    Group(Box<Doc>),
}

impl Doc {
    pub fn text(s: impl Into<String>) -> Doc {
        Doc::Text(s.into())
    }

    pub fn concat(docs: impl IntoIterator<Item = Doc>) -> Doc {
        Doc::Concat(docs.into_iter().collect())
    }

    /// Interleave `sep` between `docs`.
    pub fn join(docs: impl IntoIterator<Item = Doc>, sep: Doc) -> Doc {
        let mut out = Vec::new();
        for (i, doc) in docs.into_iter().enumerate() {
            if i > 0 {
                out.push(sep.clone());
            }
            out.push(doc);
        }
        Doc::Concat(out)
    }

    pub fn nest(self, indent: usize) -> Doc {
        Doc::Nest(indent, Box::new(self))
    }

    pub fn group(self) -> Doc {
        Doc::Group(Box::new(self))
    }

    /// Width of the flat rendering, or `None` if it cannot render flat.
    fn flat_width(&self) -> Option<usize> {
        match self {
            Doc::Nil => Some(0),
            Doc::Text(s) if s.contains('\n') => None,
            Doc::Text(s) => Some(s.chars().count()),
            Doc::Line => Some(1),
            Doc::HardLine => None,
            Doc::Concat(docs) => docs.iter().try_fold(0, |acc, d| Some(acc + d.flat_width()?)),
            Doc::Nest(_, d) | Doc::Group(d) => d.flat_width(),
        }
    }

    /// Lay the document out for `width` columns.
    pub fn display(&self, width: usize) -> Vec<String> {
        let mut lines = vec![String::new()];
        let mut column = 0usize;
        let mut stack: Vec<(usize, bool, &Doc)> = vec![(0, false, self)];

        while let Some((indent, flat, doc)) = stack.pop() {
            match doc {
                Doc::Nil => {}
                Doc::Text(s) => {
                    let mut parts = s.split('\n');
                    if let Some(first) = parts.next() {
                        push_str(&mut lines, &mut column, first);
                    }
                    for part in parts {
                        lines.push(String::new());
                        column = 0;
                        push_str(&mut lines, &mut column, part);
                    }
                }
                Doc::Line if flat => push_str(&mut lines, &mut column, " "),
                Doc::Line | Doc::HardLine => {
                    lines.push(" ".repeat(indent));
                    column = indent;
                }
                Doc::Concat(docs) => {
                    for d in docs.iter().rev() {
                        stack.push((indent, flat, d));
                    }
                }
                Doc::Nest(i, d) => stack.push((indent + i, flat, d)),
                Doc::Group(d) => {
                    let fits = flat
                        || d.flat_width()
                            .is_some_and(|w| column + w <= width);
                    stack.push((indent, fits, d));
                }
            }
        }

        lines
    }
}

fn push_str(lines: &mut [String], column: &mut usize, s: &str) {
    if let Some(last) = lines.last_mut() {
        last.push_str(s);
    }
    *column += s.chars().count();
}
