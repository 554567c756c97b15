//! Exam paper layout: several exercises rendered into one body.

use std::fmt::Write;

use crate::error::RenderError;
use crate::escape::escape_latex;
use crate::node::Node;
use crate::normalize::normalize;
use crate::renderer::{LatexRenderer, RenderResult};

/// One exercise of a paper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exercise {
    /// Dash-separated identifier, e.g. `9709-s20-qp-12-3`.
    pub id: String,
    pub body: Node,
}

impl Exercise {
    #[must_use]
    pub fn new(id: impl Into<String>, body: Node) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }

    /// Bracketed header shown above the exercise.
    ///
    /// The first three id components are separated by `/` and the remainder
    /// is kept as one component: `9709-s20-qp-12-3` becomes
    /// `[9709/s20/qp/12-3]`. Shorter ids keep every component.
    #[must_use]
    pub fn header(&self) -> String {
        let parts: Vec<&str> = self.id.split('-').collect();
        let header = if parts.len() > 3 {
            format!("{}/{}", parts[..3].join("/"), parts[3..].join("-"))
        } else {
            parts.join("/")
        };
        format!("[{header}]")
    }
}

/// Ordered collection of exercises.
#[derive(Clone, Debug, Default)]
pub struct Paper {
    exercises: Vec<Exercise>,
}

impl Paper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, exercise: Exercise) {
        self.exercises.push(exercise);
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Syllabus code: the id prefix of the first exercise, before its first dash.
    #[must_use]
    pub fn syllabus(&self) -> Option<&str> {
        let id = &self.exercises.first()?.id;
        id.split('-').next().filter(|s| !s.is_empty())
    }

    /// Default document title.
    #[must_use]
    pub fn default_title(&self) -> String {
        match self.syllabus() {
            Some(syllabus) => format!("Topic Questions on {syllabus}"),
            None => "Topic Questions".to_owned(),
        }
    }

    /// Render every exercise and normalize the combined body once.
    ///
    /// Each exercise gets fresh render state, so reference sections stay with
    /// the exercise that cites them. Warnings are prefixed with the exercise id.
    pub fn render(&self, renderer: &LatexRenderer) -> Result<RenderResult, RenderError> {
        let mut latex = String::new();
        let mut warnings = Vec::new();
        let mut reference_count = 0;

        for (index, exercise) in self.exercises.iter().enumerate() {
            let raw = renderer
                .render_raw(&exercise.body)
                .map_err(|source| RenderError::Exercise {
                    id: exercise.id.clone(),
                    source: Box::new(source),
                })?;

            writeln!(latex, "\\begin{{minipage}}{{\\textwidth}}").unwrap();
            writeln!(latex, "\\texttt{{{}}} \\newline", escape_latex(&exercise.header())).unwrap();
            writeln!(latex, "\\textbf{{{}.}} {}", index + 1, raw.latex.trim()).unwrap();
            latex.push_str("\\end{minipage}\n\n\\vspace{1cm}\n\n");

            warnings.extend(
                raw.warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", exercise.id)),
            );
            reference_count += raw.reference_count;
        }

        tracing::debug!(exercises = self.len(), "Rendered paper");
        Ok(RenderResult {
            body: normalize(&latex)?,
            warnings,
            reference_count,
        })
    }
}

impl FromIterator<Exercise> for Paper {
    fn from_iter<I: IntoIterator<Item = Exercise>>(iter: I) -> Self {
        Self {
            exercises: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LinkTarget;
    use pretty_assertions::assert_eq;

    fn exercise(id: &str, text: &str) -> Exercise {
        Exercise::new(id, Node::Document(vec![Node::paragraph(text)]))
    }

    #[test]
    fn test_header_layout() {
        assert_eq!(exercise("9709-s20-qp-12-3", "").header(), "[9709/s20/qp/12-3]");
        assert_eq!(exercise("9709-s20-qp-1", "").header(), "[9709/s20/qp/1]");
        assert_eq!(exercise("9709-s20", "").header(), "[9709/s20]");
        assert_eq!(exercise("intro", "").header(), "[intro]");
    }

    #[test]
    fn test_syllabus_and_title() {
        let paper: Paper = [exercise("9709-s20-qp-12-3", "a"), exercise("0625-w19-qp-1-1", "b")]
            .into_iter()
            .collect();
        assert_eq!(paper.syllabus(), Some("9709"));
        assert_eq!(paper.default_title(), "Topic Questions on 9709");
        assert_eq!(Paper::new().syllabus(), None);
        assert_eq!(Paper::new().default_title(), "Topic Questions");
    }

    #[test]
    fn test_render_numbers_exercises() {
        let mut paper = Paper::new();
        paper.push(exercise("9709-s20-qp-12-3", "First question."));
        paper.push(exercise("9709-s20-qp-12-4", "Second question."));

        let result = paper.render(&LatexRenderer::default()).unwrap();
        assert_eq!(
            result.body.as_str(),
            "\\begin{minipage}{\\textwidth}\n\
             \\texttt{[9709/s20/qp/12-3]} \\newline\n\
             \\textbf{1.} First question.\n\
             \\end{minipage}\n\
             \n\
             \\vspace{1cm}\n\
             \n\
             \\begin{minipage}{\\textwidth}\n\
             \\texttt{[9709/s20/qp/12-4]} \\newline\n\
             \\textbf{2.} Second question.\n\
             \\end{minipage}\n\
             \n\
             \\vspace{1cm}"
        );
    }

    #[test]
    fn test_header_escaped() {
        let paper: Paper = [exercise("a_b-c", "x")].into_iter().collect();
        let result = paper.render(&LatexRenderer::default()).unwrap();
        assert!(result.body.as_str().contains("\\texttt{[a\\_b/c]}"));
    }

    #[test]
    fn test_error_names_exercise() {
        let broken = Exercise::new(
            "9709-bad",
            Node::Paragraph(vec![Node::Link {
                target: LinkTarget::new(""),
                children: vec![],
            }]),
        );
        let paper: Paper = [exercise("9709-ok", "fine"), broken].into_iter().collect();
        let err = paper.render(&LatexRenderer::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::Exercise {
                id: "9709-bad".to_owned(),
                source: Box::new(RenderError::MissingUrl { kind: "link" }),
            }
        );
    }

    #[test]
    fn test_warnings_prefixed_with_id() {
        let tagged = Exercise::new("9709-t", Node::BlockTag("<video/>".to_owned()));
        let paper: Paper = [tagged].into_iter().collect();
        let result = paper.render(&LatexRenderer::default()).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("9709-t: [unsupported tag: video]"));
    }
}
