//! Paths into a JSON document and dotted-pattern matching over them.
//!
//! A path is the ordered stack of segments traversed from the root: object
//! keys as strings, array indices as integers rendered as decimal strings,
//! joined with `.` (e.g. `hearing.defendantAttendance.0.attendanceDays.2`).

/// One step into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }
}

impl core::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A borrowed path (the traversal stack during a rewrite).
pub type Path = [PathSegment];

/// Render a path as a dotted string.
pub fn render(path: &Path) -> String {
    let mut out = String::new();
    for (i, seg) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&seg.to_string());
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    /// Exact key (or an index whose decimal rendering equals the literal).
    Literal(String),
    /// Any array index.
    AnyIndex,
    /// Any single segment.
    Any,
}

/// Dotted path pattern.
///
/// Segments are separated by `.`; `#` matches any array index and `*`
/// matches any single segment. This covers the recurring need of matching
/// irregularly nested records inside arrays of arrays without every
/// transformer re-implementing traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Pattern matching only the document root (empty path).
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('.')
            .map(|s| match s {
                "#" => PatternSegment::AnyIndex,
                "*" => PatternSegment::Any,
                literal => PatternSegment::Literal(literal.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Whole-path match (no prefix semantics).
    pub fn matches(&self, path: &Path) -> bool {
        if self.segments.len() != path.len() {
            return false;
        }
        self.segments.iter().zip(path.iter()).all(|(p, s)| match p {
            PatternSegment::Any => true,
            PatternSegment::AnyIndex => matches!(s, PathSegment::Index(_)),
            PatternSegment::Literal(lit) => match s {
                PathSegment::Key(k) => k == lit,
                PathSegment::Index(i) => i.to_string() == *lit,
            },
        })
    }

    /// Matcher closure for [`crate::rewrite::rewrite`].
    pub fn matcher(&self) -> impl Fn(&Path) -> bool + '_ {
        move |path| self.matches(path)
    }
}
