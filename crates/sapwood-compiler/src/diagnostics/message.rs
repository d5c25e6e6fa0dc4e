use rowan::TextRange;

/// Diagnostic kinds ordered by priority, highest first.
///
/// When two diagnostics overlap, the higher-priority one suppresses the
/// other. Unclosed delimiters come first because everything after them is
/// noise; grammar and predicate checks come last because they assume the
/// syntax is sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Unclosed delimiters
    UnclosedTree,
    UnclosedGroup,
    UnclosedAlternation,
    UnclosedPredicate,

    // Something required is missing
    ExpectedExpression,
    ExpectedCaptureName,
    ExpectedFieldName,

    // Something that does not belong
    EmptyTree,
    EmptyAlternation,
    BareIdentifier,
    InvalidSeparator,
    ErrorTakesNoArguments,
    PredicateWithoutParens,
    InvalidPredicateArgument,
    CaptureWithoutTarget,
    UnexpectedToken,
    NestingTooDeep,
    QueryTooLarge,

    // Valid syntax in the wrong place
    FieldOutsideNode,
    NegatedFieldOutsideNode,
    MisplacedAnchor,
    CaptureOnSequence,
    FieldOnSequence,
    PredicateWithoutPattern,
    EmptyRepetition,
    EmptyPattern,

    // Checked against the grammar
    UnknownNodeKind,
    UnknownField,
    FieldNotOnNodeKind,

    // Predicates
    UnknownPredicate,
    PredicateArity,
    PredicateArgumentKind,
    InvalidRegex,
    UnboundCapture,

    DuplicateCapture,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DuplicateCapture => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Lower discriminant wins.
    pub fn suppresses(&self, other: &DiagnosticKind) -> bool {
        self < other
    }

    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::UnclosedTree | Self::UnclosedGroup | Self::UnclosedAlternation | Self::UnclosedPredicate
        )
    }

    /// Something the user left out. Suppresses unclosed-delimiter errors at
    /// the same position.
    pub fn is_root_cause_error(&self) -> bool {
        matches!(
            self,
            Self::ExpectedExpression | Self::ExpectedCaptureName | Self::ExpectedFieldName
        )
    }

    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTree => Some("use `(_)` to match any named node, or `_` for any node"),
            Self::BareIdentifier => Some("node patterns are written in parentheses"),
            Self::InvalidSeparator => Some("terms are separated by whitespace"),
            Self::PredicateWithoutParens => Some("write predicates as `(#name? @capture ...)`"),
            Self::EmptyRepetition => Some("quantify a term that matches at least one node"),
            Self::CaptureOnSequence | Self::FieldOnSequence => {
                Some("move it onto one of the terms inside")
            }
            _ => None,
        }
    }

    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnclosedTree => "missing closing `)`",
            Self::UnclosedGroup => "missing closing `)` for group",
            Self::UnclosedAlternation => "missing closing `]`",
            Self::UnclosedPredicate => "missing closing `)` for predicate",

            Self::ExpectedExpression => "expected a pattern",
            Self::ExpectedCaptureName => "expected capture name",
            Self::ExpectedFieldName => "expected field name",

            Self::EmptyTree => "empty `()` is not allowed",
            Self::EmptyAlternation => "empty `[]` is not allowed",
            Self::BareIdentifier => "bare identifier is not a pattern",
            Self::InvalidSeparator => "unexpected separator",
            Self::ErrorTakesNoArguments => "`(ERROR)` cannot have children",
            Self::PredicateWithoutParens => "predicate outside parentheses",
            Self::InvalidPredicateArgument => "invalid predicate argument",
            Self::CaptureWithoutTarget => "capture has no target",
            Self::UnexpectedToken => "unexpected token",
            Self::NestingTooDeep => "query is nested too deeply",
            Self::QueryTooLarge => "query is too large to parse",

            Self::FieldOutsideNode => "field constraint outside a node pattern",
            Self::NegatedFieldOutsideNode => "negated field outside a node pattern",
            Self::MisplacedAnchor => "anchor has nothing to attach to",
            Self::CaptureOnSequence => "capture on a sequence of terms",
            Self::FieldOnSequence => "field on a sequence of terms",
            Self::PredicateWithoutPattern => "predicate does not follow a pattern",
            Self::EmptyRepetition => "quantified pattern can match nothing",
            Self::EmptyPattern => "pattern must start by matching a node",

            Self::UnknownNodeKind => "unknown node kind",
            Self::UnknownField => "unknown field",
            Self::FieldNotOnNodeKind => "field not valid on this node kind",

            Self::UnknownPredicate => "unknown predicate",
            Self::PredicateArity => "wrong number of predicate arguments",
            Self::PredicateArgumentKind => "wrong kind of predicate argument",
            Self::InvalidRegex => "invalid regular expression",
            Self::UnboundCapture => "capture is not bound by this pattern",

            Self::DuplicateCapture => "capture repeated on the same term",
        }
    }

    /// Template for a message with caller-provided detail in `{}`.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownNodeKind => "`{}` is not a node kind".to_owned(),
            Self::UnknownField => "`{}` is not a field".to_owned(),
            Self::FieldNotOnNodeKind => "field `{}` is not valid on this node kind".to_owned(),
            Self::UnknownPredicate => "`{}` is not a known predicate".to_owned(),
            Self::UnboundCapture => "`@{}` is not bound by this pattern".to_owned(),
            Self::DuplicateCapture => "`@{}` is repeated on the same term".to_owned(),
            Self::UnclosedTree
            | Self::UnclosedGroup
            | Self::UnclosedAlternation
            | Self::UnclosedPredicate => format!("{}; {{}}", self.fallback_message()),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_owned(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub(crate) replacement: String,
    pub(crate) description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Range underlined in output.
    pub(crate) range: TextRange,
    /// Range other diagnostics are suppressed in. Defaults to `range`; the
    /// parser widens it to the enclosing unclosed delimiter.
    pub(crate) suppression_range: TextRange,
    pub(crate) message: String,
    pub(crate) fix: Option<Fix>,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange) -> Self {
        Self {
            kind,
            range,
            suppression_range: range,
            message: kind.fallback_message().to_owned(),
            fix: None,
            related: Vec::new(),
            hints: kind.default_hint().map(str::to_owned).into_iter().collect(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.range.start().into()..self.range.end().into()
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}: {}",
            self.severity(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        if let Some(fix) = &self.fix {
            write!(f, " (fix: {})", fix.description)?;
        }
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
