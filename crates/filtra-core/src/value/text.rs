use std::borrow::Cow;

///
/// TextMode
///
/// Explicit case rule for text comparisons. There is no locale-dependent
/// default: `Cs` compares bytes, `Ci` compares Unicode lowercase forms.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TextMode {
    #[default]
    Cs, // case-sensitive ("default")
    Ci, // case-insensitive ("insensitive")
}

impl TextMode {
    /// Parse the document spelling of a mode.
    #[must_use]
    pub fn from_document(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Cs),
            "insensitive" => Some(Self::Ci),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_document(self) -> &'static str {
        match self {
            Self::Cs => "default",
            Self::Ci => "insensitive",
        }
    }
}

///
/// TextOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
        }
    }
}

/// Fold text under a mode; case-sensitive text is borrowed unchanged.
#[must_use]
pub fn fold_text(text: &str, mode: TextMode) -> Cow<'_, str> {
    match mode {
        TextMode::Cs => Cow::Borrowed(text),
        TextMode::Ci => Cow::Owned(text.to_lowercase()),
    }
}

/// Substring test; `needle` must already be folded under `mode`.
#[must_use]
pub fn text_matches(actual: &str, op: TextOp, needle: &str, mode: TextMode) -> bool {
    let actual = fold_text(actual, mode);

    match op {
        TextOp::Contains => actual.contains(needle),
        TextOp::StartsWith => actual.starts_with(needle),
        TextOp::EndsWith => actual.ends_with(needle),
    }
}
