/// A scalar field value plus its optional trailing inline comment.
///
/// The comment is stored verbatim, leading `#` included. A record rewrite
/// never synthesizes a comment that was not present in the source or
/// supplied explicitly by a transform rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub value: String,
    pub comment: Option<String>,
}

impl FieldValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: None,
        }
    }

    pub fn with_comment(value: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: Some(comment.into()),
        }
    }
}

/// A record's dynasty assignment. Id 0 is the implicit "lowborn" dynasty
/// used when a record carries no dynasty line; lowborns are never written
/// back explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynastyVal {
    pub id: u64,
    pub comment: Option<String>,
}

impl DynastyVal {
    pub const LOWBORN: u64 = 0;

    pub fn lowborn() -> Self {
        Self {
            id: Self::LOWBORN,
            comment: None,
        }
    }

    pub fn is_lowborn(&self) -> bool {
        self.id == Self::LOWBORN
    }
}
