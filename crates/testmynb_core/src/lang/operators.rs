//! Operator vocabulary.
//!
//! This module defines the canonical operator set (symbol operators like `+` and word operators like `and`)
//! along with basic metadata such as precedence, associativity, and fixity.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Some operators are spelled using reserved words (e.g. `"and"`). Those entries have
//!   [`OperatorInfo::is_keyword_spelling`] set to `true` and are lexed as keywords.
//! - Precedence follows Python's operator table: higher binds tighter.
//!
//! ## Examples
//! ```rust
//! use testmynb_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("//"), Some(OperatorId::SlashSlash));
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::registry::Support;

/// Define how operators associate when chained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    /// Comparisons chain (`a < b < c`) instead of associating.
    Chain,
    None,
}

/// Define whether an operator is infix (binary), prefix (unary) or an assignment form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    Assign,
}

/// Stable identifier for every operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,

    // Comparison
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Assignment
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    SlashSlashEq,
    PercentEq,
    StarStarEq,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `spellings` may contain multiple accepted spellings for the same operator id (synonyms).
/// - `precedence` is a relative ordering where higher binds tighter; assignment forms use `0`.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spellings: &'static [&'static str],
    pub precedence: u8,
    pub associativity: Associativity,
    pub fixity: Fixity,
    pub is_keyword_spelling: bool,
    pub support: Support,
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, &["+"], 50, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Minus, &["-"], 50, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Star, &["*"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::StarStar, &["**"], 70, Associativity::Right, Fixity::Infix, false),
    op(OperatorId::Slash, &["/"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::SlashSlash, &["//"], 60, Associativity::Left, Fixity::Infix, false),
    op(OperatorId::Percent, &["%"], 60, Associativity::Left, Fixity::Infix, false),
    // Comparison
    op(OperatorId::EqEq, &["=="], 40, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::NotEq, &["!="], 40, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::Lt, &["<"], 40, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::LtEq, &["<="], 40, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::Gt, &[">"], 40, Associativity::Chain, Fixity::Infix, false),
    op(OperatorId::GtEq, &[">="], 40, Associativity::Chain, Fixity::Infix, false),
    // Assignment
    op(OperatorId::Eq, &["="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::PlusEq, &["+="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::MinusEq, &["-="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::StarEq, &["*="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::SlashEq, &["/="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::SlashSlashEq, &["//="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::PercentEq, &["%="], 0, Associativity::None, Fixity::Assign, false),
    op(OperatorId::StarStarEq, &["**="], 0, Associativity::None, Fixity::Assign, false),
    // Word operators (keyword spellings)
    op(OperatorId::Or, &["or"], 20, Associativity::Left, Fixity::Infix, true),
    op(OperatorId::And, &["and"], 25, Associativity::Left, Fixity::Infix, true),
    op(OperatorId::Not, &["not"], 30, Associativity::Right, Fixity::Prefix, true),
    op(OperatorId::In, &["in"], 40, Associativity::Chain, Fixity::Infix, true),
    op(OperatorId::Is, &["is"], 40, Associativity::Chain, Fixity::Infix, true),
];

/// Return the full metadata entry for an operator.
///
/// ## Parameters
/// - `id`: Operator identifier.
///
/// ## Returns
/// - The associated [`OperatorInfo`] from [`OPERATORS`].
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Return the canonical (first) spelling for an operator.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spellings[0]
}

/// Map an augmented-assignment operator to the binary operator it applies.
///
/// ## Returns
/// - `Some(OperatorId)` for `+=`, `-=`, … (e.g. `PlusEq` → `Plus`).
/// - `None` for plain `=` and non-assignment operators.
pub fn augmented_base(id: OperatorId) -> Option<OperatorId> {
    match id {
        OperatorId::PlusEq => Some(OperatorId::Plus),
        OperatorId::MinusEq => Some(OperatorId::Minus),
        OperatorId::StarEq => Some(OperatorId::Star),
        OperatorId::SlashEq => Some(OperatorId::Slash),
        OperatorId::SlashSlashEq => Some(OperatorId::SlashSlash),
        OperatorId::PercentEq => Some(OperatorId::Percent),
        OperatorId::StarStarEq => Some(OperatorId::StarStar),
        _ => None,
    }
}

/// Resolve an operator spelling to its identifier.
///
/// ## Parameters
/// - `spelling`: Candidate operator token (symbol or word operator).
///
/// ## Returns
/// - `Some(OperatorId)` if the spelling exists in [`OPERATORS`].
/// - `None` otherwise.
pub fn from_str(spelling: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| {
            let spellings: &[&str] = o.spellings;
            spellings.contains(&spelling)
        })
        .map(|o| o.id)
}

// --- helpers -----------------------------------------------------------------

const fn op(
    id: OperatorId,
    spellings: &'static [&'static str],
    precedence: u8,
    associativity: Associativity,
    fixity: Fixity,
    is_keyword_spelling: bool,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spellings,
        precedence,
        associativity,
        fixity,
        is_keyword_spelling,
        support: Support::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmented_base_covers_every_assign_form() {
        for o in OPERATORS.iter().filter(|o| o.fixity == Fixity::Assign) {
            if o.id == OperatorId::Eq {
                assert_eq!(augmented_base(o.id), None);
            } else {
                let base = augmented_base(o.id).unwrap_or_else(|| panic!("no base for {:?}", o.id));
                assert_eq!(format!("{}=", as_str(base)), as_str(o.id));
            }
        }
    }

    #[test]
    fn test_power_binds_tighter_than_multiplication() {
        assert!(info_for(OperatorId::StarStar).precedence > info_for(OperatorId::Star).precedence);
        assert_eq!(info_for(OperatorId::StarStar).associativity, Associativity::Right);
    }
}
