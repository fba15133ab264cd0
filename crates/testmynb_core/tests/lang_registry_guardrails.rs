use std::collections::HashMap;

use testmynb_core::errors::ExceptionKind;
use testmynb_core::lang::builtins;
use testmynb_core::lang::exceptions;
use testmynb_core::lang::keywords;
use testmynb_core::lang::operators;
use testmynb_core::lang::punctuation;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::as_str(info.id),
            info.canonical,
            "keyword as_str mismatch for {:?}",
            info.id
        );

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

#[test]
fn builtins_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, builtins::BuiltinFnId> = HashMap::new();

    for info in builtins::BUILTIN_FUNCTIONS {
        assert_eq!(
            builtins::from_str(info.canonical),
            Some(info.id),
            "builtin canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(builtins::as_str(info.id), info.canonical);

        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate builtin spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        for &alias in info.aliases {
            assert_eq!(builtins::from_str(alias), Some(info.id), "builtin alias not resolvable: {alias}");
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!("duplicate builtin alias {:?}: {:?} and {:?}", alias, prev, info.id);
            }
        }
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, operators::OperatorId> = HashMap::new();

    for info in operators::OPERATORS {
        assert!(!info.spellings.is_empty(), "operator {:?} has no spelling", info.id);
        for &spelling in info.spellings {
            assert_eq!(
                operators::from_str(spelling),
                Some(info.id),
                "operator spelling not resolvable: {}",
                spelling
            );
            if let Some(prev) = seen.insert(spelling, info.id) {
                panic!("duplicate operator spelling {:?}: {:?} and {:?}", spelling, prev, info.id);
            }
        }
    }
}

#[test]
fn word_operators_are_also_keywords() {
    for info in operators::OPERATORS.iter().filter(|o| o.is_keyword_spelling) {
        let spelling = operators::as_str(info.id);
        assert!(
            keywords::from_str(spelling).is_some(),
            "word operator {spelling:?} missing from the keyword registry"
        );
    }
}

#[test]
fn punctuation_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, punctuation::PunctuationId> = HashMap::new();

    for info in punctuation::PUNCTUATION {
        assert_eq!(punctuation::from_str(info.canonical), Some(info.id));
        assert_eq!(punctuation::as_str(info.id), info.canonical);
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate punctuation spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        assert!(
            operators::from_str(info.canonical).is_none(),
            "punctuation {:?} collides with an operator spelling",
            info.canonical
        );
    }
}

#[test]
fn exception_hierarchy_is_rooted_at_exception() {
    for info in exceptions::EXCEPTIONS {
        let kind = info.item.id;
        assert_eq!(exceptions::from_str(info.item.canonical), Some(kind));
        assert!(
            exceptions::is_subclass(kind, ExceptionKind::Exception),
            "{:?} does not derive from Exception",
            kind
        );
        if kind != ExceptionKind::Exception {
            assert!(info.parent.is_some(), "{kind:?} is missing a parent");
        }
    }
}

#[test]
fn builtin_and_exception_names_do_not_shadow_keywords() {
    for info in builtins::BUILTIN_FUNCTIONS {
        assert!(keywords::from_str(info.canonical).is_none(), "{} is a keyword", info.canonical);
    }
    for info in exceptions::EXCEPTIONS {
        assert!(builtins::from_str(info.item.canonical).is_none());
    }
}
