//! Properties over generated documents.

use super::common::{identified, preorder_ids};
use blockedit::ast::IdGenerator;
use blockedit::lang::Parse;
use blockedit::{reconcile, SexprParser};
use proptest::prelude::*;

fn comment() -> impl Strategy<Value = String> {
    "; [a-z]{1,5}( [a-z]{1,5})?"
}

fn name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["x", "y", "acc", "n"])
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9]{0,5}",
        (0u32..1000).prop_map(|n| n.to_string()),
        "\"[a-z ]{0,4}(\\\\\")?\"",
        Just("#t".to_string()),
    ]
}

/// `(head args...)` or `[head args...]`. An argument may carry a comment on
/// the line above it or at the end of its own line.
fn application(inner: BoxedStrategy<String>) -> impl Strategy<Value = String> {
    let arg = (inner, prop::option::of(comment()), any::<bool>());
    (
        prop::sample::select(vec!["f", "g", "+", "list"]),
        prop::collection::vec(arg, 0..4),
        any::<bool>(),
    )
        .prop_map(|(head, args, square)| {
            let (open, close) = if square { ('[', ']') } else { ('(', ')') };
            let mut out = format!("{open}{head}");
            for (arg, comment, above) in args {
                match comment {
                    Some(c) if above => out.push_str(&format!("\n{c}\n{arg}")),
                    Some(c) => out.push_str(&format!(" {arg} {c}\n")),
                    None => out.push_str(&format!(" {arg}")),
                }
            }
            out.push(close);
            out
        })
}

fn special_form(inner: BoxedStrategy<String>) -> impl Strategy<Value = String> {
    let e = || inner.clone();
    prop_oneof![
        (name(), e()).prop_map(|(x, v)| format!("(define {x} {v})")),
        (name(), comment(), e()).prop_map(|(x, c, v)| format!("(define {c}\n{x} {v})")),
        (name(), prop::collection::vec(name(), 0..3), e())
            .prop_map(|(f, params, body)| format!("(define ({f} {}) {body})", params.join(" "))),
        (prop::collection::vec(name(), 1..3), e())
            .prop_map(|(params, body)| format!("(lambda ({}) {body})", params.join(" "))),
        (e(), e(), prop::option::of(e())).prop_map(|(t, a, b)| match b {
            Some(b) => format!("(if {t} {a} {b})"),
            None => format!("(if {t} {a})"),
        }),
        prop::collection::vec((e(), e()), 1..3).prop_map(|clauses| {
            let clauses: Vec<String> = clauses
                .into_iter()
                .map(|(test, body)| format!("[{test} {body}]"))
                .collect();
            format!("(cond {})", clauses.join(" "))
        }),
        (
            prop::sample::select(vec!["let", "let*", "letrec"]),
            prop::collection::vec((name(), e()), 1..3),
            e(),
        )
            .prop_map(|(form, bindings, body)| {
                let bindings: Vec<String> = bindings
                    .into_iter()
                    .map(|(x, v)| format!("[{x} {v}]"))
                    .collect();
                format!("({form} ({}) {body})", bindings.join(" "))
            }),
        (prop::sample::select(vec!["when", "unless"]), e(), e())
            .prop_map(|(form, p, body)| format!("({form} {p} {body})")),
        prop::collection::vec(e(), 1..3).prop_map(|exprs| format!("(begin {})", exprs.join(" "))),
        (name(), prop::collection::vec(name(), 0..3))
            .prop_map(|(p, fields)| format!("(define-struct {p} ({}))", fields.join(" "))),
    ]
}

fn expr() -> impl Strategy<Value = String> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            3 => application(inner.clone()),
            2 => special_form(inner),
        ]
    })
}

/// Top-level expressions, some with a comment block above them.
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec((expr(), prop::option::of(comment())), 1..5).prop_map(|roots| {
        roots
            .into_iter()
            .map(|(root, comment)| match comment {
                Some(c) => format!("{c}\n{root}"),
                None => root,
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn root_hashes(src: &str) -> Vec<u64> {
    SexprParser
        .parse(src)
        .unwrap()
        .iter()
        .map(|root| root.hash)
        .collect()
}

proptest! {
    #[test]
    fn hash_ignores_position(doc in document(), indent in 0usize..6) {
        let shifted: String = doc
            .lines()
            .map(|line| format!("{}{line}\n\n", " ".repeat(indent)))
            .collect();
        prop_assert_eq!(root_hashes(&doc), root_hashes(&shifted));
    }

    #[test]
    fn reparse_of_unchanged_text_keeps_every_id(doc in document()) {
        let mut ids = IdGenerator::new();
        let first = identified(&doc, &mut ids);
        let second = reconcile(&first, SexprParser.parse(&doc).unwrap(), &mut ids);
        prop_assert_eq!(preorder_ids(&first), preorder_ids(&second));
    }

    #[test]
    fn pretty_print_round_trips_identity(doc in document(), width in 10usize..60) {
        let mut ids = IdGenerator::new();
        let first = identified(&doc, &mut ids);
        let printed = first.pretty_print(width);
        let second = reconcile(&first, SexprParser.parse(&printed).unwrap(), &mut ids);
        prop_assert_eq!(preorder_ids(&first), preorder_ids(&second));
    }
}
