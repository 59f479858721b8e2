use std::sync::LazyLock;

use proptest::prelude::*;
use translet_runtime::algebra::numeric::{format_number, parse_number};
use translet_runtime::algebra::strings::{normalize_space, string_length, substring, translate};
use translet_runtime::{
    CompareOp, NodeSet, ResultTreeFragment, SimpleNode, TreeNode, Value, compare, elem, simple_doc, text,
};

type V = Value<SimpleNode>;

const OPS: [CompareOp; 6] = [CompareOp::Eq, CompareOp::Ne, CompareOp::Gt, CompareOp::Lt, CompareOp::Ge, CompareOp::Le];

/// Document whose item elements the node strategies draw from, so identical nodes recur.
static ITEMS: LazyLock<(SimpleNode, Vec<SimpleNode>)> = LazyLock::new(|| {
    let doc = ["1", "2", "a", "", " 1 ", "2.0"]
        .iter()
        .fold(elem("items"), |list, v| list.child(elem("item").child(text(v))))
        .build();
    let doc = simple_doc().child(doc).build();
    let items = doc.children()[0].children();
    (doc, items)
});

fn item() -> impl Strategy<Value = SimpleNode> {
    (0..ITEMS.1.len()).prop_map(|i| ITEMS.1[i].clone())
}

fn simple_value() -> impl Strategy<Value = V> {
    prop_oneof![
        any::<bool>().prop_map(V::Boolean),
        (-1000.0f64..1000.0).prop_map(V::Number),
        Just(V::Number(f64::NAN)),
        "[a-c0-9 .]{0,4}".prop_map(V::String),
        item().prop_map(V::Node),
        "[a1-2 .]{0,3}".prop_map(|s| V::ResultTreeFragment(ResultTreeFragment::from_text(s))),
        item().prop_map(|n| V::ResultTreeFragment(ResultTreeFragment::from_root(n))),
    ]
}

fn any_value() -> impl Strategy<Value = V> {
    prop_oneof![
        3 => simple_value(),
        2 => prop::sample::subsequence(ITEMS.1.clone(), 0..=3).prop_map(|nodes| V::NodeSet(NodeSet::new(nodes))),
    ]
}

proptest! {
    #[test]
    fn prop_swapping_operands_and_operator_agrees(a in any_value(), b in any_value(), i in 0usize..6) {
        let op = OPS[i];
        prop_assert_eq!(op.swap().swap(), op);
        prop_assert_eq!(compare(&a, &b, op), compare(&b, &a, op.swap()));
    }

    #[test]
    fn prop_ne_is_negated_eq_for_simple_values(a in simple_value(), b in simple_value()) {
        prop_assert_eq!(compare(&a, &b, CompareOp::Ne), !compare(&a, &b, CompareOp::Eq));
    }

    #[test]
    fn prop_node_sets_compare_with_themselves_like_their_values(n in item(), i in 0usize..6) {
        let op = OPS[i];
        let set = V::NodeSet(NodeSet::singleton(n.clone()));
        let expected = match op {
            CompareOp::Eq => true,
            CompareOp::Ne => false,
            _ => {
                let d = parse_number(&n.string_value());
                compare(&V::Number(d), &V::Number(d), op)
            }
        };
        prop_assert_eq!(compare(&set, &set, op), expected);
    }

    #[test]
    fn prop_number_formatting_round_trips(d in -1.0e15f64..1.0e15) {
        let s = format_number(d);
        prop_assert!(!s.contains('e') && !s.contains('E'), "exponent in {s}");
        prop_assert!(!s.ends_with(".0"), "trailing .0 in {s}");
        prop_assert_eq!(parse_number(&s), d);
    }

    #[test]
    fn prop_tiny_numbers_round_trip(d in 1.0e-300f64..1.0e-3) {
        prop_assert_eq!(parse_number(&format_number(d)), d);
        prop_assert_eq!(parse_number(&format_number(-d)), -d);
    }

    #[test]
    fn prop_substring_never_grows(s in "\\PC{0,12}", start in -5.0f64..15.0, len in -5.0f64..15.0) {
        let out = substring(&s, start, Some(len));
        prop_assert!(string_length(&out) <= string_length(&s));
        prop_assert!(s.contains(out.as_str()));
    }

    #[test]
    fn prop_normalize_space_is_idempotent(s in "[ a\\t\\nb\\r]{0,16}") {
        let once = normalize_space(&s);
        prop_assert_eq!(normalize_space(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
        prop_assert!(!once.contains("  "));
    }

    #[test]
    fn prop_translate_with_empty_map_is_identity(s in "\\PC{0,12}") {
        prop_assert_eq!(translate(&s, "", "xyz"), s);
    }
}
