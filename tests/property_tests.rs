mod common;

use proptest::prelude::*;
use roguedb_client::credentials::issue_at;
use roguedb_client::query::TYPE_URL_PREFIX;
use roguedb_client::{
    audience_for, build_expression, compose_query, ComparisonExpression, ComparisonOperator,
    Error, LogicalOperator, MatchMode, Operand,
};

fn comparison_operator() -> impl Strategy<Value = ComparisonOperator> {
    prop_oneof![
        Just(ComparisonOperator::GreaterEqual),
        Just(ComparisonOperator::LesserEqual),
        Just(ComparisonOperator::Greater),
        Just(ComparisonOperator::Lesser),
        Just(ComparisonOperator::Equal),
        Just(ComparisonOperator::NotEqual),
    ]
}

fn logical_operator() -> impl Strategy<Value = LogicalOperator> {
    prop_oneof![Just(LogicalOperator::And), Just(LogicalOperator::Or)]
}

fn type_name() -> impl Strategy<Value = String> {
    ("[a-z]{1,8}(\\.[a-z]{1,8}){0,2}", "[A-Z][A-Za-z0-9]{0,10}", any::<bool>()).prop_map(
        |(package, message, prefixed)| {
            let name = format!("{package}.{message}");
            if prefixed {
                format!("{TYPE_URL_PREFIX}{name}")
            } else {
                name
            }
        },
    )
}

fn operand() -> impl Strategy<Value = Operand> {
    (type_name(), any::<i32>(), any::<bool>(), "[a-z]{0,8}").prop_map(|(name, number, flag, text)| {
        Operand::of(name)
            .with("attribute1", number)
            .with("attribute3", flag)
            .with("label", text)
    })
}

fn expression() -> impl Strategy<Value = ComparisonExpression> {
    (logical_operator(), prop::collection::vec((comparison_operator(), operand(), 1u32..32), 1..6), any::<bool>())
        .prop_map(|(logical, clauses, scoped)| {
            let mut builder = ComparisonExpression::builder(logical);
            for (comparison, operand, field) in clauses {
                builder = if scoped {
                    builder.compare_field(comparison, field, operand)
                } else {
                    builder.compare(comparison, operand)
                };
            }
            builder.build().expect("Builder input is consistent")
        })
}

proptest! {
    // Each case signs with a 2048-bit key.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn lifetime_equals_ttl(ttl in 1i64..=31_536_000, issued_at in 0u64..4_000_000_000) {
        let token = issue_at(&common::test_account(), ttl, issued_at).expect("Issuance should succeed");
        prop_assert_eq!(token.expires_at() - token.issued_at(), ttl as u64);
        prop_assert_eq!(token.issued_at(), issued_at);
    }

    #[test]
    fn non_positive_ttl_is_invalid(ttl in i64::MIN..=0) {
        let result = issue_at(&common::test_account(), ttl, 1_700_000_000);
        prop_assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}

proptest! {
    #[test]
    fn audience_is_local_part_plus_suffix(local in "[a-z0-9._-]{1,24}", domain in "[a-z0-9.-]{1,24}") {
        let email = format!("{local}@{domain}");
        prop_assert_eq!(audience_for(&email), format!("{local}.roguedb.dev"));
    }

    #[test]
    fn mismatched_operator_count_is_malformed(
        comparisons in prop::collection::vec(comparison_operator(), 0..6),
        operands in prop::collection::vec(operand(), 0..6),
    ) {
        prop_assume!(comparisons.len() != operands.len());
        let result = build_expression(LogicalOperator::And, comparisons, operands, vec![]);
        prop_assert!(matches!(result, Err(Error::MalformedQuery(_))));
    }

    #[test]
    fn mismatched_field_count_is_malformed(
        clauses in prop::collection::vec((comparison_operator(), operand()), 1..6),
        fields in prop::collection::vec(1u32..32, 1..8),
    ) {
        prop_assume!(fields.len() != clauses.len());
        let (comparisons, operands): (Vec<_>, Vec<_>) = clauses.into_iter().unzip();
        let result = build_expression(LogicalOperator::Or, comparisons, operands, fields);
        prop_assert!(matches!(result, Err(Error::MalformedQuery(_))));
    }

    #[test]
    fn mode_follows_fields(expression in expression()) {
        let expected = if expression.fields().is_empty() {
            MatchMode::IndexTuple
        } else {
            MatchMode::FieldScoped
        };
        prop_assert_eq!(expression.mode(), expected);
        prop_assert_eq!(expression.comparisons().len(), expression.operands().len());
    }

    #[test]
    fn type_url_carries_one_prefix(operand in operand()) {
        let json = serde_json::to_value(&operand).expect("Serialization should succeed");
        let url = json["@type"].as_str().expect("@type is a string").to_string();
        prop_assert_eq!(url.matches(TYPE_URL_PREFIX).count(), 1);
        prop_assert_eq!(url, operand.type_url());
    }

    #[test]
    fn expression_json_roundtrip(expression in expression()) {
        let json = serde_json::to_string(&expression).expect("Serialization should succeed");
        let parsed: ComparisonExpression = serde_json::from_str(&json).expect("Parsing should succeed");
        prop_assert_eq!(parsed.mode(), expression.mode());
        prop_assert_eq!(parsed, expression);
    }

    #[test]
    fn compose_keeps_positions(expressions in prop::collection::vec(expression(), 1..6)) {
        let query = compose_query("key", expressions.clone()).expect("Composition should succeed");
        prop_assert_eq!(query.expressions(), expressions.as_slice());

        let json = serde_json::to_string(&query).expect("Serialization should succeed");
        let parsed: roguedb_client::Query = serde_json::from_str(&json).expect("Parsing should succeed");
        prop_assert_eq!(parsed, query);
    }
}
