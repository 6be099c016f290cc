//! Core generation scenarios: overwrite semantics, empty-field policy,
//! manual fields, and chained prompts.

use crate::common::{Case, p, run_case};

#[tokio::test]
async fn test_basic_single_field() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "")],
        templates: &[("f2", "{{f1}}")],
        expected: &[("f2", "p_1")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_independent_fields_generate_in_parallel() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "2"), ("f3", ""), ("f4", "")],
        templates: &[("f3", "{{f1}}"), ("f4", "{{f2}}")],
        expected: &[("f3", "p_1"), ("f4", "p_2")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_no_overwrite_keeps_existing_value() {
    let (_, report) = run_case(Case {
        note: &[("f1", "1"), ("f2", "old")],
        templates: &[("f2", "{{f1}}")],
        expected: &[("f2", "old")],
        ..Case::default()
    })
    .await;
    assert!(!report.did_update());
}

#[tokio::test]
async fn test_overwrite_replaces_existing_value() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "old")],
        templates: &[("f2", "{{f1}}")],
        overwrite: true,
        expected: &[("f2", "p_1")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chained_overwrite_regenerates_the_chain() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "old"), ("f3", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}}")],
        overwrite: true,
        expected: &[("f2", "p_1"), ("f3", "p_p_1")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chained_no_overwrite_interpolates_the_old_value() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "old"), ("f3", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}}")],
        expected: &[("f2", "old"), ("f3", "p_old")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_all_references_filled_generates() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "2"), ("f3", "")],
        templates: &[("f3", "{{f1}} {{f2}}")],
        expected: &[("f3", "p_1 2")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_one_empty_reference_skips_by_default() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", "")],
        templates: &[("f3", "{{f1}} {{f2}}")],
        expected: &[("f3", "")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_one_empty_reference_inlines_when_allowed() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", "")],
        templates: &[("f3", "{{f1}} {{f2}}")],
        allow_empty: true,
        expected: &[("f3", "p_1 ")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_all_references_empty_skips_even_when_allowed() {
    run_case(Case {
        note: &[("f1", ""), ("f2", ""), ("f3", "")],
        templates: &[("f3", "{{f1}} {{f2}}")],
        allow_empty: true,
        expected: &[("f3", "")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_single_empty_reference_skips_when_allowed() {
    run_case(Case {
        note: &[("f1", ""), ("f2", "")],
        templates: &[("f2", "{{f1}}")],
        allow_empty: true,
        expected: &[("f2", "")],
        ..Case::default()
    })
    .await;
}

// f1 -> f2 -> f3 <- f5 <- f4, with the f4 branch empty.
#[tokio::test]
async fn test_chained_with_empty_branch_stops_at_the_join() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", ""), ("f4", ""), ("f5", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}} {{f5}}"), ("f5", "{{f4}}")],
        expected: &[("f2", "p_1"), ("f3", ""), ("f4", ""), ("f5", "")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chained_with_empty_branch_inlines_when_allowed() {
    let f3 = p(&format!("{} ", p("1")));
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", ""), ("f4", ""), ("f5", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}} {{f5}}"), ("f5", "{{f4}}")],
        allow_empty: true,
        expected: &[("f2", "p_1"), ("f3", f3.as_str()), ("f4", ""), ("f5", "")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_manual_field_is_not_generated() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "2"), ("f3", ""), ("f4", "")],
        templates: &[("f3", "{{f1}}"), ("f4", "{{f2}}")],
        manual: &["f3"],
        expected: &[("f3", ""), ("f4", "p_2")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chained_simple() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}}")],
        expected: &[("f2", "p_1"), ("f3", "p_p_1")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chained_complex_fan_out_and_join() {
    // f2 feeds f3 and f4; f5 joins all three.
    let f5 = p(&format!("{} {} {}", p(&p("1")), p("1"), p(&p("1"))));
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", ""), ("f4", ""), ("f5", "")],
        templates: &[
            ("f2", "{{f1}}"),
            ("f3", "{{f2}}"),
            ("f4", "{{f2}}"),
            ("f5", "{{f3}} {{f2}} {{f4}}"),
        ],
        expected: &[
            ("f2", "p_1"),
            ("f3", "p_p_1"),
            ("f4", "p_p_1"),
            ("f5", f5.as_str()),
        ],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_chain_preserves_already_filled_fields() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", "old"), ("f3", "")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}}")],
        expected: &[("f2", "old"), ("f3", "p_old")],
        ..Case::default()
    })
    .await;
}

// f1 -> f2 -> f3(manual) -> f4: the manual field aborts everything after it.
#[tokio::test]
async fn test_chained_manual_field_stops_the_chain() {
    run_case(Case {
        note: &[("f1", "1"), ("f2", ""), ("f3", "old"), ("f4", "old")],
        templates: &[("f2", "{{f1}}"), ("f3", "{{f2}}"), ("f4", "{{f3}}")],
        manual: &["f3"],
        expected: &[("f2", "p_1"), ("f3", "old"), ("f4", "old")],
        ..Case::default()
    })
    .await;
}

#[tokio::test]
async fn test_report_says_whether_anything_updated() {
    let (_, report) = run_case(Case {
        note: &[("f1", "1"), ("f2", "")],
        templates: &[("f2", "{{f1}}")],
        expected: &[("f2", "p_1")],
        ..Case::default()
    })
    .await;
    assert!(report.did_update());

    let (_, report) = run_case(Case {
        note: &[("f1", "1"), ("f2", "1")],
        templates: &[("f2", "{{f1}}")],
        expected: &[("f2", "1")],
        ..Case::default()
    })
    .await;
    assert!(!report.did_update());
}
