mod support;

const COUNTER_SCRIPT: &str = r#"
counter = (counter or 0) + 1
log(tostring(counter))
"#;

#[tokio::test]
async fn script_globals_do_not_leak_between_vus() {
    let engine = support::compile(COUNTER_SCRIPT);

    let first = support::run_iterations(&engine, 2).await;
    let second = support::run_iterations(&engine, 2).await;

    // Globals persist across iterations within one VU...
    assert_eq!(support::log_texts(&first[0]), vec!["1"]);
    assert_eq!(support::log_texts(&first[1]), vec!["2"]);

    // ...but a second VU derived from the same baseline starts clean.
    assert_eq!(support::log_texts(&second[0]), vec!["1"]);
    assert_eq!(support::log_texts(&second[1]), vec!["2"]);
}

#[tokio::test]
async fn concurrent_vus_emit_independent_ordered_streams() {
    let engine = support::compile(COUNTER_SCRIPT);

    let vu_a = engine.start_vu();
    let vu_b = engine.start_vu();
    assert_ne!(vu_a.id(), vu_b.id());

    let (groups_a, groups_b) = tokio::join!(
        support::collect_iterations(vu_a, 3),
        support::collect_iterations(vu_b, 3),
    );

    for groups in [&groups_a, &groups_b] {
        assert_eq!(groups.len(), 3);
        assert_eq!(support::log_texts(&groups[0]), vec!["1"]);
        assert_eq!(support::log_texts(&groups[1]), vec!["2"]);
        assert_eq!(support::log_texts(&groups[2]), vec!["3"]);
    }
}

#[tokio::test]
async fn a_faulting_vu_does_not_disturb_its_neighbor() {
    let faulty = support::compile(r#"error("broken vu")"#);
    let healthy = support::compile(r#"log("ok")"#);

    let (faulty_groups, healthy_groups) = tokio::join!(
        support::run_iterations(&faulty, 2),
        support::run_iterations(&healthy, 2),
    );

    assert_eq!(faulty_groups.len(), 2);
    for stream in &healthy_groups {
        assert_eq!(support::log_texts(stream), vec!["ok"]);
    }
}
