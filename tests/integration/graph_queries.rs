use std::collections::BTreeSet;

use anyhow::Result;
use bzljvm::aspect::{AspectRecords, parse_records};
use bzljvm::graph::{DependencyMemo, GraphBuilder, LabelGraph, OrderingStrategy, ProjectOrderResolver};
use bzljvm::label::{Label, TargetKind};
use bzljvm::test_utils::{RecordBuilder, init_test_logging};

use crate::common::sample_records;

fn labels(items: &[&str]) -> Vec<Label> {
    items.iter().map(Label::new).collect()
}

fn set(items: &[&str]) -> BTreeSet<Label> {
    items.iter().map(Label::new).collect()
}

#[test]
fn test_package_graph_of_sample_workspace() {
    init_test_logging(None);
    let records = sample_records();
    let graph = GraphBuilder::new().build(&records);

    // app-tests -> app collapses into the //projects/app package
    assert_eq!(graph.root_labels(), &set(&["//projects/app"]));
    assert_eq!(
        graph.leaf_labels(false),
        &set(&["//projects/libs/banana", "@maven//:guava", "@maven//:junit"])
    );
    assert_eq!(graph.leaf_labels(true), &set(&["//projects/libs/banana"]));
    assert!(graph.find_cycles().is_empty());

    let app = Label::new("//projects/app");
    let banana = Label::new("//projects/libs/banana");
    assert!(graph.is_dependency(&app, &banana, None, false));
    assert!(!graph.is_dependency(&banana, &app, None, false));
}

#[test]
fn test_target_graph_keeps_targets() {
    let records = sample_records();
    let graph = GraphBuilder::new().with_target_granularity(true).build(&records);

    assert_eq!(graph.root_labels(), &set(&["//projects/app:app-tests"]));
    assert!(graph.contains(&Label::new("//projects/app:app")));
    assert!(graph.is_dependency(
        &Label::new("//projects/app:app-tests"),
        &Label::new("//projects/libs/banana:banana-api"),
        None,
        false
    ));
}

#[test]
fn test_graph_does_not_depend_on_record_order() {
    let records = sample_records();
    let mut reversed = records.clone();
    reversed.reverse();

    let forward = GraphBuilder::new().build(&records);
    let backward = GraphBuilder::new().build(&reversed);

    assert_eq!(forward.root_labels(), backward.root_labels());
    assert_eq!(forward.leaf_labels(true), backward.leaf_labels(true));
    assert_eq!(forward.depends_on_map(), backward.depends_on_map());
}

#[test]
fn test_both_strategies_order_dependencies_first() {
    let graph = GraphBuilder::new().build(&sample_records());
    let selection = labels(&["//projects/app", "//projects/libs/banana", "//projects/libs/apple"]);
    let expected = labels(&["//projects/libs/banana", "//projects/libs/apple", "//projects/app"]);

    for strategy in [OrderingStrategy::Topological, OrderingStrategy::Insertion] {
        assert_eq!(graph.order_labels_with(&selection, false, strategy), expected, "{strategy:?}");
    }
}

#[test]
fn test_project_order_with_and_without_records() {
    let records = AspectRecords::from_flat(sample_records());
    let resolver = ProjectOrderResolver::new(OrderingStrategy::Topological);
    let selection = labels(&["//projects/app", "//projects/libs/apple"]);

    assert_eq!(
        resolver.compute_package_order(&selection, Some(&records)),
        labels(&["//projects/libs/apple", "//projects/app"])
    );
    assert_eq!(resolver.compute_package_order(&selection, None), selection);
}

#[test]
fn test_mutually_dependent_packages() -> Result<()> {
    // two targets per package, each depending on the other package
    let records = parse_records(
        r#"[
            {"label": "//a:one", "kind": "java_library", "deps": ["//b:two"]},
            {"label": "//b:one", "kind": "java_library", "deps": ["//a:two"]},
            {"label": "//a:two", "kind": "java_library"},
            {"label": "//b:two", "kind": "java_library"}
        ]"#,
    )?;

    let package_graph = GraphBuilder::new().build(&records);
    assert_eq!(package_graph.find_cycles(), vec![labels(&["//a", "//b"])]);
    assert!(package_graph.root_labels().is_empty());

    let mut memo = DependencyMemo::new();
    assert!(package_graph.is_dependency(&Label::new("//a"), &Label::new("//b"), Some(&mut memo), false));
    assert!(package_graph.is_dependency(&Label::new("//b"), &Label::new("//a"), Some(&mut memo), false));

    let ordered = package_graph.order_labels(&labels(&["//a", "//b"]), false);
    assert_eq!(ordered.len(), 2);

    // at target granularity there is no cycle at all
    let target_graph = GraphBuilder::new().with_target_granularity(true).build(&records);
    assert!(target_graph.find_cycles().is_empty());
    Ok(())
}

#[test]
fn test_large_chain() {
    const LENGTH: usize = 100_001;
    let names: Vec<Label> = (0..LENGTH).map(|i| Label::new(format!("//chain/p{i}"))).collect();

    let mut graph = LabelGraph::new();
    for pair in names.windows(2) {
        graph.add_dependency(pair[0].clone(), pair[1].clone());
    }

    assert_eq!(graph.edge_count(), LENGTH - 1);
    assert_eq!(graph.root_labels(), &BTreeSet::from([names[0].clone()]));
    assert_eq!(graph.leaf_labels(false), &BTreeSet::from([names[LENGTH - 1].clone()]));
    assert!(graph.is_dependency(&names[0], &names[LENGTH - 1], None, false));
    assert!(!graph.is_dependency(&names[LENGTH - 1], &names[0], None, false));
}

#[test]
fn test_external_transitives() {
    let records = vec![
        RecordBuilder::new("//app:app", TargetKind::JavaLibrary).dep("@maven//:guava").build(),
        RecordBuilder::new("@maven//:guava", TargetKind::JavaImport).dep("//shaded:lib").build(),
    ];
    let graph = GraphBuilder::new().with_target_granularity(true).build(&records);

    let app = Label::new("//app:app");
    let shaded = Label::new("//shaded:lib");
    assert!(!graph.is_dependency(&app, &shaded, None, false));
    assert!(graph.is_dependency(&app, &shaded, None, true));
}
