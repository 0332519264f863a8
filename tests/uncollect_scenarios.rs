use std::sync::Arc;

use pretty_assertions::assert_eq;
use relopt::catalog::NoStatistics;
use relopt::executor::{try_collect, uncollect, TupleIter, VecTupleIter};
use relopt::optimizer::{
    AdapterConverter, ConversionEngine, Convention, HepOptimizer, ImplementationConverter,
    NativeUncollectRule, OptExpr, Operator, PlanNodeType, PlannerConfig, RelNode,
};

fn build_plan() -> OptExpr {
    let scan = OptExpr::new(
        RelNode::logical(Operator::TableScan {
            table: "t1".to_string(),
            index: None,
        }),
        vec![],
    );
    OptExpr::new(RelNode::logical(Operator::Uncollect), vec![scan])
}

fn build_optimizer(engine: ConversionEngine) -> HepOptimizer {
    HepOptimizer::new(
        PlannerConfig::default(),
        vec![NativeUncollectRule::create()],
        engine,
        Arc::new(NoStatistics),
        build_plan(),
    )
    .unwrap()
}

#[test]
fn uncollect_with_converter_registers_native_alternative() {
    let engine = ConversionEngine::default().with_converter(ImplementationConverter::new(
        Convention::NONE,
        Convention::NATIVE,
        vec![PlanNodeType::TableScan],
    ));
    let mut optimizer = build_optimizer(engine);
    // the second iteration fires the rule again and registers nothing new
    assert_eq!(optimizer.run().unwrap(), 2);

    let graph = optimizer.graph();
    let root = graph.root();
    let alternatives = graph.equivalents(root);
    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0], root);
    let native = alternatives
        .iter()
        .filter(|id| graph.node(**id).convention() == Convention::NATIVE)
        .collect::<Vec<_>>();
    assert_eq!(native.len(), 1);
    assert_eq!(
        graph.explain(*native[0]),
        "Uncollect [NATIVE]\n  TableScan: t1 [NATIVE]\n"
    );
}

#[test]
fn uncollect_without_converter_abstains() {
    let mut optimizer = build_optimizer(ConversionEngine::default());
    let node_count = optimizer.graph().node_count();

    assert_eq!(optimizer.find_best(Convention::NATIVE).unwrap(), None);
    let graph = optimizer.graph();
    assert_eq!(graph.node_count(), node_count);
    assert_eq!(graph.equivalents(graph.root()), &[graph.root()]);
}

#[test]
fn uncollect_through_adapter() {
    let engine = ConversionEngine::default()
        .with_converter(AdapterConverter::new(Convention::NONE, Convention::NATIVE));
    let mut optimizer = build_optimizer(engine);
    let best = optimizer.find_best(Convention::NATIVE).unwrap().unwrap();
    assert_eq!(
        optimizer.graph().explain(best),
        "Uncollect [NATIVE]\n  Convert: NONE -> NATIVE [NATIVE]\n    TableScan: t1 [NONE]\n"
    );
}

#[test]
fn uncollect_pipeline_restarts_and_closes() {
    let mut iter = uncollect(VecTupleIter::new(vec![vec![1, 2], vec![], vec![3]]));
    assert_eq!(try_collect(&mut iter).unwrap(), vec![1, 2, 3]);
    iter.restart().unwrap();
    iter.restart().unwrap();
    assert_eq!(iter.pull().unwrap(), Some(1));
    iter.close_allocation();
    iter.close_allocation();
    assert!(iter.input().is_closed());
}
