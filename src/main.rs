use std::sync::Arc;

use anyhow::Result;
use relopt::catalog::{IndexStats, MemoryStatistics};
use relopt::executor::{filter, project, try_collect, uncollect, TupleIter, VecTupleIter};
use relopt::optimizer::{Convention, OptExpr, Operator, PlannerConfig, RelNode};
use relopt::Session;

fn main() -> Result<()> {
    env_logger::init();

    let mut statistics = MemoryStatistics::default();
    statistics.insert("orders", "orders_pk", IndexStats::new(128, 4096));
    let session = Session::new(PlannerConfig::from_env()?).with_statistics(Arc::new(statistics));

    // 1. build the abstract plan: Uncollect(Filter(TableScan))
    let scan = OptExpr::new(
        RelNode::logical(Operator::TableScan {
            table: "orders".to_string(),
            index: Some("orders_pk".to_string()),
        }),
        vec![],
    );
    let filter_expr = OptExpr::new(
        RelNode::logical(Operator::Filter {
            predicate: "status = 'open'".to_string(),
        }),
        vec![scan],
    );
    let plan = OptExpr::new(RelNode::logical(Operator::Uncollect), vec![filter_expr]);

    // 2. plan into the native convention
    println!("{}", session.explain(plan, Convention::NATIVE)?);

    // 3. stream a pipeline of the same shape
    let orders = VecTupleIter::new(vec![
        ("open", vec!["apple", "pear"]),
        ("closed", vec!["plum"]),
        ("open", vec!["fig"]),
    ]);
    let open = filter(orders, |(status, _): &(&str, Vec<&str>)| *status == "open");
    let mut items = uncollect(project(open, |(_, items): (&str, Vec<&str>)| items));

    println!("items: {:?}", try_collect(&mut items)?);
    // a restarted pipeline streams the same items again
    items.restart()?;
    println!("items after restart: {:?}", session.run(&mut items)?);
    Ok(())
}
