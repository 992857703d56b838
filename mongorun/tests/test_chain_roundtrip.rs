//! Round-trip tests: rendering a structured chain query and parsing the
//! result must recover the same collection, operation, and argument literals.

use bson::doc;
use mongorun::{parse_chain, ChainOp};
use termgate_dbcmd::{ChainOperation, ChainQueryDescriptor};

fn descriptor(operation: ChainOperation) -> ChainQueryDescriptor {
    ChainQueryDescriptor {
        collection: "users".into(),
        operation,
        filter: None,
        update: None,
        document: None,
        pipeline: None,
        sort: None,
        limit: None,
    }
}

#[test]
fn find_round_trips() {
    let mut d = descriptor(ChainOperation::Find);
    d.filter = Some("{age: {$gt: 21}}".into());
    d.sort = Some("{age: -1}".into());
    d.limit = Some(10);

    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(call.collection, "users");
    assert_eq!(
        call.operation,
        ChainOp::Find {
            filter: doc! {"age": {"$gt": 21i64}},
            sort: Some(doc! {"age": -1i64}),
            limit: Some(10),
            skip: None,
        }
    );
}

#[test]
fn find_default_filter_round_trips() {
    let call = parse_chain(&descriptor(ChainOperation::Find).render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::Find {
            filter: doc! {},
            sort: None,
            limit: None,
            skip: None,
        }
    );
}

#[test]
fn find_one_round_trips() {
    let mut d = descriptor(ChainOperation::FindOne);
    d.filter = Some("{name: 'ada'}".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::FindOne {
            filter: doc! {"name": "ada"}
        }
    );
}

#[test]
fn count_round_trips() {
    let mut d = descriptor(ChainOperation::Count);
    d.filter = Some("{active: true}".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::Count {
            filter: doc! {"active": true}
        }
    );
}

#[test]
fn aggregate_round_trips() {
    let mut d = descriptor(ChainOperation::Aggregate);
    d.pipeline = Some("[{$match: {y: 2024}}, {$limit: 3}]".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::Aggregate {
            pipeline: vec![doc! {"$match": {"y": 2024i64}}, doc! {"$limit": 3i64}],
        }
    );
}

#[test]
fn aggregate_default_pipeline_round_trips() {
    let call = parse_chain(&descriptor(ChainOperation::Aggregate).render()).unwrap();
    assert_eq!(call.operation, ChainOp::Aggregate { pipeline: vec![] });
}

#[test]
fn insert_one_round_trips() {
    let mut d = descriptor(ChainOperation::InsertOne);
    d.document = Some("{name: 'ada', age: 36}".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::InsertOne {
            document: doc! {"name": "ada", "age": 36i64}
        }
    );
}

#[test]
fn update_one_round_trips() {
    let mut d = descriptor(ChainOperation::UpdateOne);
    d.filter = Some("{id:1}".into());
    d.update = Some("{$set:{x:2}}".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::UpdateOne {
            filter: doc! {"id": 1i64},
            update: doc! {"$set": {"x": 2i64}},
        }
    );
}

#[test]
fn delete_one_round_trips() {
    let mut d = descriptor(ChainOperation::DeleteOne);
    d.filter = Some("{id: 9}".into());
    let call = parse_chain(&d.render()).unwrap();
    assert_eq!(
        call.operation,
        ChainOp::DeleteOne {
            filter: doc! {"id": 9i64}
        }
    );
}
