//! Chain-query rendering for the mongo kind.
//!
//! A structured `ChainQueryDescriptor` becomes the restricted
//! `db.<collection>.<operation>(...)` text that `mongorun` interprets.

use serde::{Deserialize, Serialize};

/// The seven chain operations `mongorun` understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChainOperation {
    Find,
    FindOne,
    Count,
    Aggregate,
    InsertOne,
    UpdateOne,
    DeleteOne,
}

/// Structured description of one document-store query.
///
/// `filter` defaults to the empty-object literal; exactly one of filter /
/// pipeline / document is the primary argument depending on the operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainQueryDescriptor {
    pub collection: String,
    pub operation: ChainOperation,
    #[serde(default)]
    pub filter: Option<String>,
    /// Update document, for `updateOne`.
    #[serde(default)]
    pub update: Option<String>,
    /// Document to insert, for `insertOne`.
    #[serde(default)]
    pub document: Option<String>,
    /// Aggregation pipeline, for `aggregate`.
    #[serde(default)]
    pub pipeline: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl ChainQueryDescriptor {
    /// Render the chain-call text. An empty collection renders to an empty
    /// string, which the callers treat as "nothing to run".
    pub fn render(&self) -> String {
        if self.collection.is_empty() {
            return String::new();
        }

        let filter = self.filter.as_deref().filter(|f| !f.is_empty()).unwrap_or("{}");
        let mut query = format!("db.{}.", self.collection);

        match self.operation {
            ChainOperation::Find => {
                query.push_str(&format!("find({})", filter));
                if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
                    query.push_str(&format!(".sort({})", sort));
                }
                if let Some(limit) = self.limit {
                    query.push_str(&format!(".limit({})", limit));
                }
                query.push_str(".toArray()");
            }
            ChainOperation::FindOne => query.push_str(&format!("findOne({})", filter)),
            ChainOperation::Count => query.push_str(&format!("countDocuments({})", filter)),
            ChainOperation::Aggregate => {
                let pipeline =
                    self.pipeline.as_deref().filter(|p| !p.is_empty()).unwrap_or("[]");
                query.push_str(&format!("aggregate({}).toArray()", pipeline));
            }
            ChainOperation::InsertOne => {
                let document =
                    self.document.as_deref().filter(|d| !d.is_empty()).unwrap_or("{}");
                query.push_str(&format!("insertOne({})", document));
            }
            ChainOperation::UpdateOne => {
                let update = self.update.as_deref().filter(|u| !u.is_empty()).unwrap_or("{}");
                query.push_str(&format!("updateOne({}, {})", filter, update));
            }
            ChainOperation::DeleteOne => query.push_str(&format!("deleteOne({})", filter)),
        }

        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn find_with_defaults() {
        assert_eq!(
            descriptor(ChainOperation::Find).render(),
            "db.users.find({}).toArray()"
        );
    }

    #[test]
    fn find_with_sort_and_limit() {
        let mut d = descriptor(ChainOperation::Find);
        d.filter = Some("{age: {$gt: 21}}".into());
        d.sort = Some("{age: -1}".into());
        d.limit = Some(10);
        assert_eq!(
            d.render(),
            "db.users.find({age: {$gt: 21}}).sort({age: -1}).limit(10).toArray()"
        );
    }

    #[test]
    fn find_one_defaults_filter_to_empty_object() {
        assert_eq!(descriptor(ChainOperation::FindOne).render(), "db.users.findOne({})");
    }

    #[test]
    fn count_renders_count_documents() {
        let mut d = descriptor(ChainOperation::Count);
        d.filter = Some("{active: true}".into());
        assert_eq!(d.render(), "db.users.countDocuments({active: true})");
    }

    #[test]
    fn aggregate_defaults_pipeline_to_empty_array() {
        assert_eq!(
            descriptor(ChainOperation::Aggregate).render(),
            "db.users.aggregate([]).toArray()"
        );
    }

    #[test]
    fn insert_one_uses_document() {
        let mut d = descriptor(ChainOperation::InsertOne);
        d.document = Some("{name: 'ada'}".into());
        assert_eq!(d.render(), "db.users.insertOne({name: 'ada'})");
    }

    #[test]
    fn update_one_takes_filter_and_update() {
        let mut d = descriptor(ChainOperation::UpdateOne);
        d.filter = Some("{id:1}".into());
        d.update = Some("{$set:{x:2}}".into());
        assert_eq!(d.render(), "db.users.updateOne({id:1}, {$set:{x:2}})");
    }

    #[test]
    fn delete_one_uses_filter() {
        let mut d = descriptor(ChainOperation::DeleteOne);
        d.filter = Some("{id:1}".into());
        assert_eq!(d.render(), "db.users.deleteOne({id:1})");
    }

    #[test]
    fn empty_collection_renders_nothing() {
        let mut d = descriptor(ChainOperation::Find);
        d.collection.clear();
        assert_eq!(d.render(), "");
    }
}
