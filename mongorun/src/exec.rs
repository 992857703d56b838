//! Driver dispatch.
//!
//! One connection per invocation: opened here, used for exactly one chain
//! call, and dropped when the run ends. Results are serialized to indented
//! JSON for the terminal.

use bson::{doc, Bson, Document};
use futures_util::TryStreamExt;
use mongodb::Client;

use crate::error::Result;
use crate::parser::{ChainCall, ChainOp};

/// Fallback database when the URI path carries none.
const DEFAULT_DATABASE: &str = "test";

/// Connect, run one chain call, and render its result.
pub async fn execute(uri: &str, call: ChainCall) -> Result<String> {
    let client = Client::with_uri_str(uri).await?;
    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
    let collection = database.collection::<Document>(&call.collection);

    let result = match call.operation {
        ChainOp::Find {
            filter,
            sort,
            limit,
            skip,
        } => {
            let mut find = collection.find(filter);
            if let Some(sort) = sort {
                find = find.sort(sort);
            }
            if let Some(limit) = limit {
                find = find.limit(limit);
            }
            if let Some(skip) = skip {
                find = find.skip(skip);
            }
            let docs: Vec<Document> = find.await?.try_collect().await?;
            Bson::Array(docs.into_iter().map(Bson::Document).collect())
        }
        ChainOp::FindOne { filter } => match collection.find_one(filter).await? {
            Some(doc) => Bson::Document(doc),
            None => Bson::Null,
        },
        ChainOp::Count { filter } => Bson::Int64(collection.count_documents(filter).await? as i64),
        ChainOp::Aggregate { pipeline } => {
            let docs: Vec<Document> = collection.aggregate(pipeline).await?.try_collect().await?;
            Bson::Array(docs.into_iter().map(Bson::Document).collect())
        }
        ChainOp::InsertOne { document } => {
            let result = collection.insert_one(document).await?;
            Bson::Document(doc! {
                "acknowledged": true,
                "insertedId": result.inserted_id,
            })
        }
        ChainOp::UpdateOne { filter, update } => {
            let result = collection.update_one(filter, update).await?;
            let mut doc = doc! {
                "acknowledged": true,
                "matchedCount": result.matched_count as i64,
                "modifiedCount": result.modified_count as i64,
            };
            if let Some(upserted) = result.upserted_id {
                doc.insert("upsertedId", upserted);
            }
            Bson::Document(doc)
        }
        ChainOp::DeleteOne { filter } => {
            let result = collection.delete_one(filter).await?;
            Bson::Document(doc! {
                "acknowledged": true,
                "deletedCount": result.deleted_count as i64,
            })
        }
    };

    render(&result)
}

/// Indented JSON rendering of a BSON result value.
fn render(result: &Bson) -> Result<String> {
    let json: serde_json::Value = result.clone().into();
    Ok(serde_json::to_string_pretty(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_indents_documents() {
        let value = Bson::Document(doc! {"a": 1i64, "b": "x"});
        let text = render(&value).unwrap();
        assert!(text.contains("\n"));
        assert!(text.contains("\"a\""));
    }

    #[test]
    fn render_null_for_absent_document() {
        assert_eq!(render(&Bson::Null).unwrap(), "null");
    }

    #[test]
    fn render_count_as_bare_integer() {
        assert_eq!(render(&Bson::Int64(7)).unwrap(), "7");
    }
}
