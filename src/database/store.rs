use diesel::{
    dsl::sql,
    pg::Pg,
    prelude::*,
    sql_types::{Bool, Jsonb, Text},
};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    db_utils::PgPool,
    query::{like_pattern, Condition, Query, Sort},
};
use crate::{app::AppError, schema::documents};

/// A schema-less record, always a JSON object.
pub type Document = Map<String, Value>;

/// Key under which a document's identifier is exposed.
pub const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Blogs,
    Comments,
    Wishlist,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Blogs => "blogs",
            Collection::Comments => "comments",
            Collection::Wishlist => "wishlist",
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    /// Documents whose contents actually changed; writing the stored values
    /// again counts as matched but not modified.
    pub modified_count: u64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Storage seam used by every handler.
///
/// Implementations are synchronous; handlers reach them through
/// [`AppState::run`](crate::app::AppState::run).
pub trait DocumentStore: Send + Sync {
    fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertResult, AppError>;

    /// Documents matching `query`, each carrying its identifier under `_id`.
    fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, AppError>;

    /// Replaces or adds the top-level `fields` of one document.
    fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<UpdateResult, AppError>;

    fn delete_many(&self, collection: Collection, query: &Query) -> Result<DeleteResult, AppError>;

    fn find_one(&self, collection: Collection, query: &Query) -> Result<Option<Document>, AppError> {
        let query = query.clone().limit(1);
        Ok(self.find(collection, &query)?.into_iter().next())
    }
}

/// Merges the stored identifier into the document body.
pub fn with_id(id: String, doc: Value) -> Document {
    let mut out = Document::new();
    out.insert(ID_FIELD.to_string(), Value::String(id));
    if let Value::Object(fields) = doc {
        for (key, value) in fields {
            if key != ID_FIELD {
                out.insert(key, value);
            }
        }
    }
    out
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Insertable)]
#[table_name = "documents"]
struct DocumentInsert<'a> {
    id: &'a str,
    collection: &'a str,
    doc: Value,
}

/// `UPDATE` merging `$fields` into the document `$id`. Rows the merge would
/// leave unchanged are not touched, so the affected row count is the
/// modified count.
macro_rules! merge_update {
    ($collection:expr, $id:expr, $fields:expr) => {{
        let fields = Value::Object($fields);
        diesel::update(
            documents::table
                .filter(documents::collection.eq($collection.name()))
                .filter(documents::id.eq($id))
                .filter(sql::<Bool>("doc <> doc || ").bind::<Jsonb, _>(fields.clone())),
        )
        .set(documents::doc.eq(sql::<Jsonb>("doc || ").bind::<Jsonb, _>(fields)))
    }};
}

/// Documents kept as JSONB rows of a single PostgreSQL table.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select<'a>(collection: Collection, query: &Query) -> documents::BoxedQuery<'a, Pg, (Text, Jsonb)> {
        let mut select = documents::table
            .select((documents::id, documents::doc))
            .filter(documents::collection.eq(collection.name()))
            .into_boxed();

        // Field names come from the models, never from requests.
        for condition in &query.conditions {
            select = match condition {
                Condition::Eq(field, value) => select.filter(
                    sql::<Bool>(&format!("(doc ->> '{}') = ", field)).bind::<Text, _>(value.clone()),
                ),
                Condition::Contains(field, needle) => select.filter(
                    sql::<Bool>(&format!("(doc ->> '{}') ILIKE ", field))
                        .bind::<Text, _>(like_pattern(needle)),
                ),
                Condition::IdIn(ids) => select.filter(documents::id.eq_any(ids.clone())),
            };
        }

        select = match query.sort {
            Some(Sort::NewestFirst(field)) => {
                select.order(sql::<Text>(&format!("(doc ->> '{}') DESC NULLS LAST", field)))
            }
            Some(Sort::OldestFirst(field)) => {
                select.order(sql::<Text>(&format!("(doc ->> '{}') ASC NULLS LAST", field)))
            }
            Some(Sort::LongestFirst(field)) => select.order(sql::<Text>(&format!(
                "length(doc ->> '{}') DESC NULLS LAST",
                field
            ))),
            None => select,
        };

        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
    }
}

impl DocumentStore for PgStore {
    fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertResult, AppError> {
        let conn = self.pool.get()?;

        doc.remove(ID_FIELD);
        let id = new_id();
        let record = DocumentInsert {
            id: &id,
            collection: collection.name(),
            doc: Value::Object(doc),
        };
        diesel::insert_into(documents::table)
            .values(&record)
            .execute(&conn)?;

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, AppError> {
        let conn = self.pool.get()?;

        let rows = PgStore::select(collection, query).load::<(String, Value)>(&conn)?;

        Ok(rows.into_iter().map(|(id, doc)| with_id(id, doc)).collect())
    }

    fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        mut fields: Document,
    ) -> Result<UpdateResult, AppError> {
        let conn = self.pool.get()?;

        fields.remove(ID_FIELD);
        let modified = merge_update!(collection, id, fields).execute(&conn)? as u64;
        let matched = if modified > 0 {
            modified
        } else {
            documents::table
                .filter(documents::collection.eq(collection.name()))
                .filter(documents::id.eq(id))
                .count()
                .get_result::<i64>(&conn)? as u64
        };

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched,
            modified_count: modified,
        })
    }

    fn delete_many(&self, collection: Collection, query: &Query) -> Result<DeleteResult, AppError> {
        let conn = self.pool.get()?;

        let ids = PgStore::select(collection, query)
            .load::<(String, Value)>(&conn)?
            .into_iter()
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        if ids.is_empty() {
            return Ok(DeleteResult {
                acknowledged: true,
                deleted_count: 0,
            });
        }

        let deleted = diesel::delete(documents::table.filter(documents::id.eq_any(ids)))
            .execute(&conn)? as u64;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: deleted,
        })
    }
}
