table! {
    documents (id) {
        id -> Varchar,
        collection -> Varchar,
        doc -> Jsonb,
    }
}
