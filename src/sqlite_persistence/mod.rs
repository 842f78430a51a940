mod versioned_schema;

pub use versioned_schema::{
    Column, ConflictPolicy, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
