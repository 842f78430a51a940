use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection};

pub const BASE_DB_VERSION: usize = 99999;

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                auto_increment: false,
                non_null: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }

    fn from_sql(s: &str) -> Option<&'static SqlType> {
        match s {
            "TEXT" => Some(&SqlType::Text),
            "INTEGER" => Some(&SqlType::Integer),
            "REAL" => Some(&SqlType::Real),
            _ => None,
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    /// Rowid alias filled in by SQLite, never part of an insert.
    pub auto_increment: bool,
    pub non_null: bool,
}

/// What an insert does when it hits an existing key.
pub enum ConflictPolicy {
    /// Plain insert, a conflicting key is an error.
    Fail,
    /// Keep the row already stored.
    Ignore,
    /// Overwrite the listed columns of the row already stored.
    Upsert {
        key: &'static str,
        update: &'static [&'static str],
    },
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
    pub on_conflict: ConflictPolicy,
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let columns_sql: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
                if column.is_primary_key {
                    sql.push_str(" PRIMARY KEY");
                }
                if column.auto_increment {
                    sql.push_str(" AUTOINCREMENT");
                }
                if column.non_null {
                    sql.push_str(" NOT NULL");
                }
                sql
            })
            .collect();
        conn.execute(
            &format!("CREATE TABLE {} ({});", self.name, columns_sql.join(", ")),
            params![],
        )
        .with_context(|| format!("Failed to create table {}", self.name))?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    /// Columns an insert has to provide, in declaration order.
    pub fn insert_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns
            .iter()
            .filter(|c| !c.auto_increment)
            .map(|c| c.name)
    }

    /// Parameterized insert statement, honoring the table's conflict policy.
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.insert_columns().collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders.join(", ")
        );
        match &self.on_conflict {
            ConflictPolicy::Fail => {}
            ConflictPolicy::Ignore => sql.push_str(" ON CONFLICT DO NOTHING"),
            ConflictPolicy::Upsert { key, update } => {
                let assignments: Vec<String> = update
                    .iter()
                    .map(|c| format!("{} = excluded.{}", c, c))
                    .collect();
                sql.push_str(&format!(
                    " ON CONFLICT({}) DO UPDATE SET {}",
                    key,
                    assignments.join(", ")
                ));
            }
        }
        sql
    }

    fn validate(&self, conn: &Connection) -> Result<()> {
        struct ActualColumn {
            name: String,
            sql_type: String,
            non_null: bool,
            is_primary_key: bool,
        }

        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns = stmt
            .query_map(params![], |row| {
                Ok(ActualColumn {
                    name: row.get(1)?,
                    sql_type: row.get(2)?,
                    non_null: row.get::<_, i32>(3)? == 1,
                    is_primary_key: row.get::<_, i32>(5)? == 1,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if actual_columns.is_empty() {
            bail!("Table {} does not exist", self.name);
        }
        if actual_columns.len() != self.columns.len() {
            bail!(
                "Table {} has {} columns, expected {}. Found: {}",
                self.name,
                actual_columns.len(),
                self.columns.len(),
                actual_columns
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        for (actual, expected) in actual_columns.iter().zip(self.columns.iter()) {
            if actual.name != expected.name {
                bail!(
                    "Table {} column name mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    actual.name
                );
            }
            if SqlType::from_sql(&actual.sql_type) != Some(expected.sql_type) {
                bail!(
                    "Table {} column {} type mismatch: expected {:?}, got {}",
                    self.name,
                    expected.name,
                    expected.sql_type,
                    actual.sql_type
                );
            }
            if actual.non_null != expected.non_null {
                bail!(
                    "Table {} column {} non-null mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.non_null,
                    actual.non_null
                );
            }
            if actual.is_primary_key != expected.is_primary_key {
                bail!(
                    "Table {} column {} primary key mismatch: expected {}, got {}",
                    self.name,
                    expected.name,
                    expected.is_primary_key,
                    actual.is_primary_key
                );
            }
        }

        for (index_name, _) in self.indices {
            let index_exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='index' AND name=?1 AND tbl_name=?2",
                    params![index_name, self.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !index_exists {
                bail!("Table {} is missing index '{}'", self.name, index_name);
            }
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.pragma_update(None, "user_version", BASE_DB_VERSION + self.version)?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.validate(conn)?;
        }
        Ok(())
    }
}
