//! Flat-file record store.
//!
//! Each table is one CSV file whose header row names the declared columns.
//! Rows have no stored identity: a row is addressed by its zero-based
//! position in file order, so deleting a row shifts every later row down.
//!
//! Every operation reads the whole file, mutates in memory and rewrites the
//! whole file. There is no locking; two writers racing on the same table
//! lose updates (last writer wins). Callers are expected to run one
//! interactive session at a time.

use crate::error::{OficinaError, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One row, keyed by column name.
pub type Record = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Declared column set of a table. Column order is the on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

impl Schema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| *c == column)
    }

    /// A full row must carry exactly the declared columns.
    fn check_exact(&self, row: &Record) -> Result<()> {
        let matches = row.len() == self.columns.len() && row.keys().all(|k| self.has_column(k));
        if matches {
            return Ok(());
        }
        Err(OficinaError::SchemaMismatch {
            table: self.table.to_string(),
            expected: self.columns.join(", "),
            got: row.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    /// A change set may name any subset of the declared columns.
    fn check_known(&self, changes: &Record) -> Result<()> {
        match changes.keys().find(|k| !self.has_column(k)) {
            Some(column) => Err(OficinaError::UnknownColumn {
                table: self.table.to_string(),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// In-memory image of a table file. Columns on disk that the schema does not
/// declare are kept opaque and written back unchanged.
#[derive(Debug, Default)]
struct Table {
    extra_columns: Vec<String>,
    rows: Vec<Row>,
}

#[derive(Debug)]
struct Row {
    fields: Record,
    extra: Vec<String>,
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    schema: Schema,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    /// Create the backing file with only the header row. Returns true if the
    /// file was created, false if it already existed.
    pub fn initialize(&self) -> Result<bool> {
        let created = crate::io::write_if_missing(&self.path, &self.encode(&Table::default())?)?;
        if created {
            tracing::debug!(table = self.schema.table, path = %self.path.display(), "initialized empty table");
        }
        Ok(created)
    }

    /// All rows in file order. An absent or blank file is replaced by an
    /// empty table carrying the declared header.
    pub fn load(&self) -> Result<Vec<Record>> {
        Ok(self
            .read_table()?
            .rows
            .into_iter()
            .map(|row| row.fields)
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_table()?.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, position: usize) -> Result<Record> {
        let mut rows = self.load()?;
        let len = rows.len();
        if position >= len {
            return Err(self.out_of_range(position, len));
        }
        Ok(rows.swap_remove(position))
    }

    /// Append `row` at the end of the table. Returns the new row's position.
    pub fn append(&self, row: Record) -> Result<usize> {
        self.schema.check_exact(&row)?;
        let mut table = self.read_table()?;
        let extra = vec![String::new(); table.extra_columns.len()];
        table.rows.push(Row { fields: row, extra });
        self.save(&table)?;
        Ok(table.rows.len() - 1)
    }

    /// Overwrite only the columns named in `changes` on the row at `position`.
    pub fn update(&self, position: usize, changes: &Record) -> Result<()> {
        self.schema.check_known(changes)?;
        let mut table = self.read_table()?;
        let len = table.rows.len();
        let row = table
            .rows
            .get_mut(position)
            .ok_or_else(|| self.out_of_range(position, len))?;
        for (column, value) in changes {
            row.fields.insert(column.clone(), value.clone());
        }
        self.save(&table)
    }

    /// Remove the row at `position`; later rows move down by one.
    pub fn delete(&self, position: usize) -> Result<Record> {
        let mut table = self.read_table()?;
        let len = table.rows.len();
        if position >= len {
            return Err(self.out_of_range(position, len));
        }
        let removed = table.rows.remove(position);
        self.save(&table)?;
        Ok(removed.fields)
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    fn read_table(&self) -> Result<Table> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.initialize()?;
                return Ok(Table::default());
            }
            Err(e) => return Err(e.into()),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            let table = Table::default();
            self.save(&table)?;
            return Ok(table);
        }
        self.decode(&data)
    }

    fn save(&self, table: &Table) -> Result<()> {
        let data = self.encode(table)?;
        crate::io::atomic_write(&self.path, &data)?;
        tracing::debug!(table = self.schema.table, rows = table.rows.len(), "table rewritten");
        Ok(())
    }

    /// Declared columns first, then any undeclared columns found on disk.
    fn encode(&self, table: &Table) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(
            self.schema
                .columns
                .iter()
                .copied()
                .chain(table.extra_columns.iter().map(String::as_str)),
        )?;
        for row in &table.rows {
            writer.write_record(
                self.schema
                    .columns
                    .iter()
                    .map(|c| row.fields.get(*c).map(String::as_str).unwrap_or(""))
                    .chain(row.extra.iter().map(String::as_str)),
            )?;
        }
        writer.into_inner().map_err(|e| e.into_error().into())
    }

    fn decode(&self, data: &[u8]) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let mut indices = Vec::with_capacity(self.schema.columns.len());
        for column in self.schema.columns {
            let idx = headers
                .iter()
                .position(|h| h.trim() == *column)
                .ok_or_else(|| OficinaError::MissingColumn {
                    path: self.path.display().to_string(),
                    column: column.to_string(),
                })?;
            indices.push(idx);
        }

        let extra_indices: Vec<usize> = (0..headers.len())
            .filter(|i| !indices.contains(i))
            .collect();
        let extra_columns: Vec<String> = extra_indices
            .iter()
            .map(|&i| headers.get(i).unwrap_or("").to_string())
            .collect();
        if !extra_columns.is_empty() {
            tracing::debug!(table = self.schema.table, extra = ?extra_columns, "keeping undeclared columns");
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let fields: Record = self
                .schema
                .columns
                .iter()
                .zip(&indices)
                .map(|(column, &i)| (column.to_string(), record.get(i).unwrap_or("").to_string()))
                .collect();
            let extra = extra_indices
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect();
            rows.push(Row { fields, extra });
        }
        Ok(Table {
            extra_columns,
            rows,
        })
    }

    fn out_of_range(&self, position: usize, len: usize) -> OficinaError {
        OficinaError::IndexOutOfRange {
            table: self.schema.table.to_string(),
            position,
            len,
        }
    }
}

/// Build a [`Record`] from `(column, value)` pairs.
pub fn record<const N: usize>(pairs: [(&str, &str); N]) -> Record {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CLIENTS: Schema = Schema {
        table: "clientes",
        columns: &["nome", "telefone", "endereco"],
    };

    fn store(dir: &TempDir) -> RecordStore {
        RecordStore::new(dir.path().join("clientes.csv"), CLIENTS)
    }

    fn client(nome: &str, telefone: &str, endereco: &str) -> Record {
        record([("nome", nome), ("telefone", telefone), ("endereco", endereco)])
    }

    #[test]
    fn load_missing_file_creates_header_only() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.load().unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "nome,telefone,endereco\n"
        );
    }

    #[test]
    fn load_blank_file_is_healed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "").unwrap();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "nome,telefone,endereco\n"
        );
    }

    #[test]
    fn append_preserves_existing_rows() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(client("Ana", "111", "Rua A")).unwrap();
        let pos = store.append(client("Bruno", "222", "Rua B")).unwrap();
        assert_eq!(pos, 1);

        let rows = store.load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], client("Ana", "111", "Rua A"));
        assert_eq!(rows[1], client("Bruno", "222", "Rua B"));
    }

    #[test]
    fn append_rejects_wrong_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let missing = record([("nome", "Ana"), ("telefone", "111")]);
        assert!(matches!(
            store.append(missing),
            Err(OficinaError::SchemaMismatch { .. })
        ));

        let mut extra = client("Ana", "111", "Rua A");
        extra.insert("email".to_string(), "ana@example.com".to_string());
        assert!(matches!(
            store.append(extra),
            Err(OficinaError::SchemaMismatch { .. })
        ));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn update_touches_only_named_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(client("Ana", "111", "Rua A")).unwrap();
        store.append(client("Bruno", "222", "Rua B")).unwrap();
        store.append(client("Carla", "333", "Rua C")).unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        store.update(1, &record([("telefone", "999")])).unwrap();

        let after = std::fs::read_to_string(store.path()).unwrap();
        let before_lines: Vec<_> = before.lines().collect();
        let after_lines: Vec<_> = after.lines().collect();
        assert_eq!(before_lines.len(), after_lines.len());
        for (i, (b, a)) in before_lines.iter().zip(&after_lines).enumerate() {
            if i == 2 {
                assert_eq!(*a, "Bruno,999,Rua B");
            } else {
                assert_eq!(b, a);
            }
        }
    }

    #[test]
    fn update_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(client("Ana", "111", "Rua A")).unwrap();
        let err = store.update(1, &record([("nome", "X")])).unwrap_err();
        assert!(matches!(
            err,
            OficinaError::IndexOutOfRange {
                position: 1,
                len: 1,
                ..
            }
        ));
    }

    #[test]
    fn update_unknown_column_fails() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(client("Ana", "111", "Rua A")).unwrap();
        let err = store.update(0, &record([("email", "x")])).unwrap_err();
        assert!(matches!(err, OficinaError::UnknownColumn { .. }));
    }

    #[test]
    fn delete_shifts_following_rows() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for (n, t) in [("Ana", "1"), ("Bruno", "2"), ("Carla", "3"), ("Davi", "4")] {
            store.append(client(n, t, "Rua")).unwrap();
        }
        let removed = store.delete(1).unwrap();
        assert_eq!(removed["nome"], "Bruno");

        let rows = store.load().unwrap();
        assert_eq!(rows.len(), 3);
        let names: Vec<_> = rows.iter().map(|r| r["nome"].as_str()).collect();
        assert_eq!(names, ["Ana", "Carla", "Davi"]);
    }

    #[test]
    fn delete_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(matches!(
            store.delete(0),
            Err(OficinaError::IndexOutOfRange { len: 0, .. })
        ));
    }

    #[test]
    fn fields_with_commas_and_newlines_survive() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let row = client("Ana, a \"Rápida\"", "111", "Rua A, 10\nApto 3");
        store.append(row.clone()).unwrap();
        assert_eq!(store.load().unwrap()[0], row);
    }

    #[test]
    fn header_order_on_disk_is_respected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "endereco,nome,telefone\nRua A,Ana,111\n").unwrap();
        let rows = store.load().unwrap();
        assert_eq!(rows[0], client("Ana", "111", "Rua A"));

        // rewritten in declared order
        store.update(0, &record([("telefone", "222")])).unwrap();
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "nome,telefone,endereco\nAna,222,Rua A\n"
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "nome,telefone,endereco\nAna,111\n").unwrap();
        assert_eq!(store.load().unwrap()[0], client("Ana", "111", ""));
    }

    #[test]
    fn undeclared_columns_survive_rewrites() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(
            store.path(),
            "nome,telefone,endereco,email\nAna,111,Rua A,ana@x.com\nBruno,222,Rua B,b@x.com\n",
        )
        .unwrap();
        assert_eq!(store.load().unwrap()[1], client("Bruno", "222", "Rua B"));

        store.update(0, &record([("telefone", "999")])).unwrap();
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "nome,telefone,endereco,email\nAna,999,Rua A,ana@x.com\nBruno,222,Rua B,b@x.com\n"
        );

        store.append(client("Carla", "333", "Rua C")).unwrap();
        store.delete(0).unwrap();
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "nome,telefone,endereco,email\nBruno,222,Rua B,b@x.com\nCarla,333,Rua C,\n"
        );
    }

    #[test]
    fn missing_declared_column_is_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "nome,telefone\nAna,111\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(OficinaError::MissingColumn { column, .. }) if column == "endereco"
        ));
    }
}
