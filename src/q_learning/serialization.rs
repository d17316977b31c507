//! Persisted form of a Q-table.
//!
//! A snapshot is a JSON object mapping each state key string to an object of
//! `action label -> value`. States are written in key order and actions in
//! action space order, so two snapshots of equal tables are byte-identical.

use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::{Error, Result};

/// One state's action values, in the order they are written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotRow(pub Vec<(String, f64)>);

/// State key string to action values.
pub type SnapshotTable = BTreeMap<String, SnapshotRow>;

impl Serialize for SnapshotRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (action, value) in &self.0 {
            map.serialize_entry(action, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SnapshotRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = SnapshotRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of action labels to numbers")
            }

            fn visit_map<M: MapAccess<'de>>(
                self,
                mut access: M,
            ) -> std::result::Result<SnapshotRow, M::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((action, value)) = access.next_entry::<String, f64>()? {
                    entries.push((action, value));
                }
                Ok(SnapshotRow(entries))
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Write a snapshot as pretty-printed JSON.
pub fn write_table(table: &SnapshotTable, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create file {path:?}"),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush().map_err(|source| Error::Io {
        operation: format!("flush {path:?}"),
        source,
    })?;
    Ok(())
}

/// Read a snapshot; content that is not a valid table is reported as
/// [`Error::MalformedSnapshot`].
pub fn read_table(path: &Path) -> Result<SnapshotTable> {
    let file = File::open(path).map_err(|source| Error::Io {
        operation: format!("open file {path:?}"),
        source,
    })?;
    parse_table(BufReader::new(file), path)
}

pub(crate) fn parse_table<R: std::io::Read>(reader: R, path: &Path) -> Result<SnapshotTable> {
    serde_json::from_reader(reader).map_err(|e| Error::MalformedSnapshot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
