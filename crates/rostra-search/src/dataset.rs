//! Parquet decoding into [`Table`].

use arrow::json::ArrayWriter;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value;

use rostra_core::{Record, Table};

use crate::error::{Error, Result};

/// Decode a whole Parquet file held in memory.
///
/// Columns keep their Parquet schema order. Cell values go through Arrow's
/// JSON writer, so dates and timestamps come out as ISO strings and null
/// cells are simply absent from the row.
pub fn decode_parquet(service: &str, data: Bytes) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .map_err(|e| Error::malformed(service, format!("not a Parquet file: {e}")))?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let reader = builder
        .build()
        .map_err(|e| Error::malformed(service, e))?;

    let mut writer = ArrayWriter::new(Vec::new());
    for batch in reader {
        let batch = batch.map_err(|e| Error::malformed(service, e))?;
        writer
            .write(&batch)
            .map_err(|e| Error::malformed(service, e))?;
    }
    writer.finish().map_err(|e| Error::malformed(service, e))?;

    let json = writer.into_inner();
    // A writer that saw no batches may emit nothing at all.
    let rows: Vec<Record> = if json.is_empty() {
        Vec::new()
    } else {
        let values: Vec<Value> =
            serde_json::from_slice(&json).map_err(|e| Error::malformed(service, e))?;
        values
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => Ok(map),
                other => Err(Error::malformed(
                    service,
                    format!("unexpected row shape: {other}"),
                )),
            })
            .collect::<Result<_>>()?
    };

    Ok(Table::new(columns, rows))
}
