use crate::error::ExportError;
use crate::qto::{AggregationResult, QuantityKinds};
use std::fs::File;
use std::path::Path;

pub fn export_csv<P: AsRef<Path>>(
    result: &AggregationResult,
    kinds: &QuantityKinds,
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["Quantity Set", "Quantity", "Kind", "Value"])?;

    for (set_name, quantity_name, value) in result.rows() {
        let kind = kinds
            .get(set_name, quantity_name)
            .map_or("", |k| k.as_str());
        let value = value.to_string();
        writer.write_record([set_name, quantity_name, kind, value.as_str()])?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}
