use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("cell ({col}, {row}) is out of field {cols}x{rows}")]
    OutOfField {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },
    #[error("invalid saved field: {0}")]
    InvalidSave(String),
}
