//! Model layer: backing collections, values, and the data connection.
//!
//! The grid never owns row data. A [`GridModel`] implementation provides
//! values and change notifications; a [`DataConnection`] shapes them
//! (sorting, grouping) and translates between source indices and view row
//! indices.

pub mod connection;
pub mod traits;
pub mod value;

pub use connection::{
    CollectionChange, DataConnection, GroupDescription, GroupSpan, SortDescription, SortOrder,
};
pub use traits::{GridModel, ModelSignals, VecModel};
pub use value::CellValue;
