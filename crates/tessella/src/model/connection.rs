//! Data connection between a backing collection and the grid.
//!
//! [`DataConnection`] wraps a [`GridModel`] and presents it in *view
//! order*: the order produced by the active sort and group descriptions.
//! It resolves view row indices to source rows, surfaces structured
//! [`CollectionChange`] notifications with view indices, and computes the
//! contiguous group spans the slot layout turns into group headers.
//!
//! Incremental model changes on an unshaped (unsorted, ungrouped) view are
//! re-emitted incrementally so consumers only shift the affected tail of
//! their mappings. Any change that can alter view order - a sort or group
//! description change, an insert into a sorted view, a model reset - emits
//! [`CollectionChange::Reset`] instead, which invalidates all pending
//! incremental diffs. This distinction is performance-critical: a reset
//! forces a full rebuild of slot mappings and display data downstream.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;
use tessella_core::{ConnectionId, Signal};

use super::traits::GridModel;
use super::value::CellValue;

/// Sort direction for a sort description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortOrder {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Orders the view by one value column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDescription {
    /// The value column to compare.
    pub column: usize,
    /// The direction to sort in.
    pub order: SortOrder,
}

impl SortDescription {
    /// Creates an ascending sort on `column`.
    pub fn ascending(column: usize) -> Self {
        Self {
            column,
            order: SortOrder::Ascending,
        }
    }

    /// Creates a descending sort on `column`.
    pub fn descending(column: usize) -> Self {
        Self {
            column,
            order: SortOrder::Descending,
        }
    }
}

/// Groups the view by one value column.
///
/// Group descriptions are applied outermost-first; rows sharing the same
/// key for every description up to a level form one group at that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDescription {
    /// The value column whose values form the group keys.
    pub column: usize,
}

/// A contiguous run of view rows sharing a group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpan {
    /// Nesting level; 0 is the outermost group description.
    pub level: usize,
    /// First view row of the span.
    pub start_row: usize,
    /// Number of view rows in the span.
    pub row_count: usize,
    /// The shared key value at this level.
    pub key: CellValue,
}

/// A structured change notification, in view row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// Rows were inserted at `index`.
    Inserted { index: usize, count: usize },
    /// Rows were removed at `index`.
    Removed { index: usize, count: usize },
    /// Rows were replaced in place at `index`.
    Replaced { index: usize, count: usize },
    /// View order or content changed wholesale; rebuild everything.
    Reset,
}

#[derive(Default)]
struct Shaping {
    sort: Vec<SortDescription>,
    group: Vec<GroupDescription>,
}

impl Shaping {
    fn is_passthrough(&self) -> bool {
        self.sort.is_empty() && self.group.is_empty()
    }
}

#[derive(Default)]
struct RowMapping {
    view_to_source: Vec<usize>,
    source_to_view: Vec<usize>,
}

impl RowMapping {
    fn identity(count: usize) -> Self {
        Self {
            view_to_source: (0..count).collect(),
            source_to_view: (0..count).collect(),
        }
    }

    fn from_order(view_to_source: Vec<usize>) -> Self {
        let mut source_to_view = vec![0; view_to_source.len()];
        for (view, &source) in view_to_source.iter().enumerate() {
            source_to_view[source] = view;
        }
        Self {
            view_to_source,
            source_to_view,
        }
    }
}

/// Mediates between a backing collection and the grid's row indices.
///
/// See the [module documentation](self) for the incremental-vs-reset
/// contract.
pub struct DataConnection {
    model: Arc<dyn GridModel>,
    shaping: Arc<RwLock<Shaping>>,
    mapping: Arc<RwLock<RowMapping>>,
    /// Emitted for every change to the view, in emission order.
    pub changed: Arc<Signal<CollectionChange>>,
    model_connections: Option<ModelConnectionIds>,
}

/// Connection IDs held on the model's signals, kept so the connection can
/// unsubscribe on drop.
struct ModelConnectionIds {
    inserted: ConnectionId,
    removed: ConnectionId,
    replaced: ConnectionId,
    moved: ConnectionId,
    value: ConnectionId,
    reset: ConnectionId,
}

impl DataConnection {
    /// Creates a connection over `model` with no sort or group shaping.
    pub fn new(model: Arc<dyn GridModel>) -> Self {
        let shaping = Arc::new(RwLock::new(Shaping::default()));
        let mapping = Arc::new(RwLock::new(RowMapping::identity(model.row_count())));
        let changed: Arc<Signal<CollectionChange>> = Arc::new(Signal::new());

        let mut connection = Self {
            model,
            shaping,
            mapping,
            changed,
            model_connections: None,
        };
        connection.subscribe();
        connection
    }

    fn subscribe(&mut self) {
        let signals = self.model.signals();

        let ctx = self.handler_context();
        let inserted = signals.rows_inserted.connect(move |(index, count)| {
            ctx.on_incremental(CollectionChange::Inserted {
                index: *index,
                count: *count,
            });
        });

        let ctx = self.handler_context();
        let removed = signals.rows_removed.connect(move |(index, count)| {
            ctx.on_incremental(CollectionChange::Removed {
                index: *index,
                count: *count,
            });
        });

        let ctx = self.handler_context();
        let replaced = signals
            .rows_replaced
            .connect(move |(index, count)| ctx.on_replace(*index, *count));

        let ctx = self.handler_context();
        let moved = signals
            .rows_moved
            .connect(move |(from, to)| ctx.on_move(*from, *to));

        let ctx = self.handler_context();
        let value = signals
            .value_changed
            .connect(move |(row, _column)| ctx.on_replace(*row, 1));

        let ctx = self.handler_context();
        let reset = signals.model_reset.connect(move |_| ctx.on_reset());

        self.model_connections = Some(ModelConnectionIds {
            inserted,
            removed,
            replaced,
            moved,
            value,
            reset,
        });
    }

    fn handler_context(&self) -> HandlerContext {
        HandlerContext {
            model: self.model.clone(),
            shaping: self.shaping.clone(),
            mapping: self.mapping.clone(),
            changed: self.changed.clone(),
        }
    }

    /// Returns the wrapped model.
    pub fn model(&self) -> &Arc<dyn GridModel> {
        &self.model
    }

    /// Returns the number of rows in the view.
    pub fn row_count(&self) -> usize {
        self.mapping.read().view_to_source.len()
    }

    /// Returns the number of value columns.
    pub fn column_count(&self) -> usize {
        self.model.column_count()
    }

    /// Resolves a view row to its source-collection index.
    pub fn source_index(&self, view_row: usize) -> Option<usize> {
        self.mapping.read().view_to_source.get(view_row).copied()
    }

    /// Resolves a source-collection index to its view row.
    pub fn view_index(&self, source_row: usize) -> Option<usize> {
        self.mapping.read().source_to_view.get(source_row).copied()
    }

    /// Returns the value at `(view_row, column)`.
    pub fn value(&self, view_row: usize, column: usize) -> CellValue {
        match self.source_index(view_row) {
            Some(source) => self.model.value(source, column),
            None => CellValue::None,
        }
    }

    /// Writes a value through to the backing item.
    ///
    /// Returns `false` on validation failure; the item is unchanged then.
    pub fn set_value(&self, view_row: usize, column: usize, value: CellValue) -> bool {
        match self.source_index(view_row) {
            Some(source) => self.model.set_value(source, column, value),
            None => false,
        }
    }

    /// Returns whether the item at `view_row` rejects editing entirely.
    pub fn is_row_read_only(&self, view_row: usize) -> bool {
        match self.source_index(view_row) {
            Some(source) => self.model.is_row_read_only(source),
            None => true,
        }
    }

    /// Returns whether the view order differs from source order.
    pub fn is_shaped(&self) -> bool {
        !self.shaping.read().is_passthrough()
    }

    /// Returns the active sort descriptions.
    pub fn sort_descriptions(&self) -> Vec<SortDescription> {
        self.shaping.read().sort.clone()
    }

    /// Returns the active group descriptions.
    pub fn group_descriptions(&self) -> Vec<GroupDescription> {
        self.shaping.read().group.clone()
    }

    /// Replaces the sort descriptions and rebuilds the view.
    pub fn set_sort_descriptions(&self, sort: Vec<SortDescription>) {
        self.shaping.write().sort = sort;
        self.refresh();
    }

    /// Toggles sorting on `column`: unsorted becomes ascending, ascending
    /// becomes descending, descending becomes ascending.
    ///
    /// Returns the new sort order for the column.
    pub fn toggle_sort(&self, column: usize) -> SortOrder {
        let order = {
            let mut shaping = self.shaping.write();
            let order = match shaping.sort.first() {
                Some(d) if d.column == column => d.order.toggled(),
                _ => SortOrder::Ascending,
            };
            shaping.sort = vec![SortDescription { column, order }];
            order
        };
        self.refresh();
        order
    }

    /// Replaces the group descriptions and rebuilds the view.
    pub fn set_group_descriptions(&self, group: Vec<GroupDescription>) {
        self.shaping.write().group = group;
        self.refresh();
    }

    /// Recomputes the view order and emits [`CollectionChange::Reset`].
    pub fn refresh(&self) {
        self.handler_context().on_reset();
    }

    /// Computes the contiguous group spans of the current view, ordered by
    /// start row, then level (outermost first).
    ///
    /// Rows group by the tuple of their keys at every level up to and
    /// including the span's own level, so nested spans never straddle an
    /// outer span boundary.
    pub fn group_spans(&self) -> Vec<GroupSpan> {
        let group = self.shaping.read().group.clone();
        if group.is_empty() {
            return Vec::new();
        }
        let mapping = self.mapping.read();
        let keys: Vec<Vec<CellValue>> = mapping
            .view_to_source
            .iter()
            .map(|&source| {
                group
                    .iter()
                    .map(|d| self.model.value(source, d.column))
                    .collect()
            })
            .collect();

        let mut spans = Vec::new();
        for level in 0..group.len() {
            let mut start = 0;
            while start < keys.len() {
                let mut end = start + 1;
                while end < keys.len() && keys[end][..=level] == keys[start][..=level] {
                    end += 1;
                }
                spans.push(GroupSpan {
                    level,
                    start_row: start,
                    row_count: end - start,
                    key: keys[start][level].clone(),
                });
                start = end;
            }
        }
        spans.sort_by_key(|s| (s.start_row, s.level));
        spans
    }

    /// Moves a row in the backing collection, expressed in view indices.
    ///
    /// Only meaningful on an unshaped view, where view order is source
    /// order; on a shaped view the drop is rejected because the sort or
    /// group shaping, not the caller, owns row order.
    pub fn move_row(&self, view_from: usize, view_to: usize) -> bool {
        if self.is_shaped() {
            tracing::debug!(
                target: "tessella::connection",
                "row move rejected: view is sorted or grouped"
            );
            return false;
        }
        self.model.move_row(view_from, view_to)
    }
}

impl Drop for DataConnection {
    fn drop(&mut self) {
        if let Some(ids) = self.model_connections.take() {
            let signals = self.model.signals();
            signals.rows_inserted.disconnect(ids.inserted);
            signals.rows_removed.disconnect(ids.removed);
            signals.rows_replaced.disconnect(ids.replaced);
            signals.rows_moved.disconnect(ids.moved);
            signals.value_changed.disconnect(ids.value);
            signals.model_reset.disconnect(ids.reset);
        }
    }
}

/// The shared state a model-signal handler needs, cloneable into closures.
struct HandlerContext {
    model: Arc<dyn GridModel>,
    shaping: Arc<RwLock<Shaping>>,
    mapping: Arc<RwLock<RowMapping>>,
    changed: Arc<Signal<CollectionChange>>,
}

impl HandlerContext {
    fn on_incremental(&self, change: CollectionChange) {
        if self.shaping.read().is_passthrough() {
            *self.mapping.write() = RowMapping::identity(self.model.row_count());
            self.changed.emit(change);
        } else {
            // Order may have changed; incremental diffs are invalid now.
            self.on_reset();
        }
    }

    fn on_replace(&self, index: usize, count: usize) {
        if self.shaping.read().is_passthrough() {
            self.changed.emit(CollectionChange::Replaced { index, count });
        } else {
            // The replaced values may participate in the sort or group keys.
            self.on_reset();
        }
    }

    fn on_move(&self, from: usize, to: usize) {
        if self.shaping.read().is_passthrough() {
            self.changed.emit(CollectionChange::Removed {
                index: from,
                count: 1,
            });
            self.changed.emit(CollectionChange::Inserted {
                index: to,
                count: 1,
            });
        } else {
            // Source order does not affect a shaped view; fix the mapping
            // silently.
            *self.mapping.write() = self.compute_mapping();
        }
    }

    fn on_reset(&self) {
        *self.mapping.write() = self.compute_mapping();
        self.changed.emit(CollectionChange::Reset);
    }

    fn compute_mapping(&self) -> RowMapping {
        let shaping = self.shaping.read();
        let count = self.model.row_count();
        if shaping.is_passthrough() {
            return RowMapping::identity(count);
        }

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| {
            for d in &shaping.group {
                let ord = self.model.value(a, d.column).cmp(&self.model.value(b, d.column));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            for d in &shaping.sort {
                let ord = self.model.value(a, d.column).cmp(&self.model.value(b, d.column));
                let ord = match d.order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        RowMapping::from_order(order)
    }
}
