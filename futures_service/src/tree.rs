//! Two-level category tree over the published futures list.
//!
//! The provider is a pure projection: it never fetches, it reads whatever snapshot
//! the caller hands it. Roots are the `Futures` header (always present) and the
//! `No-data Futures` header (only when some codes are unsupported); leaves are the
//! records themselves.
use futures_common::codes::is_contract_code;
use futures_common::label::render_record;
use futures_common::{Category, QuoteRecord, Settings, SortMode};
use log::info;
use strum_macros::{Display, EnumString};

use crate::service::Snapshot;

/// Context tag of category headers.
pub const CATEGORY_CONTEXT: &str = "category";

/// Identifier of a category header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum CategoryId {
    /// Codes with full contract data.
    #[strum(serialize = "Futures")]
    Futures,
    /// Codes the upstream source has no data for.
    #[strum(serialize = "No-data Futures")]
    NoData,
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// Synthetic root grouping records; `label` embeds the count.
    CategoryHeader {
        /// Which category this header groups.
        id: CategoryId,
        /// Display label, e.g. `Futures(3)`.
        label: String,
        /// Whether the host should show the header expanded.
        expanded: bool,
    },
    /// One quote record.
    Leaf(QuoteRecord),
}

impl TreeNode {
    /// Whether this node is a synthetic category header.
    pub fn is_category_header(&self) -> bool {
        matches!(self, TreeNode::CategoryHeader { .. })
    }
}

/// Collapsible state of a rendered tree item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsible {
    /// Leaf; nothing to expand.
    None,
    /// Header shown folded.
    Collapsed,
    /// Header shown unfolded.
    Expanded,
}

/// Tree item handed to the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    /// Stable identifier: category name or record code.
    pub id: String,
    /// Rendered label.
    pub label: String,
    /// Expand state.
    pub collapsible: Collapsible,
    /// Context tag: `category`, `future`, `nodata` or `failed`.
    pub context: String,
    /// Hover text, only for supported leaves.
    pub tooltip: Option<String>,
}

/// Category provider for the futures view.
pub struct FutureTree {
    order: SortMode,
    sidebar_format: String,
}

impl FutureTree {
    /// Provider ordering by `order` and rendering leaves with `sidebar_format`.
    pub fn new(order: SortMode, sidebar_format: &str) -> Self {
        FutureTree {
            order,
            sidebar_format: sidebar_format.to_string(),
        }
    }

    /// Order the next fetch should use.
    pub fn order(&self) -> SortMode {
        self.order
    }

    /// Root headers for `snapshot`.
    pub fn root_nodes(&self, snapshot: &Snapshot) -> Vec<TreeNode> {
        let supported = snapshot.supported_count();
        let label = if supported > 0 {
            format!("{}({})", CategoryId::Futures, supported)
        } else {
            CategoryId::Futures.to_string()
        };
        let mut nodes = vec![TreeNode::CategoryHeader {
            id: CategoryId::Futures,
            label,
            expanded: true,
        }];

        let unsupported = snapshot.unsupported_count();
        if unsupported > 0 {
            nodes.push(TreeNode::CategoryHeader {
                id: CategoryId::NoData,
                label: format!("{}({})", CategoryId::NoData, unsupported),
                expanded: false,
            });
        }
        nodes
    }

    /// Children of `node`; leaves have none.
    pub fn children(&self, node: &TreeNode, snapshot: &Snapshot) -> Vec<TreeNode> {
        let records = snapshot.records().iter();
        match node {
            TreeNode::CategoryHeader {
                id: CategoryId::Futures,
                ..
            } => records
                .filter(|r| is_contract_code(&r.code))
                .cloned()
                .map(TreeNode::Leaf)
                .collect(),
            TreeNode::CategoryHeader {
                id: CategoryId::NoData,
                ..
            } => records
                .filter(|r| r.category == Category::Unsupported)
                .cloned()
                .map(TreeNode::Leaf)
                .collect(),
            TreeNode::Leaf(_) => Vec::new(),
        }
    }

    /// Render `node` for the host. Leaves carry no click command.
    pub fn tree_item(&self, node: &TreeNode) -> TreeItem {
        match node {
            TreeNode::CategoryHeader {
                id,
                label,
                expanded,
            } => TreeItem {
                id: id.to_string(),
                label: label.clone(),
                collapsible: if *expanded {
                    Collapsible::Expanded
                } else {
                    Collapsible::Collapsed
                },
                context: CATEGORY_CONTEXT.to_string(),
                tooltip: None,
            },
            TreeNode::Leaf(record) => TreeItem {
                id: record.code.clone(),
                label: record
                    .placeholder_label()
                    .unwrap_or_else(|| render_record(&self.sidebar_format, record, &[])),
                collapsible: Collapsible::None,
                context: record.category.to_string(),
                tooltip: (record.category == Category::Future).then(|| {
                    format!(
                        "「{}」{}\nvolume: {}\nupdated: {}",
                        record.name, record.code, record.volume, record.updated_at
                    )
                }),
            },
        }
    }

    /// Step the sort order (NORMAL -> ASC -> DESC -> NORMAL) and record it in `settings`.
    ///
    /// The caller persists `settings` and triggers the next refresh.
    pub fn change_order(&mut self, settings: &mut Settings) -> SortMode {
        self.order = self.order.cycle();
        settings.future_sort = self.order;
        info!("Futures sort order is now {}", self.order);
        self.order
    }
}
