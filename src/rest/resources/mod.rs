//! Resource implementations for the fulfillment API.
//!
//! | Resource | Base path | Extra operations |
//! |----------|-----------|------------------|
//! | [`Item`] | `/items` | `bulk_create`, `upload_image`, `delete_image` |
//! | [`Warehousing`] | `/warehousings` | `list_stocked`, `label` |
//! | [`Shipment`] | `/shipments` | `bulk_create`, `modify_request`, `cancel_request` |
//! | [`Transfer`] | `/transfers` | |
//!
//! Standard operations come from [`Resource`](crate::rest::Resource).

mod common;
mod item;
mod shipment;
mod transfer;
mod warehousing;

pub use common::{Address, LineItem, Page, BULK_LIMIT};
pub use item::{Item, ItemImage, ItemKind, ItemListParams, ItemUpdate, NewItem};
pub use shipment::{
    ModifyRequest, NewShipment, Shipment, ShipmentListParams, ShipmentStatus, ShipmentUpdate,
};
pub use transfer::{NewTransfer, Transfer, TransferListParams, TransferStatus, TransferUpdate};
pub use warehousing::{
    arrival_window, duplicate_item_codes, NewWarehousing, Warehousing, WarehousingListParams,
    WarehousingStatus, WarehousingUpdate,
};
