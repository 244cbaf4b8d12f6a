//! Order placement

use crate::core::listing::Listing;
use crate::core::notice::Notice;
use crate::core::order::{Order, OrderDetails};
use crate::core::session::SessionContext;
use crate::core::store::OrderService;

/// Build and submit an order, reporting the outcome as a notice
///
/// Neither validation problems nor store failures escape as errors; both
/// become an error [`Notice`] for the user.
pub async fn place_order<O>(
    service: &O,
    listing: &Listing,
    session: &SessionContext,
    details: OrderDetails,
) -> Notice
where
    O: OrderService + ?Sized,
{
    let order = match Order::for_listing(listing, session, details) {
        Ok(order) => order,
        Err(e) => {
            tracing::debug!(listing_id = %listing.id, error = %e, "Order rejected before submission");
            return Notice::error(e.to_string());
        }
    };

    match service.submit_order(&order).await {
        Ok(receipt) => {
            tracing::info!(
                listing_id = %order.listing_id,
                order_id = ?receipt.order_id,
                total = order.total_price,
                "Order placed"
            );
            Notice::success(format!("Order placed for {}", order.listing_name))
        }
        Err(e) => {
            tracing::error!(listing_id = %order.listing_id, error = %e, "Order submission failed");
            Notice::error(format!("Could not place order: {}", e))
        }
    }
}
